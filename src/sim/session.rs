/// LevelSession: the complete simulation state of one level.
///
/// Owned by the frame loop as a plain value — no module-level globals. One
/// `tick(intent, dt_ms)` advances everything in a fixed order:
///
///   1. Facing + walk animation from intent
///   2. X-axis collision resolution, commit if allowed
///   3. Y-axis collision resolution, commit if allowed
///   4. Interactions: door timers, key pickups, door unlocks
///
/// X always before Y, pickups always before unlocks, so a recorded
/// `(intent, dt)` sequence replays to the identical state.
///
/// A session is replaced wholesale on level transition; the only state that
/// survives is `CarriedState` (lives and keys held).

use crate::config::{RulesConfig, SpeedConfig};
use crate::domain::collision;
use crate::domain::map::TileMap;
use crate::domain::player::{Intent, PlayerState};
use super::event::GameEvent;
use super::interact::Interactions;

/// Player attributes that persist across level transitions.
#[derive(Clone, Copy, Debug)]
pub struct CarriedState {
    pub lives: u32,
    pub keys_held: u32,
}

/// Outcome of one tick. `level_completed` tells the caller to load the
/// next level; the events are for the sound/render collaborators.
pub struct FrameResult {
    pub level_completed: bool,
    pub events: Vec<GameEvent>,
}

#[derive(Debug)]
pub struct LevelSession {
    pub map: TileMap,
    pub interactions: Interactions,
    pub player: PlayerState,
    /// 1-based level index this session was loaded from.
    pub level_index: usize,
    pub speed: SpeedConfig,
    pub rules: RulesConfig,
}

impl LevelSession {
    pub fn new(
        map: TileMap,
        level_index: usize,
        carried: CarriedState,
        speed: SpeedConfig,
        rules: RulesConfig,
    ) -> Self {
        let interactions = Interactions::from_map(&map);
        let lives = carried.lives.min(rules.max_lives);
        let keys_held = carried.keys_held.min(rules.max_keys);
        let player = PlayerState::new(map.spawn_rect(), lives, keys_held);
        LevelSession {
            map,
            interactions,
            player,
            level_index,
            speed,
            rules,
        }
    }

    /// The state that survives this session's replacement.
    pub fn carried(&self) -> CarriedState {
        CarriedState {
            lives: self.player.lives,
            keys_held: self.player.keys_held,
        }
    }

    /// Advance the simulation by one frame of `dt_ms` elapsed time.
    pub fn tick(&mut self, intent: Intent, dt_ms: u32) -> FrameResult {
        let mut events = Vec::new();

        self.player.update_facing(intent);
        self.player
            .advance_animation(intent, dt_ms, self.speed.walk_frame_ms);

        // Per-axis displacement: intent component × speed × elapsed time.
        let step = self.speed.player_speed * dt_ms as f32 / 1000.0;
        let dx = intent.dx as f32 * step;
        let dy = intent.dy as f32 * step;

        if dx != 0.0 && collision::can_move(&self.map, &self.player.rect, dx, 0.0) {
            self.player.rect.x += dx;
        }
        if dy != 0.0 && collision::can_move(&self.map, &self.player.rect, 0.0, dy) {
            self.player.rect.y += dy;
        }

        let player_box = self.player.rect;
        let level_completed = self.interactions.step(
            &player_box,
            &mut self.player.keys_held,
            self.rules.max_keys,
            dt_ms,
            self.speed.door_open_ms,
            &mut events,
        );

        FrameResult {
            level_completed,
            events,
        }
    }

}
