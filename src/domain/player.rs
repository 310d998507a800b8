/// Player state: position box, facing, walk animation, carried counters.
///
/// ## Facing rule table (ordered — the tie-break is the contract)
/// ┌───────────────────────┬──────────────┐
/// │ Condition (in order)   │ New facing   │
/// ├───────────────────────┼──────────────┤
/// │ intent.dx < 0          │ Left         │
/// │ intent.dx > 0          │ Right        │
/// │ intent.dy < 0          │ Up           │
/// │ intent.dy > 0          │ Down         │
/// │ both axes zero         │ unchanged    │
/// └───────────────────────┴──────────────┘
/// Horizontal intent wins over vertical; idle keeps the last facing so a
/// replayed input sequence always reproduces the same sprite.
///
/// ## Walk animation
/// A 3-frame cycle per direction. The frame index advances only when the
/// accumulated milliseconds since the last advance cross the configured
/// interval — never once per rendered frame — so animation speed is
/// independent of frame rate. Zero intent snaps to the idle frame at once.

use super::collision::Rect;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

/// Resolved per-tick movement intent; components in {-1, 0, 1}.
/// Produced by the input layer — the simulation never polls devices.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Intent {
    pub dx: i8,
    pub dy: i8,
}

impl Intent {
    pub const IDLE: Intent = Intent { dx: 0, dy: 0 };

    pub fn new(dx: i8, dy: i8) -> Self {
        Intent {
            dx: dx.clamp(-1, 1),
            dy: dy.clamp(-1, 1),
        }
    }

    pub fn is_idle(self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Number of frames in the walk cycle.
pub const WALK_FRAMES: u8 = 3;

#[derive(Clone, Debug)]
pub struct PlayerState {
    pub rect: Rect,
    pub facing: Facing,
    /// Current walk frame, 0..WALK_FRAMES. 0 doubles as the idle sprite.
    pub anim_frame: u8,
    /// Milliseconds accumulated toward the next frame advance.
    pub anim_elapsed_ms: u32,
    pub moving: bool,
    pub lives: u32,
    pub keys_held: u32,
}

impl PlayerState {
    pub fn new(rect: Rect, lives: u32, keys_held: u32) -> Self {
        PlayerState {
            rect,
            facing: Facing::Down,
            anim_frame: 0,
            anim_elapsed_ms: 0,
            moving: false,
            lives,
            keys_held,
        }
    }

    /// Apply the facing rule table above.
    pub fn update_facing(&mut self, intent: Intent) {
        self.facing = match (intent.dx, intent.dy) {
            (dx, _) if dx < 0 => Facing::Left,
            (dx, _) if dx > 0 => Facing::Right,
            (_, dy) if dy < 0 => Facing::Up,
            (_, dy) if dy > 0 => Facing::Down,
            _ => self.facing,
        };
    }

    /// Advance the walk cycle by `dt_ms` of elapsed time.
    /// `frame_ms` is the per-frame interval from config.
    pub fn advance_animation(&mut self, intent: Intent, dt_ms: u32, frame_ms: u32) {
        if intent.is_idle() {
            // Idle resets instantly; no decay, no half-finished frame.
            self.moving = false;
            self.anim_frame = 0;
            self.anim_elapsed_ms = 0;
            return;
        }
        self.moving = true;
        self.anim_elapsed_ms += dt_ms;
        while self.anim_elapsed_ms >= frame_ms && frame_ms > 0 {
            self.anim_elapsed_ms -= frame_ms;
            self.anim_frame = (self.anim_frame + 1) % WALK_FRAMES;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> PlayerState {
        PlayerState::new(Rect::new(0.0, 0.0, 32.0, 32.0), 3, 0)
    }

    #[test]
    fn horizontal_intent_overrides_vertical() {
        let mut p = player();
        p.update_facing(Intent::new(-1, 1));
        assert_eq!(p.facing, Facing::Left);
        p.update_facing(Intent::new(1, -1));
        assert_eq!(p.facing, Facing::Right);
    }

    #[test]
    fn vertical_intent_when_horizontal_is_zero() {
        let mut p = player();
        p.update_facing(Intent::new(0, -1));
        assert_eq!(p.facing, Facing::Up);
        p.update_facing(Intent::new(0, 1));
        assert_eq!(p.facing, Facing::Down);
    }

    #[test]
    fn idle_keeps_last_facing() {
        let mut p = player();
        p.update_facing(Intent::new(1, 0));
        p.update_facing(Intent::IDLE);
        assert_eq!(p.facing, Facing::Right);
    }

    #[test]
    fn frame_advances_on_interval_not_per_call() {
        let mut p = player();
        let walk = Intent::new(1, 0);
        // 4 calls of 40ms at a 120ms interval: only one advance.
        for _ in 0..4 {
            p.advance_animation(walk, 40, 120);
        }
        assert_eq!(p.anim_frame, 1);
        assert_eq!(p.anim_elapsed_ms, 40);
    }

    #[test]
    fn large_dt_advances_multiple_frames() {
        let mut p = player();
        p.advance_animation(Intent::new(0, 1), 250, 120);
        assert_eq!(p.anim_frame, 2);
        assert_eq!(p.anim_elapsed_ms, 10);
    }

    #[test]
    fn cycle_wraps_over_three_frames() {
        let mut p = player();
        p.advance_animation(Intent::new(1, 0), 360, 120);
        assert_eq!(p.anim_frame, 0);
    }

    #[test]
    fn idle_snaps_to_idle_frame() {
        let mut p = player();
        p.advance_animation(Intent::new(1, 0), 130, 120);
        assert_eq!(p.anim_frame, 1);
        p.advance_animation(Intent::IDLE, 10, 120);
        assert!(!p.moving);
        assert_eq!(p.anim_frame, 0);
        assert_eq!(p.anim_elapsed_ms, 0);
    }

    #[test]
    fn intent_components_are_clamped() {
        let i = Intent::new(5, -7);
        assert_eq!((i.dx, i.dy), (1, -1));
    }
}
