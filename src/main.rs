/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::map::LoadError;
use sim::event::GameEvent;
use sim::level::{self, LevelSource};
use sim::session::{CarriedState, LevelSession};
use ui::input::InputState;
use ui::renderer::{FrameView, Phase, Renderer};
use ui::sound::SoundEngine;

/// Cap on per-frame elapsed time: after a suspend or a long stall the
/// simulation takes one big-but-bounded step instead of tunneling.
const MAX_DT_MS: u32 = 100;

/// How long messages stay on the bar.
const MESSAGE_MS: u32 = 2500;

fn main() {
    let config = GameConfig::load();
    let source = level::choose_source(&config);
    let level_count = level::level_count(&source);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut renderer, sound.as_ref(), &config, &source, level_count);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Keygate!");
}

fn game_loop(
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    source: &LevelSource,
    level_count: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut phase = Phase::Title;
    let mut session: Option<LevelSession> = None;
    // Counters as they stood when the current level was entered; a restart
    // rolls back to these, not to the mid-level values.
    let mut carried_at_entry = fresh_carried(config);
    let mut message = String::new();
    let mut message_ms: u32 = 0;
    let mut last_frame = Instant::now();

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() {
            break;
        }

        let dt_ms = (last_frame.elapsed().as_millis() as u32).min(MAX_DT_MS);
        last_frame = Instant::now();

        // Message bar countdown
        if message_ms > 0 {
            message_ms = message_ms.saturating_sub(dt_ms);
            if message_ms == 0 {
                message.clear();
            }
        }

        match phase {
            Phase::Title => {
                if kb.any_pressed(&[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc]) {
                    break;
                }
                if kb.was_pressed(KeyCode::Enter) {
                    carried_at_entry = fresh_carried(config);
                    session = Some(start_level(source, 1, carried_at_entry, config)?);
                    phase = Phase::Playing;
                }
            }

            Phase::Playing => {
                if kb.any_pressed(&[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc]) {
                    break;
                }

                let Some(sess) = session.as_mut() else {
                    phase = Phase::Title;
                    continue;
                };

                // Restart rewinds the level to its entry state.
                if kb.any_pressed(&[KeyCode::Char('r'), KeyCode::Char('R')]) {
                    let index = sess.level_index;
                    session = Some(start_level(source, index, carried_at_entry, config)?);
                    message = format!("Level {index} restarted");
                    message_ms = MESSAGE_MS;
                    continue;
                }

                let intent = kb.movement_intent();
                let result = sess.tick(intent, dt_ms);
                play_events(sound, &result.events);

                for ev in &result.events {
                    match ev {
                        GameEvent::KeyCollected { .. } => {
                            message = format!("Key collected ({}/{})", sess.player.keys_held, config.rules.max_keys);
                            message_ms = MESSAGE_MS;
                        }
                        GameEvent::DoorUnlockStarted { .. } => {
                            message = "Unlocking...".to_string();
                            message_ms = MESSAGE_MS;
                        }
                        _ => {}
                    }
                }

                if result.level_completed {
                    let next = sess.level_index + 1;
                    let carried = sess.carried();
                    match start_level(source, next, carried, config) {
                        Ok(new_session) => {
                            carried_at_entry = carried;
                            message = format!("Level {next}");
                            message_ms = MESSAGE_MS;
                            session = Some(new_session);
                        }
                        Err(LoadError::FileNotFound { .. }) => {
                            // No next level file: the run is complete.
                            play_events(sound, &[GameEvent::GameWon]);
                            session = None;
                            phase = Phase::GameComplete;
                        }
                        Err(e) => return Err(Box::new(e)),
                    }
                }
            }

            Phase::GameComplete => {
                if kb.any_pressed(&[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc]) {
                    break;
                }
                if kb.was_pressed(KeyCode::Enter) {
                    carried_at_entry = fresh_carried(config);
                    session = Some(start_level(source, 1, carried_at_entry, config)?);
                    phase = Phase::Playing;
                }
            }
        }

        let view = FrameView {
            phase,
            session: session.as_ref(),
            speed: &config.speed,
            message: &message,
            level_count,
        };
        renderer.render(&view)?;

        std::thread::sleep(Duration::from_millis(config.speed.frame_sleep_ms));
    }

    Ok(())
}

/// Load one level, treating any map-shape error as fatal. Missing files are
/// left for the caller to interpret (a missing level 1 is a broken install,
/// a missing level n+1 is a finished game).
fn start_level(
    source: &LevelSource,
    index: usize,
    carried: CarriedState,
    config: &GameConfig,
) -> Result<LevelSession, LoadError> {
    level::load_session(source, index, carried, config)
}

fn fresh_carried(config: &GameConfig) -> CarriedState {
    CarriedState {
        lives: config.rules.start_lives,
        keys_held: 0,
    }
}

fn play_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let Some(sfx) = sound else { return };
    for ev in events {
        match ev {
            GameEvent::KeyCollected { .. } => sfx.play_key(),
            GameEvent::DoorUnlockStarted { .. } => sfx.play_unlock(),
            GameEvent::DoorOpened { .. } => sfx.play_door_open(),
            GameEvent::GameWon => sfx.play_won(),
            GameEvent::LevelCompleted => {}
        }
    }
}
