/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub rules: RulesConfig,
    pub maps_dir: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            speed: SpeedConfig::default(),
            rules: RulesConfig::default(),
            maps_dir: PathBuf::from(default_maps_dir()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    /// Player speed in pixels per second.
    pub player_speed: f32,
    /// Door open duration: Opening → Consumed threshold.
    pub door_open_ms: u32,
    /// Cosmetic mirror-blink interval while a door opens.
    pub door_blink_ms: u32,
    /// Walk-cycle frame interval.
    pub walk_frame_ms: u32,
    /// Render loop pacing sleep.
    pub frame_sleep_ms: u64,
}

#[derive(Clone, Debug)]
pub struct RulesConfig {
    pub max_keys: u32,
    pub max_lives: u32,
    pub start_lives: u32,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_player_speed")]
    player_speed: f32,
    #[serde(default = "default_door_open")]
    door_open_ms: u32,
    #[serde(default = "default_door_blink")]
    door_blink_ms: u32,
    #[serde(default = "default_walk_frame")]
    walk_frame_ms: u32,
    #[serde(default = "default_frame_sleep")]
    frame_sleep_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_max_keys")]
    max_keys: u32,
    #[serde(default = "default_max_lives")]
    max_lives: u32,
    #[serde(default = "default_start_lives")]
    start_lives: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_maps_dir")]
    maps_dir: String,
}

// ── Defaults ──

fn default_player_speed() -> f32 { 90.0 }  // 3 px/frame at 30fps
fn default_door_open() -> u32 { 1200 }
fn default_door_blink() -> u32 { 150 }
fn default_walk_frame() -> u32 { 120 }
fn default_frame_sleep() -> u64 { 15 }

fn default_max_keys() -> u32 { 3 }
fn default_max_lives() -> u32 { 5 }
fn default_start_lives() -> u32 { 3 }

fn default_maps_dir() -> String { "maps".into() }

impl Default for SpeedConfig {
    fn default() -> Self {
        SpeedConfig {
            player_speed: default_player_speed(),
            door_open_ms: default_door_open(),
            door_blink_ms: default_door_blink(),
            walk_frame_ms: default_walk_frame(),
            frame_sleep_ms: default_frame_sleep(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            max_keys: default_max_keys(),
            max_lives: default_max_lives(),
            start_lives: default_start_lives(),
        }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            player_speed: default_player_speed(),
            door_open_ms: default_door_open(),
            door_blink_ms: default_door_blink(),
            walk_frame_ms: default_walk_frame(),
            frame_sleep_ms: default_frame_sleep(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            max_keys: default_max_keys(),
            max_lives: default_max_lives(),
            start_lives: default_start_lives(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            maps_dir: default_maps_dir(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        // Resolve maps directory: absolute paths are used as-is, relative
        // paths are searched across candidate dirs.
        let maps_dir_str = &toml_cfg.general.maps_dir;
        let maps_dir = if PathBuf::from(maps_dir_str).is_absolute() {
            PathBuf::from(maps_dir_str)
        } else {
            search_dirs
                .iter()
                .map(|d| d.join(maps_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(maps_dir_str))
        };

        GameConfig {
            speed: SpeedConfig {
                player_speed: toml_cfg.speed.player_speed,
                door_open_ms: toml_cfg.speed.door_open_ms,
                door_blink_ms: toml_cfg.speed.door_blink_ms,
                walk_frame_ms: toml_cfg.speed.walk_frame_ms,
                frame_sleep_ms: toml_cfg.speed.frame_sleep_ms,
            },
            rules: RulesConfig {
                max_keys: toml_cfg.rules.max_keys,
                max_lives: toml_cfg.rules.max_lives,
                start_lives: toml_cfg.rules.start_lives,
            },
            maps_dir,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds its data.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.speed.door_open_ms, 1200);
        assert_eq!(cfg.speed.door_blink_ms, 150);
        assert_eq!(cfg.rules.max_keys, 3);
        assert_eq!(cfg.general.maps_dir, "maps");
    }

    #[test]
    fn default_config_matches_documented_defaults() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.maps_dir, PathBuf::from("maps"));
        assert_eq!(cfg.speed.player_speed, 90.0);
        assert_eq!(cfg.rules.start_lives, 3);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg: TomlConfig = toml::from_str(
            "[speed]\nplayer_speed = 120.0\n\n[rules]\nmax_keys = 9\n",
        )
        .unwrap();
        assert_eq!(cfg.speed.player_speed, 120.0);
        assert_eq!(cfg.speed.door_open_ms, 1200);
        assert_eq!(cfg.rules.max_keys, 9);
        assert_eq!(cfg.rules.start_lives, 3);
    }
}
