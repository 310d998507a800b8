/// Level loader.
///
/// Levels are addressed by a 1-based index; the file for index `n` is
/// `map{n}.txt` in the configured maps directory. The absence of that file
/// is the game's only completion signal — there is no "final level" marker.
///
/// ## Sources (priority order):
///   1. `maps/` directory (`map1.txt`, `map2.txt`, ...)
///   2. Built-in embedded levels
///
/// The source is chosen once at startup and sticks for the whole run, so a
/// partially populated directory never mixes with the embedded set.

use std::path::PathBuf;

use crate::config::GameConfig;
use crate::domain::map::{LoadError, TileMap};
use super::session::{CarriedState, LevelSession};

#[derive(Clone, Debug)]
pub enum LevelSource {
    Directory(PathBuf),
    Embedded,
}

/// Pick the level source: the maps directory if it holds a first level,
/// otherwise the embedded set.
pub fn choose_source(config: &GameConfig) -> LevelSource {
    if config.maps_dir.join("map1.txt").is_file() {
        LevelSource::Directory(config.maps_dir.clone())
    } else {
        LevelSource::Embedded
    }
}

/// Load level `index` (1-based) into a fresh session, carrying the player's
/// persistent state. `Err(FileNotFound)` means the player has finished every
/// level — the caller reports the game as won.
pub fn load_session(
    source: &LevelSource,
    index: usize,
    carried: CarriedState,
    config: &GameConfig,
) -> Result<LevelSession, LoadError> {
    let map = load_map(source, index)?;
    Ok(LevelSession::new(
        map,
        index,
        carried,
        config.speed.clone(),
        config.rules.clone(),
    ))
}

fn load_map(source: &LevelSource, index: usize) -> Result<TileMap, LoadError> {
    match source {
        LevelSource::Directory(dir) => {
            let path = dir.join(format!("map{index}.txt"));
            // Only a genuinely absent file means "out of levels"; any other
            // I/O failure on an existing file is a fault, not a win.
            let text = std::fs::read_to_string(&path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    LoadError::FileNotFound { index }
                } else {
                    LoadError::Io {
                        path: path.display().to_string(),
                        source: e,
                    }
                }
            })?;
            TileMap::parse(&text, &path.to_string_lossy())
        }
        LevelSource::Embedded => {
            let maps = embedded_maps();
            let text = maps
                .get(index.wrapping_sub(1))
                .ok_or(LoadError::FileNotFound { index })?;
            TileMap::parse(text, &format!("built-in level {index}"))
        }
    }
}

/// Count the levels in the chosen source. For a directory this probes
/// `map1.txt`, `map2.txt`, ... until the first gap, matching the loader's
/// notion of "you ran out of levels".
pub fn level_count(source: &LevelSource) -> usize {
    match source {
        LevelSource::Directory(dir) => {
            let mut n = 0;
            while dir.join(format!("map{}.txt", n + 1)).is_file() {
                n += 1;
            }
            n
        }
        LevelSource::Embedded => embedded_level_count(),
    }
}

/// Number of built-in fallback levels.
pub fn embedded_level_count() -> usize {
    embedded_maps().len()
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

fn embedded_maps() -> &'static [&'static str] {
    &[
        // 1 — First Steps: one key, one door, zigzag corridors.
        "111111111111111\n\
         1S0000000000001\n\
         101111111111101\n\
         100K00000000001\n\
         101111111111101\n\
         10000000000D001\n\
         111111111111111",
        // 2 — Long Hall: a spare key on the way down.
        "1111111111111111\n\
         1S000K0000000001\n\
         1011111111111101\n\
         10000L0000000001\n\
         1011111111111101\n\
         1K00000000000001\n\
         1011111111111101\n\
         1000000000000D01\n\
         1111111111111111",
        // 3 — The Vault: ring walls, door on the bottom run.
        "111111111111111111\n\
         1S0000000000000001\n\
         101111111111111101\n\
         100000000000000001\n\
         101111111111111101\n\
         10K000000000000001\n\
         101111111111111101\n\
         10000000D000000L01\n\
         111111111111111111",
    ]
}
