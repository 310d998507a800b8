/// Tile map: parsing, normalization, and bounds-checked queries.
///
/// ## Level file format
///   One line per map row, one character per tile column:
///     '0' floor   '1' wall   'D' door   'L' ladder (inert)
///     'K' key     'S' spawn (exactly one required)
///   Unrecognized characters are Empty (non-solid). Ragged rows are a
///   load error.
///
/// ## Normalization
///   Door, Key and Spawn cells are extracted while parsing — doors and keys
///   into entity position lists, the spawn into `spawn` — and the cell
///   itself is rewritten to Floor. Re-walking a vacated key cell therefore
///   has no special behavior.

use thiserror::Error;

use super::collision::Rect;
use super::tile::Tile;

/// Tile edge length in pixels.
pub const TILE_SIZE: f32 = 40.0;
/// Player bounding box edge length; centered in the spawn tile.
pub const PLAYER_SIZE: f32 = 32.0;
/// Key pickup box edge length; centered in its tile.
const KEY_SIZE: f32 = 20.0;

#[derive(Debug, Error)]
pub enum LoadError {
    /// No file for the requested level index. The session layer treats this
    /// as "all levels completed" — it is the game's win signal, not a fault.
    #[error("no level file for index {index}")]
    FileNotFound { index: usize },

    /// The level file exists but could not be read. Unlike `FileNotFound`
    /// this is a fault, never a win signal.
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{source_name}: no spawn point ('S') in map")]
    MissingSpawn { source_name: String },

    #[error("{source_name}: row {row} has {got} columns, expected {expected}")]
    RaggedRow {
        source_name: String,
        row: usize,
        got: usize,
        expected: usize,
    },
}

#[derive(Debug)]
pub struct TileMap {
    tiles: Vec<Vec<Tile>>,
    pub width: usize,
    pub height: usize,
    /// Spawn tile (col, row), already rewritten to Floor.
    pub spawn: (usize, usize),
    /// Door tile positions extracted during parsing.
    pub door_tiles: Vec<(usize, usize)>,
    /// Key tile positions extracted during parsing.
    pub key_tiles: Vec<(usize, usize)>,
}

impl TileMap {
    /// Parse a level from text. `source_name` is only used in diagnostics.
    pub fn parse(text: &str, source_name: &str) -> Result<TileMap, LoadError> {
        let mut rows: Vec<&str> = text.lines().collect();
        while rows.last().map_or(false, |r| r.trim().is_empty()) {
            rows.pop();
        }

        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());

        let mut tiles = vec![vec![Tile::Empty; width]; height];
        let mut spawn = None;
        let mut door_tiles = vec![];
        let mut key_tiles = vec![];

        for (row, line) in rows.iter().enumerate() {
            let got = line.chars().count();
            if got != width {
                return Err(LoadError::RaggedRow {
                    source_name: source_name.to_string(),
                    row,
                    got,
                    expected: width,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                tiles[row][col] = match ch {
                    'S' => {
                        // First spawn wins; extras are plain floor.
                        if spawn.is_none() {
                            spawn = Some((col, row));
                        }
                        Tile::Floor
                    }
                    'D' => {
                        door_tiles.push((col, row));
                        Tile::Floor
                    }
                    'K' => {
                        key_tiles.push((col, row));
                        Tile::Floor
                    }
                    other => Tile::from_symbol(other),
                };
            }
        }

        let spawn = spawn.ok_or_else(|| LoadError::MissingSpawn {
            source_name: source_name.to_string(),
        })?;

        Ok(TileMap {
            tiles,
            width,
            height,
            spawn,
            door_tiles,
            key_tiles,
        })
    }

    /// Tile at (col, row). Out of range reads as Wall — the implicit map
    /// boundary, so collision code needs no edge special cases.
    #[inline]
    pub fn tile_at(&self, col: usize, row: usize) -> Tile {
        if col < self.width && row < self.height {
            self.tiles[row][col]
        } else {
            Tile::Wall
        }
    }

    /// Full pixel rect of tile (col, row).
    pub fn tile_rect(&self, col: usize, row: usize) -> Rect {
        Rect::new(
            col as f32 * TILE_SIZE,
            row as f32 * TILE_SIZE,
            TILE_SIZE,
            TILE_SIZE,
        )
    }

    /// Key pickup rect: a smaller box centered in tile (col, row).
    pub fn key_rect(&self, col: usize, row: usize) -> Rect {
        let off = (TILE_SIZE - KEY_SIZE) / 2.0;
        Rect::new(
            col as f32 * TILE_SIZE + off,
            row as f32 * TILE_SIZE + off,
            KEY_SIZE,
            KEY_SIZE,
        )
    }

    /// Player box centered in the spawn tile.
    pub fn spawn_rect(&self) -> Rect {
        let (col, row) = self.spawn;
        let off = (TILE_SIZE - PLAYER_SIZE) / 2.0;
        Rect::new(
            col as f32 * TILE_SIZE + off,
            row as f32 * TILE_SIZE + off,
            PLAYER_SIZE,
            PLAYER_SIZE,
        )
    }

    pub fn px_width(&self) -> f32 {
        self.width as f32 * TILE_SIZE
    }

    pub fn px_height(&self) -> f32 {
        self.height as f32 * TILE_SIZE
    }

    /// Serialize the normalized grid back to text rows (entity cells render
    /// as Floor, since extraction already rewrote them).
    pub fn render_rows(&self) -> Vec<String> {
        self.tiles
            .iter()
            .map(|row| row.iter().map(|t| t.symbol()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_extracts_spawn_doors_keys() {
        let map = TileMap::parse("11111\n1S0K1\n10D01\n11111", "t").unwrap();
        assert_eq!((map.width, map.height), (5, 4));
        assert_eq!(map.spawn, (1, 1));
        assert_eq!(map.door_tiles, vec![(2, 2)]);
        assert_eq!(map.key_tiles, vec![(3, 1)]);
        // Extracted cells are normalized to Floor.
        assert_eq!(map.tile_at(1, 1), Tile::Floor);
        assert_eq!(map.tile_at(2, 2), Tile::Floor);
        assert_eq!(map.tile_at(3, 1), Tile::Floor);
    }

    #[test]
    fn missing_spawn_is_an_error() {
        let err = TileMap::parse("111\n101\n111", "lvl9").unwrap_err();
        assert!(matches!(err, LoadError::MissingSpawn { .. }));
        assert!(err.to_string().contains("lvl9"));
    }

    #[test]
    fn ragged_row_is_an_error() {
        let err = TileMap::parse("1111\n1S1\n1111", "lvl2").unwrap_err();
        match err {
            LoadError::RaggedRow { row, got, expected, .. } => {
                assert_eq!((row, got, expected), (1, 3, 4));
            }
            other => panic!("expected RaggedRow, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_reads_as_wall() {
        let map = TileMap::parse("S0\n00", "t").unwrap();
        assert_eq!(map.tile_at(5, 0), Tile::Wall);
        assert_eq!(map.tile_at(0, 7), Tile::Wall);
        assert_eq!(map.tile_at(1, 1), Tile::Floor);
    }

    #[test]
    fn trailing_blank_lines_are_ignored() {
        let map = TileMap::parse("1S1\n111\n\n\n", "t").unwrap();
        assert_eq!(map.height, 2);
    }

    #[test]
    fn spawn_rect_is_centered_in_tile() {
        let map = TileMap::parse("11\nS1", "t").unwrap();
        let r = map.spawn_rect();
        assert_eq!(r.x, 4.0);
        assert_eq!(r.y, TILE_SIZE + 4.0);
        assert_eq!((r.w, r.h), (PLAYER_SIZE, PLAYER_SIZE));
    }

    #[test]
    fn serialize_round_trip_normalizes_entities() {
        let text = "11111\n1S0K1\n10D01\n11111";
        let map = TileMap::parse(text, "t").unwrap();
        let rows = map.render_rows();
        // Non-entity tiles match the input 1:1; S/D/K cells read as Floor.
        assert_eq!(rows, vec!["11111", "10001", "10001", "11111"]);
        // Serializing again is a pure function of the normalized grid.
        let again = TileMap::parse(&rows.join("\n"), "t");
        assert!(matches!(again, Err(LoadError::MissingSpawn { .. })));
    }

    #[test]
    fn first_spawn_wins() {
        let map = TileMap::parse("S0S\n000", "t").unwrap();
        assert_eq!(map.spawn, (0, 0));
        assert_eq!(map.tile_at(2, 0), Tile::Floor);
    }
}
