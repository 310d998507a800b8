/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Empty,
    Floor,
    Wall,   // Solid — the only tile that blocks movement
    Door,   // Extracted into a Door entity at load time
    Ladder, // Reserved, currently inert (walkable)
    Key,    // Extracted into a KeyPickup entity at load time
}

impl Tile {
    /// Does this tile block movement?
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Wall)
    }

    /// Map a level-file symbol to a tile. `S` (spawn) is handled by the
    /// parser, not here; unrecognized symbols are Empty (non-solid).
    pub fn from_symbol(ch: char) -> Tile {
        match ch {
            '0' => Tile::Floor,
            '1' => Tile::Wall,
            'D' => Tile::Door,
            'L' => Tile::Ladder,
            'K' => Tile::Key,
            _ => Tile::Empty,
        }
    }

    /// The level-file symbol for this tile. Inverse of `from_symbol`
    /// for every tile that can survive normalization.
    pub fn symbol(self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::Floor => '0',
            Tile::Wall => '1',
            Tile::Door => 'D',
            Tile::Ladder => 'L',
            Tile::Key => 'K',
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_wall_is_solid() {
        assert!(Tile::Wall.is_solid());
        for t in [Tile::Empty, Tile::Floor, Tile::Door, Tile::Ladder, Tile::Key] {
            assert!(!t.is_solid());
        }
    }

    #[test]
    fn symbol_round_trip() {
        for t in [Tile::Floor, Tile::Wall, Tile::Door, Tile::Ladder, Tile::Key] {
            assert_eq!(Tile::from_symbol(t.symbol()), t);
        }
    }

    #[test]
    fn unrecognized_symbol_is_empty() {
        assert_eq!(Tile::from_symbol('x'), Tile::Empty);
        assert_eq!(Tile::from_symbol('?'), Tile::Empty);
        assert_eq!(Tile::from_symbol(' '), Tile::Empty);
    }
}
