/// Axis-aligned rectangle geometry and tile collision resolution.
///
/// Movement is resolved one axis at a time (X first, then Y, by the
/// session). Diagonal input against a corner therefore slides along the
/// open axis instead of stopping dead — deliberate, it is what makes the
/// controls feel right.
///
/// Edge policy: the tile scan is clamped to the map, and `TileMap::tile_at`
/// reports Wall for anything out of range, so a box can never leave the map
/// and the scan needs no special-case edge logic.

use super::map::{TileMap, TILE_SIZE};

/// Axis-aligned box in pixel coordinates. `(x, y)` is the top-left corner.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// This rect moved by (dx, dy).
    pub fn translated(&self, dx: f32, dy: f32) -> Rect {
        Rect { x: self.x + dx, y: self.y + dy, ..*self }
    }

    /// Strict overlap — touching edges do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// May `rect` move by a single-axis displacement `(dx, dy)`?
///
/// Scans the tile-index range covered by the translated box and denies the
/// move if any Wall tile in that range truly intersects it. The caller
/// resolves X and Y separately; passing a two-axis delta here would defeat
/// corner sliding.
pub fn can_move(map: &TileMap, rect: &Rect, dx: f32, dy: f32) -> bool {
    let moved = rect.translated(dx, dy);

    // Past the map edge counts as wall.
    if moved.x < 0.0 || moved.y < 0.0 {
        return false;
    }
    if moved.right() > map.px_width() || moved.bottom() > map.px_height() {
        return false;
    }

    let col0 = (moved.x / TILE_SIZE) as usize;
    let col1 = ((moved.right() / TILE_SIZE) as usize).min(map.width.saturating_sub(1));
    let row0 = (moved.y / TILE_SIZE) as usize;
    let row1 = ((moved.bottom() / TILE_SIZE) as usize).min(map.height.saturating_sub(1));

    for row in row0..=row1 {
        for col in col0..=col1 {
            if map.tile_at(col, row).is_solid() && moved.intersects(&map.tile_rect(col, row)) {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_from(rows: &[&str]) -> TileMap {
        TileMap::parse(&rows.join("\n"), "test").unwrap()
    }

    /// Player-sized box centered in tile (col, row).
    fn boxed_at(col: usize, row: usize) -> Rect {
        let off = (TILE_SIZE - 32.0) / 2.0;
        Rect::new(col as f32 * TILE_SIZE + off, row as f32 * TILE_SIZE + off, 32.0, 32.0)
    }

    #[test]
    fn open_floor_allows_movement() {
        let map = map_from(&[
            "11111",
            "1S001",
            "11111",
        ]);
        let r = boxed_at(1, 1);
        assert!(can_move(&map, &r, 3.0, 0.0));
        assert!(can_move(&map, &r, 0.0, 0.0));
    }

    #[test]
    fn wall_blocks_increasing_overlap() {
        let map = map_from(&[
            "11111",
            "1S011",
            "11111",
        ]);
        // Box flush against the wall at col 3; any rightward delta is denied.
        let r = Rect::new(2.0 * TILE_SIZE + 8.0, TILE_SIZE + 4.0, 32.0, 32.0);
        assert!(!can_move(&map, &r, 1.0, 0.0));
        assert!(!can_move(&map, &r, 0.5, 0.0));
        // Moving away is fine.
        assert!(can_move(&map, &r, -3.0, 0.0));
    }

    #[test]
    fn sealed_cell_blocks_all_directions() {
        let map = map_from(&[
            "111",
            "1S1",
            "111",
        ]);
        // The 32px box has 4px of slack inside its 40px tile; any delta
        // beyond the slack must be denied on every side.
        let r = boxed_at(1, 1);
        for (dx, dy) in [(6.0, 0.0), (-6.0, 0.0), (0.0, 6.0), (0.0, -6.0)] {
            assert!(!can_move(&map, &r, dx, dy), "moved ({dx},{dy})");
        }
        // Within the slack the box may still shift without touching a wall.
        assert!(can_move(&map, &r, 3.0, 0.0));
    }

    #[test]
    fn map_edge_acts_as_wall() {
        // No boundary walls at all — the clamp itself must contain the box.
        let map = map_from(&[
            "S00",
            "000",
        ]);
        let r = boxed_at(0, 0);
        assert!(!can_move(&map, &r, -10.0, 0.0));
        assert!(!can_move(&map, &r, 0.0, -10.0));
        let r = boxed_at(2, 1);
        assert!(!can_move(&map, &r, 10.0, 0.0));
        assert!(!can_move(&map, &r, 0.0, 10.0));
    }

    #[test]
    fn corner_slides_along_open_axis() {
        // Wall below, open to the right: Y is denied, X still allowed,
        // which is exactly the per-axis resolution contract.
        let map = map_from(&[
            "11111",
            "1S001",
            "11111",
        ]);
        let r = boxed_at(1, 1);
        assert!(!can_move(&map, &r, 0.0, 6.0));
        assert!(can_move(&map, &r, 6.0, 0.0));
    }

    #[test]
    fn touching_edge_is_not_a_collision() {
        let map = map_from(&[
            "11111",
            "1S011",
            "11111",
        ]);
        // Box whose right edge lands exactly on the wall boundary at x=120.
        let r = Rect::new(3.0 * TILE_SIZE - 32.0 - 2.0, TILE_SIZE + 4.0, 32.0, 32.0);
        assert!(can_move(&map, &r, 2.0, 0.0));
        assert!(!can_move(&map, &r, 2.1, 0.0));
    }

    #[test]
    fn non_solid_tiles_never_block() {
        let map = map_from(&[
            "11111",
            "1SLK1",
            "11111",
        ]);
        let r = boxed_at(1, 1);
        // Ladder and key cells are walkable (key cell is Floor after extraction).
        assert!(can_move(&map, &r, TILE_SIZE, 0.0));
        assert!(can_move(&map, &r, 2.0 * TILE_SIZE, 0.0));
    }
}
