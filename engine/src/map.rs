//! The tile map: a rectangular grid of tile indices plus the per-index
//! attribute table. Dimensions are fixed after load; tile contents mutate
//! only through [`GameMap::set_tile`] and [`GameMap::move_section`], used by
//! doors, switches and destructible geometry.

use bitflags::bitflags;
use dn2_core::constants::TileAttributes;

use crate::services::LevelData;

/// Tile indices with this bit set refer to the masked (foreground) tileset;
/// they carry no attributes.
pub const MASKED_TILE_BIT: u16 = 0x8000;

bitflags! {
    /// Per-level flags from the level header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LevelFlags: u8 {
        /// Backdrop scrolls on its own, independent of the camera
        const BACKDROP_AUTO_SCROLL = 0x1;
        /// Level starts with the earthquake effect armed
        const EARTHQUAKE = 0x2;
        /// Backdrop follows the camera with a parallax factor
        const PARALLAX_BACKDROP = 0x4;
    }
}

#[derive(Debug, Clone)]
pub struct GameMap {
    width: i32,
    height: i32,
    tiles: Vec<u16>,
    tileset_attributes: Vec<TileAttributes>,
}

impl GameMap {
    pub fn from_level(level: &LevelData) -> Self {
        debug_assert_eq!(level.tiles.len(), (level.width * level.height) as usize);

        Self {
            width: level.width,
            height: level.height,
            tiles: level.tiles.clone(),
            tileset_attributes: level.tileset_attributes.clone(),
        }
    }

    /// An all-empty map, mainly useful in tests.
    pub fn with_size(width: i32, height: i32, tileset_attributes: Vec<TileAttributes>) -> Self {
        Self {
            width,
            height,
            tiles: vec![0; (width * height) as usize],
            tileset_attributes,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }

    /// Tile index at the given cell; out-of-bounds reads as empty.
    pub fn tile_at(&self, x: i32, y: i32) -> u16 {
        self.offset(x, y).map_or(0, |offset| self.tiles[offset])
    }

    /// Writes a tile. Out-of-bounds writes are dropped.
    pub fn set_tile(&mut self, tile_index: u16, x: i32, y: i32) {
        if let Some(offset) = self.offset(x, y) {
            self.tiles[offset] = tile_index;
        }
    }

    /// Attributes of a tile index. Masked tiles have none; the table is
    /// indexed by groups of eight, mirroring the original's layout.
    pub fn attributes(&self, tile_index: u16) -> TileAttributes {
        if tile_index & MASKED_TILE_BIT != 0 {
            return TileAttributes::empty();
        }

        self.tileset_attributes
            .get((tile_index >> 3) as usize)
            .copied()
            .unwrap_or_else(TileAttributes::empty)
    }

    /// Attributes of the tile at a cell.
    pub fn attributes_at(&self, x: i32, y: i32) -> TileAttributes {
        self.attributes(self.tile_at(x, y))
    }

    pub fn has_attribute_at(&self, x: i32, y: i32, attribute: TileAttributes) -> bool {
        self.attributes_at(x, y).intersects(attribute)
    }

    /// Shifts the rectangular tile block `(left, top) ..= (right, bottom)`
    /// down by `distance` rows, clearing the vacated cells. Doors and
    /// falling bridges animate through this.
    pub fn move_section(&mut self, left: i32, top: i32, right: i32, bottom: i32, distance: i32) {
        if distance == 0 {
            return;
        }

        if distance > 0 {
            for y in (top..=bottom).rev() {
                for x in left..=right {
                    let tile = self.tile_at(x, y);
                    self.set_tile(tile, x, y + distance);
                }
            }
        } else {
            for y in top..=bottom {
                for x in left..=right {
                    let tile = self.tile_at(x, y);
                    self.set_tile(tile, x, y + distance);
                }
            }
        }

        // Clear the rows the block has left behind
        let vacated = distance.unsigned_abs() as i32;
        for step in 0..vacated.min(bottom - top + 1) {
            let y = if distance > 0 { top + step } else { bottom - step };
            for x in left..=right {
                self.set_tile(0, x, y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A small attribute table: indices 0..=7 are empty, 8..=15 are fully
    // solid, 16..=23 are ladders.
    fn test_attributes() -> Vec<TileAttributes> {
        vec![
            TileAttributes::empty(),
            TileAttributes::SOLID_TOP
                | TileAttributes::SOLID_BOTTOM
                | TileAttributes::SOLID_LEFT
                | TileAttributes::SOLID_RIGHT,
            TileAttributes::LADDER,
        ]
    }

    const SOLID: u16 = 8;
    const LADDER: u16 = 16;

    #[test]
    fn out_of_bounds_reads_as_empty() {
        let map = GameMap::with_size(4, 4, test_attributes());
        assert_eq!(map.tile_at(-1, 0), 0);
        assert_eq!(map.tile_at(0, -1), 0);
        assert_eq!(map.tile_at(4, 0), 0);
        assert_eq!(map.tile_at(0, 4), 0);
    }

    #[test]
    fn set_tile_round_trips_and_ignores_out_of_bounds() {
        let mut map = GameMap::with_size(4, 4, test_attributes());
        map.set_tile(SOLID, 2, 3);
        map.set_tile(SOLID, 9, 9);

        assert_eq!(map.tile_at(2, 3), SOLID);
        assert_eq!(map.tile_at(3, 3), 0);
    }

    #[test]
    fn attributes_look_up_by_index_group() {
        let map = GameMap::with_size(4, 4, test_attributes());
        assert_eq!(map.attributes(0), TileAttributes::empty());
        assert!(map.attributes(SOLID).contains(TileAttributes::SOLID_TOP));
        assert!(map.attributes(SOLID + 7).contains(TileAttributes::SOLID_TOP));
        assert!(map.attributes(LADDER).contains(TileAttributes::LADDER));
    }

    #[test]
    fn masked_tiles_have_no_attributes() {
        let map = GameMap::with_size(4, 4, test_attributes());
        assert_eq!(
            map.attributes(SOLID | MASKED_TILE_BIT),
            TileAttributes::empty()
        );
    }

    #[test]
    fn unknown_indices_have_no_attributes() {
        let map = GameMap::with_size(4, 4, test_attributes());
        assert_eq!(map.attributes(4000), TileAttributes::empty());
    }

    #[test]
    fn move_section_shifts_down_and_clears_vacated_cells() {
        let mut map = GameMap::with_size(4, 8, test_attributes());
        map.set_tile(SOLID, 1, 2);
        map.set_tile(LADDER, 2, 3);

        map.move_section(1, 2, 2, 3, 2);

        assert_eq!(map.tile_at(1, 4), SOLID);
        assert_eq!(map.tile_at(2, 5), LADDER);
        assert_eq!(map.tile_at(1, 2), 0);
        assert_eq!(map.tile_at(2, 3), 0);
    }

    #[test]
    fn move_section_shifts_up() {
        let mut map = GameMap::with_size(4, 8, test_attributes());
        map.set_tile(SOLID, 1, 5);

        map.move_section(1, 5, 1, 5, -3);

        assert_eq!(map.tile_at(1, 2), SOLID);
        assert_eq!(map.tile_at(1, 5), 0);
    }

    #[test]
    fn dimensions_are_fixed_after_construction() {
        let mut map = GameMap::with_size(6, 3, test_attributes());
        map.set_tile(SOLID, 0, 0);
        map.move_section(0, 0, 5, 2, 1);
        assert_eq!(map.width(), 6);
        assert_eq!(map.height(), 3);
    }
}
