//! Moving map parts: rectangular regions of the tile map that animate in
//! block, one row per tick. Opening doors and collapsing bridges run
//! through this pool.

use dn2_core::constants::MAX_NUM_MOVING_MAP_PARTS;

use crate::map::GameMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapPartMotion {
    /// The block slides upwards (doors opening)
    RiseUp,
    /// The block drops downwards (falling bridges, crushers)
    FallDown,
}

#[derive(Debug, Clone, Copy)]
pub struct MovingMapPart {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub motion: MapPartMotion,
    pub steps_remaining: i32,
}

#[derive(Debug, Clone)]
pub struct MovingMapParts {
    parts: Vec<Option<MovingMapPart>>,
}

impl Default for MovingMapParts {
    fn default() -> Self {
        Self::new()
    }
}

impl MovingMapParts {
    pub fn new() -> Self {
        Self {
            parts: vec![None; MAX_NUM_MOVING_MAP_PARTS],
        }
    }

    pub fn active_count(&self) -> usize {
        self.parts.iter().flatten().count()
    }

    /// Starts animating a block; silently dropped when the pool is full.
    pub fn spawn(
        &mut self,
        left: i32,
        top: i32,
        right: i32,
        bottom: i32,
        motion: MapPartMotion,
        steps: i32,
    ) {
        match self.parts.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(MovingMapPart {
                    left,
                    top,
                    right,
                    bottom,
                    motion,
                    steps_remaining: steps,
                });
            }
            None => log::debug!("moving map part pool exhausted"),
        }
    }

    /// Advances every active part by one row and retires finished ones.
    pub fn update(&mut self, map: &mut GameMap) {
        for slot in &mut self.parts {
            let Some(part) = slot else { continue };

            let distance = match part.motion {
                MapPartMotion::RiseUp => -1,
                MapPartMotion::FallDown => 1,
            };

            map.move_section(part.left, part.top, part.right, part.bottom, distance);
            part.top += distance;
            part.bottom += distance;

            part.steps_remaining -= 1;
            if part.steps_remaining <= 0 {
                *slot = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dn2_core::constants::TileAttributes;

    fn test_map() -> GameMap {
        let attributes = vec![TileAttributes::empty(), TileAttributes::SOLID_TOP];
        GameMap::with_size(10, 12, attributes)
    }

    const DOOR_TILE: u16 = 8;

    #[test]
    fn a_door_block_slides_up_one_row_per_tick() {
        let mut map = test_map();
        map.set_tile(DOOR_TILE, 4, 6);
        map.set_tile(DOOR_TILE, 4, 7);

        let mut parts = MovingMapParts::new();
        parts.spawn(4, 6, 4, 7, MapPartMotion::RiseUp, 2);

        parts.update(&mut map);
        assert_eq!(map.tile_at(4, 5), DOOR_TILE);
        assert_eq!(map.tile_at(4, 7), 0);
        assert_eq!(parts.active_count(), 1);

        parts.update(&mut map);
        assert_eq!(map.tile_at(4, 4), DOOR_TILE);
        assert_eq!(parts.active_count(), 0, "part retires after its steps");
    }

    #[test]
    fn a_bridge_block_falls_down() {
        let mut map = test_map();
        map.set_tile(DOOR_TILE, 2, 3);

        let mut parts = MovingMapParts::new();
        parts.spawn(2, 3, 2, 3, MapPartMotion::FallDown, 3);

        for _ in 0..3 {
            parts.update(&mut map);
        }
        assert_eq!(map.tile_at(2, 6), DOOR_TILE);
        assert_eq!(map.tile_at(2, 3), 0);
    }

    #[test]
    fn pool_is_capped_at_seventy() {
        let mut parts = MovingMapParts::new();
        for _ in 0..MAX_NUM_MOVING_MAP_PARTS + 3 {
            parts.spawn(0, 0, 1, 1, MapPartMotion::FallDown, 100);
        }
        assert_eq!(parts.active_count(), MAX_NUM_MOVING_MAP_PARTS);
    }
}
