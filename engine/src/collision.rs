//! Tile-AABB collision resolution, gravity ramping, conveyor belts and
//! stair-stepping. All coordinates are tile coordinates; an entity's
//! position is its bottom-left tile, matching the original's convention.

use dn2_core::constants::TileAttributes;

use crate::map::GameMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionResult {
    None,
    Collision,
    /// The leading edge touches a climbable tile (grabbable from below)
    Climbable,
    /// The leading edge touches a ladder tile
    Ladder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConveyorBeltCheckResult {
    None,
    Left,
    Right,
}

/// Inclusive tile-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoundingBox {
    /// Box for an entity whose bottom-left tile is `(x, y)`.
    pub fn from_position(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            left: x,
            top: y - (height - 1),
            right: x + width - 1,
            bottom: y,
        }
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.left <= other.right
            && self.right >= other.left
            && self.top <= other.bottom
            && self.bottom >= other.top
    }
}

/// Gravity ramp: per-tick fall distance by gravity state. The state advances
/// by one each airborne tick and saturates, so a fall starts slow and tops
/// out at 3 tiles per tick.
pub const GRAVITY_FALL_SPEEDS: [i32; 6] = [0, 1, 1, 2, 2, 3];

pub const MAX_GRAVITY_STATE: u8 = (GRAVITY_FALL_SPEEDS.len() - 1) as u8;

pub fn fall_speed_for(gravity_state: u8) -> i32 {
    GRAVITY_FALL_SPEEDS[gravity_state.min(MAX_GRAVITY_STATE) as usize]
}

pub fn advance_gravity_state(gravity_state: u8) -> u8 {
    (gravity_state + 1).min(MAX_GRAVITY_STATE)
}

/// Checks whether moving one step in `direction` is possible. The set of
/// tiles the leading edge would cross is tested against the matching
/// `SOLID_*` bit of the opposing side: a tile with `SOLID_TOP` blocks
/// downward motion into it, and so on. A blocking tile wins over
/// climbable/ladder results.
pub fn check_world_collision(
    map: &GameMap,
    direction: MovementDirection,
    bbox: &BoundingBox,
) -> CollisionResult {
    let mut result = CollisionResult::None;

    let mut inspect = |attributes: TileAttributes, blocking: TileAttributes| {
        if attributes.intersects(blocking) {
            result = CollisionResult::Collision;
        } else if result == CollisionResult::None {
            if attributes.contains(TileAttributes::CLIMBABLE) {
                result = CollisionResult::Climbable;
            } else if attributes.contains(TileAttributes::LADDER) {
                result = CollisionResult::Ladder;
            }
        }
    };

    match direction {
        MovementDirection::Up => {
            for x in bbox.left..=bbox.right {
                inspect(
                    map.attributes_at(x, bbox.top - 1),
                    TileAttributes::SOLID_BOTTOM,
                );
            }
        }
        MovementDirection::Down => {
            for x in bbox.left..=bbox.right {
                inspect(
                    map.attributes_at(x, bbox.bottom + 1),
                    TileAttributes::SOLID_TOP,
                );
            }
        }
        MovementDirection::Left => {
            for y in bbox.top..=bbox.bottom {
                inspect(
                    map.attributes_at(bbox.left - 1, y),
                    TileAttributes::SOLID_RIGHT,
                );
            }
        }
        MovementDirection::Right => {
            for y in bbox.top..=bbox.bottom {
                inspect(
                    map.attributes_at(bbox.right + 1, y),
                    TileAttributes::SOLID_LEFT,
                );
            }
        }
    }

    result
}

/// True when the row directly beneath the box has a walkable top anywhere.
pub fn is_on_solid_ground(map: &GameMap, bbox: &BoundingBox) -> bool {
    (bbox.left..=bbox.right)
        .any(|x| map.has_attribute_at(x, bbox.bottom + 1, TileAttributes::SOLID_TOP))
}

/// Conveyor belt check for an entity standing on the ground. Belt tiles
/// drag whatever stands on them one tile per tick.
pub fn check_conveyor_belt(map: &GameMap, bbox: &BoundingBox) -> ConveyorBeltCheckResult {
    for x in bbox.left..=bbox.right {
        let attributes = map.attributes_at(x, bbox.bottom + 1);
        if attributes.contains(TileAttributes::CONVEYOR_L) {
            return ConveyorBeltCheckResult::Left;
        }
        if attributes.contains(TileAttributes::CONVEYOR_R) {
            return ConveyorBeltCheckResult::Right;
        }
    }

    ConveyorBeltCheckResult::None
}

/// Tries to move one tile left or right. Entities with stair stepping may
/// climb a single-tile step when the direct move is blocked. Returns the
/// applied `(dx, dy)`, or `None` when fully blocked.
pub fn apply_horizontal_movement(
    map: &GameMap,
    bbox: &BoundingBox,
    dx: i32,
    allow_stair_stepping: bool,
) -> Option<(i32, i32)> {
    debug_assert!(dx == -1 || dx == 1);

    let direction = if dx < 0 {
        MovementDirection::Left
    } else {
        MovementDirection::Right
    };

    if check_world_collision(map, direction, bbox) != CollisionResult::Collision {
        return Some((dx, 0));
    }

    if allow_stair_stepping {
        // Try the same move from one tile up (climbing a stair)
        let stepped = bbox.translated(0, -1);
        if check_world_collision(map, MovementDirection::Up, bbox) != CollisionResult::Collision
            && check_world_collision(map, direction, &stepped) != CollisionResult::Collision
        {
            return Some((dx, -1));
        }
    }

    None
}

/// One tick of gravity: moves the box down by the ramped fall distance,
/// stopping at solid ground. Returns the applied vertical offset, the new
/// gravity state, and whether the entity landed this tick.
pub fn apply_gravity(map: &GameMap, bbox: &BoundingBox, gravity_state: u8) -> (i32, u8, bool) {
    let mut moved = 0;
    let distance = fall_speed_for(gravity_state);

    let mut current = *bbox;
    for _ in 0..distance {
        if check_world_collision(map, MovementDirection::Down, &current)
            == CollisionResult::Collision
        {
            return (moved, 0, true);
        }
        current = current.translated(0, 1);
        moved += 1;
    }

    // Zero-distance ticks still need the ground check so a freshly spawned
    // entity resting on a floor never starts ramping up
    if check_world_collision(map, MovementDirection::Down, &current) == CollisionResult::Collision {
        (moved, 0, moved > 0)
    } else {
        (moved, advance_gravity_state(gravity_state), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLID: u16 = 8;
    const LADDER: u16 = 16;
    const CLIMBABLE: u16 = 24;
    const TOP_ONLY: u16 = 32;
    const BELT_L: u16 = 40;
    const BELT_R: u16 = 48;

    fn test_map() -> GameMap {
        let attributes = vec![
            TileAttributes::empty(),
            TileAttributes::SOLID_TOP
                | TileAttributes::SOLID_BOTTOM
                | TileAttributes::SOLID_LEFT
                | TileAttributes::SOLID_RIGHT,
            TileAttributes::LADDER,
            TileAttributes::CLIMBABLE,
            TileAttributes::SOLID_TOP,
            TileAttributes::SOLID_TOP | TileAttributes::CONVEYOR_L,
            TileAttributes::SOLID_TOP | TileAttributes::CONVEYOR_R,
        ];
        let mut map = GameMap::with_size(20, 20, attributes);

        // A floor across the bottom
        for x in 0..20 {
            map.set_tile(SOLID, x, 15);
        }
        map
    }

    fn standing_box(x: i32) -> BoundingBox {
        BoundingBox::from_position(x, 14, 2, 2)
    }

    #[test]
    fn bounding_box_from_bottom_left_position() {
        let bbox = BoundingBox::from_position(4, 10, 3, 5);
        assert_eq!(
            bbox,
            BoundingBox {
                left: 4,
                top: 6,
                right: 6,
                bottom: 10
            }
        );
    }

    #[test]
    fn downward_motion_is_blocked_by_solid_top() {
        let map = test_map();
        let result = check_world_collision(&map, MovementDirection::Down, &standing_box(5));
        assert_eq!(result, CollisionResult::Collision);
    }

    #[test]
    fn upward_motion_is_blocked_by_solid_bottom() {
        let mut map = test_map();
        map.set_tile(SOLID, 5, 10);
        let bbox = BoundingBox::from_position(5, 12, 1, 2);
        assert_eq!(
            check_world_collision(&map, MovementDirection::Up, &bbox),
            CollisionResult::Collision
        );
    }

    #[test]
    fn one_sided_platform_blocks_only_from_above() {
        let mut map = test_map();
        map.set_tile(TOP_ONLY, 5, 10);

        let above = BoundingBox::from_position(5, 9, 1, 1);
        assert_eq!(
            check_world_collision(&map, MovementDirection::Down, &above),
            CollisionResult::Collision
        );

        let below = BoundingBox::from_position(5, 12, 1, 1);
        assert_eq!(
            check_world_collision(&map, MovementDirection::Up, &below),
            CollisionResult::None
        );
        let beside = BoundingBox::from_position(4, 10, 1, 1);
        assert_eq!(
            check_world_collision(&map, MovementDirection::Right, &beside),
            CollisionResult::None
        );
    }

    #[test]
    fn sideways_motion_is_blocked_by_opposing_side_bits() {
        let mut map = test_map();
        map.set_tile(SOLID, 8, 14);

        let left_of_wall = standing_box(6);
        assert_eq!(
            check_world_collision(&map, MovementDirection::Right, &left_of_wall),
            CollisionResult::Collision
        );

        let right_of_wall = standing_box(9);
        assert_eq!(
            check_world_collision(&map, MovementDirection::Left, &right_of_wall),
            CollisionResult::Collision
        );
    }

    #[test]
    fn climbable_and_ladder_tiles_are_reported() {
        let mut map = test_map();
        map.set_tile(CLIMBABLE, 5, 8);
        let below_pipe = BoundingBox::from_position(5, 9, 1, 1);
        assert_eq!(
            check_world_collision(&map, MovementDirection::Up, &below_pipe),
            CollisionResult::Climbable
        );

        map.set_tile(LADDER, 7, 14);
        let above_ladder = BoundingBox::from_position(7, 13, 1, 1);
        assert_eq!(
            check_world_collision(&map, MovementDirection::Down, &above_ladder),
            CollisionResult::Ladder
        );
    }

    #[test]
    fn map_edges_do_not_block() {
        let map = test_map();
        let at_left_edge = BoundingBox::from_position(0, 5, 1, 1);
        assert_eq!(
            check_world_collision(&map, MovementDirection::Left, &at_left_edge),
            CollisionResult::None
        );
    }

    #[test]
    fn gravity_ramps_up_and_saturates() {
        assert_eq!(fall_speed_for(0), 0);
        assert_eq!(fall_speed_for(1), 1);
        assert_eq!(fall_speed_for(5), 3);
        assert_eq!(fall_speed_for(200), 3, "state must saturate");
        assert_eq!(advance_gravity_state(5), 5);
    }

    #[test]
    fn falling_stops_on_the_floor_and_resets_the_ramp() {
        let map = test_map();
        let in_air = BoundingBox::from_position(5, 13, 2, 2);

        let (moved, state, landed) = apply_gravity(&map, &in_air, 3);
        assert_eq!(moved, 1, "must stop at the floor short of full distance");
        assert_eq!(state, 0);
        assert!(landed);
    }

    #[test]
    fn resting_on_ground_keeps_gravity_state_zero() {
        let map = test_map();
        let (moved, state, landed) = apply_gravity(&map, &standing_box(5), 0);
        assert_eq!(moved, 0);
        assert_eq!(state, 0);
        assert!(!landed);
    }

    #[test]
    fn free_fall_advances_the_gravity_state() {
        let map = test_map();
        let high_up = BoundingBox::from_position(5, 2, 1, 1);
        let (moved, state, landed) = apply_gravity(&map, &high_up, 1);
        assert_eq!(moved, 1);
        assert_eq!(state, 2);
        assert!(!landed);
    }

    #[test]
    fn stair_stepping_climbs_single_tile_steps() {
        let mut map = test_map();
        map.set_tile(SOLID, 7, 14); // one-tile step in the walking path

        let bbox = standing_box(5);
        assert_eq!(
            apply_horizontal_movement(&map, &bbox, 1, false),
            None,
            "without stair stepping the step blocks"
        );
        assert_eq!(
            apply_horizontal_movement(&map, &bbox, 1, true),
            Some((1, -1))
        );
    }

    #[test]
    fn stair_stepping_does_not_climb_two_tile_walls() {
        let mut map = test_map();
        map.set_tile(SOLID, 7, 14);
        map.set_tile(SOLID, 7, 13);

        let bbox = standing_box(5);
        assert_eq!(apply_horizontal_movement(&map, &bbox, 1, true), None);
    }

    #[test]
    fn conveyor_belts_report_drift_direction() {
        let mut map = test_map();
        map.set_tile(BELT_L, 3, 15);
        map.set_tile(BELT_R, 10, 15);

        assert_eq!(
            check_conveyor_belt(&map, &standing_box(3)),
            ConveyorBeltCheckResult::Left
        );
        assert_eq!(
            check_conveyor_belt(&map, &standing_box(10)),
            ConveyorBeltCheckResult::Right
        );
        assert_eq!(
            check_conveyor_belt(&map, &standing_box(6)),
            ConveyorBeltCheckResult::None
        );
    }
}
