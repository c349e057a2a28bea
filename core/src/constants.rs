//! Constants module - game constants recovered from the original executable

use bitflags::bitflags;

// =============================================================================
// Screen Geometry
// =============================================================================

/// Screen dimensions in pixels (VGA mode 13h)
pub const SCREEN_WIDTH: i32 = 320;
pub const SCREEN_HEIGHT: i32 = 200;

/// Screen dimensions in tiles
pub const SCREEN_WIDTH_TILES: i32 = 40;
pub const SCREEN_HEIGHT_TILES: i32 = 25;

/// The in-game viewport (the part of the screen showing the map)
pub const VIEWPORT_WIDTH: i32 = 32;
pub const VIEWPORT_HEIGHT: i32 = 20;

/// One map tile is 8x8 pixels
pub const TILE_SIZE: i32 = 8;

/// Radar display position on the HUD (pixels)
pub const RADAR_POS_X: i32 = 288;
pub const RADAR_POS_Y: i32 = 136;

// =============================================================================
// Timing
// =============================================================================

/// Rate of the original's re-programmed PIT interrupt ("fast ticks")
pub const FAST_TICKS_PER_SECOND: i32 = 280;

/// Animation/menu timing unit ("slow ticks")
pub const SLOW_TICKS_PER_SECOND: i32 = 140;

/// Rate of the gameplay simulation, in logic ticks per second
pub const GAME_FRAMES_PER_SECOND: i32 = 15;

/// Maximum number of logic ticks consumed per rendered frame before the
/// remaining accumulated time is discarded
pub const MAX_CATCH_UP_TICKS: i32 = 4;

// =============================================================================
// Object Pools
// =============================================================================

pub const MAX_NUM_ACTORS: usize = 448;
pub const MAX_NUM_EFFECTS: usize = 18;
pub const MAX_NUM_PLAYER_SHOTS: usize = 6;
pub const MAX_NUM_MOVING_MAP_PARTS: usize = 70;

pub const NUM_PARTICLE_GROUPS: usize = 5;
pub const PARTICLES_PER_GROUP: usize = 64;

// =============================================================================
// Player
// =============================================================================

pub const PLAYER_MAX_HEALTH: i32 = 9;
pub const MAX_AMMO: i32 = 32;
pub const MAX_AMMO_FLAMETHROWER: i32 = 64;

/// The HUD's score field holds 7 digits
pub const MAX_SCORE: i32 = 9_999_999;

/// Invulnerability window after taking non-fatal damage, in logic ticks
pub const INITIAL_MERCY_FRAMES: i32 = 20;

/// Duration of the cloaking device and rapid fire items, in logic ticks
pub const CLOAK_TIME: i32 = 700;
pub const RAPID_FIRE_TIME: i32 = 700;

pub const NUM_INVENTORY_SLOTS: usize = 6;
pub const NUM_COLLECTABLE_LETTERS: usize = 5;

// =============================================================================
// Weapon Damage
// =============================================================================

pub const WPN_DAMAGE_REGULAR: i32 = 1;
pub const WPN_DAMAGE_LASER: i32 = 2;
pub const WPN_DAMAGE_ROCKET_LAUNCHER: i32 = 8;
pub const WPN_DAMAGE_FLAME_THROWER: i32 = 2;
pub const WPN_DAMAGE_SHIP_LASER: i32 = 5;

// =============================================================================
// Saved Games & High Scores
// =============================================================================

pub const NUM_SAVE_SLOTS: usize = 8;
pub const SAVE_SLOT_NAME_MAX_LEN: usize = 18;

pub const NUM_HIGH_SCORE_ENTRIES: usize = 10;
pub const HIGH_SCORE_NAME_MAX_LEN: usize = 15;

// =============================================================================
// Bonuses
// =============================================================================

/// Each categorical end-of-level bonus is worth a flat 100,000 points
pub const SCORE_ADDED_PER_BONUS: i32 = 100_000;

// =============================================================================
// Scripts & Menus
// =============================================================================

/// With the demo time-out enabled, a script waiting for input this many slow
/// ticks terminates and hands control back to the intro/demo loop
pub const SCRIPT_TIMEOUT_TO_DEMO_TICKS: i32 = 2100;

/// Actor id of the news reporter sprite used on the story screens
pub const NEWS_REPORTER_ACTOR_ID: u16 = 297;

/// Number of mouth positions in the news reporter talk animation
pub const NUM_NEWS_REPORTER_STATES: usize = 4;

/// The in-game message line break marker; printing pauses on it
pub const MESSAGE_NEXT_LINE_MARKER: char = '*';

/// Maximum printed line length for in-game messages
pub const MESSAGE_CHARS_PER_LINE: usize = 37;

// =============================================================================
// Demo Playback
// =============================================================================

/// The built-in demo always plays episode 0 on hard difficulty
pub const DEMO_EPISODE: i32 = 0;

/// Level sequence of the built-in demo recording
pub const DEMO_LEVELS: [i32; 4] = [0, 2, 4, 6];

/// Byte value terminating the recorded demo input stream
pub const END_OF_DEMO_MARKER: u8 = 0xFF;

/// Levels per episode; finishing the last one ends the episode
pub const NUM_LEVELS_PER_EPISODE: i32 = 8;

// =============================================================================
// Tile Attributes
// =============================================================================

bitflags! {
    /// Per-tile-index attribute bits, using the original's bit layout.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TileAttributes: u16 {
        const SOLID_TOP = 0x1;
        const SOLID_BOTTOM = 0x2;
        const SOLID_RIGHT = 0x4;
        const SOLID_LEFT = 0x8;
        const ANIMATED = 0x10;
        const FOREGROUND = 0x20;
        const FLAMMABLE = 0x40;
        const CLIMBABLE = 0x80;
        const CONVEYOR_L = 0x100;
        const CONVEYOR_R = 0x200;
        const SLOW_ANIMATION = 0x400;
        const LADDER = 0x4000;
    }
}

// =============================================================================
// Random Number Table
// =============================================================================

/// The random number lookup table embedded in the original game's executable.
/// The simulation draws all of its randomness from this table through a
/// wrapping index; this is what makes demo playback reproducible.
pub const RANDOM_NUMBER_TABLE: [u8; 256] = [
    0, 8, 109, 220, 222, 241, 149, 107, 75, 248, 254, 140, 16, 66, 74, 21, 211, 47, 80, 242, 154,
    27, 205, 128, 161, 89, 77, 36, 95, 110, 85, 48, 212, 140, 211, 249, 22, 79, 200, 50, 28, 188,
    52, 140, 202, 120, 68, 145, 62, 70, 184, 190, 91, 197, 152, 224, 149, 104, 25, 178, 252, 182,
    202, 182, 141, 197, 4, 81, 181, 242, 145, 42, 39, 227, 156, 198, 225, 193, 219, 93, 122, 175,
    249, 0, 175, 143, 70, 239, 46, 246, 163, 53, 163, 109, 168, 135, 2, 235, 25, 92, 20, 145, 138,
    77, 69, 166, 78, 176, 173, 212, 166, 113, 94, 161, 41, 50, 239, 49, 111, 164, 70, 60, 2, 37,
    171, 75, 136, 156, 11, 56, 42, 146, 138, 229, 73, 146, 77, 61, 98, 196, 135, 106, 63, 197,
    195, 86, 96, 203, 113, 101, 170, 247, 181, 113, 80, 250, 108, 7, 255, 237, 129, 226, 79, 107,
    112, 166, 103, 241, 24, 223, 239, 120, 198, 58, 60, 82, 128, 3, 184, 66, 143, 224, 145, 224,
    81, 206, 163, 45, 63, 90, 168, 114, 59, 33, 159, 95, 28, 139, 123, 98, 125, 196, 15, 70, 194,
    253, 54, 14, 109, 226, 71, 17, 161, 93, 186, 87, 244, 138, 20, 52, 123, 251, 26, 36, 17, 46,
    52, 231, 232, 76, 31, 221, 84, 37, 216, 165, 212, 106, 197, 242, 98, 43, 39, 175, 254, 145,
    190, 84, 118, 222, 187, 136, 120, 163, 236, 249,
];
