//! The interfaces through which the core reaches its external collaborators:
//! the 2D renderer, the audio mixer, and the asset provider. The outer frame
//! implements these on top of the platform layer; tests use the null
//! implementations below.

use anyhow::Result;
use dn2_core::constants::TileAttributes;
use dn2_core::types::ScriptBundle;

use crate::map::LevelFlags;

/// How an actor sprite is drawn this frame. Anything except `Normal` is reset
/// back to `Normal` by the engine after one frame, so an actor can flash
/// white for a single frame by setting `Whiteflash` once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DrawStyle {
    /// Not drawn, and does not collide with the player or projectiles
    Invisible,
    #[default]
    Normal,
    /// Hit flash
    Whiteflash,
    /// Drawn in front of the map's foreground tiles
    InFront,
    /// Used for the player while the cloaking device is active
    Translucent,
}

/// Sound effects the core triggers by id. The mixer resolves these to the
/// AdLib/SoundBlaster samples loaded from the game data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundId {
    BigExplosion,
    Explosion,
    AlternateExplosion,
    DukeJumping,
    DukeLanding,
    DukePain,
    DukeDeath,
    NormalShot,
    LaserShot,
    RocketShot,
    FlameThrowerShot,
    ItemPickup,
    WeaponPickup,
    HealthPickup,
    LetterPickup,
    EnemyHit,
    GlassBreaking,
    DoorOpening,
    ForceFieldFizzle,
    Teleport,
    MenuSelect,
    MenuToggle,
    IngameMessageTyping,
    EarthQuake,
    FallingRock,
}

/// The draw-primitive surface the core renders with. Implementations sit on
/// top of the external renderer's texture/batch API; coordinates are in
/// tiles unless stated otherwise.
pub trait Renderer {
    fn clear(&mut self);

    fn draw_tile(&mut self, tile_index: u16, x: i32, y: i32);
    fn draw_sprite(&mut self, actor_id: u16, frame: u8, x: i32, y: i32, style: DrawStyle);
    fn draw_backdrop(&mut self, name: &str, offset_x: i32, offset_y: i32);
    fn draw_full_screen_image(&mut self, image: &str);

    fn draw_text(&mut self, x: i32, y: i32, text: &str);
    fn draw_big_text(&mut self, x: i32, y: i32, color_index: i32, text: &str);
    fn draw_checkbox(&mut self, x: i32, y: i32, checked: bool);
    fn draw_message_box_frame(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn draw_menu_selection_indicator(&mut self, y: i32);

    /// Solid fill, in tile coordinates, with a palette color
    fn fill_rect(&mut self, left: i32, top: i32, right: i32, bottom: i32, color_index: u8);
    /// Semi-transparent overlay used for water areas, in pixel coordinates
    fn fill_rect_translucent(&mut self, left: i32, top: i32, right: i32, bottom: i32);
    /// One-frame full screen flash
    fn flash_screen(&mut self, color_index: u8);

    /// Whole-output pixel offset; used for the screen shake effect
    fn set_global_translation(&mut self, x: i32, y: i32);

    fn set_palette(&mut self, palette_file: &str);
}

/// Write-only, non-blocking surface towards the audio mixer plus the screen
/// fades that the orchestrator treats as blocking. The mixer runs on its own
/// thread; the core never shares state with it beyond these calls.
pub trait ServiceProvider {
    fn fade_out_screen(&mut self);
    fn fade_in_screen(&mut self);

    fn play_sound(&mut self, id: SoundId);
    fn stop_sound(&mut self, id: SoundId);
    fn stop_all_sounds(&mut self);
    fn play_music(&mut self, name: &str);
    fn stop_music(&mut self);
    fn set_music_volume(&mut self, volume: f32);
    fn set_sound_volume(&mut self, volume: f32);

    fn is_shareware_version(&self) -> bool;
}

/// A level as decoded by the external asset loader. Tile indices with the
/// high bit set refer to the masked (foreground) tileset.
#[derive(Debug, Clone)]
pub struct LevelData {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<u16>,
    /// Attributes per tile-index group, indexed by `tile_index >> 3`
    pub tileset_attributes: Vec<TileAttributes>,
    /// Actor descriptions from the level header: (id, x, y)
    pub actor_descriptions: Vec<(u16, i32, i32)>,
    pub backdrop_image: String,
    pub music_file: String,
    pub flags: LevelFlags,
    pub player_start: (i32, i32),
    pub player_facing_left: bool,
    /// Water regions `(left, top, right, bottom)`, drawn as a translucent
    /// overlay
    pub water_areas: Vec<(i32, i32, i32, i32)>,
}

/// Yields decoded assets by name. Decoding the on-disk formats is the outer
/// layer's job; a missing asset is fatal and aborts initialization.
pub trait AssetProvider {
    fn level(&self, episode: i32, level: i32) -> Result<LevelData>;
    fn script_bundle(&self, name: &str) -> Result<ScriptBundle>;
    /// The recorded demo input byte stream (NUKEM2.MNI)
    fn demo_stream(&self) -> Result<Vec<u8>>;
}

// ============================================================================
// Null implementations (used by tests and headless runs)
// ============================================================================

/// Discards all draw calls.
#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn clear(&mut self) {}
    fn draw_tile(&mut self, _tile_index: u16, _x: i32, _y: i32) {}
    fn draw_sprite(&mut self, _actor_id: u16, _frame: u8, _x: i32, _y: i32, _style: DrawStyle) {}
    fn draw_backdrop(&mut self, _name: &str, _offset_x: i32, _offset_y: i32) {}
    fn draw_full_screen_image(&mut self, _image: &str) {}
    fn draw_text(&mut self, _x: i32, _y: i32, _text: &str) {}
    fn draw_big_text(&mut self, _x: i32, _y: i32, _color_index: i32, _text: &str) {}
    fn draw_checkbox(&mut self, _x: i32, _y: i32, _checked: bool) {}
    fn draw_message_box_frame(&mut self, _x: i32, _y: i32, _width: i32, _height: i32) {}
    fn draw_menu_selection_indicator(&mut self, _y: i32) {}
    fn fill_rect(&mut self, _left: i32, _top: i32, _right: i32, _bottom: i32, _color: u8) {}
    fn fill_rect_translucent(&mut self, _left: i32, _top: i32, _right: i32, _bottom: i32) {}
    fn flash_screen(&mut self, _color_index: u8) {}
    fn set_global_translation(&mut self, _x: i32, _y: i32) {}
    fn set_palette(&mut self, _palette_file: &str) {}
}

/// Swallows audio and fade requests; remembers the last played sounds and
/// music so tests can assert on them.
#[derive(Debug, Default)]
pub struct NullServiceProvider {
    pub played_sounds: Vec<SoundId>,
    pub current_music: Option<String>,
    pub shareware: bool,
}

impl ServiceProvider for NullServiceProvider {
    fn fade_out_screen(&mut self) {}
    fn fade_in_screen(&mut self) {}

    fn play_sound(&mut self, id: SoundId) {
        self.played_sounds.push(id);
    }

    fn stop_sound(&mut self, _id: SoundId) {}

    fn stop_all_sounds(&mut self) {}

    fn play_music(&mut self, name: &str) {
        self.current_music = Some(name.to_string());
    }

    fn stop_music(&mut self) {
        self.current_music = None;
    }

    fn set_music_volume(&mut self, _volume: f32) {}
    fn set_sound_volume(&mut self, _volume: f32) {}

    fn is_shareware_version(&self) -> bool {
        self.shareware
    }
}
