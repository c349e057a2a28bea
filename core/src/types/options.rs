use serde::{Deserialize, Serialize};

use crate::types::input::KeyCode;
use crate::types::saved_game::GameSessionId;

/// User-configurable settings the core reads. Persisting these to the user
/// profile is the outer layer's job.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GameOptions {
    pub up_keybinding: KeyCode,
    pub down_keybinding: KeyCode,
    pub left_keybinding: KeyCode,
    pub right_keybinding: KeyCode,
    pub jump_keybinding: KeyCode,
    pub fire_keybinding: KeyCode,
    pub quick_save_keybinding: KeyCode,
    pub quick_load_keybinding: KeyCode,

    pub sound_volume: f32,
    pub music_volume: f32,
    pub sound_on: bool,
    pub music_on: bool,

    pub motion_smoothing: bool,
    pub widescreen_enabled: bool,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            up_keybinding: KeyCode::Up,
            down_keybinding: KeyCode::Down,
            left_keybinding: KeyCode::Left,
            right_keybinding: KeyCode::Right,
            jump_keybinding: KeyCode::LeftCtrl,
            fire_keybinding: KeyCode::LeftAlt,
            quick_save_keybinding: KeyCode::F5,
            quick_load_keybinding: KeyCode::F7,
            sound_volume: 1.0,
            music_volume: 1.0,
            sound_on: true,
            music_on: true,
            motion_smoothing: true,
            widescreen_enabled: false,
        }
    }
}

impl GameOptions {
    fn bindings_mut(&mut self) -> [&mut KeyCode; 8] {
        [
            &mut self.up_keybinding,
            &mut self.down_keybinding,
            &mut self.left_keybinding,
            &mut self.right_keybinding,
            &mut self.jump_keybinding,
            &mut self.fire_keybinding,
            &mut self.quick_save_keybinding,
            &mut self.quick_load_keybinding,
        ]
    }

    /// Clears disallowed and duplicated key bindings, as done when loading a
    /// profile. Cleared bindings become `Unknown` and can be rebound from the
    /// options menu.
    pub fn sanitize_keybindings(&mut self) {
        let mut seen = Vec::new();

        for binding in self.bindings_mut() {
            let normalized = binding.normalize_left_right();

            if !normalized.is_allowed_binding() || seen.contains(&normalized) {
                *binding = KeyCode::Unknown;
            } else {
                *binding = normalized;
                seen.push(normalized);
            }
        }
    }
}

/// The read-only command line record the outer layer hands to the core.
#[derive(Debug, Clone, Default)]
pub struct CommandLineOptions {
    pub game_path: String,
    pub level_to_jump_to: Option<GameSessionId>,
    pub skip_intro: bool,
    pub play_demo: bool,
    pub debug_mode_enabled: bool,
    pub player_position_override: Option<(i32, i32)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_survive_sanitizing() {
        let mut options = GameOptions::default();
        let before = options.clone();
        options.sanitize_keybindings();
        assert_eq!(options, before);
    }

    #[test]
    fn disallowed_binding_is_cleared() {
        let mut options = GameOptions {
            fire_keybinding: KeyCode::F1,
            ..GameOptions::default()
        };

        options.sanitize_keybindings();

        assert_eq!(options.fire_keybinding, KeyCode::Unknown);
        assert_eq!(options.jump_keybinding, KeyCode::LeftCtrl);
    }

    #[test]
    fn duplicate_binding_keeps_the_first_occurrence() {
        let mut options = GameOptions {
            jump_keybinding: KeyCode::Space,
            fire_keybinding: KeyCode::Space,
            ..GameOptions::default()
        };

        options.sanitize_keybindings();

        assert_eq!(options.jump_keybinding, KeyCode::Space);
        assert_eq!(options.fire_keybinding, KeyCode::Unknown);
    }

    #[test]
    fn right_hand_modifiers_are_folded_before_duplicate_detection() {
        let mut options = GameOptions {
            jump_keybinding: KeyCode::LeftCtrl,
            fire_keybinding: KeyCode::RightCtrl,
            ..GameOptions::default()
        };

        options.sanitize_keybindings();

        assert_eq!(options.jump_keybinding, KeyCode::LeftCtrl);
        assert_eq!(options.fire_keybinding, KeyCode::Unknown);
    }
}
