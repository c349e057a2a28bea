//! Merges keyboard and game controller events into the per-tick
//! [`PlayerInput`] the simulation consumes.

use dn2_core::types::{
    Button, ControllerAxis, ControllerButton, GameOptions, InputEvent, KeyCode, PlayerInput,
};

const ANALOG_STICK_DEADZONE_X: i16 = 10_000;
const ANALOG_STICK_DEADZONE_Y: i16 = 24_000;
const TRIGGER_THRESHOLD: i16 = 3_000;

/// Commands that go to the menu layer instead of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    None,
    QuickSave,
    QuickLoad,
}

fn apply_threshold(value: i16, threshold: i16) -> i16 {
    if value.unsigned_abs() > threshold.unsigned_abs() as u16 {
        value
    } else {
        0
    }
}

/// "Overlay" analog stick movement on top of the digital d-pad movement.
/// This way, button presses and analog stick movements don't cancel each
/// other out.
fn combined_input(base: &PlayerInput, stick_x: i16, stick_y: i16) -> PlayerInput {
    let mut combined = *base;

    combined.left |= stick_x < 0;
    combined.right |= stick_x > 0;
    combined.up |= stick_y < 0;
    combined.down |= stick_y > 0;

    combined
}

#[derive(Debug, Default)]
pub struct InputHandler {
    player_input: PlayerInput,
    stick_x: i16,
    stick_y: i16,
    back_button_held: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.player_input = PlayerInput::default();
    }

    /// The merged input for the current tick. Edge-triggered states are
    /// cleared; held levels persist until the corresponding release event.
    pub fn fetch_input(&mut self) -> PlayerInput {
        let input = combined_input(&self.player_input, self.stick_x, self.stick_y);
        self.player_input.reset_triggered_states();
        input
    }

    pub fn handle_event(
        &mut self,
        event: &InputEvent,
        options: &GameOptions,
        player_in_ship: bool,
    ) -> MenuCommand {
        match *event {
            InputEvent::KeyDown { keycode, is_repeat } => {
                if is_repeat {
                    MenuCommand::None
                } else {
                    self.handle_key(keycode, true, options)
                }
            }
            InputEvent::KeyUp { keycode } => self.handle_key(keycode, false, options),
            InputEvent::ControllerButtonDown { button } => self.handle_button(button, true),
            InputEvent::ControllerButtonUp { button } => self.handle_button(button, false),
            InputEvent::ControllerAxisMotion { axis, value } => {
                self.handle_axis(axis, value, player_in_ship);
                MenuCommand::None
            }
        }
    }

    fn handle_key(&mut self, keycode: KeyCode, pressed: bool, options: &GameOptions) -> MenuCommand {
        let keycode = keycode.normalize_left_right();

        if keycode == options.up_keybinding {
            self.player_input.up = pressed;
            self.player_input.interact.apply(pressed);
        } else if keycode == options.down_keybinding {
            self.player_input.down = pressed;
        } else if keycode == options.left_keybinding {
            self.player_input.left = pressed;
        } else if keycode == options.right_keybinding {
            self.player_input.right = pressed;
        } else if keycode == options.jump_keybinding {
            self.player_input.jump.apply(pressed);
        } else if keycode == options.fire_keybinding {
            self.player_input.fire.apply(pressed);
        } else if keycode == options.quick_save_keybinding {
            if pressed {
                return MenuCommand::QuickSave;
            }
        } else if keycode == options.quick_load_keybinding && pressed {
            return MenuCommand::QuickLoad;
        }

        MenuCommand::None
    }

    fn handle_button(&mut self, button: ControllerButton, pressed: bool) -> MenuCommand {
        match button {
            ControllerButton::DpadUp => {
                self.player_input.up = pressed;
                self.player_input.interact.apply(pressed);
            }
            ControllerButton::DpadDown => self.player_input.down = pressed,
            ControllerButton::DpadLeft => self.player_input.left = pressed,
            ControllerButton::DpadRight => self.player_input.right = pressed,

            ControllerButton::A | ControllerButton::B | ControllerButton::LeftShoulder => {
                // Back + jump is the quick load chord
                if pressed && self.back_button_held {
                    return MenuCommand::QuickLoad;
                }
                self.player_input.jump.apply(pressed);
            }

            ControllerButton::X | ControllerButton::Y | ControllerButton::RightShoulder => {
                // Back + fire is the quick save chord
                if pressed && self.back_button_held {
                    return MenuCommand::QuickSave;
                }
                self.player_input.fire.apply(pressed);
            }

            ControllerButton::Back => self.back_button_held = pressed,
            ControllerButton::Start => {}
        }

        MenuCommand::None
    }

    fn handle_axis(&mut self, axis: ControllerAxis, value: i16, player_in_ship: bool) {
        match axis {
            ControllerAxis::LeftX | ControllerAxis::RightX => {
                self.stick_x = apply_threshold(value, ANALOG_STICK_DEADZONE_X);
            }

            ControllerAxis::LeftY | ControllerAxis::RightY => {
                // We want to avoid accidental crouching/looking up while the
                // player is walking, but still make it easy to move the ship
                // up/down while flying. Therefore, we use a different
                // vertical deadzone when not in the ship.
                let dead_zone = if player_in_ship {
                    ANALOG_STICK_DEADZONE_X
                } else {
                    ANALOG_STICK_DEADZONE_Y
                };

                let new_y = apply_threshold(value, dead_zone);
                if self.stick_y >= 0 && new_y < 0 {
                    self.player_input.interact.was_triggered = true;
                }
                self.player_input.interact.is_pressed = new_y < 0;
                self.stick_y = new_y;
            }

            ControllerAxis::TriggerLeft | ControllerAxis::TriggerRight => {
                let trigger_pressed = value > TRIGGER_THRESHOLD;
                let button: &mut Button = if axis == ControllerAxis::TriggerLeft {
                    &mut self.player_input.jump
                } else {
                    &mut self.player_input.fire
                };
                button.apply_level(trigger_pressed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(handler: &mut InputHandler, keycode: KeyCode, options: &GameOptions) -> MenuCommand {
        handler.handle_event(
            &InputEvent::KeyDown {
                keycode,
                is_repeat: false,
            },
            options,
            false,
        )
    }

    fn release(handler: &mut InputHandler, keycode: KeyCode, options: &GameOptions) {
        handler.handle_event(&InputEvent::KeyUp { keycode }, options, false);
    }

    #[test]
    fn bound_keys_drive_the_player_input() {
        let options = GameOptions::default();
        let mut handler = InputHandler::new();

        press(&mut handler, KeyCode::Left, &options);
        press(&mut handler, KeyCode::LeftCtrl, &options);

        let input = handler.fetch_input();
        assert!(input.left);
        assert!(input.jump.is_pressed);
        assert!(input.jump.was_triggered);
    }

    #[test]
    fn fetch_clears_triggered_but_keeps_held() {
        let options = GameOptions::default();
        let mut handler = InputHandler::new();

        press(&mut handler, KeyCode::LeftAlt, &options);
        let first = handler.fetch_input();
        let second = handler.fetch_input();

        assert!(first.fire.was_triggered);
        assert!(second.fire.is_pressed);
        assert!(!second.fire.was_triggered);
    }

    #[test]
    fn key_repeat_events_are_ignored() {
        let options = GameOptions::default();
        let mut handler = InputHandler::new();

        press(&mut handler, KeyCode::LeftCtrl, &options);
        handler.fetch_input();
        handler.handle_event(
            &InputEvent::KeyDown {
                keycode: KeyCode::LeftCtrl,
                is_repeat: true,
            },
            &options,
            false,
        );

        assert!(!handler.fetch_input().jump.was_triggered);
    }

    #[test]
    fn up_key_also_drives_interact() {
        let options = GameOptions::default();
        let mut handler = InputHandler::new();

        press(&mut handler, KeyCode::Up, &options);
        let input = handler.fetch_input();

        assert!(input.up);
        assert!(input.interact.is_pressed);
        assert!(input.interact.was_triggered);

        release(&mut handler, KeyCode::Up, &options);
        assert!(!handler.fetch_input().interact.is_pressed);
    }

    #[test]
    fn right_modifier_variants_match_left_bindings() {
        let options = GameOptions::default();
        let mut handler = InputHandler::new();

        press(&mut handler, KeyCode::RightCtrl, &options);
        assert!(handler.fetch_input().jump.is_pressed);
    }

    #[test]
    fn stick_movement_is_ored_over_dpad() {
        let options = GameOptions::default();
        let mut handler = InputHandler::new();

        handler.handle_event(
            &InputEvent::ControllerButtonDown {
                button: ControllerButton::DpadRight,
            },
            &options,
            false,
        );
        handler.handle_event(
            &InputEvent::ControllerAxisMotion {
                axis: ControllerAxis::LeftX,
                value: -20_000,
            },
            &options,
            false,
        );

        let input = handler.fetch_input();
        assert!(input.right, "d-pad press must not be cancelled by the stick");
        assert!(input.left);
    }

    #[test]
    fn stick_deadzone_filters_small_deflections() {
        let options = GameOptions::default();
        let mut handler = InputHandler::new();

        handler.handle_event(
            &InputEvent::ControllerAxisMotion {
                axis: ControllerAxis::LeftX,
                value: 5_000,
            },
            &options,
            false,
        );

        let input = handler.fetch_input();
        assert!(!input.left);
        assert!(!input.right);
    }

    #[test]
    fn vertical_deadzone_is_narrower_in_the_ship() {
        let options = GameOptions::default();
        let mut handler = InputHandler::new();

        // 15000 is inside the on-foot deadzone but outside the ship deadzone
        handler.handle_event(
            &InputEvent::ControllerAxisMotion {
                axis: ControllerAxis::LeftY,
                value: 15_000,
            },
            &options,
            false,
        );
        assert!(!handler.fetch_input().down);

        handler.handle_event(
            &InputEvent::ControllerAxisMotion {
                axis: ControllerAxis::LeftY,
                value: 15_000,
            },
            &options,
            true,
        );
        assert!(handler.fetch_input().down);
    }

    #[test]
    fn trigger_held_does_not_retrigger() {
        let options = GameOptions::default();
        let mut handler = InputHandler::new();

        handler.handle_event(
            &InputEvent::ControllerAxisMotion {
                axis: ControllerAxis::TriggerRight,
                value: 10_000,
            },
            &options,
            false,
        );
        assert!(handler.fetch_input().fire.was_triggered);

        handler.handle_event(
            &InputEvent::ControllerAxisMotion {
                axis: ControllerAxis::TriggerRight,
                value: 12_000,
            },
            &options,
            false,
        );
        assert!(!handler.fetch_input().fire.was_triggered);
        assert!(handler.fetch_input().fire.is_pressed);
    }

    #[test]
    fn quick_save_and_load_are_menu_commands() {
        let options = GameOptions::default();
        let mut handler = InputHandler::new();

        assert_eq!(
            press(&mut handler, KeyCode::F5, &options),
            MenuCommand::QuickSave
        );
        assert_eq!(
            press(&mut handler, KeyCode::F7, &options),
            MenuCommand::QuickLoad
        );

        // Controller chord: Back + fire
        handler.handle_event(
            &InputEvent::ControllerButtonDown {
                button: ControllerButton::Back,
            },
            &options,
            false,
        );
        let command = handler.handle_event(
            &InputEvent::ControllerButtonDown {
                button: ControllerButton::X,
            },
            &options,
            false,
        );
        assert_eq!(command, MenuCommand::QuickSave);
    }
}
