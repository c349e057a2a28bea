use serde::{Deserialize, Serialize};

/// A button with edge detection. `was_triggered` records that at least one
/// down transition happened since the last time triggered states were reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Button {
    pub is_pressed: bool,
    pub was_triggered: bool,
}

impl Button {
    /// Applies a press/release coming from a non-repeating source (keyboard,
    /// controller button). A press always counts as a trigger.
    pub fn apply(&mut self, pressed: bool) {
        self.is_pressed = pressed;
        if pressed {
            self.was_triggered = true;
        }
    }

    /// Applies a level coming from a continuous source (analog trigger).
    /// Only a 0-to-1 transition counts as a trigger.
    pub fn apply_level(&mut self, pressed: bool) {
        if !self.is_pressed && pressed {
            self.was_triggered = true;
        }
        self.is_pressed = pressed;
    }
}

/// The merged directional + button state the simulation consumes each logic
/// tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,

    pub interact: Button,
    pub jump: Button,
    pub fire: Button,
}

impl PlayerInput {
    pub fn reset_triggered_states(&mut self) {
        self.interact.was_triggered = false;
        self.jump.was_triggered = false;
        self.fire.was_triggered = false;
    }

    pub fn any_button_triggered(&self) -> bool {
        self.interact.was_triggered || self.jump.was_triggered || self.fire.was_triggered
    }
}

/// Platform-independent key codes, covering everything that can appear in a
/// key binding plus the keys the menus react to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Unknown,
    Escape,
    Return,
    Space,
    Backspace,
    Tab,
    CapsLock,
    Up,
    Down,
    Left,
    Right,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,
    LeftShift,
    RightShift,
    LeftGui,
    RightGui,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
}

impl KeyCode {
    /// Folds the right-hand modifier keys onto their left-hand variants, so
    /// that bindings do not distinguish between the two.
    pub fn normalize_left_right(self) -> KeyCode {
        match self {
            KeyCode::RightCtrl => KeyCode::LeftCtrl,
            KeyCode::RightAlt => KeyCode::LeftAlt,
            KeyCode::RightShift => KeyCode::LeftShift,
            KeyCode::RightGui => KeyCode::LeftGui,
            other => other,
        }
    }

    /// Keys that cannot be bound to game actions. F1-F3, H and P are taken by
    /// fixed menu functions, CapsLock and the OS key misbehave as held keys.
    pub fn is_allowed_binding(self) -> bool {
        !matches!(
            self,
            KeyCode::Unknown
                | KeyCode::F1
                | KeyCode::F2
                | KeyCode::F3
                | KeyCode::H
                | KeyCode::P
                | KeyCode::CapsLock
                | KeyCode::LeftGui
                | KeyCode::RightGui
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerButton {
    A,
    B,
    X,
    Y,
    LeftShoulder,
    RightShoulder,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    Back,
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    TriggerLeft,
    TriggerRight,
}

/// OS input events as delivered by the outer frame. This is the only shape in
/// which key/controller input reaches the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown { keycode: KeyCode, is_repeat: bool },
    KeyUp { keycode: KeyCode },
    ControllerButtonDown { button: ControllerButton },
    ControllerButtonUp { button: ControllerButton },
    ControllerAxisMotion { axis: ControllerAxis, value: i16 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_apply_sets_trigger_on_press_only() {
        let mut button = Button::default();
        button.apply(true);
        assert!(button.is_pressed);
        assert!(button.was_triggered);

        button.was_triggered = false;
        button.apply(false);
        assert!(!button.is_pressed);
        assert!(!button.was_triggered);
    }

    #[test]
    fn button_apply_level_triggers_only_on_transition() {
        let mut button = Button::default();
        button.apply_level(true);
        assert!(button.was_triggered);

        button.was_triggered = false;
        button.apply_level(true);
        assert!(!button.was_triggered, "held level must not re-trigger");
    }

    #[test]
    fn reset_triggered_states_keeps_pressed_levels() {
        let mut input = PlayerInput::default();
        input.jump.apply(true);
        input.fire.apply(true);

        input.reset_triggered_states();

        assert!(input.jump.is_pressed);
        assert!(input.fire.is_pressed);
        assert!(!input.jump.was_triggered);
        assert!(!input.fire.was_triggered);
    }

    #[test]
    fn right_hand_modifiers_normalize_to_left() {
        assert_eq!(
            KeyCode::RightCtrl.normalize_left_right(),
            KeyCode::LeftCtrl
        );
        assert_eq!(KeyCode::RightAlt.normalize_left_right(), KeyCode::LeftAlt);
        assert_eq!(
            KeyCode::RightShift.normalize_left_right(),
            KeyCode::LeftShift
        );
        assert_eq!(KeyCode::Space.normalize_left_right(), KeyCode::Space);
    }

    #[test]
    fn reserved_keys_are_not_allowed_as_bindings() {
        for key in [
            KeyCode::F1,
            KeyCode::F2,
            KeyCode::F3,
            KeyCode::H,
            KeyCode::P,
            KeyCode::CapsLock,
            KeyCode::LeftGui,
            KeyCode::Unknown,
        ] {
            assert!(!key.is_allowed_binding(), "{key:?} must be rejected");
        }

        assert!(KeyCode::LeftCtrl.is_allowed_binding());
        assert!(KeyCode::Space.is_allowed_binding());
    }
}
