//! The in-game HUD and the single-line message display with its
//! character-by-character reveal.

use dn2_core::constants::{
    MESSAGE_CHARS_PER_LINE, MESSAGE_NEXT_LINE_MARKER, PLAYER_MAX_HEALTH, RADAR_POS_X, RADAR_POS_Y,
};
use dn2_core::types::{InventoryItemType, PlayerModel, WeaponType};

use crate::services::{Renderer, ServiceProvider, SoundId};

/// Ticks the display waits at the end of a line before continuing
const LINE_PAUSE_TICKS: i32 = 21;

/// Higher priorities may preempt a lower-priority message mid-print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessagePriority {
    Normal,
    HintMachineMessage,
    Menu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MessageState {
    Idle,
    Printing {
        start_offset: usize,
        chars_printed: usize,
    },
    Waiting {
        next_offset: usize,
        frames_remaining: i32,
    },
}

#[derive(Debug, Clone)]
pub struct MessageDisplay {
    message: Vec<char>,
    printed: String,
    state: MessageState,
    priority: MessagePriority,
}

impl Default for MessageDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageDisplay {
    pub fn new() -> Self {
        Self {
            message: Vec::new(),
            printed: String::new(),
            state: MessageState::Idle,
            priority: MessagePriority::Normal,
        }
    }

    /// Starts revealing a message. A message already printing is only
    /// replaced by one of equal or higher priority.
    pub fn set_message(&mut self, message: &str, priority: MessagePriority) {
        let printing = matches!(self.state, MessageState::Printing { .. });
        if !message.is_empty() && (priority >= self.priority || !printing) {
            self.message = message.chars().collect();
            self.priority = priority;
            self.printed.clear();
            self.state = MessageState::Printing {
                start_offset: 0,
                chars_printed: 0,
            };
        }
    }

    /// The part of the current line revealed so far.
    pub fn printed_text(&self) -> &str {
        &self.printed
    }

    pub fn is_idle(&self) -> bool {
        self.state == MessageState::Idle
    }

    /// One logic tick: reveals one character, or waits out a line pause.
    /// Every printed non-space character plays the typing sound.
    pub fn update(&mut self, services: &mut dyn ServiceProvider) {
        match self.state {
            MessageState::Idle => {}

            MessageState::Printing {
                start_offset,
                mut chars_printed,
            } => {
                let offset = start_offset + chars_printed;
                let next_char = self.message[offset];

                let found_line_marker = next_char == MESSAGE_NEXT_LINE_MARKER;
                if !found_line_marker {
                    self.printed.extend(next_char.to_uppercase());
                    if next_char != ' ' {
                        services.play_sound(SoundId::IngameMessageTyping);
                    }
                }

                chars_printed += 1;

                let message_consumed = start_offset + chars_printed >= self.message.len();
                let end_of_line = chars_printed == MESSAGE_CHARS_PER_LINE
                    || found_line_marker
                    || message_consumed;

                self.state = if end_of_line {
                    MessageState::Waiting {
                        next_offset: start_offset + chars_printed,
                        frames_remaining: LINE_PAUSE_TICKS,
                    }
                } else {
                    MessageState::Printing {
                        start_offset,
                        chars_printed,
                    }
                };
            }

            MessageState::Waiting {
                next_offset,
                frames_remaining,
            } => {
                let frames_remaining = frames_remaining - 1;
                if frames_remaining == 0 {
                    self.printed.clear();
                    self.state = if next_offset < self.message.len() {
                        MessageState::Printing {
                            start_offset: next_offset,
                            chars_printed: 0,
                        }
                    } else {
                        MessageState::Idle
                    };
                } else {
                    self.state = MessageState::Waiting {
                        next_offset,
                        frames_remaining,
                    };
                }
            }
        }
    }

    pub fn render(&self, renderer: &mut dyn Renderer) {
        if !self.printed.is_empty() {
            renderer.draw_text(0, 0, &self.printed);
        }
    }
}

fn weapon_icon_id(weapon: WeaponType) -> u16 {
    match weapon {
        WeaponType::Normal => 0,
        WeaponType::Laser => 1,
        WeaponType::Rocket => 2,
        WeaponType::FlameThrower => 3,
    }
}

fn inventory_icon_id(item: InventoryItemType) -> u16 {
    match item {
        InventoryItemType::CircuitBoard => 0,
        InventoryItemType::BlueKey => 1,
        InventoryItemType::RapidFire => 2,
        InventoryItemType::SpecialHintGlobe => 3,
        InventoryItemType::CloakingDevice => 4,
    }
}

/// Sprite id of the HUD icon sheet
const HUD_ICONS_ID: u16 = 0;

/// Draws the HUD overlay: level number, inventory, weapon and ammo, health
/// bar, radar dots and score. `radar_dots` holds viewport-relative positions
/// of the functioning security cameras.
pub fn draw_hud(
    renderer: &mut dyn Renderer,
    model: &PlayerModel,
    level_number: i32,
    radar_dots: &[(i32, i32)],
    tick_count: u32,
) {
    renderer.draw_text(1, 21, &format!("L{}", level_number + 1));

    for (slot, item) in model.inventory().iter().enumerate() {
        renderer.draw_sprite(
            HUD_ICONS_ID,
            inventory_icon_id(*item) as u8,
            33 + (slot as i32 % 2) * 2,
            22 + (slot as i32 / 2) * 2,
            crate::services::DrawStyle::Normal,
        );
    }

    renderer.draw_sprite(
        HUD_ICONS_ID,
        weapon_icon_id(model.weapon()) as u8,
        17,
        22,
        crate::services::DrawStyle::Normal,
    );

    // Low ammo readout blinks on and off
    let low_ammo = model.ammo() <= 4;
    if !low_ammo || tick_count % 2 == 0 {
        renderer.draw_text(23, 22, &format!("{:2}", model.ammo()));
    }

    // Health bar, pulsing when close to death
    let health = model.health();
    let pulse = health == 1 && tick_count % 2 == 0;
    for unit in 0..PLAYER_MAX_HEALTH {
        let color = if unit < health && !pulse { 12 } else { 4 };
        renderer.fill_rect(25 + unit, 22, 25 + unit, 23, color);
    }

    for (x, y) in radar_dots {
        renderer.fill_rect(
            RADAR_POS_X / 8 + x,
            RADAR_POS_Y / 8 + y,
            RADAR_POS_X / 8 + x,
            RADAR_POS_Y / 8 + y,
            15,
        );
    }

    renderer.draw_text(1, 23, &format!("{:7}", model.score()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::NullServiceProvider;

    fn drain(display: &mut MessageDisplay, services: &mut NullServiceProvider, ticks: usize) {
        for _ in 0..ticks {
            display.update(services);
        }
    }

    #[test]
    fn reveals_one_character_per_tick_uppercased() {
        let mut services = NullServiceProvider::default();
        let mut display = MessageDisplay::new();
        display.set_message("abc", MessagePriority::Normal);

        display.update(&mut services);
        assert_eq!(display.printed_text(), "A");
        display.update(&mut services);
        assert_eq!(display.printed_text(), "AB");
    }

    #[test]
    fn typing_sound_skips_spaces() {
        let mut services = NullServiceProvider::default();
        let mut display = MessageDisplay::new();
        display.set_message("A B", MessagePriority::Normal);

        drain(&mut display, &mut services, 3);

        let typing_sounds = services
            .played_sounds
            .iter()
            .filter(|id| **id == SoundId::IngameMessageTyping)
            .count();
        assert_eq!(typing_sounds, 2);
    }

    #[test]
    fn line_marker_pauses_then_continues() {
        let mut services = NullServiceProvider::default();
        let mut display = MessageDisplay::new();
        display.set_message("HI*YO", MessagePriority::Normal);

        drain(&mut display, &mut services, 3);
        assert_eq!(display.printed_text(), "HI", "marker itself is not shown");

        // The pause keeps the finished line on screen until it runs out
        drain(&mut display, &mut services, LINE_PAUSE_TICKS as usize - 1);
        assert_eq!(display.printed_text(), "HI");
        display.update(&mut services);
        assert_eq!(display.printed_text(), "");

        drain(&mut display, &mut services, 2);
        assert_eq!(display.printed_text(), "YO");
    }

    #[test]
    fn message_goes_idle_after_final_pause() {
        let mut services = NullServiceProvider::default();
        let mut display = MessageDisplay::new();
        display.set_message("OK", MessagePriority::Normal);

        drain(&mut display, &mut services, 2 + LINE_PAUSE_TICKS as usize);
        assert!(display.is_idle());
        assert_eq!(display.printed_text(), "");
    }

    #[test]
    fn long_lines_wrap_at_the_line_limit() {
        let mut services = NullServiceProvider::default();
        let mut display = MessageDisplay::new();
        let long_message: String = "X".repeat(MESSAGE_CHARS_PER_LINE + 5);
        display.set_message(&long_message, MessagePriority::Normal);

        drain(&mut display, &mut services, MESSAGE_CHARS_PER_LINE);
        assert_eq!(display.printed_text().len(), MESSAGE_CHARS_PER_LINE);

        // Next tick is a pause, not a 38th character
        display.update(&mut services);
        assert_eq!(display.printed_text().len(), MESSAGE_CHARS_PER_LINE);
    }

    #[test]
    fn lower_priority_cannot_preempt_mid_print() {
        let mut services = NullServiceProvider::default();
        let mut display = MessageDisplay::new();
        display.set_message("MENU MESSAGE", MessagePriority::Menu);
        display.update(&mut services);

        display.set_message("HINT", MessagePriority::Normal);
        display.update(&mut services);
        assert_eq!(display.printed_text(), "ME");
    }

    #[test]
    fn higher_priority_preempts_mid_print() {
        let mut services = NullServiceProvider::default();
        let mut display = MessageDisplay::new();
        display.set_message("SOME HINT", MessagePriority::Normal);
        display.update(&mut services);

        display.set_message("MENU", MessagePriority::Menu);
        display.update(&mut services);
        assert_eq!(display.printed_text(), "M");
    }

    #[test]
    fn idle_display_accepts_lower_priority_again() {
        let mut services = NullServiceProvider::default();
        let mut display = MessageDisplay::new();
        display.set_message("A", MessagePriority::Menu);
        drain(&mut display, &mut services, 1 + LINE_PAUSE_TICKS as usize);
        assert!(display.is_idle());

        display.set_message("B", MessagePriority::Normal);
        display.update(&mut services);
        assert_eq!(display.printed_text(), "B");
    }
}
