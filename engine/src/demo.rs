//! Deterministic demo playback: the recorded input byte stream replaces live
//! input, one logic tick per byte. Playing it back exercises the whole
//! simulation and proves its determinism.

use dn2_core::constants::{DEMO_EPISODE, DEMO_LEVELS, END_OF_DEMO_MARKER};
use dn2_core::types::{Difficulty, GameSessionId, PlayerInput, PlayerModel};

use crate::services::{AssetProvider, Renderer, ServiceProvider};
use crate::timing::{TimeDelta, GAME_LOGIC_UPDATE_DELAY};
use crate::world::{GameWorld, TickContext};

#[derive(Debug, Clone, Copy)]
pub struct DemoInput {
    pub input: PlayerInput,
    pub next_level: bool,
}

/// Decodes one recorded byte. Held buttons stay pressed across bytes, but
/// `was_triggered` is only set on a 0-to-1 transition.
fn parse_input(byte: u8, previous: &PlayerInput) -> PlayerInput {
    let mut result = PlayerInput {
        up: byte & 0b1 != 0,
        down: byte & 0b10 != 0,
        left: byte & 0b100 != 0,
        right: byte & 0b1000 != 0,
        ..PlayerInput::default()
    };

    result.jump.is_pressed = byte & 0b1_0000 != 0;
    result.fire.is_pressed = byte & 0b10_0000 != 0;
    // Interact carries its own bit, but pressing up always interacts too
    result.interact.is_pressed = byte & 0b100_0000 != 0 || result.up;

    result.jump.was_triggered = result.jump.is_pressed && !previous.jump.is_pressed;
    result.fire.was_triggered = result.fire.is_pressed && !previous.fire.is_pressed;
    result.interact.was_triggered =
        result.interact.is_pressed && !previous.interact.is_pressed;

    result
}

/// Parses a whole demo stream up to (and excluding) the `0xFF` terminator.
pub fn parse_demo_stream(data: &[u8]) -> Vec<DemoInput> {
    let mut previous = PlayerInput::default();
    let mut result = Vec::new();

    for &byte in data {
        if byte == END_OF_DEMO_MARKER {
            break;
        }

        let input = parse_input(byte, &previous);
        result.push(DemoInput {
            input,
            next_level: byte & 0b1000_0000 != 0,
        });
        previous = input;
    }

    result
}

fn demo_session_id(level_index: usize) -> GameSessionId {
    GameSessionId {
        episode: DEMO_EPISODE,
        level: DEMO_LEVELS[level_index],
        difficulty: Difficulty::Hard,
    }
}

pub struct DemoPlayer {
    frames: Vec<DemoInput>,
    current_frame_index: usize,
    level_index: usize,
    elapsed_time: TimeDelta,
    player_model: PlayerModel,
    world: Option<GameWorld>,
}

impl DemoPlayer {
    pub fn new(assets: &dyn AssetProvider) -> anyhow::Result<Self> {
        let stream = assets.demo_stream()?;

        Ok(Self {
            frames: parse_demo_stream(&stream),
            current_frame_index: 0,
            level_index: 0,
            elapsed_time: 0.0,
            player_model: PlayerModel::new(),
            world: None,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.current_frame_index >= self.frames.len()
    }

    pub fn current_level(&self) -> i32 {
        DEMO_LEVELS[self.level_index]
    }

    pub fn player_model(&self) -> &PlayerModel {
        &self.player_model
    }

    pub fn world(&self) -> Option<&GameWorld> {
        self.world.as_ref()
    }

    /// Runs exactly one simulation tick per stream byte; the renderer is
    /// driven at display rate in between.
    pub fn update_and_render(
        &mut self,
        dt: TimeDelta,
        renderer: &mut dyn Renderer,
        services: &mut dyn ServiceProvider,
        assets: &dyn AssetProvider,
    ) {
        if self.is_finished() {
            return;
        }

        if self.world.is_none() && !self.start_level(services, assets) {
            return;
        }

        let mut change_level = false;

        self.elapsed_time += dt;
        if self.elapsed_time >= GAME_LOGIC_UPDATE_DELAY {
            let frame = self.frames[self.current_frame_index];
            change_level = frame.next_level;

            let world = self.world.as_mut().expect("level started above");
            let mut ctx = TickContext {
                input: frame.input,
                model: &mut self.player_model,
                services: &mut *services,
            };
            world.update_game_logic(&mut ctx);

            self.current_frame_index += 1;
            self.elapsed_time -= GAME_LOGIC_UPDATE_DELAY;
        }

        if let Some(world) = self.world.as_mut() {
            world.render(renderer, &self.player_model, 1.0, false);
        }

        if change_level && self.current_frame_index < self.frames.len() {
            // The recording only covers the fixed level sequence; a marker
            // past its end stops playback
            if self.level_index + 1 >= DEMO_LEVELS.len() {
                self.current_frame_index = self.frames.len();
                return;
            }

            services.fade_out_screen();

            self.level_index += 1;
            self.player_model.reset_for_new_level();
            self.world = None;

            if self.start_level(services, assets) {
                if let Some(world) = self.world.as_mut() {
                    world.render(renderer, &self.player_model, 1.0, false);
                }
                // The level switch consumes one input byte
                self.current_frame_index += 1;
                services.fade_in_screen();
            }
        }
    }

    /// Advance by exactly one recorded tick, without rendering. This is the
    /// channel the determinism tests drive.
    pub fn advance_one_tick(
        &mut self,
        services: &mut dyn ServiceProvider,
        assets: &dyn AssetProvider,
    ) {
        self.update_and_render(
            GAME_LOGIC_UPDATE_DELAY,
            &mut crate::services::NullRenderer,
            services,
            assets,
        );
    }

    fn start_level(
        &mut self,
        services: &mut dyn ServiceProvider,
        assets: &dyn AssetProvider,
    ) -> bool {
        let session_id = demo_session_id(self.level_index);
        match assets.level(session_id.episode, session_id.level) {
            Ok(level) => {
                let world = GameWorld::new(&level, session_id, None, false);
                services.play_music(world.music_file());
                self.world = Some(world);
                true
            }
            Err(error) => {
                // A missing demo level ends playback instead of crashing the
                // attract loop
                log::error!("failed to load demo level: {error:#}");
                self.current_frame_index = self.frames.len();
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_stops_at_the_terminator() {
        let frames = parse_demo_stream(&[0b1000, 0b1000, 0xFF, 0b0100]);
        assert_eq!(frames.len(), 2);
        assert!(frames[0].input.right);
    }

    #[test]
    fn held_buttons_trigger_only_on_the_first_byte() {
        let frames = parse_demo_stream(&[0b1_0000, 0b1_0000, 0b0]);
        assert!(frames[0].input.jump.was_triggered);
        assert!(frames[1].input.jump.is_pressed);
        assert!(!frames[1].input.jump.was_triggered);
        assert!(!frames[2].input.jump.is_pressed);
    }

    #[test]
    fn re_press_triggers_again() {
        let frames = parse_demo_stream(&[0b10_0000, 0, 0b10_0000]);
        assert!(frames[0].input.fire.was_triggered);
        assert!(frames[2].input.fire.was_triggered);
    }

    #[test]
    fn up_also_presses_interact() {
        let frames = parse_demo_stream(&[0b1]);
        assert!(frames[0].input.up);
        assert!(frames[0].input.interact.is_pressed);
        assert!(frames[0].input.interact.was_triggered);
    }

    #[test]
    fn the_high_bit_marks_a_level_switch() {
        let frames = parse_demo_stream(&[0b1000_0100, 0b100]);
        assert!(frames[0].next_level);
        assert!(!frames[1].next_level);
    }

    #[test]
    fn demo_levels_follow_the_fixed_sequence() {
        assert_eq!(DEMO_LEVELS, [0, 2, 4, 6]);
        assert_eq!(demo_session_id(1).level, 2);
        assert_eq!(demo_session_id(1).difficulty, Difficulty::Hard);
    }
}
