//! The sequencer for the menu/cutscene script format. Scripts are flat
//! action lists; the runner is a little state machine whose suspended
//! continuation is fully described by the state enum, the program counter
//! and the delay timer.

use std::collections::BTreeMap;

use dn2_core::constants::{
    NEWS_REPORTER_ACTOR_ID, NUM_NEWS_REPORTER_STATES, SCRIPT_TIMEOUT_TO_DEMO_TICKS,
};
use dn2_core::types::{Action, CheckBoxDefinition, InputEvent, KeyCode, Script};

use crate::rng::RandomGenerator;
use crate::services::{Renderer, ServiceProvider, SoundId};
use crate::timing::{slow_ticks_to_time, time_to_fast_ticks, TimeDelta};

const SAVE_SLOT_START_X: i32 = 14;
const SAVE_SLOT_START_Y: i32 = 6;
const KEY_BINDINGS_START_X: i32 = 26;
const KEY_BINDINGS_START_Y: i32 = 7;
const SELECTED_COLOR_INDEX: i32 = 3;
const UNSELECTED_COLOR_INDEX: i32 = 2;
const MENU_FONT_HEIGHT: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptRunnerState {
    ReadyToExecute,
    ExecutingScript,
    AwaitingUserInput,
    FinishedExecution,
    ExecutionInterrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptTerminationType {
    RanToCompletion,
    AbortedByUser,
    MenuItemSelected,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionResult {
    pub termination_type: ScriptTerminationType,
    pub selected_page: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PagingMode {
    Menu,
    PagingOnly,
}

#[derive(Debug, Clone)]
struct PagerState {
    page_scripts: Vec<Script>,
    mode: PagingMode,
    current_page_index: i32,
    max_page_index: i32,
}

#[derive(Debug, Clone, Copy)]
struct CheckBoxState {
    pos_y: i32,
    checked: bool,
    id: char,
}

#[derive(Debug, Clone)]
struct CheckBoxesState {
    pos_x: i32,
    current_menu_pos_y: i32,
    states: Vec<CheckBoxState>,
}

#[derive(Debug, Clone, Copy)]
struct DelayState {
    ticks_to_wait: i32,
    elapsed_time: TimeDelta,
}

#[derive(Debug, Clone, Copy)]
struct NewsReporterState {
    talk_duration: i32,
    elapsed_time: TimeDelta,
}

pub struct ScriptRunner {
    instructions: Script,
    program_counter: usize,
    state: ScriptRunnerState,

    delay: Option<DelayState>,
    news_reporter: Option<NewsReporterState>,
    pager: Option<PagerState>,
    check_boxes: Option<CheckBoxesState>,

    menu_item_was_selected: bool,
    timed_out: bool,
    fade_in_before_next_wait_scheduled: bool,
    disable_menu_for_next_pages: bool,
    text_offset_enabled: bool,

    time_out_to_demo_enabled: bool,
    time_without_input: TimeDelta,

    persistent_selections: BTreeMap<i32, i32>,
    current_persistent_slot: Option<i32>,
}

impl Default for ScriptRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptRunner {
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
            program_counter: 0,
            state: ScriptRunnerState::ReadyToExecute,
            delay: None,
            news_reporter: None,
            pager: None,
            check_boxes: None,
            menu_item_was_selected: false,
            timed_out: false,
            fade_in_before_next_wait_scheduled: false,
            disable_menu_for_next_pages: false,
            text_offset_enabled: false,
            time_out_to_demo_enabled: false,
            time_without_input: 0.0,
            persistent_selections: BTreeMap::new(),
            current_persistent_slot: None,
        }
    }

    /// Starts a new top-level script. The previous pager's page index is
    /// remembered if a persistent selection slot was configured.
    pub fn execute_script(&mut self, script: &Script) {
        if let Some(slot) = self.current_persistent_slot.take() {
            if let Some(pager) = &self.pager {
                self.persistent_selections
                    .insert(slot, pager.current_page_index);
            }
        }

        self.pager = None;
        self.check_boxes = None;
        self.fade_in_before_next_wait_scheduled = false;
        self.disable_menu_for_next_pages = false;
        self.timed_out = false;
        self.time_out_to_demo_enabled = false;
        self.time_without_input = 0.0;

        self.start_execution(script.clone());
    }

    fn start_execution(&mut self, script: Script) {
        self.instructions = script;
        self.program_counter = 0;
        self.state = ScriptRunnerState::ExecutingScript;
        self.menu_item_was_selected = false;
        self.stop_news_reporter();
    }

    pub fn state(&self) -> ScriptRunnerState {
        self.state
    }

    pub fn has_finished_execution(&self) -> bool {
        matches!(
            self.state,
            ScriptRunnerState::FinishedExecution | ScriptRunnerState::ExecutionInterrupted
        )
    }

    pub fn is_in_wait_state(&self) -> bool {
        self.state == ScriptRunnerState::AwaitingUserInput
    }

    pub fn result(&self) -> Option<ExecutionResult> {
        if !self.has_finished_execution() {
            return None;
        }

        let selected_page = self
            .pager
            .as_ref()
            .map(|pager| pager.current_page_index);

        let termination_type = if self.timed_out {
            ScriptTerminationType::TimedOut
        } else if self.state == ScriptRunnerState::ExecutionInterrupted {
            ScriptTerminationType::AbortedByUser
        } else if self.pager.is_some() && self.menu_item_was_selected {
            ScriptTerminationType::MenuItemSelected
        } else {
            ScriptTerminationType::RanToCompletion
        };

        Some(ExecutionResult {
            termination_type,
            selected_page,
        })
    }

    /// The toggle states of the current checkbox row, by checkbox id.
    pub fn check_box_states(&self) -> Vec<(char, bool)> {
        self.check_boxes
            .as_ref()
            .map(|boxes| {
                boxes
                    .states
                    .iter()
                    .map(|state| (state.id, state.checked))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn clear_wait_state(&mut self) {
        self.state = ScriptRunnerState::ExecutingScript;
        self.delay = None;
    }

    pub fn handle_event(&mut self, event: &InputEvent, services: &mut dyn ServiceProvider) {
        if self.has_finished_execution() {
            return;
        }

        let keycode = match *event {
            InputEvent::KeyDown {
                keycode,
                is_repeat: false,
            } => keycode,
            _ => return,
        };

        self.time_without_input = 0.0;

        // Escape always aborts
        if keycode == KeyCode::Escape {
            self.state = ScriptRunnerState::ExecutionInterrupted;
            return;
        }

        // Any key stops a wait state (Delay or WaitForUserInput)
        if self.is_in_wait_state() {
            self.clear_wait_state();
        }

        if self.pager.is_none() {
            return;
        }

        match keycode {
            KeyCode::Left | KeyCode::Up => self.select_previous_page(services),
            KeyCode::Right | KeyCode::Down => self.select_next_page(services),
            KeyCode::Return | KeyCode::Space => {
                let menu_mode = self
                    .pager
                    .as_ref()
                    .is_some_and(|pager| pager.mode == PagingMode::Menu);
                if menu_mode {
                    self.select_current_menu_item(services);
                } else {
                    self.select_next_page(services);
                }
            }
            _ => {
                let menu_mode = self
                    .pager
                    .as_ref()
                    .is_some_and(|pager| pager.mode == PagingMode::Menu);
                if menu_mode {
                    // The wait state was cleared above, so the current page
                    // must be re-run to redraw it
                    self.execute_current_page_script();
                } else {
                    self.select_next_page(services);
                }
            }
        }
    }

    pub fn update_and_render(
        &mut self,
        dt: TimeDelta,
        renderer: &mut dyn Renderer,
        services: &mut dyn ServiceProvider,
    ) {
        if let Some(mut delay) = self.delay {
            delay.elapsed_time += dt;
            if delay.elapsed_time >= slow_ticks_to_time(delay.ticks_to_wait) {
                self.clear_wait_state();
            } else {
                self.delay = Some(delay);
            }
        }

        self.animate_news_reporter(dt, renderer);

        if let Some(boxes) = &self.check_boxes {
            for state in &boxes.states {
                renderer.draw_checkbox(boxes.pos_x, state.pos_y, state.checked);
            }
        }

        while self.state == ScriptRunnerState::ExecutingScript {
            self.interpret_next_action(renderer, services);
        }

        if self.fade_in_before_next_wait_scheduled && !self.has_finished_execution() {
            services.fade_in_screen();
            self.fade_in_before_next_wait_scheduled = false;
        }

        // After a while with no input at all, menus give way to the demo
        if self.time_out_to_demo_enabled && self.is_in_wait_state() {
            self.time_without_input += dt;
            if self.time_without_input >= slow_ticks_to_time(SCRIPT_TIMEOUT_TO_DEMO_TICKS) {
                self.timed_out = true;
                self.state = ScriptRunnerState::FinishedExecution;
            }
        }
    }

    fn animate_news_reporter(&mut self, dt: TimeDelta, renderer: &mut dyn Renderer) {
        let Some(mut state) = self.news_reporter else {
            return;
        };

        state.elapsed_time += dt;
        let elapsed_frames = time_to_fast_ticks(state.elapsed_time) / 25;

        if elapsed_frames < state.talk_duration {
            let random_number = RandomGenerator::number_at(elapsed_frames as usize);
            renderer.draw_sprite(
                NEWS_REPORTER_ACTOR_ID,
                random_number % NUM_NEWS_REPORTER_STATES as u8,
                0,
                0,
                crate::services::DrawStyle::Normal,
            );
            self.news_reporter = Some(state);
        } else {
            self.stop_news_reporter();
            renderer.draw_sprite(
                NEWS_REPORTER_ACTOR_ID,
                0,
                0,
                0,
                crate::services::DrawStyle::Normal,
            );
        }
    }

    fn stop_news_reporter(&mut self) {
        self.news_reporter = None;
    }

    fn text_x_offset(&self) -> i32 {
        if self.text_offset_enabled {
            2
        } else {
            0
        }
    }

    fn interpret_next_action(
        &mut self,
        renderer: &mut dyn Renderer,
        services: &mut dyn ServiceProvider,
    ) {
        if self.program_counter >= self.instructions.len() {
            self.state = ScriptRunnerState::FinishedExecution;
            return;
        }

        let action = self.instructions[self.program_counter].clone();
        self.program_counter += 1;

        match action {
            Action::AnimateNewsReporter { talk_duration } => {
                self.news_reporter = Some(NewsReporterState {
                    talk_duration,
                    elapsed_time: 0.0,
                });
            }

            Action::StopNewsReporterAnimation => self.stop_news_reporter(),

            Action::FadeIn => services.fade_in_screen(),
            Action::FadeOut => services.fade_out_screen(),

            Action::ShowMenuSelectionIndicator { y_pos } => {
                renderer.draw_menu_selection_indicator(y_pos);
                if let Some(boxes) = &mut self.check_boxes {
                    boxes.current_menu_pos_y = y_pos;
                }
            }

            Action::ShowFullScreenImage { image } => {
                renderer.draw_full_screen_image(&image);
            }

            Action::Delay { amount } => {
                self.delay = Some(DelayState {
                    ticks_to_wait: amount,
                    elapsed_time: 0.0,
                });
                self.state = ScriptRunnerState::AwaitingUserInput;
            }

            Action::WaitForUserInput => {
                self.state = ScriptRunnerState::AwaitingUserInput;
            }

            Action::DrawBigText {
                x,
                y,
                color_index,
                text,
            } => {
                renderer.draw_big_text(x + 2, y, color_index, &text);
            }

            Action::DrawText { x, y, text } => {
                renderer.draw_text(x + self.text_x_offset(), y, &text);
            }

            Action::DrawSprite {
                x,
                y,
                sprite_id,
                frame_number,
            } => {
                renderer.draw_sprite(
                    sprite_id,
                    frame_number as u8,
                    x,
                    y,
                    crate::services::DrawStyle::Normal,
                );
            }

            Action::SetPalette { palette_file } => renderer.set_palette(&palette_file),

            Action::SetupCheckBoxes { x_pos, definitions } => {
                // Pages re-run their script on every interaction; keep the
                // toggle states across the re-run
                let previous = self.check_boxes.take();
                let was_checked = |id: char| {
                    previous
                        .as_ref()
                        .is_some_and(|boxes| {
                            boxes
                                .states
                                .iter()
                                .any(|state| state.id == id && state.checked)
                        })
                };

                let states = definitions
                    .iter()
                    .map(|definition: &CheckBoxDefinition| CheckBoxState {
                        pos_y: definition.y_pos,
                        checked: was_checked(definition.id),
                        id: definition.id,
                    })
                    .collect();
                self.check_boxes = Some(CheckBoxesState {
                    pos_x: x_pos,
                    current_menu_pos_y: 0,
                    states,
                });
            }

            Action::ShowMessageBox {
                y,
                width,
                height,
                message_lines,
            } => {
                let x_pos = (40 - width) / 2;
                renderer.draw_message_box_frame(x_pos, y, width, height);

                let available_width = width - 1;
                for (line_number, line) in message_lines.iter().enumerate() {
                    let offset_to_center = (available_width - line.len() as i32) / 2;
                    renderer.draw_text(
                        x_pos + 1 + offset_to_center,
                        y + 1 + line_number as i32,
                        line,
                    );
                }
            }

            Action::ScheduleFadeInBeforeNextWaitState => {
                self.fade_in_before_next_wait_scheduled = true;
            }

            Action::ConfigurePersistentMenuSelection { slot } => {
                self.persistent_selections.entry(slot).or_insert(0);
                self.current_persistent_slot = Some(slot);
            }

            Action::DisableMenuFunctionality => {
                if let Some(pager) = &mut self.pager {
                    pager.mode = PagingMode::PagingOnly;
                } else {
                    self.disable_menu_for_next_pages = true;
                }
            }

            Action::Pages { pages } => {
                debug_assert!(!pages.is_empty(), "a pages definition needs pages");
                if pages.is_empty() {
                    return;
                }

                let max_page_index = pages.len() as i32 - 1;
                let mut pager = PagerState {
                    page_scripts: pages,
                    mode: PagingMode::Menu,
                    current_page_index: 0,
                    max_page_index,
                };

                if let Some(slot) = self.current_persistent_slot {
                    pager.current_page_index =
                        self.persistent_selections[&slot].min(max_page_index);
                }

                if self.disable_menu_for_next_pages {
                    pager.mode = PagingMode::PagingOnly;
                    self.disable_menu_for_next_pages = false;
                }

                self.pager = Some(pager);
                self.execute_current_page_script();
            }

            Action::EnableTextOffset => self.text_offset_enabled = true,

            Action::EnableTimeOutToDemo => {
                self.time_out_to_demo_enabled = true;
                self.time_without_input = 0.0;
            }

            Action::ShowKeyBindings => {
                for (line, name) in ["ALT", "CTRL", "Up", "Down", "Left", "Right"]
                    .iter()
                    .enumerate()
                {
                    renderer.draw_text(
                        KEY_BINDINGS_START_X,
                        KEY_BINDINGS_START_Y + line as i32 * MENU_FONT_HEIGHT,
                        name,
                    );
                }
            }

            Action::ShowSaveSlots { selected_slot } => {
                for slot in 0..dn2_core::constants::NUM_SAVE_SLOTS as i32 {
                    let color = if slot == selected_slot {
                        SELECTED_COLOR_INDEX
                    } else {
                        UNSELECTED_COLOR_INDEX
                    };
                    renderer.draw_big_text(
                        SAVE_SLOT_START_X,
                        SAVE_SLOT_START_Y + slot * MENU_FONT_HEIGHT,
                        color,
                        "Empty",
                    );
                }
            }
        }
    }

    fn execute_current_page_script(&mut self) {
        let Some(pager) = &self.pager else { return };
        let script = pager.page_scripts[pager.current_page_index as usize].clone();
        self.start_execution(script);
    }

    fn select_next_page(&mut self, services: &mut dyn ServiceProvider) {
        let Some(pager) = &mut self.pager else { return };
        pager.current_page_index += 1;
        if pager.current_page_index > pager.max_page_index {
            pager.current_page_index = 0;
        }
        let menu_mode = pager.mode == PagingMode::Menu;
        self.execute_current_page_script();

        if menu_mode {
            services.play_sound(SoundId::MenuSelect);
        }
    }

    fn select_previous_page(&mut self, services: &mut dyn ServiceProvider) {
        let Some(pager) = &mut self.pager else { return };
        pager.current_page_index -= 1;
        if pager.current_page_index < 0 {
            pager.current_page_index = pager.max_page_index;
        }
        let menu_mode = pager.mode == PagingMode::Menu;
        self.execute_current_page_script();

        if menu_mode {
            services.play_sound(SoundId::MenuSelect);
        }
    }

    fn select_current_menu_item(&mut self, services: &mut dyn ServiceProvider) {
        if let Some(boxes) = &mut self.check_boxes {
            let menu_pos_y = boxes.current_menu_pos_y;
            if let Some(check_box) = boxes
                .states
                .iter_mut()
                .find(|state| state.pos_y == menu_pos_y)
            {
                check_box.checked = !check_box.checked;
                self.execute_current_page_script();
                services.play_sound(SoundId::MenuToggle);
                return;
            }
        }

        self.menu_item_was_selected = true;
    }
}
