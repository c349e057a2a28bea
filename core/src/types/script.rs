use std::collections::HashMap;

/// A checkbox row inside an options-style script page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckBoxDefinition {
    pub y_pos: i32,
    pub id: char,
}

/// One instruction of the menu/cutscene script format. The sequencer
/// interprets these as a flat program; see the script runner for semantics.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AnimateNewsReporter { talk_duration: i32 },
    ConfigurePersistentMenuSelection { slot: i32 },
    Delay { amount: i32 },
    DisableMenuFunctionality,
    DrawBigText { x: i32, y: i32, color_index: i32, text: String },
    DrawSprite { x: i32, y: i32, sprite_id: u16, frame_number: i32 },
    DrawText { x: i32, y: i32, text: String },
    EnableTextOffset,
    EnableTimeOutToDemo,
    FadeIn,
    FadeOut,
    Pages { pages: Vec<Script> },
    ScheduleFadeInBeforeNextWaitState,
    SetPalette { palette_file: String },
    SetupCheckBoxes { x_pos: i32, definitions: Vec<CheckBoxDefinition> },
    ShowFullScreenImage { image: String },
    ShowKeyBindings,
    ShowMenuSelectionIndicator { y_pos: i32 },
    ShowMessageBox { y: i32, width: i32, height: i32, message_lines: Vec<String> },
    ShowSaveSlots { selected_slot: i32 },
    StopNewsReporterAnimation,
    WaitForUserInput,
}

pub type Script = Vec<Action>;

/// Scripts as loaded from one of the script text files (TEXT.MNI etc.),
/// keyed by their name in the file.
pub type ScriptBundle = HashMap<String, Script>;
