//! Data types module - the game's shared data model

mod bonus;
mod high_score;
mod input;
mod options;
mod player_model;
mod saved_game;
mod script;
mod tutorial;

// Re-export all types
pub use bonus::{add_bonus_score, Bonus};
pub use high_score::{
    empty_high_score_list, insert_new_score, score_qualifies, HighScoreEntry, HighScoreList,
};
pub use input::{Button, ControllerAxis, ControllerButton, InputEvent, KeyCode, PlayerInput};
pub use options::{CommandLineOptions, GameOptions};
pub use player_model::{
    CheckpointState, CollectableLetterType, InventoryItemType, LetterCollectionState, PlayerModel,
    WeaponType,
};
pub use saved_game::{is_boss_level, Difficulty, GameSessionId, SavedGame};
pub use script::{Action, CheckBoxDefinition, Script, ScriptBundle};
pub use tutorial::{message_text, TutorialMessageId, TutorialMessageState, NUM_TUTORIAL_MESSAGES};
