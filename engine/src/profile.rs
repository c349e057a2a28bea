//! The in-memory user profile: options, high score lists and save slots.
//! Reading and writing this to disk (JSON) is the outer layer's job; the
//! core only consumes and mutates the record.

use dn2_core::constants::NUM_SAVE_SLOTS;
use dn2_core::types::{empty_high_score_list, GameOptions, HighScoreList, SavedGame};

pub const NUM_EPISODES: usize = 4;

#[derive(Debug, Clone)]
pub struct UserProfile {
    pub options: GameOptions,
    /// One list per episode
    pub high_score_lists: Vec<HighScoreList>,
    pub saved_games: Vec<Option<SavedGame>>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl UserProfile {
    pub fn new() -> Self {
        let mut options = GameOptions::default();
        options.sanitize_keybindings();

        Self {
            options,
            high_score_lists: (0..NUM_EPISODES).map(|_| empty_high_score_list()).collect(),
            saved_games: vec![None; NUM_SAVE_SLOTS],
        }
    }
}
