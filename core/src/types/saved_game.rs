use serde::{Deserialize, Serialize};

use crate::constants::NUM_LEVELS_PER_EPISODE;
use crate::types::player_model::WeaponType;
use crate::types::tutorial::TutorialMessageState;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Difficulty {
    Easy = 1,
    Medium = 2,
    Hard = 3,
}

/// Identifies one playable level: which episode, which level, and at which
/// difficulty the session runs.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSessionId {
    pub episode: i32,
    pub level: i32,
    pub difficulty: Difficulty,
}

/// The last level of each episode holds the boss fight; finishing it ends the
/// episode instead of showing the bonus screen.
pub fn is_boss_level(level: i32) -> bool {
    level == NUM_LEVELS_PER_EPISODE - 1
}

/// One save slot's contents, as handed over by the external profile layer.
/// The core only consumes this record to reconstruct a session at level
/// start.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SavedGame {
    pub session_id: GameSessionId,
    pub tutorial_messages_seen: TutorialMessageState,
    pub name: String,
    pub weapon: WeaponType,
    pub ammo: i32,
    pub score: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_final_level_is_a_boss_level() {
        for level in 0..NUM_LEVELS_PER_EPISODE - 1 {
            assert!(!is_boss_level(level), "level {level} is not the boss");
        }
        assert!(is_boss_level(NUM_LEVELS_PER_EPISODE - 1));
    }

    #[test]
    fn difficulties_order_from_easy_to_hard() {
        assert!(Difficulty::Easy < Difficulty::Medium);
        assert!(Difficulty::Medium < Difficulty::Hard);
    }
}
