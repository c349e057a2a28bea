use std::collections::BTreeSet;

use crate::constants::SCORE_ADDED_PER_BONUS;
use crate::types::player_model::PlayerModel;

/// The categorical end-of-level bonuses. Enum values match the bonus numbers
/// shown on the bonus screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Bonus {
    DestroyedAllCameras = 1,
    NoDamageTaken = 2,
    CollectedEveryWeapon = 3,
    CollectedAllMerchandise = 4,
    DestroyedAllSpinningLaserTurrets = 5,
    DestroyedAllFireBombs = 6,
    ShotAllBonusGlobes = 7,
}

impl Bonus {
    pub fn as_number(self) -> i32 {
        self as i32
    }
}

/// Awards the flat per-bonus score for each achieved bonus.
pub fn add_bonus_score(player_model: &mut PlayerModel, bonuses: &BTreeSet<Bonus>) {
    player_model.give_score(bonuses.len() as i32 * SCORE_ADDED_PER_BONUS);
}
