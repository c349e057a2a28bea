use serde::{Deserialize, Serialize};

use crate::constants::{
    MAX_AMMO, MAX_AMMO_FLAMETHROWER, MAX_SCORE, NUM_INVENTORY_SLOTS, PLAYER_MAX_HEALTH,
};
use crate::types::saved_game::SavedGame;
use crate::types::tutorial::TutorialMessageState;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponType {
    Normal,
    Laser,
    Rocket,
    FlameThrower,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryItemType {
    CircuitBoard,
    BlueKey,
    RapidFire,
    SpecialHintGlobe,
    CloakingDevice,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectableLetterType {
    N,
    U,
    K,
    E,
    M,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterCollectionState {
    Incomplete,
    WrongOrder,
    InOrder,
}

/// Weapon, ammo and health at the moment a checkpoint was touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointState {
    pub weapon: WeaponType,
    pub ammo: i32,
    pub health: i32,
}

/// The player's persistent state: everything that outlives a single level
/// (and, via saved games, a single session). Position and movement state live
/// in the world simulation instead.
#[derive(Debug, Clone)]
pub struct PlayerModel {
    tutorial_messages: TutorialMessageState,
    collected_letters: Vec<CollectableLetterType>,
    inventory: Vec<InventoryItemType>,
    weapon: WeaponType,
    score: i32,
    ammo: i32,
    health: i32,
}

impl Default for PlayerModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerModel {
    pub fn new() -> Self {
        Self {
            tutorial_messages: TutorialMessageState::default(),
            collected_letters: Vec::new(),
            inventory: Vec::new(),
            weapon: WeaponType::Normal,
            score: 0,
            ammo: MAX_AMMO,
            health: PLAYER_MAX_HEALTH,
        }
    }

    pub fn from_saved_game(save: &SavedGame) -> Self {
        Self {
            tutorial_messages: save.tutorial_messages_seen,
            collected_letters: Vec::new(),
            inventory: Vec::new(),
            weapon: save.weapon,
            score: save.score,
            ammo: save.ammo,
            health: PLAYER_MAX_HEALTH,
        }
    }

    pub fn make_checkpoint(&self) -> CheckpointState {
        CheckpointState {
            weapon: self.weapon,
            ammo: self.ammo,
            health: self.health,
        }
    }

    /// Restores weapon/ammo/health from a checkpoint. Health is topped up to
    /// at least 2 so that respawning is never an immediate second death.
    pub fn restore_from_checkpoint(&mut self, state: &CheckpointState) {
        self.health = state.health.max(2);
        self.weapon = state.weapon;
        self.ammo = state.ammo;
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn give_score(&mut self, amount: i32) {
        self.score = (self.score + amount).clamp(0, MAX_SCORE);
    }

    pub fn ammo(&self) -> i32 {
        self.ammo
    }

    pub fn current_max_ammo(&self) -> i32 {
        if self.weapon == WeaponType::FlameThrower {
            MAX_AMMO_FLAMETHROWER
        } else {
            MAX_AMMO
        }
    }

    pub fn weapon(&self) -> WeaponType {
        self.weapon
    }

    pub fn current_weapon_consumes_ammo(&self) -> bool {
        self.weapon != WeaponType::Normal
    }

    /// Switches weapon and refills ammo to the new weapon's maximum.
    pub fn switch_to_weapon(&mut self, weapon: WeaponType) {
        self.weapon = weapon;
        self.ammo = self.current_max_ammo();
    }

    /// Consumes one unit of ammo. Running dry reverts to the regular weapon,
    /// which comes with a fresh (cosmetic) clip of 32.
    pub fn use_ammo(&mut self) {
        if self.current_weapon_consumes_ammo() {
            self.ammo -= 1;
            if self.ammo <= 0 {
                self.switch_to_weapon(WeaponType::Normal);
            }
        }
    }

    pub fn set_ammo(&mut self, amount: i32) {
        debug_assert!(amount >= 0 && amount <= self.current_max_ammo());
        self.ammo = amount;
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_at_full_health(&self) -> bool {
        self.health == PLAYER_MAX_HEALTH
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.health = (self.health - amount).clamp(0, PLAYER_MAX_HEALTH);
    }

    pub fn take_fatal_damage(&mut self) {
        self.health = 0;
    }

    pub fn give_health(&mut self, amount: i32) {
        self.health = (self.health + amount).clamp(0, PLAYER_MAX_HEALTH);
    }

    pub fn inventory(&self) -> &[InventoryItemType] {
        &self.inventory
    }

    pub fn has_item(&self, item: InventoryItemType) -> bool {
        self.inventory.contains(&item)
    }

    /// Adds an item to the inventory. The HUD has six item slots; picking up
    /// more than that drops the new item on the floor, i.e. does nothing.
    pub fn give_item(&mut self, item: InventoryItemType) {
        if self.inventory.len() < NUM_INVENTORY_SLOTS {
            self.inventory.push(item);
        }
    }

    pub fn remove_item(&mut self, item: InventoryItemType) {
        if let Some(position) = self.inventory.iter().position(|&held| held == item) {
            self.inventory.remove(position);
        }
    }

    pub fn collected_letters(&self) -> &[CollectableLetterType] {
        &self.collected_letters
    }

    /// Records a collected N-U-K-E-M letter and reports whether the set is
    /// complete, and if so, whether it was collected in the right order.
    pub fn add_letter(&mut self, letter: CollectableLetterType) -> LetterCollectionState {
        use CollectableLetterType as L;
        const EXPECTED_ORDER: [L; 5] = [L::N, L::U, L::K, L::E, L::M];

        self.collected_letters.push(letter);

        if self.collected_letters.len() < EXPECTED_ORDER.len() {
            LetterCollectionState::Incomplete
        } else if self.collected_letters == EXPECTED_ORDER {
            LetterCollectionState::InOrder
        } else {
            LetterCollectionState::WrongOrder
        }
    }

    /// Resets the per-level part of the state when entering a new level.
    /// Weapon, ammo, score and seen tutorial messages persist.
    pub fn reset_for_new_level(&mut self) {
        self.health = PLAYER_MAX_HEALTH;
        self.collected_letters.clear();
        self.inventory.clear();
    }

    pub fn reset_health_and_score(&mut self) {
        self.health = PLAYER_MAX_HEALTH;
        self.score = 0;
    }

    pub fn tutorial_messages(&self) -> &TutorialMessageState {
        &self.tutorial_messages
    }

    pub fn tutorial_messages_mut(&mut self) -> &mut TutorialMessageState {
        &mut self.tutorial_messages
    }
}
