//! The actor pool: a fixed table of 448 slots, visited strictly in slot
//! order. An actor is its data plus an update function bound at spawn time;
//! there is no entity hierarchy.

use dn2_core::constants::MAX_NUM_ACTORS;

use crate::services::DrawStyle;
use crate::world::{GameWorld, TickContext};

/// Behavior procedure bound to an actor at spawn time, dispatched by slot
/// index each tick.
pub type UpdateFunc = fn(&mut GameWorld, &mut TickContext, usize);

fn update_noop(_world: &mut GameWorld, _ctx: &mut TickContext, _index: usize) {}

#[derive(Debug, Clone)]
pub struct Actor {
    /// Determines the sprite, the collision box, and which behavior was
    /// bound at spawn time
    pub id: u16,
    /// Current animation frame
    pub frame: u8,

    /// Position on the map in tiles; `(x, y)` is the bottom-left tile
    pub x: i32,
    pub y: i32,

    /// Update the actor even while off screen
    pub always_update: bool,
    /// Once the actor has appeared on screen, keep updating it even if it
    /// goes off screen again
    pub remain_active: bool,
    /// May climb or descend single-tile steps without being blocked
    pub allow_stair_stepping: bool,
    /// Affected by gravity and conveyor belts
    pub gravity_affected: bool,
    /// Slot is free for reuse; skipped during update
    pub deleted: bool,

    /// Set once the actor was inside the active area; feeds `remain_active`
    pub has_been_on_screen: bool,

    /// Ramped fall speed while airborne, reset on landing
    pub gravity_state: u8,

    pub draw_style: DrawStyle,

    pub health: i16,

    /// Behavior-interpreted scratch variables
    pub var1: i32,
    pub var2: i32,
    pub var3: i32,
    pub var4: i32,
    pub var5: i32,

    /// Used by actors that act like solid level geometry (elevators,
    /// conveyor segments)
    pub tile_buffer: Option<Vec<u16>>,

    /// Score awarded to the player when the actor is destroyed
    pub score_given: i32,

    pub update_func: UpdateFunc,
}

impl Default for Actor {
    fn default() -> Self {
        Self {
            id: 0,
            frame: 0,
            x: 0,
            y: 0,
            always_update: false,
            remain_active: false,
            allow_stair_stepping: false,
            gravity_affected: false,
            deleted: true,
            has_been_on_screen: false,
            gravity_state: 0,
            draw_style: DrawStyle::Normal,
            health: 0,
            var1: 0,
            var2: 0,
            var3: 0,
            var4: 0,
            var5: 0,
            tile_buffer: None,
            score_given: 0,
            update_func: update_noop,
        }
    }
}

impl Actor {
    pub fn is_damageable(&self) -> bool {
        !self.deleted && self.health > 0 && self.draw_style != DrawStyle::Invisible
    }
}

#[derive(Debug, Clone)]
pub struct ActorPool {
    slots: Vec<Actor>,
}

impl Default for ActorPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ActorPool {
    pub fn new() -> Self {
        Self {
            slots: vec![Actor::default(); MAX_NUM_ACTORS],
        }
    }

    pub fn slots(&self) -> &[Actor] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> &Actor {
        &self.slots[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Actor {
        &mut self.slots[index]
    }

    /// Places an actor into the first free slot. When the pool is full the
    /// spawn silently does not happen, exactly like the original; callers
    /// must not treat this as an error.
    pub fn insert(&mut self, actor: Actor) -> Option<usize> {
        match self.slots.iter().position(|slot| slot.deleted) {
            Some(index) => {
                self.slots[index] = actor;
                Some(index)
            }
            None => {
                log::debug!("actor pool exhausted, dropping spawn of id {}", actor.id);
                None
            }
        }
    }

    pub fn delete(&mut self, index: usize) {
        self.slots[index].deleted = true;
        self.slots[index].tile_buffer = None;
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.deleted).count()
    }

    /// Live actors in slot order. Iteration order is part of the
    /// simulation's determinism contract.
    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &Actor)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, actor)| !actor.deleted)
    }
}
