//! Fixed pools for player shots, short-lived visual effects, and the
//! particle system. Enemy projectiles are ordinary actors and do not live
//! here.

use dn2_core::constants::{
    MAX_NUM_EFFECTS, MAX_NUM_PLAYER_SHOTS, NUM_PARTICLE_GROUPS, PARTICLES_PER_GROUP,
    WPN_DAMAGE_FLAME_THROWER, WPN_DAMAGE_LASER, WPN_DAMAGE_REGULAR, WPN_DAMAGE_ROCKET_LAUNCHER,
};
use dn2_core::types::WeaponType;

use crate::collision::BoundingBox;

/// Sprite ids of the built-in effect graphics
pub const FX_SPRITE_SHOT_IMPACT: u16 = 1;
pub const FX_SPRITE_EXPLOSION: u16 = 2;
pub const FX_SPRITE_SCORE_NUMBER: u16 = 3;
pub const FX_SPRITE_BURN: u16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ShotDirection {
    pub fn step(self) -> (i32, i32) {
        // Shots travel two tiles per tick
        match self {
            ShotDirection::Up => (0, -2),
            ShotDirection::Down => (0, 2),
            ShotDirection::Left => (-2, 0),
            ShotDirection::Right => (2, 0),
        }
    }
}

pub fn damage_for_weapon(weapon: WeaponType) -> i32 {
    match weapon {
        WeaponType::Normal => WPN_DAMAGE_REGULAR,
        WeaponType::Laser => WPN_DAMAGE_LASER,
        WeaponType::Rocket => WPN_DAMAGE_ROCKET_LAUNCHER,
        WeaponType::FlameThrower => WPN_DAMAGE_FLAME_THROWER,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlayerShot {
    pub weapon: WeaponType,
    pub frame: u8,
    pub x: i32,
    pub y: i32,
    pub direction: ShotDirection,
}

impl PlayerShot {
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_position(self.x, self.y, 1, 1)
    }

    pub fn damage(&self) -> i32 {
        damage_for_weapon(self.weapon)
    }

    /// Rockets and flame shots damage an area, not just the hit tile.
    pub fn has_area_effect(&self) -> bool {
        matches!(self.weapon, WeaponType::Rocket | WeaponType::FlameThrower)
    }
}

#[derive(Debug, Clone)]
pub struct PlayerShotPool {
    shots: [Option<PlayerShot>; MAX_NUM_PLAYER_SHOTS],
}

impl Default for PlayerShotPool {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerShotPool {
    pub fn new() -> Self {
        Self {
            shots: [None; MAX_NUM_PLAYER_SHOTS],
        }
    }

    /// Fails silently when all six slots are in flight.
    pub fn spawn(&mut self, weapon: WeaponType, x: i32, y: i32, direction: ShotDirection) -> bool {
        match self.shots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(PlayerShot {
                    weapon,
                    frame: 0,
                    x,
                    y,
                    direction,
                });
                true
            }
            None => {
                log::debug!("player shot pool exhausted");
                false
            }
        }
    }

    pub fn clear(&mut self) {
        self.shots = [None; MAX_NUM_PLAYER_SHOTS];
    }

    pub fn active_count(&self) -> usize {
        self.shots.iter().flatten().count()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Option<PlayerShot>> {
        self.shots.iter_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerShot> {
        self.shots.iter().flatten()
    }

    pub fn capacity(&self) -> usize {
        MAX_NUM_PLAYER_SHOTS
    }

    pub fn get(&self, index: usize) -> Option<&PlayerShot> {
        self.shots[index].as_ref()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut PlayerShot> {
        self.shots[index].as_mut()
    }

    pub fn remove(&mut self, index: usize) {
        self.shots[index] = None;
    }
}

/// Movement patterns for visual effects, from the original's EM_* set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectMovement {
    ScoreNumber,
    BurnFx,
    NoMove,
    RiseUp,
    FlyRight,
    FlyUpperRight,
    FlyUp,
    FlyUpperLeft,
    FlyLeft,
    FlyDown,
    BlowInWind,
}

#[derive(Debug, Clone, Copy)]
pub struct Effect {
    pub sprite_id: u16,
    pub frame: u8,
    pub x: i32,
    pub y: i32,
    pub movement: EffectMovement,
    pub movement_step: i32,
    pub spawn_delay: i32,
    pub frames_to_live: i32,
}

fn lifetime_for(movement: EffectMovement) -> i32 {
    match movement {
        EffectMovement::ScoreNumber => 30,
        EffectMovement::BurnFx => 12,
        EffectMovement::NoMove => 8,
        _ => 16,
    }
}

#[derive(Debug, Clone)]
pub struct EffectPool {
    effects: Vec<Option<Effect>>,
}

impl Default for EffectPool {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectPool {
    pub fn new() -> Self {
        Self {
            effects: vec![None; MAX_NUM_EFFECTS],
        }
    }

    pub fn spawn(&mut self, sprite_id: u16, x: i32, y: i32, movement: EffectMovement) {
        self.spawn_delayed(sprite_id, x, y, movement, 0);
    }

    /// `spawn_delay` ticks pass before the effect shows and starts moving.
    pub fn spawn_delayed(
        &mut self,
        sprite_id: u16,
        x: i32,
        y: i32,
        movement: EffectMovement,
        spawn_delay: i32,
    ) {
        match self.effects.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(Effect {
                    sprite_id,
                    frame: 0,
                    x,
                    y,
                    movement,
                    movement_step: 0,
                    spawn_delay,
                    frames_to_live: lifetime_for(movement),
                });
            }
            None => log::debug!("effect pool exhausted, dropping sprite {sprite_id}"),
        }
    }

    pub fn active_count(&self) -> usize {
        self.effects.iter().flatten().count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter().flatten().filter(|fx| fx.spawn_delay == 0)
    }

    pub fn clear(&mut self) {
        self.effects.iter_mut().for_each(|slot| *slot = None);
    }

    /// Advances all effects one tick; expired ones free their slot.
    pub fn update(&mut self) {
        for slot in &mut self.effects {
            let Some(fx) = slot else { continue };

            if fx.spawn_delay > 0 {
                fx.spawn_delay -= 1;
                continue;
            }

            match fx.movement {
                EffectMovement::ScoreNumber => {
                    // Floats up one tile every other tick
                    if fx.movement_step % 2 == 0 {
                        fx.y -= 1;
                    }
                }
                EffectMovement::BurnFx => {
                    fx.frame = (fx.frame + 1) % 4;
                }
                EffectMovement::NoMove => {}
                EffectMovement::RiseUp => fx.y -= 1,
                EffectMovement::FlyRight => fx.x += 2,
                EffectMovement::FlyUpperRight => {
                    fx.x += 1;
                    fx.y -= 1;
                }
                EffectMovement::FlyUp => fx.y -= 2,
                EffectMovement::FlyUpperLeft => {
                    fx.x -= 1;
                    fx.y -= 1;
                }
                EffectMovement::FlyLeft => fx.x -= 2,
                EffectMovement::FlyDown => fx.y += 2,
                EffectMovement::BlowInWind => {
                    fx.x += 1;
                    if fx.movement_step % 4 == 0 {
                        fx.y -= 1;
                    }
                }
            }

            fx.movement_step += 1;
            fx.frames_to_live -= 1;
            if fx.frames_to_live <= 0 {
                *slot = None;
            }
        }
    }
}

/// One burst of debris particles. Individual particle positions are derived
/// from the group's age at draw time; the simulation only tracks the groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParticleGroup {
    pub active: bool,
    pub time_alive: i32,
    pub x: i32,
    pub y: i32,
    pub color: u8,
    pub x_velocity_scale: i32,
}

const PARTICLE_LIFETIME: i32 = 28;

#[derive(Debug, Clone, Default)]
pub struct ParticleSystem {
    groups: [ParticleGroup; NUM_PARTICLE_GROUPS],
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, x: i32, y: i32, x_velocity_scale: i32, color: u8) {
        match self.groups.iter_mut().find(|group| !group.active) {
            Some(group) => {
                *group = ParticleGroup {
                    active: true,
                    time_alive: 0,
                    x,
                    y,
                    color,
                    x_velocity_scale,
                };
            }
            None => log::debug!("particle groups exhausted"),
        }
    }

    pub fn update(&mut self) {
        for group in &mut self.groups {
            if group.active {
                group.time_alive += 1;
                if group.time_alive >= PARTICLE_LIFETIME {
                    group.active = false;
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.groups = [ParticleGroup::default(); NUM_PARTICLE_GROUPS];
    }

    pub fn groups(&self) -> impl Iterator<Item = &ParticleGroup> {
        self.groups.iter().filter(|group| group.active)
    }

    pub fn particles_per_group(&self) -> usize {
        PARTICLES_PER_GROUP
    }
}
