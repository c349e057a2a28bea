//! Actor behaviors: the update procedures dispatched by actor id, plus the
//! player-contact and damage handling that goes with each kind. Everything
//! here mutates the world strictly in pool order and draws randomness only
//! from the shared random table.

use dn2_core::types::{CollectableLetterType, InventoryItemType, TutorialMessageId, WeaponType};

use crate::hud::MessagePriority;
use crate::services::{DrawStyle, SoundId};
use crate::world::actors::Actor;
use crate::world::map_parts::MapPartMotion;
use crate::world::player::PlayerState;
use crate::world::projectiles::{
    EffectMovement, FX_SPRITE_BURN, FX_SPRITE_EXPLOSION, FX_SPRITE_SCORE_NUMBER,
};
use crate::world::{Checkpoint, GameWorld, TickContext};

/// Actor ids understood by this engine. The id selects sprite, collision box
/// and behavior; level files refer to actors by these numbers.
pub mod ids {
    // Collectables
    pub const HEALTH_MOLECULE: u16 = 64;
    pub const SODA_CAN: u16 = 65;
    pub const LETTER_N: u16 = 70;
    pub const LETTER_U: u16 = 71;
    pub const LETTER_K: u16 = 72;
    pub const LETTER_E: u16 = 73;
    pub const LETTER_M: u16 = 74;
    pub const WEAPON_REGULAR: u16 = 80;
    pub const WEAPON_LASER: u16 = 81;
    pub const WEAPON_ROCKET_LAUNCHER: u16 = 82;
    pub const WEAPON_FLAME_THROWER: u16 = 83;
    pub const RAPID_FIRE: u16 = 84;
    pub const CLOAKING_DEVICE: u16 = 85;
    pub const BLUE_KEY: u16 = 86;
    pub const CIRCUIT_BOARD: u16 = 87;
    pub const HINT_GLOBE: u16 = 88;
    pub const MERCHANDISE_TOY: u16 = 90;
    pub const MERCHANDISE_PHONE: u16 = 91;
    pub const BONUS_GLOBE: u16 = 95;

    // Hazards and enemies
    pub const SECURITY_CAMERA: u16 = 119;
    pub const RADAR_DISH: u16 = 120;
    pub const SPINNING_LASER_TURRET: u16 = 121;
    pub const FIRE_BOMB: u16 = 122;
    pub const PATROLLING_GUARD: u16 = 123;
    pub const WALL_SHOOTER: u16 = 124;
    pub const ENEMY_SHOT: u16 = 125;

    // Level mechanics
    pub const DOOR: u16 = 130;
    pub const KEYHOLE: u16 = 131;
    pub const FORCE_FIELD: u16 = 132;
    pub const TELEPORTER: u16 = 133;
    pub const ELEVATOR: u16 = 134;
    pub const RESPAWN_BEACON: u16 = 135;
    pub const LEVEL_EXIT: u16 = 136;
    pub const CONTAINER: u16 = 137;
    pub const SPACE_SHIP: u16 = 140;
    pub const HINT_MACHINE: u16 = 141;
}

/// Broad classification used for contact handling and bonus bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
    HealthFood,
    Letter(CollectableLetterType),
    WeaponPickup(WeaponType),
    InventoryItem(InventoryItemType),
    Merchandise,
    BonusGlobe,
    SecurityCamera,
    RadarDish,
    Turret,
    FireBomb,
    Guard,
    WallShooter,
    EnemyShot,
    Door,
    Keyhole,
    ForceField,
    Teleporter,
    Elevator,
    RespawnBeacon,
    LevelExit,
    Container,
    SpaceShip,
    HintMachine,
    Decoration,
}

pub fn classify(id: u16) -> ActorKind {
    use ids::*;

    match id {
        HEALTH_MOLECULE | SODA_CAN => ActorKind::HealthFood,
        LETTER_N => ActorKind::Letter(CollectableLetterType::N),
        LETTER_U => ActorKind::Letter(CollectableLetterType::U),
        LETTER_K => ActorKind::Letter(CollectableLetterType::K),
        LETTER_E => ActorKind::Letter(CollectableLetterType::E),
        LETTER_M => ActorKind::Letter(CollectableLetterType::M),
        WEAPON_REGULAR => ActorKind::WeaponPickup(WeaponType::Normal),
        WEAPON_LASER => ActorKind::WeaponPickup(WeaponType::Laser),
        WEAPON_ROCKET_LAUNCHER => ActorKind::WeaponPickup(WeaponType::Rocket),
        WEAPON_FLAME_THROWER => ActorKind::WeaponPickup(WeaponType::FlameThrower),
        RAPID_FIRE => ActorKind::InventoryItem(InventoryItemType::RapidFire),
        CLOAKING_DEVICE => ActorKind::InventoryItem(InventoryItemType::CloakingDevice),
        BLUE_KEY => ActorKind::InventoryItem(InventoryItemType::BlueKey),
        CIRCUIT_BOARD => ActorKind::InventoryItem(InventoryItemType::CircuitBoard),
        HINT_GLOBE => ActorKind::InventoryItem(InventoryItemType::SpecialHintGlobe),
        MERCHANDISE_TOY | MERCHANDISE_PHONE => ActorKind::Merchandise,
        BONUS_GLOBE => ActorKind::BonusGlobe,
        SECURITY_CAMERA => ActorKind::SecurityCamera,
        RADAR_DISH => ActorKind::RadarDish,
        SPINNING_LASER_TURRET => ActorKind::Turret,
        FIRE_BOMB => ActorKind::FireBomb,
        PATROLLING_GUARD => ActorKind::Guard,
        WALL_SHOOTER => ActorKind::WallShooter,
        ENEMY_SHOT => ActorKind::EnemyShot,
        DOOR => ActorKind::Door,
        KEYHOLE => ActorKind::Keyhole,
        FORCE_FIELD => ActorKind::ForceField,
        TELEPORTER => ActorKind::Teleporter,
        ELEVATOR => ActorKind::Elevator,
        RESPAWN_BEACON => ActorKind::RespawnBeacon,
        LEVEL_EXIT => ActorKind::LevelExit,
        CONTAINER => ActorKind::Container,
        SPACE_SHIP => ActorKind::SpaceShip,
        HINT_MACHINE => ActorKind::HintMachine,
        _ => ActorKind::Decoration,
    }
}

/// Collision box size per actor id, matching the sprite size.
pub fn dimensions_for(id: u16) -> (i32, i32) {
    match classify(id) {
        ActorKind::SecurityCamera | ActorKind::EnemyShot => (1, 1),
        ActorKind::Guard => (2, 3),
        ActorKind::RadarDish => (4, 3),
        ActorKind::Door => (1, 4),
        ActorKind::ForceField => (1, 4),
        ActorKind::Teleporter | ActorKind::LevelExit => (3, 4),
        ActorKind::Elevator => (4, 1),
        ActorKind::SpaceShip => (4, 3),
        ActorKind::HintMachine => (2, 3),
        _ => (2, 2),
    }
}

/// Builds a fresh actor record with the behavior for `id` bound to it.
pub fn make_actor(id: u16, x: i32, y: i32) -> Actor {
    let mut actor = Actor {
        id,
        x,
        y,
        deleted: false,
        ..Actor::default()
    };

    match classify(id) {
        ActorKind::HealthFood
        | ActorKind::Letter(_)
        | ActorKind::WeaponPickup(_)
        | ActorKind::InventoryItem(_)
        | ActorKind::Merchandise => {
            actor.gravity_affected = true;
        }

        ActorKind::BonusGlobe => {
            actor.health = 1;
            actor.score_given = 500;
            actor.update_func = update_bonus_globe;
        }

        ActorKind::SecurityCamera => {
            actor.health = 1;
            actor.score_given = 100;
            actor.update_func = update_security_camera;
        }

        ActorKind::RadarDish => {
            actor.health = 4;
            actor.score_given = 500;
            actor.always_update = true;
        }

        ActorKind::Turret => {
            actor.health = 2;
            actor.score_given = 500;
            actor.update_func = update_turret;
        }

        ActorKind::FireBomb => {
            actor.health = 1;
            actor.score_given = 200;
            actor.gravity_affected = true;
        }

        ActorKind::Guard => {
            actor.health = 2;
            actor.score_given = 150;
            actor.gravity_affected = true;
            actor.remain_active = true;
            actor.update_func = update_guard;
        }

        ActorKind::WallShooter => {
            actor.health = 2;
            actor.score_given = 300;
            actor.update_func = update_wall_shooter;
        }

        ActorKind::EnemyShot => {
            actor.always_update = true;
            actor.update_func = update_enemy_shot;
        }

        ActorKind::ForceField => {
            actor.update_func = update_force_field;
        }

        ActorKind::Elevator => {
            actor.always_update = true;
            actor.update_func = update_elevator;
        }

        ActorKind::Container => {
            actor.health = 1;
        }

        ActorKind::Door
        | ActorKind::Keyhole
        | ActorKind::Teleporter
        | ActorKind::RespawnBeacon
        | ActorKind::LevelExit
        | ActorKind::SpaceShip
        | ActorKind::HintMachine => {}

        ActorKind::Decoration => {
            actor.update_func = update_decoration;
        }
    }

    actor
}

// ============================================================================
// Update functions
// ============================================================================

fn update_decoration(world: &mut GameWorld, _ctx: &mut TickContext, index: usize) {
    let actor = world.actors.get_mut(index);
    actor.frame = (actor.frame + 1) % 4;
}

/// The camera head tracks the player: looking left, down, or right.
fn update_security_camera(world: &mut GameWorld, _ctx: &mut TickContext, index: usize) {
    let (x, y) = {
        let actor = world.actors.get(index);
        (actor.x, actor.y)
    };

    let frame = if world.player.x + 1 < x {
        0
    } else if world.player.y > y {
        1
    } else if world.player.x > x + 1 {
        2
    } else {
        1
    };
    world.actors.get_mut(index).frame = frame;
}

/// Spins continuously, firing a shot towards the player at a fixed cadence.
fn update_turret(world: &mut GameWorld, _ctx: &mut TickContext, index: usize) {
    let (x, y, var1) = {
        let actor = world.actors.get(index);
        (actor.x, actor.y, actor.var1)
    };

    {
        let actor = world.actors.get_mut(index);
        actor.var1 += 1;
        actor.frame = ((actor.var1 / 4) % 4) as u8;
    }

    if var1 % 16 == 0 {
        let direction = if world.player.x < x { -1 } else { 1 };
        if let Some(shot) = world.spawn_actor(ids::ENEMY_SHOT, x + direction, y - 1) {
            world.actors.get_mut(shot).var1 = direction;
        }
    }
}

/// Walks back and forth, turning at walls and ledges.
fn update_guard(world: &mut GameWorld, _ctx: &mut TickContext, index: usize) {
    let (x, y, var1, id) = {
        let actor = world.actors.get(index);
        (actor.x, actor.y, actor.var1, actor.id)
    };

    let dx = if var1 == 0 { -1 } else { 1 };
    let (width, height) = dimensions_for(id);
    let bbox = crate::collision::BoundingBox::from_position(x, y, width, height);

    let ahead = bbox.translated(dx, 0);
    let blocked =
        crate::collision::apply_horizontal_movement(&world.map, &bbox, dx, false).is_none();
    let at_ledge = !crate::collision::is_on_solid_ground(&world.map, &ahead);

    let actor = world.actors.get_mut(index);
    if blocked || at_ledge {
        actor.var1 = if var1 == 0 { 1 } else { 0 };
    } else {
        actor.x += dx;
    }
    actor.frame = (actor.frame + 1) % 4;
}

/// Mounted gun: fires whenever the player is roughly level with it, with a
/// random-table gate so volleys are irregular but reproducible.
fn update_wall_shooter(world: &mut GameWorld, _ctx: &mut TickContext, index: usize) {
    let (x, y, var1) = {
        let actor = world.actors.get(index);
        (actor.x, actor.y, actor.var1)
    };

    if var1 > 0 {
        world.actors.get_mut(index).var1 -= 1;
        return;
    }

    let level_with_player = (world.player.y - y).abs() <= 2;
    if level_with_player && world.rng.next_number() & 3 == 0 {
        let direction = if world.player.x < x { -1 } else { 1 };
        if let Some(shot) = world.spawn_actor(ids::ENEMY_SHOT, x + direction, y) {
            world.actors.get_mut(shot).var1 = direction;
        }
        world.actors.get_mut(index).var1 = 24;
    }
}

/// A projectile fired by an enemy. `var1` holds the horizontal direction.
fn update_enemy_shot(world: &mut GameWorld, _ctx: &mut TickContext, index: usize) {
    let (x, y, var1) = {
        let actor = world.actors.get(index);
        (actor.x, actor.y, actor.var1)
    };

    let bbox = crate::collision::BoundingBox::from_position(x, y, 1, 1);
    let moved = crate::collision::apply_horizontal_movement(&world.map, &bbox, var1, false);

    match moved {
        Some((dx, _)) => {
            let actor = world.actors.get_mut(index);
            actor.x += dx;
            if actor.x < 0 || actor.x >= world.map.width() {
                world.actors.delete(index);
            }
        }
        None => world.actors.delete(index),
    }
}

fn update_force_field(world: &mut GameWorld, _ctx: &mut TickContext, index: usize) {
    let actor = world.actors.get_mut(index);
    actor.frame = (actor.frame + 1) % 3;
}

/// Bobs in place over a four-tick cycle.
fn update_bonus_globe(world: &mut GameWorld, _ctx: &mut TickContext, index: usize) {
    let actor = world.actors.get_mut(index);
    actor.var1 += 1;
    actor.frame = ((actor.var1 / 2) % 2) as u8;
}

/// A movable solid platform. The tiles under the actor were captured into
/// its tile buffer at spawn time; moving writes them back into the map so
/// the platform stays solid level geometry.
fn update_elevator(world: &mut GameWorld, ctx: &mut TickContext, index: usize) {
    let (x, y, width, top_limit, bottom_limit) = {
        let actor = world.actors.get(index);
        (actor.x, actor.y, actor.var1.max(1), actor.var2, actor.var3)
    };

    let player_box = world.player.bounding_box();
    let standing_on = player_box.bottom + 1 == y
        && player_box.right >= x
        && player_box.left < x + width;

    if !standing_on {
        if world.player.state == PlayerState::RidingElevator {
            world.player.state = PlayerState::Falling;
            world.player.gravity_state = 0;
        }
        return;
    }

    let direction = if ctx.input.up && y > top_limit {
        -1
    } else if ctx.input.down && y < bottom_limit {
        1
    } else {
        if world.player.state == PlayerState::RidingElevator {
            world.player.state = PlayerState::Normal;
        }
        return;
    };

    // Re-seat the platform tiles one row over
    let tiles: Vec<u16> = world
        .actors
        .get(index)
        .tile_buffer
        .clone()
        .unwrap_or_default();
    for (column, tile) in tiles.iter().enumerate() {
        world.map.set_tile(0, x + column as i32, y);
        world.map.set_tile(*tile, x + column as i32, y + direction);
    }

    world.actors.get_mut(index).y += direction;
    world.player.y += direction;
    world.player.state = PlayerState::RidingElevator;
}

// ============================================================================
// Player contact
// ============================================================================

/// Invoked when the player's box overlaps a visible actor. Collectables
/// apply their pickup; hazards deal damage.
pub(crate) fn on_player_contact(world: &mut GameWorld, ctx: &mut TickContext, index: usize) {
    let (id, x, y) = {
        let actor = world.actors.get(index);
        (actor.id, actor.x, actor.y)
    };

    match classify(id) {
        ActorKind::HealthFood => {
            if ctx.model.is_at_full_health() {
                world.give_score_with_effect(ctx, 10_000, x, y);
            } else {
                ctx.model.give_health(1);
                world.give_score_with_effect(ctx, 500, x, y);
            }
            ctx.services.play_sound(SoundId::HealthPickup);
            let message = if id == ids::SODA_CAN {
                TutorialMessageId::FoundSoda
            } else {
                TutorialMessageId::FoundHealthMolecule
            };
            world.show_tutorial_message(ctx, message);
            world.actors.delete(index);
        }

        ActorKind::Letter(letter) => {
            world.collect_letter(ctx, letter, x, y);
            world.actors.delete(index);
        }

        ActorKind::WeaponPickup(weapon) => {
            ctx.model.switch_to_weapon(weapon);
            world.bookkeeping.weapons_collected += 1;
            ctx.services.play_sound(SoundId::WeaponPickup);
            world.show_tutorial_message(
                ctx,
                match weapon {
                    WeaponType::Normal => TutorialMessageId::FoundRegularWeapon,
                    WeaponType::Laser => TutorialMessageId::FoundLaser,
                    WeaponType::Rocket => TutorialMessageId::FoundRocketLauncher,
                    WeaponType::FlameThrower => TutorialMessageId::FoundFlameThrower,
                },
            );
            world.actors.delete(index);
        }

        ActorKind::InventoryItem(item) => {
            ctx.model.give_item(item);
            ctx.services.play_sound(SoundId::ItemPickup);

            match item {
                InventoryItemType::RapidFire => {
                    world.player.activate_rapid_fire();
                    world.show_tutorial_message(ctx, TutorialMessageId::FoundRapidFire);
                }
                InventoryItemType::CloakingDevice => world.player.activate_cloak(),
                InventoryItemType::BlueKey => {
                    world.show_tutorial_message(ctx, TutorialMessageId::FoundBlueKey);
                }
                InventoryItemType::CircuitBoard => {
                    world.show_tutorial_message(ctx, TutorialMessageId::FoundAccessCard);
                }
                InventoryItemType::SpecialHintGlobe => {}
            }
            world.actors.delete(index);
        }

        ActorKind::Merchandise => {
            world.bookkeeping.merchandise_collected += 1;
            world.give_score_with_effect(ctx, 2000, x, y);
            ctx.services.play_sound(SoundId::ItemPickup);
            world.actors.delete(index);
        }

        ActorKind::Guard | ActorKind::Turret => world.damage_player(ctx, 1),

        ActorKind::EnemyShot => {
            world.actors.delete(index);
            world.damage_player(ctx, 1);
        }

        ActorKind::ForceField => {
            if world.player.has_active_cloak() {
                return;
            }
            if ctx.model.has_item(InventoryItemType::CircuitBoard) {
                ctx.services.play_sound(SoundId::ForceFieldFizzle);
                world.message_display.set_message(
                    "FORCE FIELD DESTROYED... *GOOD WORK...",
                    MessagePriority::Normal,
                );
                world.actors.delete(index);
            } else {
                world.show_tutorial_message(ctx, TutorialMessageId::FoundForceField);
                world.damage_player(ctx, 2);
            }
        }

        ActorKind::Teleporter => {
            if ctx.input.interact.was_triggered {
                let (dest_x, dest_y) = {
                    let actor = world.actors.get(index);
                    (actor.var1, actor.var2)
                };
                world.player.x = dest_x;
                world.player.y = dest_y;
                let (px, py) = (world.player.x, world.player.y);
                world.camera.center_immediately(&world.map, px, py);
                ctx.services.play_sound(SoundId::Teleport);
            } else {
                world.show_tutorial_message(ctx, TutorialMessageId::FoundTeleporter);
            }
        }

        ActorKind::Keyhole => {
            if !ctx.input.interact.was_triggered {
                return;
            }
            if world.actors.get(index).var1 != 0 {
                return; // already used
            }

            if ctx.model.has_item(InventoryItemType::BlueKey) {
                ctx.model.remove_item(InventoryItemType::BlueKey);
                ctx.services.play_sound(SoundId::DoorOpening);
                world.actors.get_mut(index).var1 = 1;
                let link = world.actors.get(index).var3;
                world.open_linked_doors(link);
            } else {
                world.show_tutorial_message(ctx, TutorialMessageId::KeyNeeded);
            }
        }

        ActorKind::RespawnBeacon => {
            if world.actors.get(index).var1 == 0 {
                world.actors.get_mut(index).var1 = 1;
                world.checkpoint = Some(Checkpoint {
                    x,
                    y,
                    state: ctx.model.make_checkpoint(),
                });
            }
        }

        ActorKind::LevelExit => {
            if world.radar_dishes_left > 0 {
                world.show_tutorial_message(ctx, TutorialMessageId::RadarsStillFunctional);
            } else {
                world.finish_level();
            }
        }

        ActorKind::Elevator => world.show_tutorial_message(ctx, TutorialMessageId::FoundTurboLift),

        ActorKind::SpaceShip => {
            if ctx.input.interact.was_triggered {
                let (ship_x, ship_y) = {
                    let actor = world.actors.get(index);
                    (actor.x, actor.y)
                };
                world.player.x = ship_x;
                world.player.y = ship_y;
                world.player.state = PlayerState::UsingShip;
                world.actors.delete(index);
            } else {
                world.show_tutorial_message(ctx, TutorialMessageId::FoundSpaceShip);
            }
        }

        ActorKind::HintMachine => {
            if ctx.model.has_item(InventoryItemType::SpecialHintGlobe) {
                ctx.model.remove_item(InventoryItemType::SpecialHintGlobe);
                world.give_score_with_effect(ctx, 50_000, x, y);
                world.message_display.set_message(
                    "WELL DONE...*SEARCH NEAR THE TALL WALLS FOR*HIDDEN PASSAGES...",
                    MessagePriority::HintMachineMessage,
                );
            } else {
                world.show_tutorial_message(ctx, TutorialMessageId::HintGlobeNeeded);
            }
        }

        ActorKind::FireBomb
        | ActorKind::BonusGlobe
        | ActorKind::SecurityCamera
        | ActorKind::RadarDish
        | ActorKind::WallShooter
        | ActorKind::Door
        | ActorKind::Container
        | ActorKind::Decoration => {}
    }
}

// ============================================================================
// Damage handling
// ============================================================================

impl GameWorld {
    /// Applies weapon damage to an actor; destruction awards score, spawns
    /// the death effect and updates the bonus bookkeeping.
    pub fn damage_actor(&mut self, ctx: &mut TickContext, index: usize, amount: i32) {
        if !self.actors.get(index).is_damageable() {
            return;
        }

        let actor = self.actors.get_mut(index);
        actor.health -= amount as i16;

        if actor.health > 0 {
            actor.draw_style = DrawStyle::Whiteflash;
            ctx.services.play_sound(SoundId::EnemyHit);
        } else {
            self.handle_actor_destroyed(ctx, index);
        }
    }

    fn handle_actor_destroyed(&mut self, ctx: &mut TickContext, index: usize) {
        let (id, x, y, score_given, var1) = {
            let actor = self.actors.get(index);
            (actor.id, actor.x, actor.y, actor.score_given, actor.var1)
        };

        match classify(id) {
            ActorKind::SecurityCamera => self.bookkeeping.cameras_destroyed += 1,
            ActorKind::Turret => self.bookkeeping.turrets_destroyed += 1,
            ActorKind::FireBomb => {
                self.bookkeeping.fire_bombs_destroyed += 1;
                // The bomb splits into fire crawling out to both sides
                for step in 1..=3 {
                    self.effects.spawn_delayed(
                        FX_SPRITE_BURN,
                        x - step,
                        y,
                        EffectMovement::BurnFx,
                        step,
                    );
                    self.effects.spawn_delayed(
                        FX_SPRITE_BURN,
                        x + step,
                        y,
                        EffectMovement::BurnFx,
                        step,
                    );
                }
            }
            ActorKind::BonusGlobe => self.bookkeeping.bonus_globes_shot += 1,
            ActorKind::RadarDish => {
                self.radar_dishes_left -= 1;
                if self.radar_dishes_left == 0 {
                    self.message_display
                        .set_message("SECTOR SECURE!!!", MessagePriority::Normal);
                }
            }
            ActorKind::Container => {
                // Shooting a container releases its contents
                ctx.services.play_sound(SoundId::GlassBreaking);
                if var1 != 0 {
                    self.spawn_actor(var1 as u16, x, y);
                }
            }
            _ => {}
        }

        if score_given > 0 {
            self.give_score_with_effect(ctx, score_given, x, y);
        }

        self.effects
            .spawn(FX_SPRITE_EXPLOSION, x, y, EffectMovement::NoMove);
        self.particles.spawn(x, y, 1, 5);

        // Play an explosion sound, randomly chosen between two variants
        if self.rng.next_number() & 1 != 0 {
            ctx.services.play_sound(SoundId::Explosion);
        } else {
            ctx.services.play_sound(SoundId::AlternateExplosion);
        }

        self.actors.delete(index);
    }

    /// Score plus the floating score-number effect shown at the source.
    pub fn give_score_with_effect(&mut self, ctx: &mut TickContext, amount: i32, x: i32, y: i32) {
        ctx.model.give_score(amount);
        self.effects
            .spawn(FX_SPRITE_SCORE_NUMBER, x, y, EffectMovement::ScoreNumber);
    }

    fn collect_letter(&mut self, ctx: &mut TickContext, letter: CollectableLetterType, x: i32, y: i32) {
        use dn2_core::types::LetterCollectionState;

        ctx.services.play_sound(SoundId::LetterPickup);

        match ctx.model.add_letter(letter) {
            LetterCollectionState::InOrder => {
                self.give_score_with_effect(ctx, 100_000, x, y);
                self.show_tutorial_message(ctx, TutorialMessageId::LettersCollectedRightOrder);
            }
            _ => {
                self.give_score_with_effect(ctx, 500, x, y);
                let message = match letter {
                    CollectableLetterType::N => Some(TutorialMessageId::FoundLetterN),
                    CollectableLetterType::U => Some(TutorialMessageId::FoundLetterU),
                    CollectableLetterType::K => Some(TutorialMessageId::FoundLetterK),
                    CollectableLetterType::E => Some(TutorialMessageId::FoundLetterE),
                    CollectableLetterType::M => None,
                };
                if let Some(message) = message {
                    self.show_tutorial_message(ctx, message);
                }
            }
        }
    }

    /// Starts the door-opening animation for every door sharing the given
    /// link id with a keyhole.
    fn open_linked_doors(&mut self, link: i32) {
        for index in 0..self.actors.slots().len() {
            let actor = self.actors.get(index);
            if actor.deleted || classify(actor.id) != ActorKind::Door || actor.var3 != link {
                continue;
            }

            let (_, height) = dimensions_for(actor.id);
            let (x, y) = (actor.x, actor.y);
            self.map_parts
                .spawn(x, y - height + 1, x, y, MapPartMotion::RiseUp, height);
            self.actors.delete(index);
        }
    }
}
