//! The playable world: map, player, actor/projectile/effect pools and the
//! fixed-step update that drives them. One instance per level attempt.

pub mod actors;
pub mod behaviors;
pub mod camera;
pub mod map_parts;
pub mod player;
pub mod projectiles;
pub mod render;

use std::collections::BTreeSet;

use dn2_core::types::{message_text, Bonus, CheckpointState, GameSessionId, PlayerInput, PlayerModel, TutorialMessageId, WeaponType};

use crate::collision::{
    apply_gravity, apply_horizontal_movement, check_conveyor_belt, check_world_collision,
    BoundingBox, CollisionResult, ConveyorBeltCheckResult, MovementDirection,
};
use crate::hud::{MessageDisplay, MessagePriority};
use crate::map::{GameMap, LevelFlags};
use crate::rng::RandomGenerator;
use crate::services::{DrawStyle, LevelData, ServiceProvider, SoundId};

use actors::ActorPool;
use behaviors::{classify, dimensions_for, ActorKind};
use camera::Camera;
use map_parts::MovingMapParts;
use player::{Player, PlayerState};
use projectiles::{
    EffectMovement, EffectPool, ParticleSystem, PlayerShotPool, FX_SPRITE_SHOT_IMPACT,
};

/// Everything a tick needs besides the world itself: the tick's input, the
/// persistent player state, and the audio/fade services.
pub struct TickContext<'a> {
    pub input: PlayerInput,
    pub model: &'a mut PlayerModel,
    pub services: &'a mut dyn ServiceProvider,
}

/// Per-level counts backing the seven end-of-level bonuses.
#[derive(Debug, Clone, Copy, Default)]
pub struct BonusBookkeeping {
    pub cameras_present: i32,
    pub cameras_destroyed: i32,
    pub turrets_present: i32,
    pub turrets_destroyed: i32,
    pub fire_bombs_present: i32,
    pub fire_bombs_destroyed: i32,
    pub bonus_globes_present: i32,
    pub bonus_globes_shot: i32,
    pub merchandise_present: i32,
    pub merchandise_collected: i32,
    pub weapons_present: i32,
    pub weapons_collected: i32,
    pub damage_taken: bool,
}

/// Where (and with what player state) to respawn after death.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    pub x: i32,
    pub y: i32,
    pub state: CheckpointState,
}

pub struct GameWorld {
    pub map: GameMap,
    pub player: Player,
    pub actors: ActorPool,
    pub player_shots: PlayerShotPool,
    pub effects: EffectPool,
    pub particles: ParticleSystem,
    pub map_parts: MovingMapParts,
    pub camera: Camera,
    pub message_display: MessageDisplay,
    pub rng: RandomGenerator,
    pub tick_count: u32,

    session_id: GameSessionId,
    pub(crate) backdrop_image: String,
    music_file: String,
    pub(crate) level_flags: LevelFlags,
    pub(crate) backdrop_scroll_offset: f32,
    pub(crate) water_areas: Vec<(i32, i32, i32, i32)>,

    player_start: (i32, i32),
    player_start_facing_left: bool,

    pub bookkeeping: BonusBookkeeping,
    pub checkpoint: Option<Checkpoint>,
    pub radar_dishes_left: i32,

    level_finished: bool,
    player_died: bool,

    pub(crate) screen_shake: i32,
    pub(crate) screen_flash: Option<u8>,
    earthquake_armed: bool,
    earthquake_countdown: i32,
}

impl GameWorld {
    pub fn new(
        level: &LevelData,
        session_id: GameSessionId,
        position_override: Option<(i32, i32)>,
        widescreen: bool,
    ) -> Self {
        let map = GameMap::from_level(level);
        let start = position_override.unwrap_or(level.player_start);

        let mut world = Self {
            map,
            player: Player::new(start.0, start.1, level.player_facing_left),
            actors: ActorPool::new(),
            player_shots: PlayerShotPool::new(),
            effects: EffectPool::new(),
            particles: ParticleSystem::new(),
            map_parts: MovingMapParts::new(),
            camera: Camera::new(widescreen),
            message_display: MessageDisplay::new(),
            rng: RandomGenerator::new(),
            tick_count: 0,
            session_id,
            backdrop_image: level.backdrop_image.clone(),
            music_file: level.music_file.clone(),
            level_flags: level.flags,
            backdrop_scroll_offset: 0.0,
            water_areas: level.water_areas.clone(),
            player_start: start,
            player_start_facing_left: level.player_facing_left,
            bookkeeping: BonusBookkeeping::default(),
            checkpoint: None,
            radar_dishes_left: 0,
            level_finished: false,
            player_died: false,
            screen_shake: 0,
            screen_flash: None,
            earthquake_armed: level.flags.contains(LevelFlags::EARTHQUAKE),
            earthquake_countdown: 0,
        };

        for (id, x, y) in &level.actor_descriptions {
            world.spawn_actor(*id, *x, *y);
        }

        let (px, py) = (world.player.x, world.player.y);
        world.camera.center_immediately(&world.map, px, py);

        world
    }

    pub fn session_id(&self) -> GameSessionId {
        self.session_id
    }

    pub fn music_file(&self) -> &str {
        &self.music_file
    }

    pub fn level_finished(&self) -> bool {
        self.level_finished
    }

    pub fn player_died(&self) -> bool {
        self.player_died
    }

    pub(crate) fn finish_level(&mut self) {
        self.level_finished = true;
    }

    pub(crate) fn signal_player_died(&mut self) {
        self.player_died = true;
    }

    pub fn is_player_in_ship(&self) -> bool {
        self.player.is_in_ship()
    }

    /// Spawns an actor, keeping the per-kind bonus bookkeeping and the
    /// radar dish count in step. Returns `None` when the pool is full (the
    /// spawn then simply does not happen).
    pub fn spawn_actor(&mut self, id: u16, x: i32, y: i32) -> Option<usize> {
        let mut actor = behaviors::make_actor(id, x, y);

        let kind = classify(id);
        if kind == ActorKind::Elevator {
            // Capture the platform tiles so the elevator can move them as
            // solid geometry
            let (width, _) = dimensions_for(id);
            actor.var1 = width;
            actor.var2 = 0;
            actor.var3 = self.map.height() - 1;
            actor.tile_buffer = Some(
                (0..width)
                    .map(|column| self.map.tile_at(x + column, y))
                    .collect(),
            );
        }

        let index = self.actors.insert(actor)?;

        match kind {
            ActorKind::SecurityCamera => self.bookkeeping.cameras_present += 1,
            ActorKind::Turret => self.bookkeeping.turrets_present += 1,
            ActorKind::FireBomb => self.bookkeeping.fire_bombs_present += 1,
            ActorKind::BonusGlobe => self.bookkeeping.bonus_globes_present += 1,
            ActorKind::Merchandise => self.bookkeeping.merchandise_present += 1,
            ActorKind::WeaponPickup(_) => self.bookkeeping.weapons_present += 1,
            ActorKind::RadarDish => self.radar_dishes_left += 1,
            _ => {}
        }

        Some(index)
    }

    /// Shows a tutorial message the first time its trigger is hit; the
    /// shown-state persists via the player model.
    pub fn show_tutorial_message(&mut self, ctx: &mut TickContext, id: TutorialMessageId) {
        if !ctx.model.tutorial_messages().has_been_shown(id) {
            ctx.model.tutorial_messages_mut().mark_as_shown(id);
            self.message_display
                .set_message(message_text(id), MessagePriority::Normal);
        }
    }

    /// One logic tick. Phases run in a fixed order; all pool iteration is
    /// in slot order, which demo determinism depends on.
    pub fn update_game_logic(&mut self, ctx: &mut TickContext) {
        self.tick_count += 1;

        self.message_display.update(ctx.services);
        self.update_player(ctx);
        self.update_actors(ctx);
        self.update_player_shots();
        self.effects.update();
        self.particles.update();
        self.resolve_collisions(ctx);
        self.map_parts.update(&mut self.map);
        self.update_earthquake(ctx);

        let (px, py) = (self.player.x, self.player.y);
        self.camera.follow(&self.map, px, py);
    }

    fn update_actors(&mut self, ctx: &mut TickContext) {
        for index in 0..self.actors.slots().len() {
            let (deleted, id, always_update, remain_active, was_seen, gravity_affected, stairs, draw_style, update_func) = {
                let actor = self.actors.get(index);
                (
                    actor.deleted,
                    actor.id,
                    actor.always_update,
                    actor.remain_active,
                    actor.has_been_on_screen,
                    actor.gravity_affected,
                    actor.allow_stair_stepping,
                    actor.draw_style,
                    actor.update_func,
                )
            };
            if deleted {
                continue;
            }

            // Hit flash and translucency last a single frame
            if matches!(draw_style, DrawStyle::Whiteflash | DrawStyle::Translucent) {
                self.actors.get_mut(index).draw_style = DrawStyle::Normal;
            }

            let (width, height) = dimensions_for(id);
            let bbox = {
                let actor = self.actors.get(index);
                BoundingBox::from_position(actor.x, actor.y, width, height)
            };

            let on_screen = self
                .camera
                .is_on_screen(bbox.left, bbox.top, bbox.right, bbox.bottom);
            if on_screen {
                self.actors.get_mut(index).has_been_on_screen = true;
            }

            let should_update =
                on_screen || always_update || (was_seen && remain_active);
            if !should_update {
                continue;
            }

            if gravity_affected {
                let gravity_state = self.actors.get(index).gravity_state;
                let (moved, new_state, _) = apply_gravity(&self.map, &bbox, gravity_state);
                {
                    let actor = self.actors.get_mut(index);
                    actor.y += moved;
                    actor.gravity_state = new_state;
                }

                // Conveyor belts only drag entities resting on the ground
                if new_state == 0 {
                    let bbox = {
                        let actor = self.actors.get(index);
                        BoundingBox::from_position(actor.x, actor.y, width, height)
                    };
                    let drift = match check_conveyor_belt(&self.map, &bbox) {
                        ConveyorBeltCheckResult::Left => Some(-1),
                        ConveyorBeltCheckResult::Right => Some(1),
                        ConveyorBeltCheckResult::None => None,
                    };
                    if let Some(dx) = drift {
                        if let Some((applied_dx, applied_dy)) =
                            apply_horizontal_movement(&self.map, &bbox, dx, stairs)
                        {
                            let actor = self.actors.get_mut(index);
                            actor.x += applied_dx;
                            actor.y += applied_dy;
                        }
                    }
                }
            }

            update_func(self, ctx, index);
        }
    }

    fn update_player_shots(&mut self) {
        for shot_index in 0..self.player_shots.capacity() {
            let Some(shot) = self.player_shots.get(shot_index).copied() else {
                continue;
            };

            let (dx, dy) = shot.direction.step();
            let (step_x, step_y) = (dx.signum(), dy.signum());
            let steps = dx.abs().max(dy.abs());

            let direction = match shot.direction {
                projectiles::ShotDirection::Up => MovementDirection::Up,
                projectiles::ShotDirection::Down => MovementDirection::Down,
                projectiles::ShotDirection::Left => MovementDirection::Left,
                projectiles::ShotDirection::Right => MovementDirection::Right,
            };

            let (mut x, mut y) = (shot.x, shot.y);
            let mut removed = false;

            for _ in 0..steps {
                let bbox = BoundingBox::from_position(x, y, 1, 1);
                if check_world_collision(&self.map, direction, &bbox)
                    == CollisionResult::Collision
                {
                    // The shot converts into a hit effect at the impact tile
                    self.effects
                        .spawn(FX_SPRITE_SHOT_IMPACT, x, y, EffectMovement::NoMove);
                    self.player_shots.remove(shot_index);
                    removed = true;
                    break;
                }
                x += step_x;
                y += step_y;
            }

            if removed {
                continue;
            }

            if x < 0 || x >= self.map.width() || y < 0 || y >= self.map.height() {
                self.effects
                    .spawn(FX_SPRITE_SHOT_IMPACT, shot.x, shot.y, EffectMovement::NoMove);
                self.player_shots.remove(shot_index);
                continue;
            }

            if let Some(live) = self.player_shots.get_mut(shot_index) {
                live.x = x;
                live.y = y;
                live.frame = live.frame.wrapping_add(1);
            }
        }
    }

    /// The collision and damage phase: player contact with actors, then
    /// player shots against damageable actors, in pool order.
    fn resolve_collisions(&mut self, ctx: &mut TickContext) {
        let player_dying = self.player.state == PlayerState::Dying;

        for index in 0..self.actors.slots().len() {
            let (deleted, id, draw_style) = {
                let actor = self.actors.get(index);
                (actor.deleted, actor.id, actor.draw_style)
            };
            if deleted || draw_style == DrawStyle::Invisible {
                continue;
            }

            let (width, height) = dimensions_for(id);
            let bbox = {
                let actor = self.actors.get(index);
                BoundingBox::from_position(actor.x, actor.y, width, height)
            };

            if !player_dying && bbox.intersects(&self.player.bounding_box()) {
                behaviors::on_player_contact(self, ctx, index);
                if self.actors.get(index).deleted {
                    continue;
                }
            }

            if !self.actors.get(index).is_damageable() {
                continue;
            }

            for shot_index in 0..self.player_shots.capacity() {
                let Some(shot) = self.player_shots.get(shot_index).copied() else {
                    continue;
                };

                // Shots move two tiles per tick; testing the swept box keeps
                // them from tunneling through one-tile-wide actors
                let (step_dx, step_dy) = shot.direction.step();
                let swept = BoundingBox {
                    left: shot.x.min(shot.x - step_dx),
                    right: shot.x.max(shot.x - step_dx),
                    top: shot.y.min(shot.y - step_dy),
                    bottom: shot.y.max(shot.y - step_dy),
                };
                if !swept.intersects(&bbox) {
                    continue;
                }

                if shot.has_area_effect() {
                    self.effects.spawn(
                        projectiles::FX_SPRITE_EXPLOSION,
                        shot.x,
                        shot.y,
                        EffectMovement::NoMove,
                    );
                }

                // Lasers shoot through everything they kill
                if shot.weapon != WeaponType::Laser {
                    self.player_shots.remove(shot_index);
                }

                self.damage_actor(ctx, index, shot.damage());
                if self.actors.get(index).deleted {
                    break;
                }
            }
        }
    }

    fn update_earthquake(&mut self, ctx: &mut TickContext) {
        if !self.earthquake_armed {
            return;
        }

        if self.earthquake_countdown > 0 {
            self.earthquake_countdown -= 1;
            self.set_screen_shift(2);
            if self.earthquake_countdown == 0 {
                self.set_screen_shift(0);
            }
        } else if self.rng.next_number() < 8 {
            self.earthquake_countdown = 30;
            ctx.services.play_sound(SoundId::EarthQuake);
            self.show_tutorial_message(ctx, TutorialMessageId::EarthQuake);
        }
    }

    /// Rewinds the player to the last checkpoint (or the level start) after
    /// death. Map and actor state are deliberately kept.
    pub fn restart_from_checkpoint(&mut self, model: &mut PlayerModel) {
        let (x, y) = match self.checkpoint {
            Some(checkpoint) => {
                model.restore_from_checkpoint(&checkpoint.state);
                (checkpoint.x, checkpoint.y)
            }
            None => {
                model.restore_from_checkpoint(&CheckpointState {
                    weapon: model.weapon(),
                    ammo: model.ammo(),
                    health: dn2_core::constants::PLAYER_MAX_HEALTH,
                });
                self.player_start
            }
        };

        self.player = Player::new(x, y, self.player_start_facing_left);
        self.player_shots.clear();
        self.effects.clear();
        self.particles.clear();
        self.player_died = false;

        self.camera.center_immediately(&self.map, x, y);
    }

    /// The bonuses achieved in this level, evaluated at level end.
    pub fn achieved_bonuses(&self) -> BTreeSet<Bonus> {
        let bk = &self.bookkeeping;
        let mut bonuses = BTreeSet::new();

        let complete = |present: i32, done: i32| present > 0 && done == present;

        if complete(bk.cameras_present, bk.cameras_destroyed) {
            bonuses.insert(Bonus::DestroyedAllCameras);
        }
        if !bk.damage_taken {
            bonuses.insert(Bonus::NoDamageTaken);
        }
        if complete(bk.weapons_present, bk.weapons_collected) {
            bonuses.insert(Bonus::CollectedEveryWeapon);
        }
        if complete(bk.merchandise_present, bk.merchandise_collected) {
            bonuses.insert(Bonus::CollectedAllMerchandise);
        }
        if complete(bk.turrets_present, bk.turrets_destroyed) {
            bonuses.insert(Bonus::DestroyedAllSpinningLaserTurrets);
        }
        if complete(bk.fire_bombs_present, bk.fire_bombs_destroyed) {
            bonuses.insert(Bonus::DestroyedAllFireBombs);
        }
        if complete(bk.bonus_globes_present, bk.bonus_globes_shot) {
            bonuses.insert(Bonus::ShotAllBonusGlobes);
        }

        bonuses
    }

    /// Radar dot positions (one per functioning security camera), scaled
    /// into the HUD radar's 16x8 dot grid.
    pub fn radar_dot_positions(&self) -> Vec<(i32, i32)> {
        self.actors
            .iter_active()
            .filter(|(_, actor)| classify(actor.id) == ActorKind::SecurityCamera)
            .map(|(_, actor)| {
                (
                    (actor.x * 15) / self.map.width().max(1),
                    (actor.y * 7) / self.map.height().max(1),
                )
            })
            .collect()
    }

    pub fn set_screen_shift(&mut self, amount: i32) {
        self.screen_shake = amount;
    }

    /// Queues a one-frame full-screen color flash.
    pub fn flash_screen(&mut self, color_index: u8) {
        self.screen_flash = Some(color_index);
    }

    /// Advances the auto-scrolling backdrop; called per rendered frame, not
    /// per tick, since it is purely visual.
    pub fn update_backdrop_auto_scrolling(&mut self, dt: f64) {
        if self.level_flags.contains(LevelFlags::BACKDROP_AUTO_SCROLL) {
            self.backdrop_scroll_offset =
                (self.backdrop_scroll_offset + dt as f32 * 30.0) % 320.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::NullServiceProvider;
    use dn2_core::constants::TileAttributes;
    use dn2_core::types::Difficulty;

    fn test_level() -> LevelData {
        let width = 64;
        let height = 32;
        let mut tiles = vec![0u16; (width * height) as usize];

        // Solid floor along row 30
        for x in 0..width {
            tiles[(30 * width + x) as usize] = 8;
        }

        LevelData {
            width,
            height,
            tiles,
            tileset_attributes: vec![
                TileAttributes::empty(),
                TileAttributes::SOLID_TOP
                    | TileAttributes::SOLID_BOTTOM
                    | TileAttributes::SOLID_LEFT
                    | TileAttributes::SOLID_RIGHT,
            ],
            actor_descriptions: Vec::new(),
            backdrop_image: "BACKDROP.MNI".to_string(),
            music_file: "MUSIC.IMF".to_string(),
            flags: LevelFlags::empty(),
            player_start: (5, 29),
            player_facing_left: false,
            water_areas: Vec::new(),
        }
    }

    fn session() -> GameSessionId {
        GameSessionId {
            episode: 0,
            level: 0,
            difficulty: Difficulty::Medium,
        }
    }

    fn tick(world: &mut GameWorld, model: &mut PlayerModel, input: PlayerInput) {
        let mut services = NullServiceProvider::default();
        let mut ctx = TickContext {
            input,
            model,
            services: &mut services,
        };
        world.update_game_logic(&mut ctx);
    }

    #[test]
    fn spawning_counts_bonus_relevant_actors() {
        let mut world = GameWorld::new(&test_level(), session(), None, false);

        world.spawn_actor(behaviors::ids::SECURITY_CAMERA, 10, 29);
        world.spawn_actor(behaviors::ids::SECURITY_CAMERA, 12, 29);
        world.spawn_actor(behaviors::ids::RADAR_DISH, 20, 29);
        world.spawn_actor(behaviors::ids::WEAPON_LASER, 22, 29);

        assert_eq!(world.bookkeeping.cameras_present, 2);
        assert_eq!(world.bookkeeping.weapons_present, 1);
        assert_eq!(world.radar_dishes_left, 1);
    }

    #[test]
    fn no_damage_bonus_survives_an_uneventful_level() {
        let world = GameWorld::new(&test_level(), session(), None, false);
        assert!(world.achieved_bonuses().contains(&Bonus::NoDamageTaken));
    }

    #[test]
    fn kill_based_bonuses_require_at_least_one_target() {
        let world = GameWorld::new(&test_level(), session(), None, false);
        let bonuses = world.achieved_bonuses();
        assert!(!bonuses.contains(&Bonus::DestroyedAllCameras));
        assert!(!bonuses.contains(&Bonus::ShotAllBonusGlobes));
    }

    #[test]
    fn tutorial_message_shows_only_once() {
        let mut world = GameWorld::new(&test_level(), session(), None, false);
        let mut model = PlayerModel::new();
        let mut services = NullServiceProvider::default();
        let mut ctx = TickContext {
            input: PlayerInput::default(),
            model: &mut model,
            services: &mut services,
        };

        world.show_tutorial_message(&mut ctx, TutorialMessageId::FoundSoda);
        assert!(!world.message_display.is_idle());

        let mut fresh_world = GameWorld::new(&test_level(), session(), None, false);
        fresh_world.show_tutorial_message(&mut ctx, TutorialMessageId::FoundSoda);
        assert!(
            fresh_world.message_display.is_idle(),
            "second trigger must not re-show the message"
        );
    }

    #[test]
    fn player_position_override_wins_over_level_start() {
        let world = GameWorld::new(&test_level(), session(), Some((40, 29)), false);
        assert_eq!((world.player.x, world.player.y), (40, 29));
    }

    #[test]
    fn restart_without_checkpoint_returns_to_level_start() {
        let mut world = GameWorld::new(&test_level(), session(), None, false);
        let mut model = PlayerModel::new();

        world.player.x = 50;
        model.take_fatal_damage();
        world.signal_player_died();

        world.restart_from_checkpoint(&mut model);

        assert_eq!((world.player.x, world.player.y), (5, 29));
        assert!(!world.player_died());
        assert!(model.health() >= 2);
    }

    #[test]
    fn update_advances_the_tick_counter_and_keeps_pools_bounded() {
        let mut world = GameWorld::new(&test_level(), session(), None, false);
        let mut model = PlayerModel::new();

        for _ in 0..10 {
            tick(&mut world, &mut model, PlayerInput::default());
        }

        assert_eq!(world.tick_count, 10);
        assert!(world.actors.active_count() <= dn2_core::constants::MAX_NUM_ACTORS);
        assert!(world.player_shots.active_count() <= dn2_core::constants::MAX_NUM_PLAYER_SHOTS);
    }
}
