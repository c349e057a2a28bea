//! The player avatar: movement state machine, firing, damage and the death
//! sequence. The persistent part (health, weapon, score, inventory) lives in
//! [`dn2_core::types::PlayerModel`]; this is the in-world state.

use dn2_core::constants::{CLOAK_TIME, INITIAL_MERCY_FRAMES, RAPID_FIRE_TIME, TileAttributes};
use dn2_core::types::{InventoryItemType, WeaponType};

use crate::collision::{
    apply_gravity, apply_horizontal_movement, check_conveyor_belt, check_world_collision,
    BoundingBox, CollisionResult, ConveyorBeltCheckResult, MovementDirection,
};
use crate::hud::MessagePriority;
use crate::services::SoundId;
use crate::world::projectiles::ShotDirection;
use crate::world::{GameWorld, TickContext};

pub const PLAYER_WIDTH: i32 = 3;
pub const PLAYER_HEIGHT: i32 = 5;
pub const PLAYER_HEIGHT_CROUCHED: i32 = 4;
pub const PLAYER_HEIGHT_IN_SHIP: i32 = 3;

/// Vertical offsets of the fixed jump arc, one entry per tick
const JUMP_ARC: [i32; 4] = [-2, -2, -1, 0];

/// Landing with the gravity ramp saturated (a fall well past jump height)
/// stuns the player
const HARD_LANDING_GRAVITY_STATE: u8 = 5;

/// Ticks the hard-landing stun lasts (shooting is blocked meanwhile)
const RECOVERY_TICKS: i32 = 3;

/// Length of the death animation before the session restarts the level
const DEATH_SEQUENCE_TICKS: i32 = 12;

/// Animation frames of the death sequence (then the sprite goes invisible)
const DEATH_FRAMES: [u8; 4] = [29, 30, 31, 32];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Normal,
    Jumping,
    Falling,
    Recovering,
    Hanging,
    Dying,
    ClimbingLadder,
    UsingJetpack,
    GettingEaten,
    UsingShip,
    BlownByFan,
    RidingElevator,
    AirlockDeathLeft,
    AirlockDeathRight,
}

#[derive(Debug, Clone)]
pub struct Player {
    /// Bottom-left tile of the sprite
    pub x: i32,
    pub y: i32,
    pub orientation: Orientation,
    pub state: PlayerState,

    /// Pose flags, only meaningful in `Normal` state
    pub is_crouching: bool,
    pub is_looking_up: bool,

    pub frame: u8,
    pub visible: bool,

    jump_step: usize,
    pub gravity_state: u8,

    pub mercy_frames: i32,
    recovery_ticks: i32,
    death_timer: i32,
    eaten_timer: i32,

    pub cloak_timer: i32,
    pub rapid_fire_timer: i32,
}

impl Player {
    pub fn new(x: i32, y: i32, facing_left: bool) -> Self {
        Self {
            x,
            y,
            orientation: if facing_left {
                Orientation::Left
            } else {
                Orientation::Right
            },
            state: PlayerState::Normal,
            is_crouching: false,
            is_looking_up: false,
            frame: 0,
            visible: true,
            jump_step: 0,
            gravity_state: 0,
            mercy_frames: 0,
            recovery_ticks: 0,
            death_timer: 0,
            eaten_timer: 0,
            cloak_timer: 0,
            rapid_fire_timer: 0,
        }
    }

    pub fn height(&self) -> i32 {
        match self.state {
            PlayerState::UsingShip => PLAYER_HEIGHT_IN_SHIP,
            _ if self.is_crouching => PLAYER_HEIGHT_CROUCHED,
            _ => PLAYER_HEIGHT,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_position(self.x, self.y, PLAYER_WIDTH, self.height())
    }

    pub fn is_in_ship(&self) -> bool {
        self.state == PlayerState::UsingShip
    }

    pub fn has_active_cloak(&self) -> bool {
        self.cloak_timer > 0
    }

    /// During mercy frames the sprite blinks: shown only on even ticks.
    pub fn is_visible_at(&self, tick_count: u32) -> bool {
        self.visible && (self.mercy_frames == 0 || tick_count % 2 == 0)
    }

    pub fn activate_rapid_fire(&mut self) {
        self.rapid_fire_timer = RAPID_FIRE_TIME;
    }

    pub fn activate_cloak(&mut self) {
        self.cloak_timer = CLOAK_TIME;
    }
}

impl GameWorld {
    pub(crate) fn update_player(&mut self, ctx: &mut TickContext) {
        if self.player.state == PlayerState::Dying {
            self.update_death_sequence();
            return;
        }

        self.update_player_timers(ctx);

        let input = ctx.input;

        match self.player.state {
            PlayerState::Recovering => {
                self.player.recovery_ticks -= 1;
                if self.player.recovery_ticks <= 0 {
                    self.player.state = PlayerState::Normal;
                }
            }

            PlayerState::ClimbingLadder => self.update_climbing(ctx),
            PlayerState::Hanging => self.update_hanging(ctx),
            PlayerState::Jumping => self.update_jumping(ctx),
            PlayerState::Falling => self.update_falling(ctx),
            PlayerState::UsingShip | PlayerState::UsingJetpack => self.update_flying(ctx),

            PlayerState::BlownByFan => {
                let bbox = self.player.bounding_box();
                if check_world_collision(&self.map, MovementDirection::Up, &bbox)
                    != CollisionResult::Collision
                {
                    self.player.y -= 1;
                }
            }

            PlayerState::RidingElevator => {
                // Vertical motion is driven by the elevator behavior;
                // stepping sideways leaves the platform
                if input.left || input.right {
                    self.player.state = PlayerState::Falling;
                    self.player.gravity_state = 0;
                }
            }

            PlayerState::GettingEaten => {
                self.player.eaten_timer += 1;
                if self.player.eaten_timer >= 10 {
                    self.kill_player(ctx);
                }
            }

            PlayerState::AirlockDeathLeft | PlayerState::AirlockDeathRight => {
                let dx = if self.player.state == PlayerState::AirlockDeathLeft {
                    -2
                } else {
                    2
                };
                self.player.x += dx;
                if self.player.x < -PLAYER_WIDTH || self.player.x > self.map.width() {
                    self.signal_player_died();
                }
            }

            PlayerState::Normal => self.update_on_ground(ctx),
            PlayerState::Dying => unreachable!("handled above"),
        }

        if matches!(
            self.player.state,
            PlayerState::Normal | PlayerState::Jumping | PlayerState::Falling | PlayerState::UsingShip
        ) {
            self.try_fire_player_shot(ctx);
        }

        // Falling out of the map is always lethal
        if self.player.y > self.map.height() + PLAYER_HEIGHT {
            self.kill_player(ctx);
        }

        self.player.x = self.player.x.clamp(0, self.map.width() - PLAYER_WIDTH);
    }

    fn update_player_timers(&mut self, ctx: &mut TickContext) {
        if self.player.mercy_frames > 0 {
            self.player.mercy_frames -= 1;
        }

        if self.player.rapid_fire_timer > 0 {
            self.player.rapid_fire_timer -= 1;
            if self.player.rapid_fire_timer == 0 {
                ctx.model.remove_item(InventoryItemType::RapidFire);
                self.message_display
                    .set_message("RAPID FIRE IS DISABLING.", MessagePriority::Normal);
            }
        }

        if self.player.cloak_timer > 0 {
            self.player.cloak_timer -= 1;
            if self.player.cloak_timer == 0 {
                ctx.model.remove_item(InventoryItemType::CloakingDevice);
                self.message_display
                    .set_message("CLOAK IS DISABLING.", MessagePriority::Normal);
            }
        }
    }

    fn update_death_sequence(&mut self) {
        self.player.death_timer += 1;

        let frame_index = ((self.player.death_timer / 2) as usize).min(DEATH_FRAMES.len() - 1);
        self.player.frame = DEATH_FRAMES[frame_index];

        if self.player.death_timer == 8 {
            self.player.visible = false;
        }
        if self.player.death_timer >= DEATH_SEQUENCE_TICKS {
            self.signal_player_died();
        }
    }

    fn update_on_ground(&mut self, ctx: &mut TickContext) {
        let input = ctx.input;

        // The floor may have opened up beneath us
        let bbox = self.player.bounding_box();
        let below = check_world_collision(&self.map, MovementDirection::Down, &bbox);
        if below == CollisionResult::None || below == CollisionResult::Climbable {
            self.player.state = PlayerState::Falling;
            self.player.gravity_state = 0;
            return;
        }

        let moving_horizontally = input.left != input.right;

        self.player.is_crouching = input.down && !moving_horizontally;
        self.player.is_looking_up = input.up && !moving_horizontally && !input.down;

        // Grabbing a ladder: the tile at head height must be a ladder
        if input.up {
            let head_y = self.player.y - (self.player.height() - 1);
            let center_x = self.player.x + PLAYER_WIDTH / 2;
            if self.map.has_attribute_at(center_x, head_y, TileAttributes::LADDER)
                || self
                    .map
                    .has_attribute_at(center_x, self.player.y, TileAttributes::LADDER)
            {
                self.player.state = PlayerState::ClimbingLadder;
                self.player.is_crouching = false;
                self.player.is_looking_up = false;
                return;
            }
        }

        if !self.player.is_crouching && moving_horizontally {
            let dx = if input.left { -1 } else { 1 };
            self.player.orientation = if input.left {
                Orientation::Left
            } else {
                Orientation::Right
            };
            self.move_player_horizontal(dx);
        }

        // Conveyor belts drag the player even when standing still
        match check_conveyor_belt(&self.map, &self.player.bounding_box()) {
            ConveyorBeltCheckResult::Left => {
                self.move_player_horizontal(-1);
            }
            ConveyorBeltCheckResult::Right => {
                self.move_player_horizontal(1);
            }
            ConveyorBeltCheckResult::None => {}
        }

        if input.jump.was_triggered {
            let bbox = self.player.bounding_box();
            if check_world_collision(&self.map, MovementDirection::Up, &bbox)
                != CollisionResult::Collision
            {
                self.player.state = PlayerState::Jumping;
                self.player.jump_step = 0;
                self.player.is_crouching = false;
                self.player.is_looking_up = false;
                ctx.services.play_sound(SoundId::DukeJumping);
            }
        }
    }

    fn update_jumping(&mut self, ctx: &mut TickContext) {
        let input = ctx.input;

        let rise = -JUMP_ARC[self.player.jump_step];
        for _ in 0..rise {
            let bbox = self.player.bounding_box();
            match check_world_collision(&self.map, MovementDirection::Up, &bbox) {
                CollisionResult::Collision => {
                    self.player.state = PlayerState::Falling;
                    self.player.gravity_state = 0;
                    return;
                }
                CollisionResult::Climbable => {
                    self.player.state = PlayerState::Hanging;
                    return;
                }
                _ => self.player.y -= 1,
            }
        }

        if input.left != input.right {
            let dx = if input.left { -1 } else { 1 };
            self.player.orientation = if input.left {
                Orientation::Left
            } else {
                Orientation::Right
            };
            self.move_player_horizontal(dx);
        }

        self.player.jump_step += 1;
        if self.player.jump_step >= JUMP_ARC.len() {
            self.player.state = PlayerState::Falling;
            self.player.gravity_state = 0;
        }
    }

    fn update_falling(&mut self, ctx: &mut TickContext) {
        let input = ctx.input;

        if input.left != input.right {
            let dx = if input.left { -1 } else { 1 };
            self.player.orientation = if input.left {
                Orientation::Left
            } else {
                Orientation::Right
            };
            self.move_player_horizontal(dx);
        }

        let state_before = self.player.gravity_state;
        let bbox = self.player.bounding_box();
        let (moved, new_state, landed) = apply_gravity(&self.map, &bbox, self.player.gravity_state);
        self.player.y += moved;
        self.player.gravity_state = new_state;

        // `new_state == 0` covers entering the fall state while already
        // standing on solid ground
        if landed || new_state == 0 {
            ctx.services.play_sound(SoundId::DukeLanding);
            if state_before >= HARD_LANDING_GRAVITY_STATE {
                self.player.state = PlayerState::Recovering;
                self.player.recovery_ticks = RECOVERY_TICKS;
            } else {
                self.player.state = PlayerState::Normal;
            }
        }
    }

    fn update_climbing(&mut self, ctx: &mut TickContext) {
        let input = ctx.input;
        let center_x = self.player.x + PLAYER_WIDTH / 2;

        if input.jump.was_triggered {
            self.player.state = PlayerState::Falling;
            self.player.gravity_state = 0;
            return;
        }

        if input.up {
            let head_y = self.player.y - self.player.height();
            if self.map.has_attribute_at(center_x, head_y, TileAttributes::LADDER) {
                self.player.y -= 1;
            }
        } else if input.down {
            self.player.y += 1;
        }

        // Off the end of the ladder
        let head_y = self.player.y - (self.player.height() - 1);
        let on_ladder = self
            .map
            .has_attribute_at(center_x, head_y, TileAttributes::LADDER)
            || self
                .map
                .has_attribute_at(center_x, self.player.y, TileAttributes::LADDER);
        if !on_ladder {
            let bbox = self.player.bounding_box();
            if check_world_collision(&self.map, MovementDirection::Down, &bbox)
                == CollisionResult::Collision
            {
                self.player.state = PlayerState::Normal;
            } else {
                self.player.state = PlayerState::Falling;
                self.player.gravity_state = 0;
            }
        }
    }

    fn update_hanging(&mut self, ctx: &mut TickContext) {
        let input = ctx.input;

        if input.down || input.jump.was_triggered {
            self.player.state = PlayerState::Falling;
            self.player.gravity_state = 0;
            return;
        }

        if input.left != input.right {
            let dx = if input.left { -1 } else { 1 };
            self.player.orientation = if input.left {
                Orientation::Left
            } else {
                Orientation::Right
            };

            let moved = self.move_player_horizontal(dx);
            if moved {
                // Let go when the grip runs out
                let bbox = self.player.bounding_box();
                if check_world_collision(&self.map, MovementDirection::Up, &bbox)
                    != CollisionResult::Climbable
                {
                    self.player.state = PlayerState::Falling;
                    self.player.gravity_state = 0;
                }
            }
        }
    }

    fn update_flying(&mut self, ctx: &mut TickContext) {
        let input = ctx.input;
        let speed = 2;

        for _ in 0..speed {
            if input.left {
                self.player.orientation = Orientation::Left;
                self.move_player_horizontal(-1);
            } else if input.right {
                self.player.orientation = Orientation::Right;
                self.move_player_horizontal(1);
            }

            let bbox = self.player.bounding_box();
            if input.up
                && check_world_collision(&self.map, MovementDirection::Up, &bbox)
                    != CollisionResult::Collision
            {
                self.player.y -= 1;
            } else if input.down
                && check_world_collision(&self.map, MovementDirection::Down, &bbox)
                    != CollisionResult::Collision
            {
                self.player.y += 1;
            }
        }
    }

    fn move_player_horizontal(&mut self, dx: i32) -> bool {
        let bbox = self.player.bounding_box();
        match apply_horizontal_movement(&self.map, &bbox, dx, false) {
            Some((applied_dx, applied_dy)) => {
                self.player.x += applied_dx;
                self.player.y += applied_dy;
                true
            }
            None => false,
        }
    }

    fn try_fire_player_shot(&mut self, ctx: &mut TickContext) {
        let input = ctx.input;

        let rapid_fire_held = input.fire.is_pressed
            && (self.player.rapid_fire_timer > 0 || self.player.is_in_ship());
        if !input.fire.was_triggered && !rapid_fire_held {
            return;
        }

        if ctx.model.current_weapon_consumes_ammo() && ctx.model.ammo() == 0 {
            return;
        }

        let weapon = ctx.model.weapon();
        let (shot_x, shot_y, direction) = self.shot_spawn_position();

        if self.player_shots.spawn(weapon, shot_x, shot_y, direction) {
            ctx.model.use_ammo();
            ctx.services.play_sound(match weapon {
                WeaponType::Normal => SoundId::NormalShot,
                WeaponType::Laser => SoundId::LaserShot,
                WeaponType::Rocket => SoundId::RocketShot,
                WeaponType::FlameThrower => SoundId::FlameThrowerShot,
            });
        }
    }

    /// Muzzle position and shot direction, derived from pose and
    /// orientation.
    fn shot_spawn_position(&self) -> (i32, i32, ShotDirection) {
        let player = &self.player;

        if player.is_looking_up {
            return (
                player.x + PLAYER_WIDTH / 2,
                player.y - player.height(),
                ShotDirection::Up,
            );
        }

        let gun_height = if player.is_crouching { 1 } else { 2 };
        match player.orientation {
            Orientation::Left => (player.x - 1, player.y - gun_height, ShotDirection::Left),
            Orientation::Right => (
                player.x + PLAYER_WIDTH,
                player.y - gun_height,
                ShotDirection::Right,
            ),
        }
    }

    /// Applies damage to the player, honoring mercy frames and the cloak.
    pub fn damage_player(&mut self, ctx: &mut TickContext, amount: i32) {
        if self.player.state == PlayerState::Dying
            || self.player.mercy_frames > 0
            || self.player.has_active_cloak()
        {
            return;
        }

        self.bookkeeping.damage_taken = true;
        ctx.model.take_damage(amount);

        if ctx.model.is_dead() {
            self.kill_player(ctx);
        } else {
            self.player.mercy_frames = INITIAL_MERCY_FRAMES;
            ctx.services.play_sound(SoundId::DukePain);
        }
    }

    /// Unconditional death: starts the scripted death animation.
    pub fn kill_player(&mut self, ctx: &mut TickContext) {
        if self.player.state == PlayerState::Dying {
            return;
        }

        ctx.model.take_fatal_damage();
        self.player.state = PlayerState::Dying;
        self.player.death_timer = 0;
        ctx.services.play_sound(SoundId::DukeDeath);
    }
}
