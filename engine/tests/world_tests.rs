//! End-to-end scenarios: whole-world simulation driven through in-memory
//! levels and the null renderer/audio services.

use std::collections::HashMap;

use anyhow::Result;

use dn2_core::constants::{
    TileAttributes, DEMO_LEVELS, MAX_AMMO, MAX_NUM_ACTORS, MAX_NUM_EFFECTS, MAX_NUM_PLAYER_SHOTS,
    PLAYER_MAX_HEALTH,
};
use dn2_core::types::{
    CommandLineOptions, Difficulty, GameSessionId, PlayerInput, PlayerModel, ScriptBundle,
    TutorialMessageId, WeaponType,
};

use engine::demo::DemoPlayer;
use engine::game::{Context, Game};
use engine::map::LevelFlags;
use engine::profile::UserProfile;
use engine::script_runner::ScriptRunner;
use engine::services::{AssetProvider, LevelData, NullRenderer, NullServiceProvider};
use engine::world::behaviors::ids;
use engine::world::player::PlayerState;
use engine::world::{GameWorld, TickContext};

const SOLID_TILE: u16 = 8;

/// A flat test level: 64x32 tiles with a solid floor along row 30, so a
/// player spawned at y=29 stands on the ground.
fn make_level() -> LevelData {
    let width = 64;
    let height = 32;
    let mut tiles = vec![0u16; (width * height) as usize];
    for x in 0..width {
        tiles[(30 * width + x) as usize] = SOLID_TILE;
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
        music_file: "LEVEL.IMF".to_string(),
        flags: LevelFlags::empty(),
        player_start: (5, 29),
        player_facing_left: false,
        water_areas: Vec::new(),
    }
}

fn session_id(level: i32) -> GameSessionId {
    GameSessionId {
        episode: 0,
        level,
        difficulty: Difficulty::Medium,
    }
}

struct TestAssets {
    demo: Vec<u8>,
}

impl Default for TestAssets {
    fn default() -> Self {
        Self { demo: vec![0xFF] }
    }
}

impl AssetProvider for TestAssets {
    fn level(&self, _episode: i32, _level: i32) -> Result<LevelData> {
        Ok(make_level())
    }

    fn script_bundle(&self, _name: &str) -> Result<ScriptBundle> {
        Ok(HashMap::new())
    }

    fn demo_stream(&self) -> Result<Vec<u8>> {
        Ok(self.demo.clone())
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

fn jump_input() -> PlayerInput {
    let mut input = PlayerInput::default();
    input.jump.is_pressed = true;
    input.jump.was_triggered = true;
    input
}

fn fire_input() -> PlayerInput {
    let mut input = PlayerInput::default();
    input.fire.is_pressed = true;
    input.fire.was_triggered = true;
    input
}

fn walk_right_input() -> PlayerInput {
    PlayerInput {
        right: true,
        ..PlayerInput::default()
    }
}

// ============================================================================
// Boot
// ============================================================================

#[test]
fn boot_with_skip_intro_lands_in_the_menu_with_menu_music() {
    let mut renderer = NullRenderer;
    let mut services = NullServiceProvider::default();
    let assets = TestAssets::default();
    let mut profile = UserProfile::new();
    let mut script_runner = ScriptRunner::new();
    let command_line = CommandLineOptions {
        skip_intro: true,
        ..CommandLineOptions::default()
    };

    let mut ctx = Context {
        renderer: &mut renderer,
        services: &mut services,
        assets: &assets,
        profile: &mut profile,
        script_runner: &mut script_runner,
        command_line: &command_line,
    };

    let mut game = Game::new(&mut ctx);
    game.update_and_render(1.0 / 60.0, &[], &mut ctx);

    assert_eq!(game.active_mode_name(), "menu");
    assert_eq!(services.current_music.as_deref(), Some("DUKEIIA.IMF"));
}

// ============================================================================
// Movement
// ============================================================================

#[test]
fn jumping_off_the_ground_arcs_up_and_lands_in_the_same_column() {
    let mut world = GameWorld::new(&make_level(), session_id(0), None, false);
    let mut model = PlayerModel::new();

    let start_x = world.player.x;
    let start_y = world.player.y;
    assert_eq!(world.player.state, PlayerState::Normal);

    tick(&mut world, &mut model, jump_input());
    assert_eq!(world.player.state, PlayerState::Jumping);

    let mut seen_states = vec![world.player.state];
    let mut highest_y = start_y;
    for _ in 0..20 {
        tick(&mut world, &mut model, PlayerInput::default());
        seen_states.push(world.player.state);
        highest_y = highest_y.min(world.player.y);
        if world.player.state == PlayerState::Normal {
            break;
        }
    }

    assert!(seen_states.contains(&PlayerState::Jumping));
    assert!(seen_states.contains(&PlayerState::Falling));
    assert_eq!(
        world.player.state,
        PlayerState::Normal,
        "must land again within twenty ticks"
    );
    assert_eq!(world.player.x, start_x, "no drift without horizontal input");
    assert_eq!(world.player.y, start_y);
    assert!(highest_y <= start_y - 4, "jump must gain several tiles");
}

#[test]
fn walking_into_a_wall_stops_the_player() {
    let mut level = make_level();
    // A wall two tiles to the right of the spawn point
    for y in 25..30 {
        level.tiles[(y * level.width + 10) as usize] = SOLID_TILE;
    }

    let mut world = GameWorld::new(&level, session_id(0), None, false);
    let mut model = PlayerModel::new();

    for _ in 0..10 {
        tick(&mut world, &mut model, walk_right_input());
    }

    assert_eq!(world.player.x, 7, "player is three tiles wide");
}

// ============================================================================
// Combat
// ============================================================================

#[test]
fn shooting_a_lethal_enemy_kills_it_and_awards_its_score() {
    let mut world = GameWorld::new(&make_level(), session_id(0), None, false);
    let mut model = PlayerModel::new();

    // A guard two tiles to the right of the muzzle, on the floor
    let guard = world
        .spawn_actor(ids::PATROLLING_GUARD, 12, 29)
        .expect("pool has room");
    world.actors.get_mut(guard).health = 1;
    let score_given = world.actors.get(guard).score_given;
    assert!(score_given > 0);

    tick(&mut world, &mut model, fire_input());
    let mut ticks_needed = 1;
    while !world.actors.get(guard).deleted && ticks_needed < 10 {
        tick(&mut world, &mut model, PlayerInput::default());
        ticks_needed += 1;
    }

    assert!(world.actors.get(guard).deleted, "guard must die");
    assert!(world.effects.active_count() > 0, "death spawns effects");
    assert_eq!(model.score(), score_given);
}

#[test]
fn one_shot_is_spawned_per_trigger_pull() {
    let mut world = GameWorld::new(&make_level(), session_id(0), None, false);
    let mut model = PlayerModel::new();

    tick(&mut world, &mut model, fire_input());
    assert!(world.player_shots.active_count() <= 1);

    // Holding fire without rapid fire must not spawn more shots
    let mut held = PlayerInput::default();
    held.fire.is_pressed = true;
    tick(&mut world, &mut model, held);
    assert!(world.player_shots.active_count() <= 1);
}

#[test]
fn mercy_frames_absorb_repeat_contact_damage() {
    let mut world = GameWorld::new(&make_level(), session_id(0), None, false);
    let mut model = PlayerModel::new();

    // A guard spawned on the player walks away to the right, overlapping
    // for the first couple of ticks
    let guard = world.spawn_actor(ids::PATROLLING_GUARD, 5, 29).unwrap();
    world.actors.get_mut(guard).var1 = 1;

    tick(&mut world, &mut model, PlayerInput::default());
    let health_after_first_hit = model.health();
    assert_eq!(health_after_first_hit, PLAYER_MAX_HEALTH - 1);
    assert!(world.player.mercy_frames > 0);

    for _ in 0..5 {
        tick(&mut world, &mut model, PlayerInput::default());
    }
    assert_eq!(
        model.health(),
        health_after_first_hit,
        "mercy frames must absorb further hits"
    );
}

// ============================================================================
// Collecting
// ============================================================================

#[test]
fn collecting_a_laser_switches_weapon_and_shows_the_hint_once() {
    let mut world = GameWorld::new(&make_level(), session_id(0), None, false);
    let mut model = PlayerModel::new();

    world.spawn_actor(ids::WEAPON_LASER, 9, 29).unwrap();

    for _ in 0..6 {
        tick(&mut world, &mut model, walk_right_input());
    }

    assert_eq!(model.weapon(), WeaponType::Laser);
    assert_eq!(model.ammo(), MAX_AMMO);
    assert!(model
        .tutorial_messages()
        .has_been_shown(TutorialMessageId::FoundLaser));
    assert!(
        !world.message_display.is_idle(),
        "the found-laser message must be printing"
    );

    // A second pickup in a fresh level must not re-show the message
    let mut second_world = GameWorld::new(&make_level(), session_id(1), None, false);
    second_world.spawn_actor(ids::WEAPON_LASER, 9, 29).unwrap();
    for _ in 0..6 {
        tick(&mut second_world, &mut model, walk_right_input());
    }
    assert!(second_world.message_display.is_idle());
}

#[test]
fn collecting_health_at_full_health_pays_out_points_instead() {
    let mut world = GameWorld::new(&make_level(), session_id(0), None, false);
    let mut model = PlayerModel::new();

    world.spawn_actor(ids::HEALTH_MOLECULE, 9, 29).unwrap();
    for _ in 0..6 {
        tick(&mut world, &mut model, walk_right_input());
    }

    assert_eq!(model.health(), PLAYER_MAX_HEALTH);
    assert_eq!(model.score(), 10_000);
}

#[test]
fn interacting_with_the_ship_boards_it() {
    let mut world = GameWorld::new(&make_level(), session_id(0), None, false);
    let mut model = PlayerModel::new();

    let ship = world.spawn_actor(ids::SPACE_SHIP, 7, 29).unwrap();

    tick(&mut world, &mut model, PlayerInput::default());
    assert_eq!(world.player.state, PlayerState::Normal);
    assert!(model
        .tutorial_messages()
        .has_been_shown(TutorialMessageId::FoundSpaceShip));

    let mut interact = PlayerInput::default();
    interact.interact.is_pressed = true;
    interact.interact.was_triggered = true;
    tick(&mut world, &mut model, interact);

    assert_eq!(world.player.state, PlayerState::UsingShip);
    assert!(world.actors.get(ship).deleted);
}

#[test]
fn the_hint_machine_trades_the_globe_for_a_hint_and_points() {
    let mut world = GameWorld::new(&make_level(), session_id(0), None, false);
    let mut model = PlayerModel::new();

    world.spawn_actor(ids::HINT_MACHINE, 6, 29).unwrap();

    tick(&mut world, &mut model, PlayerInput::default());
    assert_eq!(model.score(), 0, "no globe, no payout");

    model.give_item(dn2_core::types::InventoryItemType::SpecialHintGlobe);
    tick(&mut world, &mut model, PlayerInput::default());

    assert!(!model.has_item(dn2_core::types::InventoryItemType::SpecialHintGlobe));
    assert_eq!(model.score(), 50_000);
    assert!(!world.message_display.is_idle());
}

// ============================================================================
// Demo playback
// ============================================================================

fn world_signature(world: &GameWorld) -> Vec<(usize, u16, i32, i32, bool)> {
    world
        .actors
        .slots()
        .iter()
        .enumerate()
        .map(|(index, actor)| (index, actor.id, actor.x, actor.y, actor.deleted))
        .collect()
}

#[test]
fn demo_playback_advances_levels_on_the_marker_bit() {
    // 20 ticks walking right, then the next-level marker, then more input
    let mut stream = vec![0b1000u8; 20];
    stream.push(0b1000_1000);
    stream.extend([0b1000u8; 10]);
    stream.push(0xFF);

    let assets = TestAssets { demo: stream };
    let mut services = NullServiceProvider::default();
    let mut player = DemoPlayer::new(&assets).expect("demo stream loads");

    assert_eq!(player.current_level(), DEMO_LEVELS[0]);

    for _ in 0..25 {
        player.advance_one_tick(&mut services, &assets);
    }

    assert_eq!(player.current_level(), DEMO_LEVELS[1]);
    assert_eq!(
        player.player_model().health(),
        PLAYER_MAX_HEALTH,
        "per-level reset restores health"
    );
    assert!(player.player_model().inventory().is_empty());
    assert!(player.player_model().collected_letters().is_empty());
}

#[test]
fn demo_playback_finishes_at_the_end_of_the_stream() {
    let assets = TestAssets {
        demo: vec![0, 0, 0, 0xFF],
    };
    let mut services = NullServiceProvider::default();
    let mut player = DemoPlayer::new(&assets).unwrap();

    for _ in 0..10 {
        player.advance_one_tick(&mut services, &assets);
    }

    assert!(player.is_finished());
}

#[test]
fn demo_playback_is_deterministic() {
    let mut stream = Vec::new();
    // A busy input pattern: walking, jumping and firing
    for index in 0..120u8 {
        let mut byte = 0b1000; // right
        if index % 7 == 0 {
            byte |= 0b1_0000; // jump
        }
        if index % 3 == 0 {
            byte |= 0b10_0000; // fire
        }
        if index % 11 == 0 {
            byte |= 0b10; // down
        }
        stream.push(byte);
    }
    stream.push(0xFF);

    let assets = TestAssets { demo: stream };

    let run = || {
        let mut services = NullServiceProvider::default();
        let mut player = DemoPlayer::new(&assets).unwrap();
        let mut positions = Vec::new();
        let mut signatures = Vec::new();

        while !player.is_finished() {
            player.advance_one_tick(&mut services, &assets);
            if let Some(world) = player.world() {
                positions.push((world.player.x, world.player.y, world.tick_count));
                signatures.push(world_signature(world));

                assert!(world.actors.active_count() <= MAX_NUM_ACTORS);
                assert!(world.player_shots.active_count() <= MAX_NUM_PLAYER_SHOTS);
                assert!(world.effects.active_count() <= MAX_NUM_EFFECTS);
            }
        }

        (positions, signatures)
    };

    let first = run();
    let second = run();
    assert_eq!(
        first.0, second.0,
        "player trajectory must be byte-identical"
    );
    assert_eq!(first.1, second.1, "actor state must be byte-identical");
}

// ============================================================================
// Level completion plumbing
// ============================================================================

#[test]
fn reaching_the_exit_finishes_the_level_only_without_radar_dishes() {
    let mut world = GameWorld::new(&make_level(), session_id(0), None, false);
    let mut model = PlayerModel::new();

    world.spawn_actor(ids::RADAR_DISH, 40, 29).unwrap();
    let exit = world.spawn_actor(ids::LEVEL_EXIT, 6, 29).unwrap();

    tick(&mut world, &mut model, PlayerInput::default());
    assert!(
        !world.level_finished(),
        "a functioning radar dish must block the exit"
    );

    // Destroy the dish directly, then touch the exit again
    let mut services = NullServiceProvider::default();
    let dish = world
        .actors
        .slots()
        .iter()
        .position(|actor| !actor.deleted && actor.id == ids::RADAR_DISH)
        .unwrap();
    {
        let mut ctx = TickContext {
            input: PlayerInput::default(),
            model: &mut model,
            services: &mut services,
        };
        world.damage_actor(&mut ctx, dish, 100);
    }
    assert_eq!(world.radar_dishes_left, 0);

    tick(&mut world, &mut model, PlayerInput::default());
    assert!(world.level_finished());
    let _ = exit;
}

#[test]
fn checkpoint_rewinds_player_state_but_keeps_the_map() {
    let mut world = GameWorld::new(&make_level(), session_id(0), None, false);
    let mut model = PlayerModel::new();

    world.spawn_actor(ids::RESPAWN_BEACON, 5, 29).unwrap();
    tick(&mut world, &mut model, PlayerInput::default());
    assert!(world.checkpoint.is_some());

    // Mutate the map, then die
    world.map.set_tile(SOLID_TILE, 0, 0);
    model.take_fatal_damage();
    world.restart_from_checkpoint(&mut model);

    assert_eq!(world.player.x, 5);
    assert!(model.health() >= 2);
    assert_eq!(
        world.map.tile_at(0, 0),
        SOLID_TILE,
        "map mutations survive a respawn"
    );
}
