//! The game session: owns the in-game runner and hands off between it, the
//! bonus screen, the episode-end sequence and the high score stages.

use std::collections::BTreeSet;

use dn2_core::constants::HIGH_SCORE_NAME_MAX_LEN;
use dn2_core::types::{
    add_bonus_score, insert_new_score, is_boss_level, score_qualifies, Action, Bonus, Difficulty,
    GameSessionId, InputEvent, KeyCode, PlayerModel, SavedGame,
};

use crate::bonus_screen::BonusScreen;
use crate::game::{Context, ModeSwitch};
use crate::input::{InputHandler, MenuCommand};
use crate::timing::{TimeDelta, TimeStepper};
use crate::world::{GameWorld, TickContext};

/// Runs the world simulation with the fixed-step accumulator and live input.
pub struct GameRunner {
    world: GameWorld,
    input_handler: InputHandler,
    stepper: TimeStepper,
    quit_requested: bool,
    quick_save_requested: bool,
    quick_load_requested: bool,
}

impl GameRunner {
    pub fn new(world: GameWorld) -> Self {
        Self {
            world,
            input_handler: InputHandler::new(),
            stepper: TimeStepper::default(),
            quit_requested: false,
            quick_save_requested: false,
            quick_load_requested: false,
        }
    }

    pub fn world(&self) -> &GameWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut GameWorld {
        &mut self.world
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    fn take_quick_save_request(&mut self) -> bool {
        std::mem::take(&mut self.quick_save_requested)
    }

    fn take_quick_load_request(&mut self) -> bool {
        std::mem::take(&mut self.quick_load_requested)
    }

    pub fn handle_event(&mut self, event: &InputEvent, ctx: &mut Context) {
        if matches!(
            event,
            InputEvent::KeyDown {
                keycode: KeyCode::Escape,
                ..
            }
        ) {
            self.quit_requested = true;
            return;
        }

        let command = self.input_handler.handle_event(
            event,
            &ctx.profile.options,
            self.world.is_player_in_ship(),
        );
        match command {
            MenuCommand::QuickSave => self.quick_save_requested = true,
            MenuCommand::QuickLoad => self.quick_load_requested = true,
            MenuCommand::None => {}
        }
    }

    pub fn update_and_render(
        &mut self,
        dt: TimeDelta,
        model: &mut PlayerModel,
        ctx: &mut Context,
    ) {
        self.stepper.update(dt);
        for _ in 0..self.stepper.take_ticks() {
            let mut tick_ctx = TickContext {
                input: self.input_handler.fetch_input(),
                model: &mut *model,
                services: &mut *ctx.services,
            };
            self.world.update_game_logic(&mut tick_ctx);

            if self.world.level_finished() || self.world.player_died() {
                break;
            }
        }

        self.world.update_backdrop_auto_scrolling(dt);
        self.world.render(
            ctx.renderer,
            model,
            self.stepper.interpolation_factor(),
            ctx.profile.options.motion_smoothing,
        );
    }
}

/// High score name entry, driven by raw key events.
#[derive(Debug, Default)]
struct NameEntryState {
    text: String,
}

enum NameEntryAction {
    None,
    Commit,
    Cancel,
}

fn keycode_to_char(keycode: KeyCode) -> Option<char> {
    use KeyCode::*;

    let letters = [
        (A, 'A'),
        (B, 'B'),
        (C, 'C'),
        (D, 'D'),
        (E, 'E'),
        (F, 'F'),
        (G, 'G'),
        (H, 'H'),
        (I, 'I'),
        (J, 'J'),
        (K, 'K'),
        (L, 'L'),
        (M, 'M'),
        (N, 'N'),
        (O, 'O'),
        (P, 'P'),
        (Q, 'Q'),
        (R, 'R'),
        (S, 'S'),
        (T, 'T'),
        (U, 'U'),
        (V, 'V'),
        (W, 'W'),
        (X, 'X'),
        (Y, 'Y'),
        (Z, 'Z'),
        (Space, ' '),
    ];

    letters
        .iter()
        .find(|(code, _)| *code == keycode)
        .map(|(_, letter)| *letter)
}

impl NameEntryState {
    fn handle_event(&mut self, event: &InputEvent) -> NameEntryAction {
        let InputEvent::KeyDown { keycode, .. } = *event else {
            return NameEntryAction::None;
        };

        match keycode {
            KeyCode::Return => NameEntryAction::Commit,
            KeyCode::Escape => NameEntryAction::Cancel,
            KeyCode::Backspace => {
                self.text.pop();
                NameEntryAction::None
            }
            other => {
                if let Some(letter) = keycode_to_char(other) {
                    if self.text.len() < HIGH_SCORE_NAME_MAX_LEN {
                        self.text.push(letter);
                    }
                }
                NameEntryAction::None
            }
        }
    }
}

/// The episode-end cutscene, driven through the shared script runner.
struct EpisodeEndSequence;

impl EpisodeEndSequence {
    fn new(episode: i32, ctx: &mut Context) -> Self {
        let script = ctx
            .assets
            .script_bundle("TEXT.MNI")
            .ok()
            .and_then(|bundle| bundle.get(&format!("&Episode {} End", episode + 1)).cloned())
            .unwrap_or_else(|| {
                vec![
                    Action::ShowMessageBox {
                        y: 8,
                        width: 30,
                        height: 5,
                        message_lines: vec![
                            "CONGRATULATIONS!".to_string(),
                            "THE EPISODE IS COMPLETE.".to_string(),
                        ],
                    },
                    Action::WaitForUserInput,
                ]
            });

        ctx.script_runner.execute_script(&script);
        Self
    }
}

enum SessionStage {
    InGame(GameRunner),
    Bonus(BonusScreen),
    EpisodeEnd(EpisodeEndSequence),
    HighScoreNameEntry(NameEntryState),
    HighScoreListDisplay { dismissed: bool },
}

enum Transition {
    None,
    LevelDone,
    NextLevel,
    SessionOver,
    ListDone,
}

pub struct GameSessionMode {
    stage: SessionStage,
    player_model: PlayerModel,
    episode: i32,
    current_level: i32,
    difficulty: Difficulty,
}

impl GameSessionMode {
    pub fn new(
        session_id: GameSessionId,
        ctx: &mut Context,
        position_override: Option<(i32, i32)>,
    ) -> anyhow::Result<Self> {
        let runner = make_runner(session_id, ctx, position_override)?;

        let mut session = Self {
            stage: SessionStage::InGame(runner),
            player_model: PlayerModel::new(),
            episode: session_id.episode,
            current_level: session_id.level,
            difficulty: session_id.difficulty,
        };
        session.show_welcome_message();
        Ok(session)
    }

    pub fn from_saved_game(save: &SavedGame, ctx: &mut Context) -> anyhow::Result<Self> {
        let runner = make_runner(save.session_id, ctx, None)?;

        let mut session = Self {
            stage: SessionStage::InGame(runner),
            player_model: PlayerModel::from_saved_game(save),
            episode: save.session_id.episode,
            current_level: save.session_id.level,
            difficulty: save.session_id.difficulty,
        };
        session.show_welcome_message();
        Ok(session)
    }

    fn show_welcome_message(&mut self) {
        if let SessionStage::InGame(runner) = &mut self.stage {
            runner.world_mut().message_display.set_message(
                "LET'S GO!  GOOD LUCK OUT THERE...",
                crate::hud::MessagePriority::Normal,
            );
        }
    }

    pub fn player_model(&self) -> &PlayerModel {
        &self.player_model
    }

    fn current_session_id(&self) -> GameSessionId {
        GameSessionId {
            episode: self.episode,
            level: self.current_level,
            difficulty: self.difficulty,
        }
    }

    pub fn handle_event(&mut self, event: &InputEvent, ctx: &mut Context) {
        let mut name_to_enter: Option<String> = None;

        match &mut self.stage {
            SessionStage::InGame(runner) => runner.handle_event(event, ctx),

            SessionStage::EpisodeEnd(_) => {
                ctx.script_runner.handle_event(event, ctx.services);
            }

            SessionStage::HighScoreNameEntry(state) => match state.handle_event(event) {
                NameEntryAction::Commit => name_to_enter = Some(state.text.clone()),
                NameEntryAction::Cancel => name_to_enter = Some(String::new()),
                NameEntryAction::None => {}
            },

            SessionStage::HighScoreListDisplay { dismissed } => {
                let pressed = matches!(
                    event,
                    InputEvent::KeyDown { .. } | InputEvent::ControllerButtonDown { .. }
                );
                if pressed {
                    *dismissed = true;
                }
            }

            SessionStage::Bonus(_) => {}
        }

        if let Some(name) = name_to_enter {
            self.enter_high_score(name, ctx);
        }
    }

    pub fn update_and_render(&mut self, dt: TimeDelta, ctx: &mut Context) -> Option<ModeSwitch> {
        // Quick save/load are one-shot requests, handled at the frame
        // boundary before the stage update
        let (wants_quick_save, wants_quick_load) = match &mut self.stage {
            SessionStage::InGame(runner) => (
                runner.take_quick_save_request(),
                runner.take_quick_load_request(),
            ),
            _ => (false, false),
        };

        if wants_quick_save {
            ctx.profile.saved_games[0] = Some(SavedGame {
                session_id: self.current_session_id(),
                tutorial_messages_seen: *self.player_model.tutorial_messages(),
                name: "QUICK SAVE".to_string(),
                weapon: self.player_model.weapon(),
                ammo: self.player_model.ammo(),
                score: self.player_model.score(),
            });
        }

        if wants_quick_load {
            if let Some(save) = ctx.profile.saved_games[0].clone() {
                ctx.services.fade_out_screen();
                match Self::from_saved_game(&save, ctx) {
                    Ok(session) => {
                        *self = session;
                        return None;
                    }
                    Err(error) => log::error!("quick load failed: {error:#}"),
                }
            }
        }

        let mut transition = Transition::None;

        match &mut self.stage {
            SessionStage::InGame(runner) => {
                runner.update_and_render(dt, &mut self.player_model, ctx);

                if runner.world().player_died() {
                    // Death rewinds to the checkpoint; the map keeps its state
                    ctx.services.fade_out_screen();
                    runner
                        .world_mut()
                        .restart_from_checkpoint(&mut self.player_model);
                    ctx.services.fade_in_screen();
                }

                if runner.quit_requested() {
                    transition = Transition::SessionOver;
                } else if runner.world().level_finished() {
                    transition = Transition::LevelDone;
                }
            }

            SessionStage::Bonus(screen) => {
                screen.update_and_render(dt, ctx.renderer, ctx.services);
                if screen.finished() {
                    transition = Transition::NextLevel;
                }
            }

            SessionStage::EpisodeEnd(_) => {
                ctx.script_runner
                    .update_and_render(dt, ctx.renderer, ctx.services);
                if ctx.script_runner.has_finished_execution() {
                    transition = Transition::SessionOver;
                }
            }

            SessionStage::HighScoreNameEntry(state) => {
                ctx.renderer.draw_big_text(4, 6, 2, "ENTER YOUR NAME:");
                ctx.renderer.draw_big_text(4, 10, 3, &state.text);
            }

            SessionStage::HighScoreListDisplay { dismissed } => {
                let list = &ctx.profile.high_score_lists[self.episode as usize];
                for (rank, entry) in list.iter().enumerate() {
                    ctx.renderer.draw_big_text(
                        4,
                        4 + rank as i32 * 2,
                        2,
                        &format!("{:7}  {}", entry.score, entry.name),
                    );
                }
                if *dismissed {
                    transition = Transition::ListDone;
                }
            }
        }

        self.apply_transition(transition, ctx)
    }

    fn apply_transition(
        &mut self,
        transition: Transition,
        ctx: &mut Context,
    ) -> Option<ModeSwitch> {
        match transition {
            Transition::None => None,

            Transition::LevelDone => {
                let achieved = match &self.stage {
                    SessionStage::InGame(runner) => runner.world().achieved_bonuses(),
                    _ => BTreeSet::<Bonus>::new(),
                };
                let score_without_bonuses = self.player_model.score();
                add_bonus_score(&mut self.player_model, &achieved);

                if is_boss_level(self.current_level) {
                    ctx.services.play_music("NEVRENDA.IMF");
                    ctx.services.fade_out_screen();
                    self.stage =
                        SessionStage::EpisodeEnd(EpisodeEndSequence::new(self.episode, ctx));
                } else {
                    ctx.services.fade_out_screen();
                    self.stage = SessionStage::Bonus(BonusScreen::new(
                        &achieved,
                        score_without_bonuses,
                        ctx.services,
                    ));
                    ctx.services.fade_in_screen();
                }
                None
            }

            Transition::NextLevel => {
                self.current_level += 1;
                self.player_model.reset_for_new_level();

                ctx.services.fade_out_screen();
                match make_runner(self.current_session_id(), ctx, None) {
                    Ok(runner) => {
                        self.stage = SessionStage::InGame(runner);
                        ctx.services.fade_in_screen();
                        None
                    }
                    Err(error) => {
                        log::error!("failed to load the next level: {error:#}");
                        self.finish_game_session(ctx)
                    }
                }
            }

            Transition::SessionOver => self.finish_game_session(ctx),

            Transition::ListDone => {
                ctx.services.fade_out_screen();
                Some(ModeSwitch::ToMenu)
            }
        }
    }

    /// Ends the in-game part: the score either goes through name entry into
    /// the high score list, or straight to the list display.
    fn finish_game_session(&mut self, ctx: &mut Context) -> Option<ModeSwitch> {
        ctx.services.stop_music();
        ctx.services.fade_out_screen();

        let list = &ctx.profile.high_score_lists[self.episode as usize];
        if score_qualifies(self.player_model.score(), list) {
            self.stage = SessionStage::HighScoreNameEntry(NameEntryState::default());
        } else {
            self.stage = SessionStage::HighScoreListDisplay { dismissed: false };
        }
        None
    }

    fn enter_high_score(&mut self, name: String, ctx: &mut Context) {
        ctx.services.fade_out_screen();
        insert_new_score(
            self.player_model.score(),
            name,
            &mut ctx.profile.high_score_lists[self.episode as usize],
        );
        self.stage = SessionStage::HighScoreListDisplay { dismissed: false };
    }
}

fn make_runner(
    session_id: GameSessionId,
    ctx: &mut Context,
    position_override: Option<(i32, i32)>,
) -> anyhow::Result<GameRunner> {
    let level = ctx.assets.level(session_id.episode, session_id.level)?;
    let world = GameWorld::new(
        &level,
        session_id,
        position_override,
        ctx.profile.options.widescreen_enabled,
    );
    ctx.services.play_music(world.music_file());
    Ok(GameRunner::new(world))
}
