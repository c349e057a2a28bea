//! The top-level mode dispatcher: intro/demo loop, main menu, or a game
//! session. Owns the quit flag and the hand-offs between modes; the script
//! runner lives in the [`Context`] so it outlives any single mode.

use dn2_core::types::{CommandLineOptions, GameSessionId, InputEvent, SavedGame};

use crate::intro::IntroDemoLoopMode;
use crate::menu::MenuMode;
use crate::profile::UserProfile;
use crate::script_runner::ScriptRunner;
use crate::services::{AssetProvider, Renderer, ServiceProvider};
use crate::session::GameSessionMode;
use crate::timing::TimeDelta;

/// Borrowed access to everything outside the mode itself, assembled fresh
/// by the outer frame for every call into the core.
pub struct Context<'a> {
    pub renderer: &'a mut dyn Renderer,
    pub services: &'a mut dyn ServiceProvider,
    pub assets: &'a dyn AssetProvider,
    pub profile: &'a mut UserProfile,
    pub script_runner: &'a mut ScriptRunner,
    pub command_line: &'a CommandLineOptions,
}

/// Hand-off requests returned by the active mode.
pub enum ModeSwitch {
    ToIntro,
    ToMenu,
    ToSession(GameSessionId),
    ToSavedGame(SavedGame),
    Quit,
}

enum Mode {
    Intro(IntroDemoLoopMode),
    Menu(MenuMode),
    Session(GameSessionMode),
}

pub struct Game {
    mode: Mode,
    quit_requested: bool,
}

impl Game {
    pub fn new(ctx: &mut Context) -> Self {
        let position_override = ctx.command_line.player_position_override;
        let mode = if let Some(session_id) = ctx.command_line.level_to_jump_to {
            match GameSessionMode::new(session_id, ctx, position_override) {
                Ok(session) => Mode::Session(session),
                Err(error) => {
                    log::error!("failed to jump into level: {error:#}");
                    Mode::Menu(MenuMode::new(ctx))
                }
            }
        } else if ctx.command_line.skip_intro {
            Mode::Menu(MenuMode::new(ctx))
        } else {
            Mode::Intro(IntroDemoLoopMode::new(ctx))
        };

        Self {
            mode,
            quit_requested: false,
        }
    }

    /// Name of the active top-level mode, mainly for diagnostics.
    pub fn active_mode_name(&self) -> &'static str {
        match self.mode {
            Mode::Intro(_) => "intro",
            Mode::Menu(_) => "menu",
            Mode::Session(_) => "session",
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    /// One frame: pump the OS events into the active mode, advance it by
    /// `dt`, and apply any requested mode switch at the frame boundary.
    pub fn update_and_render(&mut self, dt: TimeDelta, events: &[InputEvent], ctx: &mut Context) {
        for event in events {
            let switch = match &mut self.mode {
                Mode::Intro(intro) => intro.handle_event(event, ctx),
                Mode::Menu(menu) => {
                    menu.handle_event(event, ctx);
                    None
                }
                Mode::Session(session) => {
                    session.handle_event(event, ctx);
                    None
                }
            };

            if let Some(switch) = switch {
                self.apply_mode_switch(switch, ctx);
            }
        }

        if self.quit_requested {
            return;
        }

        let switch = match &mut self.mode {
            Mode::Intro(intro) => intro.update_and_render(dt, ctx),
            Mode::Menu(menu) => menu.update_and_render(dt, ctx),
            Mode::Session(session) => session.update_and_render(dt, ctx),
        };

        if let Some(switch) = switch {
            self.apply_mode_switch(switch, ctx);
        }
    }

    fn apply_mode_switch(&mut self, switch: ModeSwitch, ctx: &mut Context) {
        match switch {
            ModeSwitch::ToIntro => self.mode = Mode::Intro(IntroDemoLoopMode::new(ctx)),

            ModeSwitch::ToMenu => self.mode = Mode::Menu(MenuMode::new(ctx)),

            ModeSwitch::ToSession(session_id) => {
                match GameSessionMode::new(session_id, ctx, None) {
                    Ok(session) => self.mode = Mode::Session(session),
                    Err(error) => {
                        log::error!("failed to start session: {error:#}");
                        self.mode = Mode::Menu(MenuMode::new(ctx));
                    }
                }
            }

            ModeSwitch::ToSavedGame(save) => {
                match GameSessionMode::from_saved_game(&save, ctx) {
                    Ok(session) => self.mode = Mode::Session(session),
                    Err(error) => {
                        log::error!("failed to restore saved game: {error:#}");
                        self.mode = Mode::Menu(MenuMode::new(ctx));
                    }
                }
            }

            ModeSwitch::Quit => {
                ctx.services.fade_out_screen();
                self.quit_requested = true;
            }
        }
    }
}
