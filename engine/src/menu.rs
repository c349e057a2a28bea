//! The main menu, driven entirely through the script sequencer. If the game
//! data ships a menu script it is used as-is; otherwise a built-in page
//! definition with the same structure stands in.

use dn2_core::types::{Action, Difficulty, GameSessionId, Script};

use crate::game::{Context, ModeSwitch};
use crate::script_runner::ScriptTerminationType;
use crate::timing::TimeDelta;

// Page order: new game, restore game, high scores, quit
const PAGE_NEW_GAME: i32 = 0;
const PAGE_RESTORE_GAME: i32 = 1;
const PAGE_QUIT: i32 = 3;

fn built_in_menu_script(ctx: &Context) -> Script {
    let page = |label: &str, extra: Vec<Action>| -> Script {
        let mut script = vec![
            Action::DrawBigText {
                x: 10,
                y: 6,
                color_index: 3,
                text: label.to_string(),
            },
            Action::ShowMenuSelectionIndicator { y_pos: 6 },
        ];
        script.extend(extra);
        script.push(Action::WaitForUserInput);
        script
    };

    // The high scores page renders the episode 1 list right on the page
    let high_score_lines: Vec<Action> = ctx.profile.high_score_lists[0]
        .iter()
        .enumerate()
        .map(|(rank, entry)| Action::DrawText {
            x: 8,
            y: 9 + rank as i32,
            text: format!("{:7}  {}", entry.score, entry.name),
        })
        .collect();

    vec![
        Action::EnableTimeOutToDemo,
        Action::ConfigurePersistentMenuSelection { slot: 0 },
        Action::Pages {
            pages: vec![
                page("NEW GAME", Vec::new()),
                page("RESTORE GAME", Vec::new()),
                page("HIGH SCORES", high_score_lines),
                page("QUIT", Vec::new()),
            ],
        },
    ]
}

pub struct MenuMode;

impl MenuMode {
    pub fn new(ctx: &mut Context) -> Self {
        ctx.services.play_music("DUKEIIA.IMF");

        let script = ctx
            .assets
            .script_bundle("TEXT.MNI")
            .ok()
            .and_then(|bundle| bundle.get("Main_Menu").cloned())
            .unwrap_or_else(|| built_in_menu_script(ctx));
        ctx.script_runner.execute_script(&script);

        Self
    }

    pub fn handle_event(&mut self, event: &dn2_core::types::InputEvent, ctx: &mut Context) {
        ctx.script_runner.handle_event(event, ctx.services);
    }

    pub fn update_and_render(&mut self, dt: TimeDelta, ctx: &mut Context) -> Option<ModeSwitch> {
        ctx.script_runner
            .update_and_render(dt, ctx.renderer, ctx.services);

        if !ctx.script_runner.has_finished_execution() {
            return None;
        }

        let result = ctx.script_runner.result()?;
        match result.termination_type {
            ScriptTerminationType::TimedOut => {
                ctx.services.fade_out_screen();
                Some(ModeSwitch::ToIntro)
            }

            ScriptTerminationType::AbortedByUser => Some(ModeSwitch::Quit),

            ScriptTerminationType::MenuItemSelected => match result.selected_page {
                Some(PAGE_NEW_GAME) => {
                    ctx.services.fade_out_screen();
                    Some(ModeSwitch::ToSession(GameSessionId {
                        episode: 0,
                        level: 0,
                        difficulty: Difficulty::Medium,
                    }))
                }

                Some(PAGE_RESTORE_GAME) => {
                    match ctx.profile.saved_games.iter().flatten().next().cloned() {
                        Some(save) => {
                            ctx.services.fade_out_screen();
                            Some(ModeSwitch::ToSavedGame(save))
                        }
                        None => {
                            // Nothing to restore: back into the menu
                            *self = MenuMode::new(ctx);
                            None
                        }
                    }
                }

                Some(PAGE_QUIT) => Some(ModeSwitch::Quit),

                // The high scores page shows its list inline; selecting it
                // (or anything unexpected) re-enters the menu
                _ => {
                    *self = MenuMode::new(ctx);
                    None
                }
            },

            ScriptTerminationType::RanToCompletion => {
                // Menus always wait for input; a completed script means the
                // user dismissed every wait state, so re-enter
                *self = MenuMode::new(ctx);
                None
            }
        }
    }
}
