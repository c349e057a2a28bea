//! The intro/demo attract loop: story (shown once), credits, then demo
//! playback, rotating until the user presses a button.

use dn2_core::types::{Action, InputEvent, Script};

use crate::demo::DemoPlayer;
use crate::game::{Context, ModeSwitch};
use crate::script_runner::ScriptTerminationType;
use crate::timing::TimeDelta;

enum Step {
    Story,
    Credits,
    Demo(DemoPlayer),
}

pub struct IntroDemoLoopMode {
    steps: Vec<Step>,
    current: usize,
}

fn bundle_script(ctx: &Context, name: &str) -> Option<Script> {
    ctx.assets
        .script_bundle("TEXT.MNI")
        .ok()
        .and_then(|bundle| bundle.get(name).cloned())
}

fn fallback_screen(text: &str) -> Script {
    vec![
        Action::DrawBigText {
            x: 4,
            y: 10,
            color_index: 2,
            text: text.to_string(),
        },
        Action::Delay { amount: 700 },
    ]
}

impl IntroDemoLoopMode {
    pub fn new(ctx: &mut Context) -> Self {
        let mut steps = vec![Step::Story, Step::Credits];

        match DemoPlayer::new(ctx.assets) {
            Ok(player) => steps.push(Step::Demo(player)),
            Err(error) => log::warn!("demo playback unavailable: {error:#}"),
        }

        let mut mode = Self { steps, current: 0 };
        mode.start_current_step(ctx);
        mode
    }

    fn start_current_step(&mut self, ctx: &mut Context) {
        match &mut self.steps[self.current] {
            Step::Story => {
                let script =
                    bundle_script(ctx, "&Story").unwrap_or_else(|| fallback_screen("THE STORY"));
                ctx.script_runner.execute_script(&script);
            }

            Step::Credits => {
                let mut script = bundle_script(ctx, "&Credits")
                    .unwrap_or_else(|| fallback_screen("CREDITS"));

                // The credits screen is shown twice as long in the
                // registered version; the shareware version switches to the
                // order info screen after half the time has elapsed.
                if ctx.services.is_shareware_version() {
                    script.push(Action::Delay { amount: 700 });
                    if let Some(order_info) = bundle_script(ctx, "Q_ORDER") {
                        script.extend(order_info);
                    }
                    script.push(Action::Delay { amount: 700 });
                } else {
                    script.push(Action::Delay { amount: 700 * 2 });
                }

                ctx.script_runner.execute_script(&script);
            }

            Step::Demo(player) => {
                // Restart playback from the beginning of the stream
                if let Ok(fresh) = DemoPlayer::new(ctx.assets) {
                    *player = fresh;
                }
                ctx.services.fade_out_screen();
                ctx.services.fade_in_screen();
            }
        }
    }

    pub fn handle_event(&mut self, event: &InputEvent, ctx: &mut Context) -> Option<ModeSwitch> {
        let is_button_press = matches!(
            event,
            InputEvent::KeyDown { is_repeat: false, .. } | InputEvent::ControllerButtonDown { .. }
        );
        if !is_button_press {
            return None;
        }

        match &self.steps[self.current] {
            Step::Demo(_) => {
                ctx.services.stop_all_sounds();
                Some(ModeSwitch::ToMenu)
            }

            Step::Credits => Some(ModeSwitch::ToMenu),

            Step::Story => {
                ctx.script_runner.handle_event(event, ctx.services);
                let aborted = ctx.script_runner.has_finished_execution()
                    && ctx.script_runner.result().map(|result| result.termination_type)
                        == Some(ScriptTerminationType::AbortedByUser);
                aborted.then_some(ModeSwitch::ToMenu)
            }
        }
    }

    pub fn update_and_render(&mut self, dt: TimeDelta, ctx: &mut Context) -> Option<ModeSwitch> {
        let step_finished = match &mut self.steps[self.current] {
            Step::Demo(player) => {
                player.update_and_render(dt, ctx.renderer, ctx.services, ctx.assets);
                player.is_finished()
            }
            Step::Story | Step::Credits => {
                ctx.script_runner
                    .update_and_render(dt, ctx.renderer, ctx.services);
                ctx.script_runner.has_finished_execution()
            }
        };

        if step_finished {
            self.advance_to_next_step(ctx);
        }

        None
    }

    fn advance_to_next_step(&mut self, ctx: &mut Context) {
        // The story only plays on the first time around the loop
        if matches!(self.steps[self.current], Step::Story) {
            self.steps.remove(self.current);
        } else {
            self.current += 1;
        }

        if self.current >= self.steps.len() {
            self.current = 0;
        }

        self.start_current_step(ctx);
    }
}
