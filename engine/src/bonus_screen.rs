//! The post-level bonus screen: a pre-computed timeline of text updates,
//! sound cues and the animated 100,000-point count-up per achieved bonus.

use std::collections::BTreeSet;

use dn2_core::types::Bonus;

use crate::services::{Renderer, ServiceProvider, SoundId};
use crate::timing::{slow_ticks_to_time, TimeDelta};

const INITIAL_DELAY_TICKS: i32 = 60;
const FINAL_DELAY_TICKS: i32 = 425;

const BONUS_SLIDE_IN: [&str; 6] = ["S", "ONUS", " BONUS", "ET BONUS", "CRET BONUS", "SECRET BONUS"];

const NO_BONUS_SLIDE_IN: [&str; 27] = [
    "            ==",
    "          ====",
    "        ======",
    "      ========",
    "    ==========",
    "  ============",
    "==============",
    "  ============",
    "   N==========",
    "   NO ========",
    "   NO BO======",
    "   NO BONU====",
    "   NO BONUS!==",
    "   NO BONUS!  ",
    " NO BONUS!  BE",
    "O BONUS! BETTE",
    "BONUS! BETTER ",
    "NUS! BETTER LU",
    "S! BETTER LUCK",
    " BETTER LUCK! ",
    "ETTER LUCK!  N",
    "TER LUCK!  NEX",
    "R LUCK!  NEXT ",
    "LUCK!  NEXT TI",
    "CK!  NEXT TIME",
    "!  NEXT TIME! ",
    "  NEXT TIME!  ",
];

#[derive(Debug, Clone)]
enum BonusEvent {
    SetText(String),
    AppendBonusNumber(i32),
    CountUpStep(i32),
    Sound(SoundId),
    Finish,
}

pub struct BonusScreen {
    score: i32,
    running_text: String,
    events: Vec<(TimeDelta, BonusEvent)>,
    next_event: usize,
    elapsed_time: TimeDelta,
    done: bool,
}

impl BonusScreen {
    pub fn new(
        achieved_bonuses: &BTreeSet<Bonus>,
        score_before_adding_bonuses: i32,
        services: &mut dyn ServiceProvider,
    ) -> Self {
        services.play_music("OPNGATEA.IMF");

        let mut screen = Self {
            score: score_before_adding_bonuses,
            running_text: String::new(),
            events: Vec::new(),
            next_event: 0,
            elapsed_time: 0.0,
            done: false,
        };

        let end_time = if achieved_bonuses.is_empty() {
            screen.build_no_bonus_sequence()
        } else {
            screen.build_bonus_summation_sequence(achieved_bonuses)
        };

        screen
            .events
            .push((end_time + slow_ticks_to_time(FINAL_DELAY_TICKS), BonusEvent::Finish));

        screen
    }

    fn build_bonus_summation_sequence(&mut self, bonuses: &BTreeSet<Bonus>) -> TimeDelta {
        let mut time = slow_ticks_to_time(INITIAL_DELAY_TICKS);

        for bonus in bonuses {
            time += slow_ticks_to_time(100);

            for text in BONUS_SLIDE_IN {
                self.events.push((time, BonusEvent::SetText(text.to_string())));
                time += slow_ticks_to_time(5);
            }

            self.events
                .push((time, BonusEvent::AppendBonusNumber(bonus.as_number())));
            time += slow_ticks_to_time(190);

            self.events
                .push((time, BonusEvent::SetText("  100000 PTS".to_string())));
            time += slow_ticks_to_time(100);

            for iteration in 0..100 {
                self.events.push((time, BonusEvent::CountUpStep(iteration)));
                time += slow_ticks_to_time(2);
            }

            self.events
                .push((time, BonusEvent::SetText("       0 PTS".to_string())));
            self.events.push((time, BonusEvent::Sound(SoundId::BigExplosion)));
            time += slow_ticks_to_time(50);
        }

        time
    }

    fn build_no_bonus_sequence(&mut self) -> TimeDelta {
        let mut time = slow_ticks_to_time(100 + INITIAL_DELAY_TICKS);

        for text in &NO_BONUS_SLIDE_IN[0..14] {
            self.events.push((time, BonusEvent::SetText(text.to_string())));
            time += slow_ticks_to_time(5);
        }
        self.events.push((time, BonusEvent::Sound(SoundId::BigExplosion)));
        time += slow_ticks_to_time(130);

        for text in &NO_BONUS_SLIDE_IN[14..20] {
            self.events.push((time, BonusEvent::SetText(text.to_string())));
            time += slow_ticks_to_time(10);
        }
        self.events.push((time, BonusEvent::Sound(SoundId::BigExplosion)));
        time += slow_ticks_to_time(130);

        for text in &NO_BONUS_SLIDE_IN[20..27] {
            self.events.push((time, BonusEvent::SetText(text.to_string())));
            time += slow_ticks_to_time(10);
        }

        time += slow_ticks_to_time(15);
        self.events.push((time, BonusEvent::Sound(SoundId::BigExplosion)));

        time
    }

    pub fn finished(&self) -> bool {
        self.done
    }

    pub fn update_and_render(
        &mut self,
        dt: TimeDelta,
        renderer: &mut dyn Renderer,
        services: &mut dyn ServiceProvider,
    ) {
        self.update_sequence(dt, services);

        renderer.draw_full_screen_image("BONUSSCN.MNI");
        renderer.draw_big_text(6, 8, 0, "SCORE");
        renderer.draw_big_text(6, 17, 0, &self.running_text);

        let score_text = self.score.to_string();
        let score_x = 34 - score_text.len() as i32 * 2;
        renderer.draw_big_text(score_x, 8, 0, &score_text);
    }

    fn update_sequence(&mut self, dt: TimeDelta, services: &mut dyn ServiceProvider) {
        if self.done {
            return;
        }

        self.elapsed_time += dt;

        while self.next_event < self.events.len()
            && self.elapsed_time >= self.events[self.next_event].0
        {
            let event = self.events[self.next_event].1.clone();
            self.next_event += 1;

            match event {
                BonusEvent::SetText(text) => self.running_text = text,

                BonusEvent::AppendBonusNumber(number) => {
                    self.running_text = format!("{} {}", self.running_text, number);
                    services.play_sound(SoundId::BigExplosion);
                }

                BonusEvent::CountUpStep(iteration) => {
                    self.score += 1000;
                    services.play_sound(SoundId::DukeJumping);
                    self.running_text = format!("  {:6} PTS", 99_000 - iteration * 1000);
                }

                BonusEvent::Sound(id) => services.play_sound(id),

                BonusEvent::Finish => {
                    self.done = true;
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{NullRenderer, NullServiceProvider};

    fn run_for(screen: &mut BonusScreen, seconds: f64) {
        let mut renderer = NullRenderer;
        let mut services = NullServiceProvider::default();
        screen.update_and_render(seconds, &mut renderer, &mut services);
    }

    #[test]
    fn plays_the_between_levels_music() {
        let mut services = NullServiceProvider::default();
        let _screen = BonusScreen::new(&BTreeSet::new(), 0, &mut services);
        assert_eq!(services.current_music.as_deref(), Some("OPNGATEA.IMF"));
    }

    #[test]
    fn one_bonus_counts_up_one_hundred_thousand_points() {
        let mut services = NullServiceProvider::default();
        let mut screen =
            BonusScreen::new(&BTreeSet::from([Bonus::NoDamageTaken]), 50_000, &mut services);

        // Run far past the whole sequence
        run_for(&mut screen, 3600.0);

        assert!(screen.finished());
        assert_eq!(screen.score, 150_000);
    }

    #[test]
    fn two_bonuses_count_up_twice() {
        let mut services = NullServiceProvider::default();
        let mut screen = BonusScreen::new(
            &BTreeSet::from([Bonus::NoDamageTaken, Bonus::ShotAllBonusGlobes]),
            0,
            &mut services,
        );

        run_for(&mut screen, 3600.0);
        assert_eq!(screen.score, 200_000);
    }

    #[test]
    fn no_bonus_sequence_still_runs_to_completion() {
        let mut services = NullServiceProvider::default();
        let mut screen = BonusScreen::new(&BTreeSet::new(), 1234, &mut services);

        run_for(&mut screen, 0.1);
        assert!(!screen.finished());

        run_for(&mut screen, 3600.0);
        assert!(screen.finished());
        assert_eq!(screen.score, 1234, "no points without a bonus");
    }

    #[test]
    fn is_not_finished_before_the_final_delay() {
        let mut services = NullServiceProvider::default();
        let mut screen =
            BonusScreen::new(&BTreeSet::from([Bonus::NoDamageTaken]), 0, &mut services);

        run_for(&mut screen, slow_ticks_to_time(INITIAL_DELAY_TICKS + 100));
        assert!(!screen.finished());
    }
}
