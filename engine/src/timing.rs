//! Tick timing. The original re-programs the PIT to roughly 280 Hz ("fast
//! ticks"); menu and animation timings count in half that rate ("slow
//! ticks"), and the gameplay simulation advances at 15 logic ticks per
//! second.

use dn2_core::constants::{
    FAST_TICKS_PER_SECOND, GAME_FRAMES_PER_SECOND, MAX_CATCH_UP_TICKS, SLOW_TICKS_PER_SECOND,
};

pub type TimeDelta = f64;

/// Duration of one gameplay logic tick, in seconds
pub const GAME_LOGIC_UPDATE_DELAY: TimeDelta = 1.0 / GAME_FRAMES_PER_SECOND as TimeDelta;

pub fn fast_ticks_to_time(ticks: i32) -> TimeDelta {
    ticks as TimeDelta / FAST_TICKS_PER_SECOND as TimeDelta
}

pub fn slow_ticks_to_time(ticks: i32) -> TimeDelta {
    ticks as TimeDelta / SLOW_TICKS_PER_SECOND as TimeDelta
}

pub fn time_to_fast_ticks(time: TimeDelta) -> i32 {
    (time * FAST_TICKS_PER_SECOND as TimeDelta) as i32
}

pub fn time_to_slow_ticks(time: TimeDelta) -> i32 {
    (time * SLOW_TICKS_PER_SECOND as TimeDelta) as i32
}

/// Accumulates wall-clock time and hands it out in whole logic ticks.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeStepper {
    elapsed_time: TimeDelta,
}

impl TimeStepper {
    pub fn update(&mut self, dt: TimeDelta) {
        self.elapsed_time += dt;
    }

    /// Whole logic ticks currently accumulated
    pub fn elapsed_ticks(&self) -> i32 {
        (self.elapsed_time / GAME_LOGIC_UPDATE_DELAY) as i32
    }

    /// Fraction of the next logic tick already elapsed, in `[0, 1)`. This is
    /// the interpolation factor handed to the renderer when motion smoothing
    /// is on.
    pub fn interpolation_factor(&self) -> f32 {
        ((self.elapsed_time / GAME_LOGIC_UPDATE_DELAY) % 1.0) as f32
    }

    /// Consumes accumulated time and reports how many logic ticks to run,
    /// capped to avoid a spiral of death on a stalled host. Time beyond the
    /// cap is discarded, not carried over.
    pub fn take_ticks(&mut self) -> i32 {
        let ticks = self.elapsed_ticks();
        if ticks > MAX_CATCH_UP_TICKS {
            self.elapsed_time = 0.0;
            MAX_CATCH_UP_TICKS
        } else {
            self.elapsed_time -= ticks as TimeDelta * GAME_LOGIC_UPDATE_DELAY;
            ticks
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_elapsed_time_means_no_ticks() {
        let mut stepper = TimeStepper::default();
        assert_eq!(stepper.take_ticks(), 0);
    }

    #[test]
    fn exactly_one_tick_duration_yields_one_tick() {
        let mut stepper = TimeStepper::default();
        stepper.update(GAME_LOGIC_UPDATE_DELAY);
        assert_eq!(stepper.take_ticks(), 1);
        assert_eq!(stepper.take_ticks(), 0, "time must have been consumed");
    }

    #[test]
    fn partial_ticks_accumulate_across_updates() {
        let mut stepper = TimeStepper::default();
        stepper.update(GAME_LOGIC_UPDATE_DELAY * 0.6);
        assert_eq!(stepper.take_ticks(), 0);
        stepper.update(GAME_LOGIC_UPDATE_DELAY * 0.6);
        assert_eq!(stepper.take_ticks(), 1);
    }

    #[test]
    fn remainder_is_kept_after_taking_ticks() {
        let mut stepper = TimeStepper::default();
        stepper.update(GAME_LOGIC_UPDATE_DELAY * 2.5);
        assert_eq!(stepper.take_ticks(), 2);
        stepper.update(GAME_LOGIC_UPDATE_DELAY * 0.5);
        assert_eq!(stepper.take_ticks(), 1);
    }

    #[test]
    fn catch_up_is_bounded_and_excess_time_discarded() {
        let mut stepper = TimeStepper::default();
        stepper.update(GAME_LOGIC_UPDATE_DELAY * 20.0);
        assert_eq!(stepper.take_ticks(), MAX_CATCH_UP_TICKS);
        assert_eq!(stepper.take_ticks(), 0, "excess must not carry over");
    }

    #[test]
    fn interpolation_factor_stays_below_one() {
        let mut stepper = TimeStepper::default();
        stepper.update(GAME_LOGIC_UPDATE_DELAY * 0.25);
        let factor = stepper.interpolation_factor();
        assert!((0.0..1.0).contains(&factor));
        assert!((factor - 0.25).abs() < 1e-6);
    }

    #[test]
    fn slow_ticks_are_half_as_fast_as_fast_ticks() {
        assert!((slow_ticks_to_time(1) - fast_ticks_to_time(2)).abs() < 1e-12);
        assert_eq!(time_to_fast_ticks(1.0), FAST_TICKS_PER_SECOND);
        assert_eq!(time_to_slow_ticks(1.0), SLOW_TICKS_PER_SECOND);
    }
}
