use serde::{Deserialize, Serialize};

use nightrun_core::run::RunState;

use crate::scoring::target_met;

/// A state change scheduled for later, tagged with the run it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeferredTransition {
    /// Simulated seconds until it fires.
    pub remaining: f32,
    /// Run epoch at scheduling time. A mismatch on firing discards it.
    pub epoch: u64,
}

/// How a sunrise resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SunriseOutcome {
    /// The day was won; wind the clock back to dawn.
    Rollover,
    GameOver,
}

/// START → PLAYING → (LEVEL_COMPLETE → PLAYING)* → GAME_OVER.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMachine {
    state: RunState,
    day: u32,
    /// Bumped by every full reset.
    epoch: u64,
    pending: Option<DeferredTransition>,
    /// Set once the day's target has been reached; guards re-triggering.
    day_goal_reached: bool,
}

impl Default for RunMachine {
    fn default() -> Self {
        Self {
            state: RunState::Start,
            day: 1,
            epoch: 0,
            pending: None,
            day_goal_reached: false,
        }
    }
}

impl RunMachine {
    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn pending(&self) -> Option<DeferredTransition> {
        self.pending
    }

    pub fn day_goal_reached(&self) -> bool {
        self.day_goal_reached
    }

    /// Full reset into a fresh PLAYING run on day 1. Any transition still
    /// pending from the previous run is invalidated by the new epoch.
    pub fn begin_run(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.state = RunState::Playing;
        self.day = 1;
        self.day_goal_reached = false;
    }

    /// Enter LEVEL_COMPLETE if the target is met, at most once per day.
    /// Returns whether the transition happened.
    pub fn try_complete_day(&mut self, cars_passed: i32, target: u32, delay_secs: f32) -> bool {
        if self.state != RunState::Playing || self.day_goal_reached || !target_met(cars_passed, target) {
            return false;
        }
        self.day_goal_reached = true;
        self.state = RunState::LevelComplete;
        self.pending = Some(DeferredTransition {
            remaining: delay_secs,
            epoch: self.epoch,
        });
        true
    }

    /// Resolve the clock reaching sunrise while PLAYING.
    pub fn sunrise(&mut self, cars_passed: i32, target: u32) -> SunriseOutcome {
        if self.day_goal_reached || target_met(cars_passed, target) {
            SunriseOutcome::Rollover
        } else {
            self.state = RunState::GameOver;
            SunriseOutcome::GameOver
        }
    }

    /// Count down the pending transition. Returns `true` when the next day
    /// begins this frame.
    pub fn tick_deferred(&mut self, dt: f32) -> bool {
        let Some(mut pending) = self.pending else {
            return false;
        };
        pending.remaining -= dt;
        if pending.remaining > 0.0 {
            self.pending = Some(pending);
            return false;
        }
        self.pending = None;

        if pending.epoch != self.epoch || self.state != RunState::LevelComplete {
            tracing::debug!(
                scheduled = pending.epoch,
                current = self.epoch,
                "Discarded stale day transition"
            );
            return false;
        }
        self.day = self.day.saturating_add(1);
        self.day_goal_reached = false;
        self.state = RunState::Playing;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn playing() -> RunMachine {
        let mut m = RunMachine::default();
        m.begin_run();
        m
    }

    #[test]
    fn starts_idle_on_day_one() {
        let m = RunMachine::default();
        assert_eq!(m.state(), RunState::Start);
        assert_eq!(m.day(), 1);
    }

    #[test]
    fn completion_fires_once_per_day() {
        let mut m = playing();
        assert!(!m.try_complete_day(199, 200, 4.0));
        assert!(m.try_complete_day(200, 200, 4.0));
        assert!(!m.try_complete_day(201, 200, 4.0));
        assert!(!m.try_complete_day(250, 200, 4.0));
        assert_eq!(m.state(), RunState::LevelComplete);
    }

    #[test]
    fn next_day_after_delay() {
        let mut m = playing();
        m.try_complete_day(200, 200, 4.0);
        let mut frames = 0;
        while !m.tick_deferred(DT) {
            frames += 1;
            assert!(frames < 1000);
        }
        // 4 s at 60 Hz, give or take float rounding
        assert!((238..=241).contains(&frames), "fired after {frames} frames");
        assert_eq!(m.day(), 2);
        assert_eq!(m.state(), RunState::Playing);
        assert!(!m.day_goal_reached());
        assert!(m.try_complete_day(300, 300, 4.0));
    }

    #[test]
    fn reset_discards_stale_transition() {
        let mut m = playing();
        m.try_complete_day(200, 200, 4.0);
        m.tick_deferred(1.0);
        m.begin_run();
        assert!(!m.tick_deferred(10.0), "stale transition must not fire");
        assert_eq!(m.day(), 1);
        assert_eq!(m.state(), RunState::Playing);
        assert!(m.pending().is_none());
    }

    #[test]
    fn sunrise_without_target_is_game_over() {
        let mut m = playing();
        assert_eq!(m.sunrise(150, 200), SunriseOutcome::GameOver);
        assert_eq!(m.state(), RunState::GameOver);
    }

    #[test]
    fn sunrise_with_target_rolls_over() {
        let mut m = playing();
        assert_eq!(m.sunrise(200, 200), SunriseOutcome::Rollover);
        assert_eq!(m.state(), RunState::Playing);
    }

    #[test]
    fn restart_after_game_over() {
        let mut m = playing();
        m.sunrise(0, 200);
        let epoch = m.epoch();
        m.begin_run();
        assert_eq!(m.state(), RunState::Playing);
        assert_eq!(m.epoch(), epoch + 1);
    }
}
