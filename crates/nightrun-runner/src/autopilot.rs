//! A simple driver for headless runs.

use nightrun_core::input::{Command, DriveIntents, FrameInputs};
use nightrun_core::run::RunState;
use nightrun_race::RaceState;
use nightrun_race::wrap::signed_relative;

/// Segments ahead the autopilot watches for slower traffic.
const LOOKAHEAD_SEGMENTS: f64 = 12.0;
/// Lateral gap below which a car ahead counts as blocking.
const BLOCKING_GAP: f64 = 0.45;
/// Offset the autopilot will not steer beyond.
const EDGE: f64 = 0.8;

#[derive(Debug, Clone, Copy, Default)]
pub struct Autopilot {
    /// Restart automatically after GAME_OVER.
    pub restart: bool,
}

impl Autopilot {
    pub fn new(restart: bool) -> Self {
        Self { restart }
    }

    /// Intents for the next frame given the current state.
    pub fn inputs(&self, state: &RaceState) -> FrameInputs {
        match state.run.state() {
            RunState::Start => FrameInputs::command(Command::Start),
            RunState::GameOver if self.restart => FrameInputs::command(Command::Restart),
            RunState::GameOver | RunState::LevelComplete => FrameInputs::default(),
            RunState::Playing => FrameInputs::driving(self.drive(state)),
        }
    }

    fn drive(&self, state: &RaceState) -> DriveIntents {
        let player = &state.player;
        let length = state.track.length();
        let horizon = LOOKAHEAD_SEGMENTS * state.track.segment_length();

        let blocker = state
            .traffic
            .iter()
            .filter(|car| car.speed < player.speed)
            .map(|car| (signed_relative(car.z, player.z, length), car))
            .filter(|(rel, car)| {
                *rel > 0.0 && *rel < horizon && (car.offset - player.offset).abs() < BLOCKING_GAP
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, car)| car);

        let mut drive = DriveIntents::throttle();
        match blocker {
            Some(car) => {
                // Dodge toward the side with more room.
                let go_left = if car.offset > player.offset {
                    player.offset > -EDGE
                } else {
                    player.offset >= EDGE
                };
                drive.steer_left = go_left;
                drive.steer_right = !go_left;
            },
            None if player.offset > 0.1 => drive.steer_left = true,
            None if player.offset < -0.1 => drive.steer_right = true,
            None => {},
        }
        drive
    }
}

#[cfg(test)]
mod tests {
    use nightrun_race::NightRun;
    use nightrun_race::config::RaceConfig;
    use nightrun_race::track::TrafficCar;

    use super::*;

    fn playing() -> NightRun {
        let mut sim = NightRun::try_new(RaceConfig::default(), 11).unwrap();
        sim.reset_run();
        sim
    }

    #[test]
    fn presses_start_then_drives() {
        let sim = NightRun::try_new(RaceConfig::default(), 11).unwrap();
        let pilot = Autopilot::default();
        assert_eq!(pilot.inputs(sim.state()).command, Some(Command::Start));

        let sim = playing();
        let inputs = pilot.inputs(sim.state());
        assert!(inputs.command.is_none());
        assert!(inputs.drive.accelerate);
    }

    #[test]
    fn restarts_only_when_asked() {
        let mut state = playing().state().clone();
        state.run.sunrise(0, 200);
        assert_eq!(state.run.state(), RunState::GameOver);
        assert!(Autopilot::new(false).inputs(&state).command.is_none());
        assert_eq!(
            Autopilot::new(true).inputs(&state).command,
            Some(Command::Restart)
        );
    }

    #[test]
    fn steers_around_slow_car() {
        let mut state = playing().state().clone();
        state.player.offset = 0.0;
        state.player.speed = 10_000.0;
        let ahead = state.player.z + 3.0 * state.track.segment_length();
        state.traffic = vec![TrafficCar {
            offset: 0.2,
            z: ahead,
            sprite: 0,
            speed: 4_000.0,
        }];
        let drive = Autopilot::default().inputs(&state).drive;
        assert!(drive.steer_left && !drive.steer_right);
    }

    #[test]
    fn recentres_on_open_road() {
        let mut state = playing().state().clone();
        state.traffic.clear();
        state.player.offset = 0.5;
        let drive = Autopilot::default().inputs(&state).drive;
        assert!(drive.steer_left);
        state.player.offset = 0.0;
        let drive = Autopilot::default().inputs(&state).drive;
        assert_eq!(drive.steer(), 0);
    }
}
