pub mod config;
pub mod environment;
pub mod palette;
pub mod physics;
pub mod projection;
pub mod raster;
pub mod render;
pub mod run_state;
pub mod scoring;
pub mod track;
pub mod traffic;
pub mod wrap;

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use nightrun_core::events::RaceEvent;
use nightrun_core::frame_simulation_boilerplate;
use nightrun_core::input::{Command, DriveIntents, FrameInputs};
use nightrun_core::run::{RunState, WeatherFamily};
use nightrun_core::simulation::{FrameSimulation, SimulationMetadata};
use nightrun_core::stats::{FrameStats, cars_remaining, sanitize_ratio};

use config::RaceConfig;
use environment::{ClockTick, DAY_END, DayClock};
use physics::PlayerState;
use render::{DrawList, RenderView, Renderer};
use run_state::{RunMachine, SunriseOutcome};
use track::{Track, TrackError, TrafficCar};

/// The whole simulation state. Serialized as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceState {
    pub track: Track,
    pub traffic: Vec<TrafficCar>,
    pub player: PlayerState,
    pub clock: DayClock,
    pub run: RunMachine,
    /// Net cars passed today. Re-passes decrement it, so it can go negative.
    pub cars_passed: i32,
    /// Collisions since the run started.
    pub collisions: u32,
}

/// The endless night-run race.
pub struct NightRun {
    state: RaceState,
    paused: bool,
    config: RaceConfig,
    rng: StdRng,
}

impl NightRun {
    /// Build an idle simulation sitting in START. The day-1 track is generated
    /// up front so the engine never holds an empty loop.
    pub fn try_new(config: RaceConfig, seed: u64) -> Result<Self, TrackError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let track = Track::generate(1, &config, &mut rng)?;
        let traffic = track.scatter_traffic(&config, &mut rng);
        Ok(Self {
            state: RaceState {
                track,
                traffic,
                player: PlayerState::default(),
                clock: DayClock::default(),
                run: RunMachine::default(),
                cars_passed: 0,
                collisions: 0,
            },
            paused: false,
            config,
            rng,
        })
    }

    /// Like [`NightRun::try_new`] with the config from [`RaceConfig::load`].
    pub fn from_env(seed: u64) -> Result<Self, TrackError> {
        Self::try_new(RaceConfig::load(), seed)
    }

    pub fn state(&self) -> &RaceState {
        &self.state
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// Today's pass target.
    pub fn pass_target(&self) -> u32 {
        scoring::pass_target(
            self.state.run.day(),
            self.config.pass_target_base,
            self.config.pass_target_increment,
        )
    }

    /// A renderer sized for this simulation's config.
    pub fn renderer(&self) -> Renderer {
        Renderer::new(&self.config)
    }

    pub fn render(&self, renderer: &mut Renderer) -> DrawList {
        renderer.render(&RenderView {
            track: &self.state.track,
            traffic: &self.state.traffic,
            player: &self.state.player,
            run_state: self.state.run.state(),
            day: self.state.run.day(),
            time_of_day: self.state.clock.time(),
        })
    }

    /// Regenerate track and traffic for `day`. A failed build keeps the
    /// current loop.
    fn rebuild_track(&mut self, day: u32) {
        match Track::generate(day, &self.config, &mut self.rng) {
            Ok(track) => {
                self.state.traffic = track.scatter_traffic(&self.config, &mut self.rng);
                self.state.track = track;
            },
            Err(e) => tracing::error!(day, error = %e, "Track rebuild failed, keeping previous track"),
        }
        self.state.player.z = wrap::normalize(self.state.player.z, self.state.track.length());
    }

    /// Full reset into a fresh run on day 1. Cancels any pending day transition.
    pub fn reset_run(&mut self) -> Vec<RaceEvent> {
        self.state.run.begin_run();
        self.state.player = PlayerState::default();
        self.state.cars_passed = 0;
        self.state.collisions = 0;
        self.state.clock.reset_to_dawn();
        self.rebuild_track(1);
        tracing::info!(epoch = self.state.run.epoch(), "Run started");
        vec![RaceEvent::RunStarted { day: 1 }]
    }

    fn begin_next_day(&mut self, events: &mut Vec<RaceEvent>) {
        let day = self.state.run.day();
        self.state.cars_passed = 0;
        self.state.clock.reset_to_dawn();
        self.rebuild_track(day);
        let weather = WeatherFamily::for_day(day);
        tracing::info!(day, ?weather, target = self.pass_target(), "Day started");
        events.push(RaceEvent::DayStarted { day, weather });
    }

    fn step_playing(&mut self, dt: f32, drive: &DriveIntents, events: &mut Vec<RaceEvent>) {
        let dt64 = f64::from(dt);
        let state = &mut self.state;
        let z_before = state.player.z;

        physics::integrate_player(
            &mut state.player,
            drive,
            dt64,
            &self.config.driving,
            state.track.length(),
        );
        let outcome = traffic::advance_traffic(
            &mut state.traffic,
            &mut state.player,
            z_before,
            dt64,
            &state.track,
            &self.config.traffic,
        );

        state.cars_passed = state.cars_passed.saturating_add(outcome.net_passes());
        if outcome.passed > 0 {
            events.push(RaceEvent::CarsPassed {
                count: outcome.passed,
                total: state.cars_passed,
            });
        }
        if outcome.repassed > 0 {
            events.push(RaceEvent::CarsRepassed {
                count: outcome.repassed,
                total: state.cars_passed,
            });
        }
        if let Some(speed_after) = outcome.collision {
            state.collisions = state.collisions.saturating_add(1);
            events.push(RaceEvent::Collision { speed_after });
        }

        let target = scoring::pass_target(
            state.run.day(),
            self.config.pass_target_base,
            self.config.pass_target_increment,
        );
        let delay = self.config.level_complete_delay_secs;
        if state.run.try_complete_day(state.cars_passed, target, delay) {
            state.player.speed = 0.0;
            let day = state.run.day();
            tracing::info!(day, cars_passed = state.cars_passed, "Level complete");
            events.push(RaceEvent::LevelComplete {
                day,
                cars_passed: state.cars_passed,
            });
        }

        if state.clock.advance(dt, self.config.day_rate) == ClockTick::Sunrise {
            match state.run.sunrise(state.cars_passed, target) {
                SunriseOutcome::Rollover => state.clock.reset_to_dawn(),
                SunriseOutcome::GameOver => {
                    state.player.speed = 0.0;
                    let day = state.run.day();
                    tracing::info!(day, cars_passed = state.cars_passed, target, "Game over");
                    events.push(RaceEvent::GameOver {
                        day,
                        cars_passed: state.cars_passed,
                    });
                },
            }
        }
    }
}

impl FrameSimulation for NightRun {
    fn metadata(&self) -> SimulationMetadata {
        SimulationMetadata {
            name: "NightRun".to_string(),
            description: "Pass the quota of cars before the sun comes up. Every day, more."
                .to_string(),
            day_length: Duration::from_secs_f32(DAY_END / self.config.day_rate.max(f32::EPSILON)),
        }
    }

    fn tick_rate(&self) -> f32 {
        self.config.tick_rate_hz
    }

    fn update(&mut self, dt: f32, inputs: &FrameInputs) -> Vec<RaceEvent> {
        match inputs.command {
            Some(Command::Pause) => self.pause(),
            Some(Command::Resume) => self.resume(),
            _ => {},
        }
        if self.paused {
            return Vec::new();
        }

        let run_state = self.state.run.state();
        match (inputs.command, run_state) {
            (Some(Command::Start), RunState::Start) | (Some(Command::Restart), RunState::GameOver) => {
                return self.reset_run();
            },
            _ => {},
        }

        let mut events = Vec::new();
        if run_state.is_simulating() {
            self.step_playing(dt, &inputs.drive, &mut events);
        } else if run_state == RunState::LevelComplete {
            self.state.player.speed = 0.0;
        }
        // Stale transitions from an earlier run count down and are dropped here too.
        if self.state.run.tick_deferred(dt) {
            self.begin_next_day(&mut events);
        }
        events
    }

    fn snapshot(&self) -> FrameStats {
        let state = &self.state;
        let day = state.run.day();
        FrameStats {
            speed_display: scoring::speed_display(state.player.speed),
            cars_passed: state.cars_passed,
            distance: state.player.z,
            day,
            cars_remaining: cars_remaining(self.pass_target(), state.cars_passed),
            sun_position: state.clock.time(),
            run_state: state.run.state(),
            weather: WeatherFamily::for_day(day),
            collisions: state.collisions,
            speed_ratio: sanitize_ratio(state.player.speed_ratio(self.config.driving.max_speed)),
        }
    }

    fn run_state(&self) -> RunState {
        self.state.run.state()
    }

    frame_simulation_boilerplate!(state_type: RaceState);
}
