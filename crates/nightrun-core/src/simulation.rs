use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::events::RaceEvent;
use crate::input::FrameInputs;
use crate::run::RunState;
use crate::stats::FrameStats;

/// Core trait for a frame-stepped race simulation.
///
/// The host owns the frame loop, audio and presentation; the simulation only
/// advances its own state and reports what happened.
pub trait FrameSimulation {
    /// Metadata for the title screen.
    fn metadata(&self) -> SimulationMetadata;

    /// Advance one frame. Returns the events raised during the frame.
    fn update(&mut self, dt: f32, inputs: &FrameInputs) -> Vec<RaceEvent>;

    /// End-of-frame snapshot for collaborators.
    fn snapshot(&self) -> FrameStats;

    /// Current run state.
    fn run_state(&self) -> RunState;

    /// Serialize the full simulation state.
    fn serialize_state(&self) -> Vec<u8>;

    /// Replace the simulation state with a previously serialized one.
    /// Malformed input leaves the current state untouched.
    fn apply_state(&mut self, state: &[u8]);

    /// Logical tick rate in Hz; `dt` is always `1 / tick_rate`.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    /// Freeze all updates until `resume`.
    fn pause(&mut self);

    fn resume(&mut self);

    fn is_paused(&self) -> bool;
}

/// Metadata for the title screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationMetadata {
    pub name: String,
    pub description: String,
    /// Nominal length of one in-game day.
    pub day_length: Duration,
}

/// Generates the `FrameSimulation` methods that only touch serialization and
/// the pause flag: `serialize_state`, `apply_state`, `pause`, `resume`, `is_paused`.
///
/// Requires the implementing struct to have `state: $StateType` and
/// `paused: bool` fields.
#[macro_export]
macro_rules! frame_simulation_boilerplate {
    (state_type: $StateType:ty) => {
        fn serialize_state(&self) -> Vec<u8> {
            match rmp_serde::to_vec(&self.state) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize simulation state");
                    Vec::new()
                },
            }
        }

        fn apply_state(&mut self, state: &[u8]) {
            match rmp_serde::from_slice::<$StateType>(state) {
                Ok(s) => self.state = s,
                Err(e) => tracing::debug!(error = %e, "Dropped malformed simulation state"),
            }
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }

        fn is_paused(&self) -> bool {
            self.paused
        }
    };
}
