pub mod audio;
pub mod commentary;
pub mod events;
pub mod input;
pub mod protocol;
pub mod run;
pub mod simulation;
pub mod stats;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::events::RaceEvent;
    use crate::input::{Command, DriveIntents, FrameInputs};
    use crate::run::RunState;
    use crate::simulation::FrameSimulation;

    /// Fixed logical timestep used by every simulation test.
    pub const DT: f32 = 1.0 / 60.0;

    /// Run `n` frames with the given drive intents, returning all accumulated events.
    pub fn run_frames(
        sim: &mut dyn FrameSimulation,
        n: usize,
        drive: DriveIntents,
    ) -> Vec<RaceEvent> {
        let inputs = FrameInputs::driving(drive);
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(sim.update(DT, &inputs));
        }
        all_events
    }

    /// Send the start intent and return the events of that frame.
    pub fn start_run(sim: &mut dyn FrameSimulation) -> Vec<RaceEvent> {
        sim.update(DT, &FrameInputs::command(Command::Start))
    }

    // ================================================================
    // Simulation Trait Contract Tests
    // ================================================================
    // Every FrameSimulation implementation must pass these. Engine crates
    // call them from their own #[cfg(test)] modules.

    /// A fresh simulation sits in START and only leaves it on a start intent.
    pub fn contract_waits_for_start(sim: &mut dyn FrameSimulation) {
        assert_eq!(sim.run_state(), RunState::Start);
        run_frames(sim, 30, DriveIntents::throttle());
        assert_eq!(
            sim.run_state(),
            RunState::Start,
            "Driving intents must not leave START"
        );
        let events = start_run(sim);
        assert_eq!(sim.run_state(), RunState::Playing);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, RaceEvent::RunStarted { .. })),
            "Start must announce the new run"
        );
    }

    /// After init, serialize_state() must return non-empty bytes.
    pub fn contract_serializes_state(sim: &dyn FrameSimulation) {
        assert!(
            !sim.serialize_state().is_empty(),
            "serialize_state() must return non-empty bytes"
        );
    }

    /// update() with throttle held while PLAYING must change state.
    pub fn contract_update_advances_state(sim: &mut dyn FrameSimulation) {
        let before = sim.serialize_state();
        run_frames(sim, 10, DriveIntents::throttle());
        let after = sim.serialize_state();
        assert_ne!(before, after, "update() while playing must advance state");
    }

    /// serialize → apply → serialize must be stable.
    pub fn contract_state_roundtrip_preserves(sim: &mut dyn FrameSimulation) {
        let state_a = sim.serialize_state();
        sim.apply_state(&state_a);
        let state_b = sim.serialize_state();
        assert_eq!(
            state_a, state_b,
            "State must be stable after serialize→apply→serialize roundtrip"
        );
    }

    /// pause() must freeze updates, resume() must unfreeze them.
    pub fn contract_pause_stops_updates(sim: &mut dyn FrameSimulation) {
        sim.pause();
        assert!(sim.is_paused());
        let before = sim.serialize_state();
        run_frames(sim, 10, DriveIntents::throttle());
        let during_pause = sim.serialize_state();
        assert_eq!(before, during_pause, "State must not change while paused");

        sim.resume();
        run_frames(sim, 10, DriveIntents::throttle());
        let after_resume = sim.serialize_state();
        assert_ne!(during_pause, after_resume, "State must change after resume");
    }

    /// Garbage state bytes must be ignored.
    pub fn contract_garbage_state_ignored(sim: &mut dyn FrameSimulation) {
        let before = sim.serialize_state();
        sim.apply_state(&[0xFF, 0xFE, 0x00, 0x01, 0xAB, 0xCD]);
        assert_eq!(before, sim.serialize_state());
    }
}
