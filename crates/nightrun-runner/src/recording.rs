//! Run recordings: a stream of wire messages, each prefixed with its length
//! as a little-endian `u32`. Every frame writes its intents, then its snapshot.

use std::io::{self, Read, Write};

use anyhow::Result;

use nightrun_core::input::FrameInputs;
use nightrun_core::protocol::{
    FrameMessage, MAX_MESSAGE_SIZE, MessageType, ProtocolError, decode_intents,
    decode_message_type, encode_frame, encode_intents,
};

pub struct Recorder<W: Write> {
    out: W,
}

impl<W: Write> Recorder<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn write_message(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(&(bytes.len() as u32).to_le_bytes())?;
        self.out.write_all(bytes)
    }

    /// Record one frame: the intents fed in, then the resulting snapshot.
    pub fn record(&mut self, inputs: &FrameInputs, frame: &FrameMessage) -> Result<()> {
        self.write_message(&encode_intents(inputs)?)?;
        self.write_message(&encode_frame(frame)?)?;
        Ok(())
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// The recorded intents in frame order. Snapshots are skipped.
pub fn read_intents<R: Read>(mut input: R) -> Result<Vec<FrameInputs>> {
    let mut intents = Vec::new();
    let mut len_buf = [0u8; 4];
    loop {
        match input.read_exact(&mut len_buf) {
            Ok(()) => {},
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
        let len = u32::from_le_bytes(len_buf) as usize;
        if len > MAX_MESSAGE_SIZE {
            return Err(ProtocolError::PayloadTooLarge(len).into());
        }
        let mut buf = vec![0; len];
        input.read_exact(&mut buf)?;
        match decode_message_type(&buf)? {
            MessageType::Intents => intents.push(decode_intents(&buf)?),
            MessageType::Frame => {},
        }
    }
    Ok(intents)
}

#[cfg(test)]
mod tests {
    use nightrun_core::input::{Command, DriveIntents};
    use nightrun_core::simulation::FrameSimulation;
    use nightrun_race::NightRun;
    use nightrun_race::config::RaceConfig;

    use super::*;
    use crate::autopilot::Autopilot;

    fn sim() -> NightRun {
        NightRun::try_new(RaceConfig::default(), 7).unwrap()
    }

    #[test]
    fn intents_come_back_in_order() {
        let game = sim();
        let frame = FrameMessage {
            frame: 0,
            stats: game.snapshot(),
            events: Vec::new(),
        };
        let inputs = [
            FrameInputs::command(Command::Start),
            FrameInputs::driving(DriveIntents::throttle()),
        ];
        let mut recorder = Recorder::new(Vec::new());
        for i in &inputs {
            recorder.record(i, &frame).unwrap();
        }
        let bytes = recorder.finish().unwrap();
        assert_eq!(read_intents(bytes.as_slice()).unwrap(), inputs.to_vec());
    }

    #[test]
    fn oversized_length_rejected() {
        let bytes = u32::MAX.to_le_bytes();
        assert!(read_intents(bytes.as_slice()).is_err());
    }

    #[test]
    fn truncated_message_is_an_error() {
        let mut bytes = 10u32.to_le_bytes().to_vec();
        bytes.push(MessageType::Intents as u8);
        assert!(read_intents(bytes.as_slice()).is_err());
    }

    #[test]
    fn replay_reproduces_the_run() {
        let pilot = Autopilot::default();
        let mut live = sim();
        let mut recorder = Recorder::new(Vec::new());
        for frame in 0..300 {
            let inputs = pilot.inputs(live.state());
            let events = live.update(1.0 / 60.0, &inputs);
            let msg = FrameMessage {
                frame,
                stats: live.snapshot(),
                events,
            };
            recorder.record(&inputs, &msg).unwrap();
        }
        let bytes = recorder.finish().unwrap();

        let mut replayed = sim();
        for inputs in read_intents(bytes.as_slice()).unwrap() {
            replayed.update(1.0 / 60.0, &inputs);
        }
        assert_eq!(live.serialize_state(), replayed.serialize_state());
    }
}
