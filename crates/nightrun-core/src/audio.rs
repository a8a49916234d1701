use crate::events::RaceEvent;
use crate::stats::sanitize_ratio;

/// Audio collaborator. Every call is fire-and-forget from the engine's view;
/// implementations swallow their own failures.
pub trait AudioSink {
    /// Called once per simulated frame with speed / max speed.
    fn update_engine_tone(&mut self, speed_ratio: f32);
    fn play_crash(&mut self);
    fn play_pass_chime(&mut self);
    fn play_victory_fanfare(&mut self);
    fn stop(&mut self);
}

/// One-shot cues derived from race events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    Crash,
    PassChime,
    VictoryFanfare,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveType {
    Sine,
    Square,
    Triangle,
    Sawtooth,
    Noise,
}

/// A synthesizer-agnostic description of a short tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub start_hz: f32,
    pub end_hz: f32,
    pub duration: f32,
    pub volume: f32,
    pub wave: WaveType,
}

/// C major arpeggio played on level completion, 150 ms apart.
pub const VICTORY_NOTES: [f32; 4] = [523.25, 659.25, 783.99, 1046.50];

impl AudioCue {
    /// Tones making up this cue, in playback order.
    pub fn tones(self) -> Vec<ToneSpec> {
        match self {
            AudioCue::Crash => vec![ToneSpec {
                start_hz: 1000.0,
                end_hz: 1000.0,
                duration: 0.5,
                volume: 0.5,
                wave: WaveType::Noise,
            }],
            AudioCue::PassChime => vec![ToneSpec {
                start_hz: 400.0,
                end_hz: 600.0,
                duration: 0.1,
                volume: 0.05,
                wave: WaveType::Square,
            }],
            AudioCue::VictoryFanfare => VICTORY_NOTES
                .iter()
                .map(|&hz| ToneSpec {
                    start_hz: hz,
                    end_hz: hz,
                    duration: 0.4,
                    volume: 0.1,
                    wave: WaveType::Square,
                })
                .collect(),
            AudioCue::Stop => Vec::new(),
        }
    }
}

/// Engine drone parameters for a speed ratio: (frequency Hz, volume).
pub fn engine_tone(speed_ratio: f32) -> (f32, f32) {
    let ratio = sanitize_ratio(speed_ratio);
    let freq = 60.0 + (220.0 - 60.0) * ratio;
    let volume = (ratio * 0.2).clamp(0.05, 0.2);
    (freq, volume)
}

/// Queue of cues collected during a frame, flushed into a sink afterwards.
#[derive(Debug, Default)]
pub struct AudioCueQueue {
    cues: Vec<AudioCue>,
}

impl AudioCueQueue {
    pub fn push(&mut self, cue: AudioCue) {
        self.cues.push(cue);
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Translate a frame's events into cues.
    pub fn extend_from_events(&mut self, events: &[RaceEvent]) {
        for event in events {
            let cue = match event {
                RaceEvent::Collision { .. } => AudioCue::Crash,
                RaceEvent::CarsPassed { .. } => AudioCue::PassChime,
                RaceEvent::LevelComplete { .. } => AudioCue::VictoryFanfare,
                RaceEvent::GameOver { .. } => AudioCue::Stop,
                RaceEvent::RunStarted { .. }
                | RaceEvent::CarsRepassed { .. }
                | RaceEvent::DayStarted { .. } => continue,
            };
            self.push(cue);
        }
    }

    pub fn process(&mut self, sink: &mut dyn AudioSink) {
        for cue in self.cues.drain(..) {
            match cue {
                AudioCue::Crash => sink.play_crash(),
                AudioCue::PassChime => sink.play_pass_chime(),
                AudioCue::VictoryFanfare => sink.play_victory_fanfare(),
                AudioCue::Stop => sink.stop(),
            }
        }
    }
}

/// Per-frame audio hand-off: engine tone first, then any event cues.
pub fn dispatch_frame(sink: &mut dyn AudioSink, speed_ratio: f32, events: &[RaceEvent]) {
    sink.update_engine_tone(sanitize_ratio(speed_ratio));
    let mut queue = AudioCueQueue::default();
    queue.extend_from_events(events);
    queue.process(sink);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        ratios: Vec<f32>,
        calls: Vec<&'static str>,
    }

    impl AudioSink for RecordingSink {
        fn update_engine_tone(&mut self, speed_ratio: f32) {
            self.ratios.push(speed_ratio);
        }
        fn play_crash(&mut self) {
            self.calls.push("crash");
        }
        fn play_pass_chime(&mut self) {
            self.calls.push("pass");
        }
        fn play_victory_fanfare(&mut self) {
            self.calls.push("victory");
        }
        fn stop(&mut self) {
            self.calls.push("stop");
        }
    }

    #[test]
    fn events_map_to_cues() {
        let mut sink = RecordingSink::default();
        let events = vec![
            RaceEvent::CarsPassed { count: 2, total: 5 },
            RaceEvent::Collision { speed_after: 100.0 },
            RaceEvent::LevelComplete {
                day: 1,
                cars_passed: 200,
            },
        ];
        dispatch_frame(&mut sink, 0.5, &events);
        assert_eq!(sink.calls, vec!["pass", "crash", "victory"]);
        assert_eq!(sink.ratios, vec![0.5]);
    }

    #[test]
    fn game_over_stops_audio() {
        let mut sink = RecordingSink::default();
        dispatch_frame(
            &mut sink,
            0.0,
            &[RaceEvent::GameOver {
                day: 2,
                cars_passed: 10,
            }],
        );
        assert_eq!(sink.calls, vec!["stop"]);
    }

    #[test]
    fn out_of_range_ratio_is_clamped() {
        let mut sink = RecordingSink::default();
        dispatch_frame(&mut sink, 3.0, &[]);
        dispatch_frame(&mut sink, f32::NAN, &[]);
        assert_eq!(sink.ratios, vec![1.0, 0.0]);
    }

    #[test]
    fn engine_tone_bounds() {
        let (idle_hz, idle_vol) = engine_tone(0.0);
        let (max_hz, max_vol) = engine_tone(1.0);
        assert!((idle_hz - 60.0).abs() < 0.01);
        assert!((max_hz - 220.0).abs() < 0.01);
        assert!((idle_vol - 0.05).abs() < 0.001, "idle keeps a floor volume");
        assert!((max_vol - 0.2).abs() < 0.001);
    }

    #[test]
    fn fanfare_is_four_notes() {
        assert_eq!(AudioCue::VictoryFanfare.tones().len(), 4);
        assert!(AudioCue::Stop.tones().is_empty());
    }
}
