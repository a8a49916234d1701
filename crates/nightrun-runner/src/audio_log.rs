use nightrun_core::audio::{AudioCue, AudioSink, engine_tone};

/// An [`AudioSink`] that traces what a synthesizer would play.
#[derive(Debug, Default)]
pub struct TracingAudio {
    /// Last engine frequency, to log only audible changes.
    last_hz: f32,
    pub cues_played: u32,
}

impl TracingAudio {
    fn cue(&mut self, cue: AudioCue) {
        self.cues_played += 1;
        let tones = cue.tones();
        tracing::debug!(?cue, tones = tones.len(), "Audio cue");
        for tone in tones {
            tracing::trace!(
                start_hz = tone.start_hz,
                end_hz = tone.end_hz,
                duration = tone.duration,
                wave = ?tone.wave,
                "Tone"
            );
        }
    }
}

impl AudioSink for TracingAudio {
    fn update_engine_tone(&mut self, speed_ratio: f32) {
        let (hz, volume) = engine_tone(speed_ratio);
        if (hz - self.last_hz).abs() >= 20.0 {
            self.last_hz = hz;
            tracing::trace!(hz, volume, "Engine tone");
        }
    }

    fn play_crash(&mut self) {
        self.cue(AudioCue::Crash);
    }

    fn play_pass_chime(&mut self) {
        self.cue(AudioCue::PassChime);
    }

    fn play_victory_fanfare(&mut self) {
        self.cue(AudioCue::VictoryFanfare);
    }

    fn stop(&mut self) {
        self.last_hz = 0.0;
        self.cue(AudioCue::Stop);
    }
}

#[cfg(test)]
mod tests {
    use nightrun_core::audio::dispatch_frame;
    use nightrun_core::events::RaceEvent;

    use super::*;

    #[test]
    fn counts_cues() {
        let mut sink = TracingAudio::default();
        dispatch_frame(
            &mut sink,
            0.5,
            &[
                RaceEvent::Collision { speed_after: 1.0 },
                RaceEvent::CarsPassed { count: 1, total: 1 },
            ],
        );
        assert_eq!(sink.cues_played, 2);
    }

    #[test]
    fn tracks_engine_pitch() {
        let mut sink = TracingAudio::default();
        sink.update_engine_tone(1.0);
        assert!((sink.last_hz - 220.0).abs() < 0.01);
        sink.stop();
        assert_eq!(sink.last_hz, 0.0);
    }
}
