use serde::{Deserialize, Serialize};

use nightrun_core::run::WeatherFamily;

use crate::palette::{self, Rgb};

/// Time of day at which the sun comes up and the day is over.
pub const DAY_END: f32 = 100.0;

/// Outcome of advancing the clock by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    Advanced,
    /// The clock reached the end of the day. It holds at [`DAY_END`] until
    /// the caller resets it.
    Sunrise,
}

/// Cyclic time of day in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DayClock {
    time: f32,
}

impl DayClock {
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn advance(&mut self, dt: f32, rate: f32) -> ClockTick {
        self.time += rate * dt;
        if self.time >= DAY_END {
            self.time = DAY_END;
            ClockTick::Sunrise
        } else {
            ClockTick::Advanced
        }
    }

    pub fn reset_to_dawn(&mut self) {
        self.time = 0.0;
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, time: f32) {
        self.time = time;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightingPhase {
    Dawn,
    Day,
    Dusk,
    Night,
}

impl LightingPhase {
    pub fn at(time: f32) -> Self {
        if time < 20.0 {
            LightingPhase::Dawn
        } else if time < 60.0 {
            LightingPhase::Day
        } else if time < 75.0 {
            LightingPhase::Dusk
        } else {
            LightingPhase::Night
        }
    }

    fn sky(self) -> Rgb {
        match self {
            LightingPhase::Dawn => palette::SKY_DAWN,
            LightingPhase::Day => palette::SKY_DAY,
            LightingPhase::Dusk => palette::SKY_DUSK,
            LightingPhase::Night => palette::SKY_NIGHT,
        }
    }

    fn label(self) -> &'static str {
        match self {
            LightingPhase::Dawn => "Dawn",
            LightingPhase::Day => "Day",
            LightingPhase::Dusk => "Dusk",
            LightingPhase::Night => "Night",
        }
    }
}

/// Everything the renderer needs about light and weather for a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    pub weather: WeatherFamily,
    pub phase: LightingPhase,
    pub sky: Rgb,
    /// Fog density in `[0, 1]`.
    pub fog: f32,
    pub fog_color: Rgb,
    pub ground: Rgb,
    pub description: &'static str,
}

/// Derive lighting and weather. Pure in `(day, time_of_day)`.
pub fn derive_environment(day: u32, time_of_day: f32) -> Environment {
    let weather = WeatherFamily::for_day(day);
    let phase = LightingPhase::at(time_of_day);
    let bright = matches!(phase, LightingPhase::Dawn | LightingPhase::Day);

    let (fog, fog_color, override_sky, override_label) = match weather {
        WeatherFamily::Clear => (0.0, palette::SKY_DAY, None, None),
        WeatherFamily::Snow => (0.3, palette::FOG_SNOW, Some(palette::SKY_SNOW), Some("Snow")),
        WeatherFamily::Fog => (0.85, palette::FOG_FOG, Some(palette::SKY_FOG), Some("Fog")),
    };

    let (sky, description) = match (bright, override_sky, override_label) {
        (true, Some(sky), Some(label)) => (sky, label),
        _ => (phase.sky(), phase.label()),
    };

    Environment {
        weather,
        phase,
        sky,
        fog,
        fog_color,
        ground: palette::ground_tones(weather)[1],
        description,
    }
}

/// The sun or moon disc hanging over the horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CelestialBody {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Rgb,
}

/// Sun in the early morning and evening, moon at night; hidden in thick fog
/// and in the middle of the day.
pub fn celestial_body(env: &Environment, time_of_day: f32, width: f32, height: f32) -> Option<CelestialBody> {
    if env.fog >= 0.5 || !(time_of_day < 20.0 || time_of_day > 60.0) {
        return None;
    }
    if time_of_day < 75.0 {
        Some(CelestialBody {
            x: width * 0.2 + time_of_day * 2.0,
            y: height * 0.3,
            radius: 40.0,
            color: palette::SUN,
        })
    } else {
        Some(CelestialBody {
            x: width * 0.8 - (time_of_day - 75.0) * 2.0,
            y: height * 0.2,
            radius: 20.0,
            color: palette::MOON,
        })
    }
}
