use serde::{Deserialize, Serialize};

use crate::run::{RunState, WeatherFamily};

/// Snapshot emitted once per frame for the HUD and other collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Speed in display units (world speed / 100, floored).
    pub speed_display: u32,
    /// Net cars passed this day. May dip below zero transiently.
    pub cars_passed: i32,
    /// Player longitudinal position within the loop.
    pub distance: f64,
    pub day: u32,
    /// Cars still to pass today, clamped at zero.
    pub cars_remaining: u32,
    /// Time of day in `[0, 100]`.
    pub sun_position: f32,
    pub run_state: RunState,
    pub weather: WeatherFamily,
    /// Collisions since the run started.
    pub collisions: u32,
    /// Speed as a fraction of maximum, for the engine tone.
    pub speed_ratio: f32,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            speed_display: 0,
            cars_passed: 0,
            distance: 0.0,
            day: 1,
            cars_remaining: 0,
            sun_position: 0.0,
            run_state: RunState::Start,
            weather: WeatherFamily::Clear,
            collisions: 0,
            speed_ratio: 0.0,
        }
    }
}

/// Cars left to pass, never negative.
pub fn cars_remaining(target: u32, cars_passed: i32) -> u32 {
    let remaining = i64::from(target) - i64::from(cars_passed);
    remaining.clamp(0, i64::from(u32::MAX)) as u32
}

/// Clamp a speed ratio into `[0, 1]`; non-finite input maps to 0.
pub fn sanitize_ratio(ratio: f32) -> f32 {
    if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_clamps_at_zero() {
        assert_eq!(cars_remaining(200, 250), 0);
        assert_eq!(cars_remaining(200, 200), 0);
        assert_eq!(cars_remaining(200, 150), 50);
    }

    #[test]
    fn negative_pass_count_extends_remaining() {
        assert_eq!(cars_remaining(200, -3), 203);
    }

    #[test]
    fn ratio_sanitized() {
        assert_eq!(sanitize_ratio(1.7), 1.0);
        assert_eq!(sanitize_ratio(-0.2), 0.0);
        assert_eq!(sanitize_ratio(f32::NAN), 0.0);
        assert_eq!(sanitize_ratio(f32::INFINITY), 0.0);
        assert!((sanitize_ratio(0.4) - 0.4).abs() < f32::EPSILON);
    }
}
