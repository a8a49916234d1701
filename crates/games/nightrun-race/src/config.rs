use serde::{Deserialize, Serialize};

use crate::track::TrackError;

/// Road geometry and traffic density.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Half-width of the paved road in world units.
    pub road_width: f64,
    /// Longitudinal length of one segment.
    pub segment_length: f64,
    /// Segments per color alternation of the rumble strips.
    pub rumble_length: usize,
    /// Number of 10-segment straights at the start of the loop.
    pub opening_straights: usize,
    /// Number of randomized curve/hill moves in the midsection.
    pub random_moves: usize,
    /// Enter / hold / leave lengths of each random move.
    pub move_enter: usize,
    pub move_hold: usize,
    pub move_leave: usize,
    /// Curvature magnitude bound of random moves (exclusive).
    pub max_curve: f64,
    /// Elevation delta bound of random moves, in segment lengths (exclusive).
    pub max_hill: f64,
    /// Length of the closing straight.
    pub closing_straight: usize,
    /// One traffic car per this many segments.
    pub segments_per_car: usize,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            road_width: 2000.0,
            segment_length: 200.0,
            rumble_length: 3,
            opening_straights: 50,
            random_moves: 40,
            move_enter: 20,
            move_hold: 40,
            move_leave: 20,
            max_curve: 8.0,
            max_hill: 20.0,
            closing_straight: 50,
            segments_per_car: 30,
        }
    }
}

/// Arcade driving model. Rates are per second.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivingConfig {
    pub max_speed: f64,
    /// Throttle acceleration.
    pub accel: f64,
    /// Brake acceleration (negative).
    pub braking: f64,
    /// Coasting drag (negative).
    pub decel: f64,
    /// Extra drag while off-road above the off-road limit (negative).
    pub off_road_decel: f64,
    pub off_road_limit: f64,
    /// Lateral speed at full throttle, in road half-widths per second.
    pub steer_rate: f64,
}

impl Default for DrivingConfig {
    fn default() -> Self {
        let max_speed = 12_000.0;
        Self {
            max_speed,
            accel: max_speed / 2.0,
            braking: -max_speed,
            decel: -max_speed / 5.0,
            off_road_decel: -max_speed,
            off_road_limit: max_speed / 10.0,
            steer_rate: 2.0,
        }
    }
}

/// Rival car behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    /// Cruising speed band as fractions of the player's max speed.
    pub min_speed_fraction: f64,
    pub speed_fraction_span: f64,
    /// Lateral spawn range is `[-max_offset, max_offset)`.
    pub max_offset: f64,
    /// Half-width of a car's lateral footprint.
    pub car_half_width: f64,
    /// Collision look-ahead in segments.
    pub collision_lookahead_segments: f64,
    /// Player speed after a crash, as a fraction of the hit car's speed.
    pub crash_speed_fraction: f64,
    pub sprite_variants: u8,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            min_speed_fraction: 0.25,
            speed_fraction_span: 0.3,
            max_offset: 0.9,
            car_half_width: 0.25,
            collision_lookahead_segments: 2.0,
            crash_speed_fraction: 0.8,
            sprite_variants: 3,
        }
    }
}

/// Camera and screen setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Horizontal field of view in degrees.
    pub fov_degrees: f64,
    pub camera_height: f64,
    /// Segments drawn ahead of the player.
    pub draw_distance: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fov_degrees: 100.0,
            camera_height: 1000.0,
            draw_distance: 300,
        }
    }
}

impl RenderConfig {
    /// Perspective divide numerator, `1 / tan(fov / 2)`.
    pub fn camera_depth(&self) -> f64 {
        1.0 / (self.fov_degrees / 2.0).to_radians().tan()
    }

    /// Distance from the camera to the player's car.
    pub fn player_z(&self) -> f64 {
        self.camera_height * self.camera_depth()
    }
}

/// Top-level race configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    pub track: TrackConfig,
    pub driving: DrivingConfig,
    pub traffic: TrafficConfig,
    pub render: RenderConfig,
    pub tick_rate_hz: f32,
    /// Time-of-day units per second; the day ends at 100.
    pub day_rate: f32,
    /// Cars to pass on day 1.
    pub pass_target_base: u32,
    /// Extra cars required per subsequent day.
    pub pass_target_increment: u32,
    /// Seconds spent in LEVEL_COMPLETE before the next day starts.
    pub level_complete_delay_secs: f32,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            track: TrackConfig::default(),
            driving: DrivingConfig::default(),
            traffic: TrafficConfig::default(),
            render: RenderConfig::default(),
            tick_rate_hz: 60.0,
            day_rate: 0.48,
            pass_target_base: 200,
            pass_target_increment: 100,
            level_complete_delay_secs: 4.0,
        }
    }
}

impl RaceConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is
    /// missing, unparseable, or describes a degenerate track.
    pub fn load() -> Self {
        let path = std::env::var("NIGHTRUN_CONFIG")
            .unwrap_or_else(|_| "config/nightrun.toml".to_string());
        let config = match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<RaceConfig>(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    RaceConfig::default()
                },
            },
            Err(_) => RaceConfig::default(),
        };
        if let Err(e) = config.validate() {
            tracing::warn!("Rejected config from {path}: {e}, using defaults");
            return RaceConfig::default();
        }
        config
    }

    /// Check the settings that would produce an empty or zero-length loop.
    pub fn validate(&self) -> Result<(), TrackError> {
        let t = &self.track;
        if !(t.segment_length.is_finite() && t.segment_length > 0.0) {
            return Err(TrackError::ZeroLength);
        }
        let segments = t.opening_straights * 10
            + t.random_moves * (t.move_enter + t.move_hold + t.move_leave)
            + t.closing_straight;
        if segments == 0 {
            return Err(TrackError::Empty);
        }
        if t.rumble_length == 0 || t.segments_per_car == 0 || self.render.draw_distance == 0 {
            return Err(TrackError::Degenerate(
                "rumble_length, segments_per_car and draw_distance must be positive",
            ));
        }
        if !(self.driving.max_speed.is_finite() && self.driving.max_speed > 0.0) {
            return Err(TrackError::Degenerate("max_speed must be positive"));
        }
        if !(self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0) {
            return Err(TrackError::Degenerate("tick_rate_hz must be positive"));
        }
        let traffic = &self.traffic;
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;
        if !non_negative(traffic.max_offset) {
            return Err(TrackError::Degenerate(
                "traffic max_offset must be finite and non-negative",
            ));
        }
        if !(non_negative(traffic.min_speed_fraction) && non_negative(traffic.speed_fraction_span)) {
            return Err(TrackError::Degenerate(
                "traffic speed fractions must be finite and non-negative",
            ));
        }
        Ok(())
    }

    /// Fixed logical timestep.
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(RaceConfig::default().validate().is_ok());
    }

    #[test]
    fn accel_reaches_max_in_two_seconds() {
        let d = DrivingConfig::default();
        assert!((d.max_speed / d.accel - 2.0).abs() < 1e-9);
    }

    #[test]
    fn camera_depth_matches_fov() {
        let r = RenderConfig::default();
        // 1 / tan(50 deg)
        assert!((r.camera_depth() - 0.839_099_631).abs() < 1e-6);
        assert!((r.player_z() - 839.099_631).abs() < 1e-3);
    }

    #[test]
    fn zero_segment_length_rejected() {
        let mut config = RaceConfig::default();
        config.track.segment_length = 0.0;
        assert!(matches!(config.validate(), Err(TrackError::ZeroLength)));
    }

    #[test]
    fn empty_layout_rejected() {
        let mut config = RaceConfig::default();
        config.track.opening_straights = 0;
        config.track.random_moves = 0;
        config.track.closing_straight = 0;
        assert!(matches!(config.validate(), Err(TrackError::Empty)));
    }

    #[test]
    fn bad_traffic_settings_rejected() {
        let cases: [fn(&mut TrafficConfig); 4] = [
            |t| t.max_offset = f64::INFINITY,
            |t| t.max_offset = f64::NAN,
            |t| t.min_speed_fraction = -0.1,
            |t| t.speed_fraction_span = -0.3,
        ];
        for tweak in cases {
            let mut config = RaceConfig::default();
            tweak(&mut config.traffic);
            assert!(matches!(config.validate(), Err(TrackError::Degenerate(_))));
        }
        let mut still_road = RaceConfig::default();
        still_road.traffic.max_offset = 0.0;
        still_road.traffic.speed_fraction_span = 0.0;
        assert!(still_road.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: RaceConfig = toml::from_str(
            r#"
            pass_target_base = 5
            [driving]
            max_speed = 6000.0
            "#,
        )
        .unwrap();
        assert_eq!(config.pass_target_base, 5);
        assert_eq!(config.pass_target_increment, 100);
        assert!((config.driving.max_speed - 6000.0).abs() < f64::EPSILON);
        assert_eq!(config.track.rumble_length, 3);
    }

    #[test]
    fn shipped_sample_matches_defaults() {
        let config: RaceConfig =
            toml::from_str(include_str!("../../../../config/nightrun.toml")).unwrap();
        assert!(config.validate().is_ok());
        let defaults = RaceConfig::default();
        assert_eq!(config.pass_target_base, defaults.pass_target_base);
        assert_eq!(config.track.segments_per_car, defaults.track.segments_per_car);
        assert!((config.driving.decel - defaults.driving.decel).abs() < 1e-9);
        assert_eq!(config.render.draw_distance, defaults.render.draw_distance);
    }

    #[test]
    fn day_lasts_about_two_hundred_seconds() {
        let config = RaceConfig::default();
        let seconds = 100.0 / config.day_rate;
        assert!((200.0..=215.0).contains(&seconds));
        // 0.008 per frame at 60 Hz
        assert!((config.day_rate * config.dt() - 0.008).abs() < 1e-6);
    }
}
