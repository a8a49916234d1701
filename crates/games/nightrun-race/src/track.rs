use std::f64::consts::PI;
use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use nightrun_core::run::WeatherFamily;

use crate::config::RaceConfig;
use crate::palette::{self, Rgb};
use crate::projection::WorldPoint;
use crate::wrap;

/// Reasons a track cannot be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackError {
    /// The layout produced no segments.
    Empty,
    /// Segment length is zero, negative or not finite.
    ZeroLength,
    /// Some other setting makes the loop unusable.
    Degenerate(&'static str),
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::Empty => write!(f, "track layout has no segments"),
            TrackError::ZeroLength => write!(f, "segment length must be positive"),
            TrackError::Degenerate(what) => write!(f, "degenerate track: {what}"),
        }
    }
}

impl std::error::Error for TrackError {}

/// Fill colors of one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentColors {
    pub road: Rgb,
    pub grass: Rgb,
    pub rumble: Rgb,
    /// Lane marker, only on light stripes.
    pub lane: Option<Rgb>,
}

impl SegmentColors {
    /// Alternating stripe colors for segment `index`.
    pub fn for_index(index: usize, rumble_length: usize, weather: WeatherFamily) -> Self {
        let road = palette::road_tones(weather);
        let ground = palette::ground_tones(weather);
        let dark = (index / rumble_length.max(1)) % 2 == 1;
        if dark {
            Self {
                road: road[0],
                grass: ground[0],
                rumble: palette::RUMBLE[0],
                lane: None,
            }
        } else {
            Self {
                road: road[1],
                grass: ground[1],
                rumble: palette::RUMBLE[1],
                lane: Some(palette::LANE),
            }
        }
    }
}

/// One fixed-length slice of the loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub index: usize,
    /// Near edge.
    pub p1: WorldPoint,
    /// Far edge.
    pub p2: WorldPoint,
    pub curve: f64,
    pub colors: SegmentColors,
}

/// A rival car cruising at a constant speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficCar {
    /// Road-relative lateral position; `±1` are the road edges.
    pub offset: f64,
    pub z: f64,
    /// Sprite variant, `0..sprite_variants`.
    pub sprite: u8,
    pub speed: f64,
}

/// A closed loop of segments for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTrack")]
pub struct Track {
    day: u32,
    weather: WeatherFamily,
    segment_length: f64,
    segments: Vec<Segment>,
}

/// Unchecked wire form of [`Track`].
#[derive(Deserialize)]
struct RawTrack {
    day: u32,
    weather: WeatherFamily,
    segment_length: f64,
    segments: Vec<Segment>,
}

impl TryFrom<RawTrack> for Track {
    type Error = TrackError;

    fn try_from(raw: RawTrack) -> Result<Self, Self::Error> {
        if !(raw.segment_length.is_finite() && raw.segment_length > 0.0) {
            return Err(TrackError::ZeroLength);
        }
        if raw.segments.is_empty() {
            return Err(TrackError::Empty);
        }
        Ok(Track {
            day: raw.day,
            weather: raw.weather,
            segment_length: raw.segment_length,
            segments: raw.segments,
        })
    }
}

pub fn ease_in(a: f64, b: f64, percent: f64) -> f64 {
    a + (b - a) * percent.powi(2)
}

pub fn ease_in_out(a: f64, b: f64, percent: f64) -> f64 {
    a + (b - a) * (0.5 - (percent * PI).cos() / 2.0)
}

/// Incremental segment builder.
struct TrackBuilder {
    segment_length: f64,
    rumble_length: usize,
    weather: WeatherFamily,
    segments: Vec<Segment>,
}

impl TrackBuilder {
    fn last_y(&self) -> f64 {
        self.segments.last().map_or(0.0, |s| s.p2.y)
    }

    fn add_segment(&mut self, curve: f64, y: f64) {
        let index = self.segments.len();
        let z = index as f64 * self.segment_length;
        self.segments.push(Segment {
            index,
            p1: WorldPoint::new(0.0, self.last_y(), z),
            p2: WorldPoint::new(0.0, y, z + self.segment_length),
            curve,
            colors: SegmentColors::for_index(index, self.rumble_length, self.weather),
        });
    }

    /// Append a move: curvature eases in, holds, then eases back out while the
    /// elevation eases from the current height by `hill` segment lengths.
    fn add_road(&mut self, enter: usize, hold: usize, leave: usize, curve: f64, hill: f64) {
        let start_y = self.last_y();
        let end_y = start_y + hill * self.segment_length;
        let total = (enter + hold + leave) as f64;
        for n in 0..enter {
            self.add_segment(
                ease_in(0.0, curve, n as f64 / enter as f64),
                ease_in_out(start_y, end_y, n as f64 / total),
            );
        }
        for n in 0..hold {
            self.add_segment(curve, ease_in_out(start_y, end_y, (n + enter) as f64 / total));
        }
        for n in 0..leave {
            self.add_segment(
                ease_in(curve, 0.0, n as f64 / leave as f64),
                ease_in_out(start_y, end_y, (n + enter + hold) as f64 / total),
            );
        }
    }
}

fn random_signed(rng: &mut StdRng, bound: f64) -> f64 {
    let magnitude = rng.random::<f64>() * bound;
    if rng.random_bool(0.5) { magnitude } else { -magnitude }
}

impl Track {
    /// Build the loop for `day`. Deterministic for a given RNG state.
    pub fn generate(day: u32, config: &RaceConfig, rng: &mut StdRng) -> Result<Track, TrackError> {
        config.validate()?;
        let t = &config.track;
        let weather = WeatherFamily::for_day(day);
        let mut builder = TrackBuilder {
            segment_length: t.segment_length,
            rumble_length: t.rumble_length,
            weather,
            segments: Vec::new(),
        };

        for _ in 0..t.opening_straights {
            builder.add_road(0, 10, 0, 0.0, 0.0);
        }
        for _ in 0..t.random_moves {
            let curve = random_signed(rng, t.max_curve);
            let hill = random_signed(rng, t.max_hill);
            builder.add_road(t.move_enter, t.move_hold, t.move_leave, curve, hill);
        }
        builder.add_road(0, t.closing_straight, 0, 0.0, 0.0);

        if builder.segments.is_empty() {
            return Err(TrackError::Empty);
        }
        tracing::debug!(
            day,
            ?weather,
            segments = builder.segments.len(),
            "Track generated"
        );
        Ok(Track {
            day,
            weather,
            segment_length: t.segment_length,
            segments: builder.segments,
        })
    }

    /// Day-1 loop from explicit `(enter, hold, leave, curve, hill)` moves.
    #[cfg(test)]
    pub(crate) fn from_roads(
        config: &RaceConfig,
        roads: &[(usize, usize, usize, f64, f64)],
    ) -> Track {
        let mut builder = TrackBuilder {
            segment_length: config.track.segment_length,
            rumble_length: config.track.rumble_length,
            weather: WeatherFamily::for_day(1),
            segments: Vec::new(),
        };
        for &(enter, hold, leave, curve, hill) in roads {
            builder.add_road(enter, hold, leave, curve, hill);
        }
        Track {
            day: 1,
            weather: builder.weather,
            segment_length: builder.segment_length,
            segments: builder.segments,
        }
    }

    /// Spread rival cars over the loop: one per `segments_per_car` segments.
    pub fn scatter_traffic(&self, config: &RaceConfig, rng: &mut StdRng) -> Vec<TrafficCar> {
        let traffic = &config.traffic;
        let per_car = config.track.segments_per_car.max(1);
        let count = self.segments.len().div_ceil(per_car);
        let max_speed = config.driving.max_speed;
        let variants = traffic.sprite_variants.max(1);

        (0..count)
            .map(|_| {
                let segment = rng.random_range(0..self.segments.len());
                let offset = if traffic.max_offset > 0.0 {
                    rng.random_range(-traffic.max_offset..traffic.max_offset)
                } else {
                    0.0
                };
                TrafficCar {
                    offset,
                    z: segment as f64 * self.segment_length,
                    sprite: rng.random_range(0..variants),
                    speed: max_speed
                        * (traffic.min_speed_fraction
                            + rng.random::<f64>() * traffic.speed_fraction_span),
                }
            })
            .collect()
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn weather(&self) -> WeatherFamily {
        self.weather
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn segment_length(&self) -> f64 {
        self.segment_length
    }

    /// Total loop length.
    pub fn length(&self) -> f64 {
        self.segments.len() as f64 * self.segment_length
    }

    pub fn segment_index(&self, z: f64) -> usize {
        wrap::segment_index(z, self.segment_length, self.segments.len())
    }

    /// The segment containing `z` (wrapped onto the loop).
    pub fn segment_at(&self, z: f64) -> &Segment {
        &self.segments[self.segment_index(z)]
    }

    /// Segment `index` positions after `base`, wrapping around the loop.
    pub fn segment_after(&self, base: usize, n: usize) -> &Segment {
        &self.segments[(base + n) % self.segments.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn build(day: u32, seed: u64) -> Track {
        let mut rng = StdRng::seed_from_u64(seed);
        Track::generate(day, &RaceConfig::default(), &mut rng).unwrap()
    }

    #[test]
    fn default_layout_has_3750_segments() {
        let track = build(1, 42);
        assert_eq!(track.segment_count(), 3750);
        assert!((track.length() - 750_000.0).abs() < 1e-6);
    }

    #[test]
    fn deterministic_generation() {
        assert_eq!(build(1, 7), build(1, 7), "Same seed must produce same track");
        assert_ne!(build(1, 7), build(1, 8));
    }

    #[test]
    fn segments_are_contiguous() {
        let track = build(2, 3);
        for pair in track.segments().windows(2) {
            assert!((pair[0].p2.z - pair[1].p1.z).abs() < 1e-9);
            assert_eq!(pair[0].p2.y, pair[1].p1.y);
            assert_eq!(pair[0].index + 1, pair[1].index);
        }
        let first = &track.segments()[0];
        assert_eq!(first.p1.y, 0.0);
        assert_eq!(first.p1.z, 0.0);
    }

    #[test]
    fn opening_is_flat_and_straight() {
        let track = build(1, 11);
        for seg in &track.segments()[..500] {
            assert_eq!(seg.curve, 0.0);
            assert_eq!(seg.p2.y, 0.0);
        }
    }

    #[test]
    fn curvature_stays_within_bounds() {
        let track = build(1, 5);
        assert!(track.segments().iter().all(|s| s.curve.abs() < 8.0));
        assert!(track.segments().iter().any(|s| s.curve != 0.0));
    }

    #[test]
    fn stripes_alternate_every_rumble_length() {
        let track = build(1, 1);
        let segs = track.segments();
        assert_eq!(segs[0].colors.lane, Some(palette::LANE));
        assert_eq!(segs[2].colors.rumble, palette::RUMBLE[1]);
        assert_eq!(segs[3].colors.lane, None);
        assert_eq!(segs[3].colors.rumble, palette::RUMBLE[0]);
        assert_eq!(segs[6].colors.lane, Some(palette::LANE));
    }

    #[test]
    fn weather_tints_the_road() {
        let snow = build(2, 1);
        assert_eq!(snow.weather(), WeatherFamily::Snow);
        assert_eq!(
            snow.segments()[0].colors.road,
            palette::road_tones(WeatherFamily::Snow)[1]
        );
        let fog = build(3, 1);
        assert_eq!(
            fog.segments()[3].colors.grass,
            palette::ground_tones(WeatherFamily::Fog)[0]
        );
    }

    #[test]
    fn segment_lookup_wraps() {
        let track = build(1, 1);
        assert_eq!(track.segment_at(0.0).index, 0);
        assert_eq!(track.segment_at(track.length()).index, 0);
        assert_eq!(track.segment_at(-1.0).index, track.segment_count() - 1);
        assert_eq!(track.segment_after(track.segment_count() - 1, 2).index, 1);
    }

    #[test]
    fn traffic_scatter_matches_density_and_bands() {
        let config = RaceConfig::default();
        let mut rng = StdRng::seed_from_u64(9);
        let track = Track::generate(1, &config, &mut rng).unwrap();
        let cars = track.scatter_traffic(&config, &mut rng);
        assert_eq!(cars.len(), 125);
        let max = config.driving.max_speed;
        for car in &cars {
            assert!((-0.9..0.9).contains(&car.offset));
            assert!(car.sprite < 3);
            assert!(car.z >= 0.0 && car.z < track.length());
            assert_eq!(car.z % config.track.segment_length, 0.0);
            assert!(car.speed >= 0.25 * max && car.speed < 0.55 * max);
        }
    }

    #[test]
    fn degenerate_config_rejected() {
        let mut config = RaceConfig::default();
        config.track.segment_length = 0.0;
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            Track::generate(1, &config, &mut rng),
            Err(TrackError::ZeroLength)
        );
    }

    #[test]
    fn empty_track_rejected_on_deserialize() {
        let mut track = build(1, 1);
        track.segments.clear();
        let bytes = rmp_serde::to_vec(&track).unwrap();
        assert!(rmp_serde::from_slice::<Track>(&bytes).is_err());
    }

    #[test]
    fn easing_endpoints() {
        assert_eq!(ease_in(0.0, 8.0, 0.0), 0.0);
        assert_eq!(ease_in(0.0, 8.0, 1.0), 8.0);
        assert!((ease_in(0.0, 8.0, 0.5) - 2.0).abs() < 1e-12);
        assert!((ease_in_out(0.0, 10.0, 0.5) - 5.0).abs() < 1e-12);
        assert!(ease_in_out(0.0, 10.0, 1.0) > 9.999);
    }
}
