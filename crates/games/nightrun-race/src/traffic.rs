use crate::config::TrafficConfig;
use crate::physics::PlayerState;
use crate::track::{Track, TrafficCar};
use crate::wrap;

/// What happened between the player and the traffic during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrafficOutcome {
    /// Cars the player overtook.
    pub passed: u32,
    /// Cars that overtook the player back.
    pub repassed: u32,
    /// Player speed after the last crash this frame, if any.
    pub collision: Option<f64>,
}

impl TrafficOutcome {
    /// Net change to the day's pass counter.
    pub fn net_passes(&self) -> i32 {
        self.passed as i32 - self.repassed as i32
    }
}

/// Crossing test for one car, from relative positions before and after the
/// frame. Returns `+1` for a pass, `-1` for a re-pass, `0` otherwise.
pub fn crossing(old_rel: f64, new_rel: f64, player_speed: f64, car_speed: f64) -> i32 {
    if old_rel > 0.0 && new_rel <= 0.0 && player_speed > car_speed {
        1
    } else if old_rel < 0.0 && new_rel >= 0.0 && car_speed > player_speed {
        -1
    } else {
        0
    }
}

/// Move every car along the loop and resolve overtakes and crashes against
/// the player, who has already been integrated from `player_z_before`.
///
/// Cars are processed in order; a crash slows the player immediately, so
/// later cars in the same frame see the reduced speed.
pub fn advance_traffic(
    cars: &mut [TrafficCar],
    player: &mut PlayerState,
    player_z_before: f64,
    dt: f64,
    track: &Track,
    config: &TrafficConfig,
) -> TrafficOutcome {
    let length = track.length();
    let lookahead = config.collision_lookahead_segments * track.segment_length();
    let mut outcome = TrafficOutcome::default();

    for car in cars.iter_mut() {
        let old_rel = wrap::signed_relative(car.z, player_z_before, length);
        car.z = wrap::normalize(car.z + car.speed * dt, length);
        let new_rel = wrap::signed_relative(car.z, player.z, length);

        match crossing(old_rel, new_rel, player.speed, car.speed) {
            1 => outcome.passed += 1,
            -1 => outcome.repassed += 1,
            _ => {},
        }

        let ahead = new_rel > 0.0 && new_rel < lookahead;
        let overlapping = (player.offset - car.offset).abs() < config.car_half_width;
        if ahead && overlapping && player.speed > car.speed {
            player.speed = car.speed * config.crash_speed_fraction;
            outcome.collision = Some(player.speed);
            tracing::debug!(car_z = car.z, speed = player.speed, "Rear-ended traffic");
        }
    }

    outcome
}

/// Traffic grouped by segment, rebuilt every frame.
///
/// A sorted arena of `(segment, car)` pairs; lookups binary-search the
/// segment's run. Nothing persists across frames.
#[derive(Debug, Default)]
pub struct SegmentBuckets {
    entries: Vec<(usize, usize)>,
}

impl SegmentBuckets {
    pub fn rebuild(&mut self, cars: &[TrafficCar], track: &Track) {
        self.entries.clear();
        self.entries
            .extend(cars.iter().enumerate().map(|(i, car)| (track.segment_index(car.z), i)));
        self.entries.sort_unstable();
    }

    /// Indices of the cars inside `segment`.
    pub fn cars_in(&self, segment: usize) -> impl Iterator<Item = usize> + '_ {
        let start = self.entries.partition_point(|&(s, _)| s < segment);
        self.entries[start..]
            .iter()
            .take_while(move |&&(s, _)| s == segment)
            .map(|&(_, car)| car)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
