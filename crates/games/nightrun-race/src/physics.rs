use serde::{Deserialize, Serialize};

use nightrun_core::input::DriveIntents;

use crate::config::DrivingConfig;
use crate::wrap;

/// The player's car.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Position along the loop, in `[0, length)`.
    pub z: f64,
    /// Road-relative lateral position; beyond `±1` is off-road. Unclamped.
    pub offset: f64,
    pub speed: f64,
    /// Steering direction held last frame, for the sprite lean.
    pub steer: i8,
}

impl PlayerState {
    pub fn is_off_road(&self) -> bool {
        self.offset.abs() > 1.0
    }

    pub fn speed_ratio(&self, max_speed: f64) -> f32 {
        if max_speed > 0.0 {
            (self.speed / max_speed) as f32
        } else {
            0.0
        }
    }
}

/// `v + accel * dt`.
fn accelerate(v: f64, accel: f64, dt: f64) -> f64 {
    v + accel * dt
}

/// Advance the player one frame. Throttle/brake/drag and the off-road
/// penalty update the speed, which is clamped to `[0, max_speed]`; steering
/// and position then use the updated speed.
pub fn integrate_player(
    player: &mut PlayerState,
    drive: &DriveIntents,
    dt: f64,
    config: &DrivingConfig,
    track_length: f64,
) {
    player.speed = if drive.accelerate {
        accelerate(player.speed, config.accel, dt)
    } else if drive.brake {
        accelerate(player.speed, config.braking, dt)
    } else {
        accelerate(player.speed, config.decel, dt)
    };

    if player.is_off_road() && player.speed > config.off_road_limit {
        player.speed = accelerate(player.speed, config.off_road_decel, dt);
    }

    player.speed = player.speed.clamp(0.0, config.max_speed);

    let dx = dt * config.steer_rate * (player.speed / config.max_speed);
    player.steer = drive.steer();
    player.offset += dx * f64::from(player.steer);

    player.z = wrap::normalize(player.z + player.speed * dt, track_length);
}
