use serde::{Deserialize, Serialize};

use crate::run::WeatherFamily;

/// Discrete signals emitted by the engine during a frame.
///
/// Each variant appears at most once per frame; simultaneous passes are
/// coalesced into a single `CarsPassed` carrying the count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RaceEvent {
    /// A fresh run began (start or restart intent).
    RunStarted { day: u32 },
    /// The player overtook one or more cars this frame.
    CarsPassed { count: u32, total: i32 },
    /// One or more previously passed cars re-overtook the player.
    CarsRepassed { count: u32, total: i32 },
    /// The player rear-ended a slower car.
    Collision { speed_after: f64 },
    /// The day's pass target was reached.
    LevelComplete { day: u32, cars_passed: i32 },
    /// A new day began after a completed one.
    DayStarted { day: u32, weather: WeatherFamily },
    /// Sunrise arrived before the target was met.
    GameOver { day: u32, cars_passed: i32 },
}

impl RaceEvent {
    /// Whether the commentary collaborator should be asked for a line.
    pub fn wants_commentary(&self) -> bool {
        matches!(
            self,
            RaceEvent::RunStarted { .. } | RaceEvent::LevelComplete { .. } | RaceEvent::GameOver { .. }
        )
    }
}
