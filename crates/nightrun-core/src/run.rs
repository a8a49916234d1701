use serde::{Deserialize, Serialize};

/// Top-level state of a run, as seen by presentation and audio collaborators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    /// Idle, waiting for a start intent.
    #[default]
    Start,
    /// Simulation active.
    Playing,
    /// Day target reached; simulation frozen until the next day begins.
    LevelComplete,
    /// Sunrise caught the player; waiting for a restart intent.
    GameOver,
}

impl RunState {
    /// Whether the simulation advances player and traffic in this state.
    pub fn is_simulating(self) -> bool {
        self == RunState::Playing
    }

    /// Whether the road scene is drawn (START and GAME_OVER show a blank screen).
    pub fn shows_road(self) -> bool {
        matches!(self, RunState::Playing | RunState::LevelComplete)
    }
}

/// Weather family of a day. Cycles clear → snow → fog every three days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherFamily {
    #[default]
    Clear,
    Snow,
    Fog,
}

impl WeatherFamily {
    /// Weather for a 1-based day index. Day 0 is treated as day 1.
    pub fn for_day(day: u32) -> Self {
        match day.max(1).wrapping_sub(1) % 3 {
            0 => WeatherFamily::Clear,
            1 => WeatherFamily::Snow,
            _ => WeatherFamily::Fog,
        }
    }

    /// Short condition label used by the HUD and the crew chief.
    pub fn description(self) -> &'static str {
        match self {
            WeatherFamily::Clear => "Sunny",
            WeatherFamily::Snow => "Snow",
            WeatherFamily::Fog => "Fog",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_cycle_starts_clear() {
        assert_eq!(WeatherFamily::for_day(1), WeatherFamily::Clear);
        assert_eq!(WeatherFamily::for_day(2), WeatherFamily::Snow);
        assert_eq!(WeatherFamily::for_day(3), WeatherFamily::Fog);
        assert_eq!(WeatherFamily::for_day(4), WeatherFamily::Clear);
    }

    #[test]
    fn day_zero_is_clamped() {
        assert_eq!(WeatherFamily::for_day(0), WeatherFamily::Clear);
    }

    #[test]
    fn only_playing_simulates() {
        assert!(RunState::Playing.is_simulating());
        assert!(!RunState::LevelComplete.is_simulating());
        assert!(!RunState::Start.is_simulating());
        assert!(!RunState::GameOver.is_simulating());
        assert!(RunState::LevelComplete.shows_road());
        assert!(!RunState::GameOver.shows_road());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn weather_has_period_three(day in 1u32..1_000_000) {
                prop_assert_eq!(WeatherFamily::for_day(day), WeatherFamily::for_day(day + 3));
            }
        }
    }
}
