use serde::{Deserialize, Serialize};

use crate::run::WeatherFamily;

/// Mood attached to a crew chief line, for the portrait animation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Angry,
    Panic,
}

/// A single radio line from the crew chief.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMessage {
    pub text: String,
    pub emotion: Emotion,
}

impl CrewMessage {
    pub fn neutral(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emotion: Emotion::Neutral,
        }
    }
}

/// Cumulative run stats the commentary service keys its line on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentaryRequest {
    pub cars_passed: i32,
    pub collisions: u32,
    pub day: u32,
    pub weather: String,
}

impl CommentaryRequest {
    pub fn new(cars_passed: i32, collisions: u32, day: u32, weather: WeatherFamily) -> Self {
        Self {
            cars_passed,
            collisions,
            day,
            weather: weather.description().to_string(),
        }
    }
}

/// Guess the mood of a line from its wording. Later rules override earlier ones.
pub fn classify_emotion(text: &str) -> Emotion {
    let mut emotion = Emotion::Neutral;
    if text.contains('!') || text.contains("Go") {
        emotion = Emotion::Happy;
    }
    if text.contains("crash") || text.contains("terrible") {
        emotion = Emotion::Angry;
    }
    if text.contains("warning") || text.contains("watch out") {
        emotion = Emotion::Panic;
    }
    emotion
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_neutral() {
        assert_eq!(classify_emotion("Steady pace."), Emotion::Neutral);
    }

    #[test]
    fn exclamation_is_happy() {
        assert_eq!(classify_emotion("Floor it!"), Emotion::Happy);
        assert_eq!(classify_emotion("Go go go"), Emotion::Happy);
    }

    #[test]
    fn panic_overrides_anger() {
        assert_eq!(
            classify_emotion("Another crash! watch out for ice"),
            Emotion::Panic
        );
        assert_eq!(classify_emotion("That crash was terrible!"), Emotion::Angry);
    }

    #[test]
    fn request_carries_weather_label() {
        let req = CommentaryRequest::new(42, 3, 2, WeatherFamily::Snow);
        assert_eq!(req.weather, "Snow");
        assert_eq!(req.cars_passed, 42);
    }
}
