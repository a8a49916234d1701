use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use nightrun_core::commentary::{CommentaryRequest, CrewMessage, classify_emotion};

use crate::config::CrewConfig;

const SYSTEM_INSTRUCTION: &str = "You are an 80s racing pit crew chief named 'Rusty'. \
You speak in short, punchy sentences. \
You are sometimes sarcastic, sometimes encouraging, but always intense. \
You love speed. \
Keep responses under 20 words.";

pub const NO_KEY_TEXT: &str = "Radio silence... (Check API Key)";
pub const INTERFERENCE_TEXT: &str = "Radio interference...";
pub const EMPTY_REPLY_TEXT: &str = "Keep driving!";

/// Failure talking to the commentary endpoint.
#[derive(Debug)]
pub enum CrewError {
    Http(reqwest::Error),
    Status(reqwest::StatusCode),
}

impl fmt::Display for CrewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrewError::Http(e) => write!(f, "commentary request failed: {e}"),
            CrewError::Status(code) => write!(f, "commentary API returned {code}"),
        }
    }
}

impl std::error::Error for CrewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CrewError::Http(e) => Some(e),
            CrewError::Status(_) => None,
        }
    }
}

impl From<reqwest::Error> for CrewError {
    fn from(e: reqwest::Error) -> Self {
        CrewError::Http(e)
    }
}

/// Partial `generateContent` response.
#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, trimmed.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

/// The situation report sent as the user turn.
pub fn build_prompt(request: &CommentaryRequest) -> String {
    format!(
        "Situation Report:\n\
         Race Day: {}\n\
         Weather: {}\n\
         Cars Overtaken: {}\n\
         Crashes: {}\n\n\
         Give me a status update for the driver over the radio.",
        request.day, request.weather, request.cars_passed, request.collisions
    )
}

/// Turn reply text into a radio message, substituting a stock line for an
/// empty reply.
pub fn message_from_reply(text: &str) -> CrewMessage {
    let text = text.trim();
    let text = if text.is_empty() { EMPTY_REPLY_TEXT } else { text };
    CrewMessage {
        text: text.to_string(),
        emotion: classify_emotion(text),
    }
}

/// Client for the crew chief's radio lines.
#[derive(Debug, Clone)]
pub struct CrewChief {
    config: CrewConfig,
    client: reqwest::Client,
}

impl CrewChief {
    pub fn new(config: CrewConfig) -> Result<Self, CrewError> {
        let client = reqwest::Client::builder()
            .user_agent("nightrun-crew")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &CrewConfig {
        &self.config
    }

    /// One radio line for the given run stats. Never fails: a missing key or
    /// any transport problem yields a stock neutral line.
    pub async fn commentary(&self, request: &CommentaryRequest) -> CrewMessage {
        if !self.config.has_api_key() {
            return CrewMessage::neutral(NO_KEY_TEXT);
        }
        match self.generate(&build_prompt(request)).await {
            Ok(text) => message_from_reply(&text),
            Err(e) => {
                tracing::warn!(error = %e, "Crew chief request failed");
                CrewMessage::neutral(INTERFERENCE_TEXT)
            },
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, CrewError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.endpoint, self.config.model
        );
        let body = json!({
            "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "maxOutputTokens": self.config.max_output_tokens },
        });

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CrewError::Status(resp.status()));
        }

        let parsed: GenerateResponse = resp.json().await?;
        Ok(parsed.text())
    }
}
