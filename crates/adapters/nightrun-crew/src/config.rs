/// Configuration for the crew chief commentary client.
#[derive(Debug, Clone)]
pub struct CrewConfig {
    /// API key for the generative-language endpoint. Empty disables requests.
    pub api_key: String,
    /// Base URL of the REST API, without the model path.
    pub endpoint: String,
    /// Model name used in `models/{model}:generateContent`.
    pub model: String,
    /// Upper bound on tokens in a reply.
    pub max_output_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            max_output_tokens: 50,
            timeout_secs: 10,
        }
    }
}

impl CrewConfig {
    /// Defaults overridden by `NIGHTRUN_CREW_API_KEY`, `NIGHTRUN_CREW_ENDPOINT`
    /// and `NIGHTRUN_CREW_MODEL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(key) = lookup("NIGHTRUN_CREW_API_KEY") {
            config.api_key = key.trim().to_string();
        }
        if let Some(endpoint) = lookup("NIGHTRUN_CREW_ENDPOINT").filter(|s| !s.trim().is_empty()) {
            config.endpoint = endpoint.trim().trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("NIGHTRUN_CREW_MODEL").filter(|s| !s.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        config
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_have_no_key() {
        let config = CrewConfig::from_lookup(lookup(&[]));
        assert!(!config.has_api_key());
        assert_eq!(config.max_output_tokens, 50);
    }

    #[test]
    fn env_overrides_apply() {
        let config = CrewConfig::from_lookup(lookup(&[
            ("NIGHTRUN_CREW_API_KEY", " abc "),
            ("NIGHTRUN_CREW_ENDPOINT", "http://localhost:9000/v1/"),
            ("NIGHTRUN_CREW_MODEL", "tiny"),
        ]));
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.endpoint, "http://localhost:9000/v1");
        assert_eq!(config.model, "tiny");
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let config = CrewConfig::from_lookup(lookup(&[("NIGHTRUN_CREW_MODEL", "  ")]));
        assert_eq!(config.model, CrewConfig::default().model);
    }
}
