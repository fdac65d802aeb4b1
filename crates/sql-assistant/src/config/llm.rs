//! Hosted language-model configuration.

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// LLM configuration loaded from environment variables prefixed with `OPENAI_`:
/// - `OPENAI_API_KEY`: API key (required)
/// - `OPENAI_MODEL`: Chat model (default: "gpt-4o")
/// - `OPENAI_BASE_URL`: API base URL (default: "https://api.openai.com/v1")
/// - `OPENAI_TEMPERATURE`: Sampling temperature (default: 0.1)
/// - `OPENAI_TIMEOUT_SECS`: Request timeout (default: 60)
/// - `OPENAI_HISTORY_TURNS`: Previous exchanges sent as context (default: 4)
#[derive(Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_history_turns() -> usize {
    4
}

impl LlmConfig {
    /// Load configuration from environment variables and require an API key.
    pub fn from_env() -> AppResult<Self> {
        let config = envy::prefixed("OPENAI_").from_env::<LlmConfig>()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::Config(
                "OPENAI_API_KEY environment variable not set".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            history_turns: default_history_turns(),
        }
    }
}

// Keeps the key out of debug logs.
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .field("history_turns", &self.history_turns)
            .finish()
    }
}
