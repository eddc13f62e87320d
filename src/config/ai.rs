//! AI provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Completion service to use
    #[serde(default)]
    pub provider: AiProvider,

    /// Google Generative Language API key
    pub gemini_api_key: Option<String>,

    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Override for the provider's API base URL
    pub base_url: Option<String>,

    /// Model for the Listener, Coordinator and Facilitator
    #[serde(default = "default_model")]
    pub orchestrator_model: String,

    /// Model for the Actor
    #[serde(default = "default_model")]
    pub persona_model: String,

    /// Time budget per completion attempt, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Attempts per completion, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// AI provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Gemini,
    OpenAI,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// API key for the selected provider, if set
    pub fn api_key(&self) -> Option<&str> {
        let key = match self.provider {
            AiProvider::Gemini => self.gemini_api_key.as_deref(),
            AiProvider::OpenAI => self.openai_api_key.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key().is_none() {
            return Err(ValidationError::MissingRequired(match self.provider {
                AiProvider::Gemini => "GEMINI_API_KEY",
                AiProvider::OpenAI => "OPENAI_API_KEY",
            }));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_attempts == 0 {
            return Err(ValidationError::InvalidMaxAttempts);
        }
        if self.orchestrator_model.trim().is_empty() {
            return Err(ValidationError::EmptyModel("orchestrator_model"));
        }
        if self.persona_model.trim().is_empty() {
            return Err(ValidationError::EmptyModel("persona_model"));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            gemini_api_key: None,
            openai_api_key: None,
            base_url: None,
            orchestrator_model: default_model(),
            persona_model: default_model(),
            timeout_secs: default_timeout(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    2
}
