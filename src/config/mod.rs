//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `CORP_SIM` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use corp_sim::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Orchestrator model: {}", config.ai.orchestrator_model);
//! ```

mod ai;
mod error;
mod simulation;

pub use ai::{AiConfig, AiProvider};
pub use error::{ConfigError, ValidationError};
pub use simulation::SimulatorConfig;

use serde::Deserialize;

use crate::application::DispatcherSettings;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Completion service configuration (Gemini/OpenAI)
    #[serde(default)]
    pub ai: AiConfig,

    /// Phases, personas and session storage
    #[serde(default)]
    pub simulation: SimulatorConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CORP_SIM` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CORP_SIM__AI__GEMINI_API_KEY=...` -> `ai.gemini_api_key = ...`
    /// - `CORP_SIM__SIMULATION__MAX_CONVERSATION_TURNS=8` -> `simulation.max_conversation_turns = 8`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CORP_SIM")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.simulation.validate()?;
        Ok(())
    }

    /// Settings handed to the turn dispatcher
    pub fn dispatcher_settings(&self) -> DispatcherSettings {
        DispatcherSettings {
            orchestrator_model: self.ai.orchestrator_model.clone(),
            persona_model: self.ai.persona_model.clone(),
            default_persona: self.simulation.default_persona_key(),
            max_conversation_turns: self.simulation.max_conversation_turns,
        }
    }
}
