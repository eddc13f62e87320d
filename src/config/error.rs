//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("At least one completion attempt is required")]
    InvalidMaxAttempts,

    #[error("Model identifier for {0} cannot be empty")]
    EmptyModel(&'static str),

    #[error("max_conversation_turns must be between 1 and {max}, got {actual}")]
    InvalidMaxTurns { max: u32, actual: u32 },

    #[error("Invalid persona name: {0}")]
    InvalidPersona(String),
}
