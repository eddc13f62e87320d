//! Error types for the simulation domain

use super::Phase;

/// Failures while turning a completion reply into a structured output
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ExtractionError {
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    Invalid(String),
}

/// Errors surfaced by a dispatch
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum SimulationError {
    #[error("Persona not found: {0}")]
    PersonaNotFound(String),

    #[error("Persona '{name}' could not be loaded: {reason}")]
    PersonaUnavailable { name: String, reason: String },

    #[error("{responder} returned malformed structured output: {reason}")]
    MalformedStructuredOutput { responder: String, reason: String },

    #[error("Completion service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Completion failed: {0}")]
    CompletionFailed(String),

    #[error("Invalid phase state, resuming in {phase}: {reason}")]
    InvalidPhaseState { phase: Phase, reason: String },
}

impl SimulationError {
    pub fn malformed(responder: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedStructuredOutput {
            responder: responder.into(),
            reason: reason.into(),
        }
    }

    /// Errors the caller may retry by sending the same message again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_))
    }
}
