//! Persona Repository Port - Interface for loading persona records.
//!
//! Personas are read-only data files keyed by a normalized name
//! (`stephen`, `cto_jack`). Loads are all-or-nothing: a caller either gets a
//! complete, validated record or an error.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::simulation::Persona;

/// Errors that can occur while loading a persona
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PersonaRepositoryError {
    #[error("Persona not found: {0}")]
    NotFound(String),

    #[error("Invalid persona name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Persona '{name}' is malformed: {reason}")]
    Invalid { name: String, reason: String },

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for loading personas by name
#[async_trait]
pub trait PersonaRepository: Send + Sync {
    /// Load a persona
    ///
    /// # Arguments
    /// * `name` - Persona identifier; normalized before lookup
    ///
    /// # Errors
    /// Returns `PersonaRepositoryError::NotFound` if no record exists
    async fn load(&self, name: &str) -> Result<Arc<Persona>, PersonaRepositoryError>;

    /// List the identifiers of all available personas
    async fn list(&self) -> Result<Vec<String>, PersonaRepositoryError>;
}
