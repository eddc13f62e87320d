//! Session Store Port - Interface for keeping sessions between turns.
//!
//! The store hands out owned copies. A dispatch works on its copy and the
//! handler saves it back only once the whole turn has succeeded.

use async_trait::async_trait;

use crate::domain::foundation::SessionKey;
use crate::domain::simulation::Session;

/// Errors that can occur during session storage operations
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session not found: {0}")]
    NotFound(SessionKey),

    #[error("Session already exists: {0}")]
    AlreadyExists(SessionKey),

    #[error("Failed to serialize session: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize session: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for persisting and loading sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a new session
    ///
    /// # Errors
    /// Returns `SessionStoreError::AlreadyExists` if the key is taken
    async fn create(&self, session: &Session) -> Result<(), SessionStoreError>;

    /// Load a session
    ///
    /// # Errors
    /// Returns `SessionStoreError::NotFound` if no session exists
    async fn load(&self, key: &SessionKey) -> Result<Session, SessionStoreError>;

    /// Overwrite a stored session
    async fn save(&self, session: &Session) -> Result<(), SessionStoreError>;

    /// Check if a session exists
    async fn exists(&self, key: &SessionKey) -> Result<bool, SessionStoreError>;

    /// Remove a session. Removing a missing session is not an error.
    async fn delete(&self, key: &SessionKey) -> Result<(), SessionStoreError>;
}
