//! EndSessionHandler - Remove a finished session

use std::sync::Arc;

use thiserror::Error;

use crate::domain::foundation::SessionKey;
use crate::ports::{SessionStore, SessionStoreError};

/// Command to end a session
#[derive(Debug, Clone)]
pub struct EndSessionCommand {
    pub key: SessionKey,
}

/// Error type for ending sessions
#[derive(Debug, Error)]
pub enum EndSessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionKey),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<SessionStoreError> for EndSessionError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(key) => EndSessionError::NotFound(key),
            other => EndSessionError::Storage(other.to_string()),
        }
    }
}

/// Handler for ending sessions
pub struct EndSessionHandler {
    store: Arc<dyn SessionStore>,
}

impl EndSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, cmd: EndSessionCommand) -> Result<(), EndSessionError> {
        if !self.store.exists(&cmd.key).await? {
            return Err(EndSessionError::NotFound(cmd.key));
        }
        self.store.delete(&cmd.key).await?;

        tracing::info!(session = %cmd.key, "Session ended");
        Ok(())
    }
}
