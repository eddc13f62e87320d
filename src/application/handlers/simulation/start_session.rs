//! StartSessionHandler - Create a new simulation session

use std::sync::Arc;

use thiserror::Error;

use crate::domain::foundation::SessionKey;
use crate::domain::simulation::Session;
use crate::ports::{SessionStore, SessionStoreError};

/// Command to start a session
#[derive(Debug, Clone)]
pub struct StartSessionCommand {
    pub key: SessionKey,
}

/// Result of starting a session
#[derive(Debug, Clone)]
pub struct StartSessionResult {
    pub session: Session,
}

/// Error type for starting sessions
#[derive(Debug, Error)]
pub enum StartSessionError {
    #[error("Session already exists: {0}")]
    AlreadyExists(SessionKey),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<SessionStoreError> for StartSessionError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::AlreadyExists(key) => StartSessionError::AlreadyExists(key),
            other => StartSessionError::Storage(other.to_string()),
        }
    }
}

/// Handler for starting sessions
pub struct StartSessionHandler {
    store: Arc<dyn SessionStore>,
}

impl StartSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, cmd: StartSessionCommand) -> Result<StartSessionResult, StartSessionError> {
        let session = Session::new(cmd.key);
        self.store.create(&session).await?;

        tracing::info!(session = %session.key, "Session started");
        Ok(StartSessionResult { session })
    }
}
