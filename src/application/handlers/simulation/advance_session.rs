//! AdvanceSessionHandler - Dispatch one user message and commit the turn

use std::sync::Arc;

use thiserror::Error;

use crate::application::TurnDispatcher;
use crate::domain::foundation::SessionKey;
use crate::domain::simulation::{OutputEvent, Phase, SimulationError};
use crate::ports::{SessionStore, SessionStoreError};

/// Command to send a user message into a session
#[derive(Debug, Clone)]
pub struct AdvanceSessionCommand {
    pub key: SessionKey,
    pub message: String,
}

/// Result of advancing a session
#[derive(Debug, Clone)]
pub struct AdvanceSessionResult {
    pub events: Vec<OutputEvent>,
    /// Phase after the turn.
    pub phase: Phase,
}

/// Error type for advancing sessions
#[derive(Debug, Error)]
pub enum AdvanceSessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionKey),

    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

impl From<SessionStoreError> for AdvanceSessionError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(key) => AdvanceSessionError::NotFound(key),
            other => AdvanceSessionError::Storage(other.to_string()),
        }
    }
}

/// Handler for advancing sessions
pub struct AdvanceSessionHandler {
    store: Arc<dyn SessionStore>,
    dispatcher: Arc<TurnDispatcher>,
}

impl AdvanceSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>, dispatcher: Arc<TurnDispatcher>) -> Self {
        Self { store, dispatcher }
    }

    pub async fn handle(
        &self,
        cmd: AdvanceSessionCommand,
    ) -> Result<AdvanceSessionResult, AdvanceSessionError> {
        let message = cmd.message.trim();
        if message.is_empty() {
            return Err(AdvanceSessionError::EmptyMessage);
        }

        let mut session = self.store.load(&cmd.key).await?;
        let events = match self.dispatcher.dispatch(&mut session, message).await {
            Ok(events) => events,
            Err(err) => {
                tracing::warn!(session = %cmd.key, error = %err, "Turn failed, nothing committed");
                return Err(err.into());
            }
        };

        self.store.save(&session).await?;
        Ok(AdvanceSessionResult {
            events,
            phase: session.current_phase(),
        })
    }
}
