//! GetSessionStateHandler - Query the phase state of a session

use std::sync::Arc;

use thiserror::Error;

use crate::domain::foundation::SessionKey;
use crate::domain::simulation::{Phase, PhaseState};
use crate::ports::{SessionStore, SessionStoreError};

/// Query to get session state
#[derive(Debug, Clone)]
pub struct GetSessionStateQuery {
    pub key: SessionKey,
}

/// Result of getting session state
#[derive(Debug, Clone)]
pub struct GetSessionStateResult {
    pub phase: Phase,
    pub state: PhaseState,
    /// Number of events in the session log.
    pub event_count: usize,
}

/// Error type for getting session state
#[derive(Debug, Error)]
pub enum GetSessionStateError {
    #[error("Session not found: {0}")]
    NotFound(SessionKey),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<SessionStoreError> for GetSessionStateError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(key) => GetSessionStateError::NotFound(key),
            other => GetSessionStateError::Storage(other.to_string()),
        }
    }
}

/// Handler for getting session state
pub struct GetSessionStateHandler {
    store: Arc<dyn SessionStore>,
}

impl GetSessionStateHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        query: GetSessionStateQuery,
    ) -> Result<GetSessionStateResult, GetSessionStateError> {
        let session = self.store.load(&query.key).await?;
        Ok(GetSessionStateResult {
            phase: session.current_phase(),
            event_count: session.events.len(),
            state: session.phase_state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::domain::simulation::{Session, USER_AUTHOR};

    fn key() -> SessionKey {
        SessionKey::parse("corp_sim", "test_user", "session_123").unwrap()
    }

    #[tokio::test]
    async fn returns_current_state() {
        let store = Arc::new(InMemorySessionStore::new());
        let mut session = Session::new(key());
        session.append(USER_AUTHOR, "Our close is slow");
        session.sync_history();
        store.create(&session).await.unwrap();
        let handler = GetSessionStateHandler::new(store);

        let result = handler.handle(GetSessionStateQuery { key: key() }).await.unwrap();

        assert_eq!(result.phase, Phase::Listener);
        assert_eq!(result.event_count, 1);
        assert_eq!(result.state.conversation_history.len(), 1);
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let handler = GetSessionStateHandler::new(Arc::new(InMemorySessionStore::new()));

        let result = handler.handle(GetSessionStateQuery { key: key() }).await;

        assert!(matches!(result, Err(GetSessionStateError::NotFound(_))));
    }
}
