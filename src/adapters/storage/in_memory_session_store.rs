//! In-Memory Session Store Adapter
//!
//! Keeps sessions in a process-local map. Used by the CLI when no session
//! directory is configured, and by tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::SessionKey;
use crate::domain::simulation::Session;
use crate::ports::{SessionStore, SessionStoreError};

/// In-memory storage for sessions
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionKey, Session>>>,
}

impl InMemorySessionStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: &Session) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.key) {
            return Err(SessionStoreError::AlreadyExists(session.key.clone()));
        }
        sessions.insert(session.key.clone(), session.clone());
        Ok(())
    }

    async fn load(&self, key: &SessionKey) -> Result<Session, SessionStoreError> {
        self.sessions
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| SessionStoreError::NotFound(key.clone()))
    }

    async fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        self.sessions
            .write()
            .await
            .insert(session.key.clone(), session.clone());
        Ok(())
    }

    async fn exists(&self, key: &SessionKey) -> Result<bool, SessionStoreError> {
        Ok(self.sessions.read().await.contains_key(key))
    }

    async fn delete(&self, key: &SessionKey) -> Result<(), SessionStoreError> {
        self.sessions.write().await.remove(key);
        Ok(())
    }
}
