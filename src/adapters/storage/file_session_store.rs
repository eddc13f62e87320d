//! File-based Session Store Adapter
//!
//! Stores each session as a YAML file on disk. File names are the SHA-256 of
//! the length-prefixed key parts, so arbitrary ids never reach the file system. Writes go
//! to a temporary file first and are renamed into place.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::foundation::SessionKey;
use crate::domain::simulation::Session;
use crate::ports::{SessionStore, SessionStoreError};

/// File-based storage for sessions
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    base_path: PathBuf,
}

impl FileSessionStore {
    /// Create a new file store rooted at `base_path`
    ///
    /// # Example
    /// ```ignore
    /// let store = FileSessionStore::new("./data/sessions");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn session_path(&self, key: &SessionKey) -> PathBuf {
        // Each part is length-prefixed so ids containing '/' cannot collide.
        let mut hasher = Sha256::new();
        for part in [key.app_id.as_str(), key.user_id.as_str(), key.session_id.as_str()] {
            hasher.update((part.len() as u64).to_be_bytes());
            hasher.update(part.as_bytes());
        }
        self.base_path
            .join(format!("{:x}.yaml", hasher.finalize()))
    }

    async fn write(&self, session: &Session) -> Result<(), SessionStoreError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| SessionStoreError::IoError(e.to_string()))?;

        let yaml = serde_yaml::to_string(session)
            .map_err(|e| SessionStoreError::SerializationFailed(e.to_string()))?;

        let path = self.session_path(&session.key);
        let tmp = path.with_extension("yaml.tmp");
        fs::write(&tmp, yaml)
            .await
            .map_err(|e| SessionStoreError::IoError(e.to_string()))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| SessionStoreError::IoError(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn create(&self, session: &Session) -> Result<(), SessionStoreError> {
        if self.exists(&session.key).await? {
            return Err(SessionStoreError::AlreadyExists(session.key.clone()));
        }
        self.write(session).await
    }

    async fn load(&self, key: &SessionKey) -> Result<Session, SessionStoreError> {
        let path = self.session_path(key);

        let yaml = match fs::read_to_string(&path).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SessionStoreError::NotFound(key.clone()))
            }
            Err(e) => return Err(SessionStoreError::IoError(e.to_string())),
        };

        serde_yaml::from_str(&yaml)
            .map_err(|e| SessionStoreError::DeserializationFailed(e.to_string()))
    }

    async fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        self.write(session).await
    }

    async fn exists(&self, key: &SessionKey) -> Result<bool, SessionStoreError> {
        fs::try_exists(self.session_path(key))
            .await
            .map_err(|e| SessionStoreError::IoError(e.to_string()))
    }

    async fn delete(&self, key: &SessionKey) -> Result<(), SessionStoreError> {
        match fs::remove_file(self.session_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionStoreError::IoError(e.to_string())),
        }
    }
}
