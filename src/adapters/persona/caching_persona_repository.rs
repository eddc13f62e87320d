//! Caching decorator for persona repositories.
//!
//! Personas are immutable, so a successful load is memoized for the lifetime
//! of the process. Failures are not cached.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::yaml_persona_repository::normalize;
use crate::domain::simulation::Persona;
use crate::ports::{PersonaRepository, PersonaRepositoryError};

/// Memoizes loads from an inner repository, keyed by normalized name
pub struct CachingPersonaRepository<R: PersonaRepository> {
    inner: R,
    cache: RwLock<HashMap<String, Arc<Persona>>>,
}

impl<R: PersonaRepository> CachingPersonaRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub async fn cached_count(&self) -> usize {
        self.cache.read().await.len()
    }
}

#[async_trait]
impl<R: PersonaRepository> PersonaRepository for CachingPersonaRepository<R> {
    async fn load(&self, name: &str) -> Result<Arc<Persona>, PersonaRepositoryError> {
        let key = normalize(name)?;
        if let Some(persona) = self.cache.read().await.get(&key) {
            return Ok(Arc::clone(persona));
        }

        let persona = self.inner.load(&key).await?;
        let mut cache = self.cache.write().await;
        let entry = cache.entry(key).or_insert(persona);
        Ok(Arc::clone(entry))
    }

    async fn list(&self) -> Result<Vec<String>, PersonaRepositoryError> {
        self.inner.list().await
    }
}
