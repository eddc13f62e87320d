//! YAML Persona Repository
//!
//! Reads `{dir}/{name}.yaml` records with required `name`, `description` and
//! `instruction` fields.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

use crate::domain::simulation::{normalize_persona_name, Persona};
use crate::ports::{PersonaRepository, PersonaRepositoryError};

/// File-backed persona repository
#[derive(Debug, Clone)]
pub struct YamlPersonaRepository {
    dir: PathBuf,
}

impl YamlPersonaRepository {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn persona_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.yaml", key))
    }
}

pub(crate) fn normalize(name: &str) -> Result<String, PersonaRepositoryError> {
    normalize_persona_name(name).map_err(|e| PersonaRepositoryError::InvalidName {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl PersonaRepository for YamlPersonaRepository {
    async fn load(&self, name: &str) -> Result<Arc<Persona>, PersonaRepositoryError> {
        let key = normalize(name)?;
        let path = self.persona_path(&key);

        let yaml = match fs::read_to_string(&path).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PersonaRepositoryError::NotFound(key))
            }
            Err(e) => return Err(PersonaRepositoryError::IoError(e.to_string())),
        };

        let persona: Persona =
            serde_yaml::from_str(&yaml).map_err(|e| PersonaRepositoryError::Invalid {
                name: key.clone(),
                reason: e.to_string(),
            })?;
        persona
            .validate()
            .map_err(|e| PersonaRepositoryError::Invalid {
                name: key.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(persona = %key, path = %path.display(), "Loaded persona");
        Ok(Arc::new(persona))
    }

    async fn list(&self) -> Result<Vec<String>, PersonaRepositoryError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersonaRepositoryError::IoError(e.to_string())),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PersonaRepositoryError::IoError(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("yaml") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CTO_JACK: &str = "name: Jack\ndescription: Chief Technology Officer\ninstruction: |\n  Probe every integration risk.\n";

    fn repo_with(files: &[(&str, &str)]) -> (TempDir, YamlPersonaRepository) {
        let dir = TempDir::new().unwrap();
        for (name, body) in files {
            std::fs::write(dir.path().join(name), body).unwrap();
        }
        let repo = YamlPersonaRepository::new(dir.path());
        (dir, repo)
    }

    #[tokio::test]
    async fn loads_persona_by_display_name() {
        let (_dir, repo) = repo_with(&[("cto_jack.yaml", CTO_JACK)]);

        let persona = repo.load("CTO Jack").await.unwrap();

        assert_eq!(persona.name, "Jack");
        assert_eq!(persona.instruction, "Probe every integration risk.\n");
    }

    #[tokio::test]
    async fn loading_twice_is_identical() {
        let (_dir, repo) = repo_with(&[("cto_jack.yaml", CTO_JACK)]);

        let first = repo.load("cto_jack").await.unwrap();
        let second = repo.load("cto_jack").await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn missing_persona_is_not_found() {
        let (_dir, repo) = repo_with(&[]);

        let err = repo.load("nonexistent_persona").await.unwrap_err();

        assert_eq!(err, PersonaRepositoryError::NotFound("nonexistent_persona".into()));
    }

    #[tokio::test]
    async fn missing_field_is_invalid() {
        let (_dir, repo) = repo_with(&[("bob.yaml", "name: Bob\ndescription: PM\n")]);

        let err = repo.load("bob").await.unwrap_err();

        assert!(matches!(err, PersonaRepositoryError::Invalid { .. }));
    }

    #[tokio::test]
    async fn blank_instruction_is_invalid() {
        let (_dir, repo) =
            repo_with(&[("bob.yaml", "name: Bob\ndescription: PM\ninstruction: \"  \"\n")]);

        assert!(matches!(
            repo.load("bob").await,
            Err(PersonaRepositoryError::Invalid { .. })
        ));
    }

    #[tokio::test]
    async fn path_traversal_is_rejected() {
        let (_dir, repo) = repo_with(&[]);

        let err = repo.load("../etc/passwd").await.unwrap_err();

        assert!(matches!(err, PersonaRepositoryError::InvalidName { .. }));
    }

    #[tokio::test]
    async fn list_returns_sorted_yaml_stems() {
        let (_dir, repo) = repo_with(&[
            ("stephen.yaml", CTO_JACK),
            ("cto_jack.yaml", CTO_JACK),
            ("notes.txt", "ignore me"),
        ]);

        assert_eq!(repo.list().await.unwrap(), vec!["cto_jack", "stephen"]);
    }
}
