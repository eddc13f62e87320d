//! Simulation configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;
use crate::domain::simulation::{normalize_persona_name, DEFAULT_MAX_TURNS, MAX_TURNS_LIMIT};

/// Simulation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    /// Application id used when creating session keys
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Turn ceiling when the Coordinator does not negotiate one
    #[serde(default = "default_max_turns")]
    pub max_conversation_turns: u32,

    /// Directory holding `{persona}.yaml` records
    #[serde(default = "default_personas_dir")]
    pub personas_dir: PathBuf,

    /// Persona played when none is configured
    #[serde(default = "default_persona")]
    pub default_persona: String,

    /// Directory for session files; sessions stay in memory when unset
    pub session_dir: Option<PathBuf>,
}

impl SimulatorConfig {
    /// Validate simulation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.app_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("APP_NAME"));
        }
        if self.max_conversation_turns == 0 || self.max_conversation_turns > MAX_TURNS_LIMIT {
            return Err(ValidationError::InvalidMaxTurns {
                max: MAX_TURNS_LIMIT,
                actual: self.max_conversation_turns,
            });
        }
        normalize_persona_name(&self.default_persona)
            .map_err(|e| ValidationError::InvalidPersona(e.to_string()))?;
        Ok(())
    }

    /// The default persona as a storage key
    pub fn default_persona_key(&self) -> String {
        normalize_persona_name(&self.default_persona).unwrap_or_else(|_| default_persona())
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            max_conversation_turns: default_max_turns(),
            personas_dir: default_personas_dir(),
            default_persona: default_persona(),
            session_dir: None,
        }
    }
}

fn default_app_name() -> String {
    "corp_sim".to_string()
}

fn default_max_turns() -> u32 {
    DEFAULT_MAX_TURNS
}

fn default_personas_dir() -> PathBuf {
    PathBuf::from("personas")
}

fn default_persona() -> String {
    "stephen".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_defaults() {
        let config = SimulatorConfig::default();
        assert_eq!(config.app_name, "corp_sim");
        assert_eq!(config.max_conversation_turns, 10);
        assert_eq!(config.personas_dir, PathBuf::from("personas"));
        assert_eq!(config.default_persona_key(), "stephen");
        assert!(config.session_dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_turns_rejected() {
        let config = SimulatorConfig {
            max_conversation_turns: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidMaxTurns { max: 100, actual: 0 })
        );
    }

    #[test]
    fn test_default_persona_is_normalized() {
        let config = SimulatorConfig {
            default_persona: "CTO Jack".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.default_persona_key(), "cto_jack");
    }

    #[test]
    fn test_path_like_persona_rejected() {
        let config = SimulatorConfig {
            default_persona: "../etc/passwd".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidPersona(_))));
    }
}
