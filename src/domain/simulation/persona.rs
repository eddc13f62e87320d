//! Persona records and name handling.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{require_non_empty, ValidationError};

/// A data-driven behavioral profile for the Actor.
///
/// Immutable once loaded; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub description: String,
    /// Behavioral instruction text interpolated into the Actor prompt.
    pub instruction: String,
}

impl Persona {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("name", &self.name)?;
        require_non_empty("description", &self.description)?;
        require_non_empty("instruction", &self.instruction)
    }
}

/// Normalizes a persona identifier to its storage key.
///
/// `"Stephen"` becomes `stephen` and `"CTO Jack"` becomes `cto_jack`. Names
/// that could escape the persona directory are rejected.
pub fn normalize_persona_name(raw: &str) -> Result<String, ValidationError> {
    require_non_empty("persona_name", raw)?;
    if raw.contains(['/', '\\']) || raw.contains("..") {
        return Err(ValidationError::invalid_format(
            "persona_name",
            "contains a path separator",
        ));
    }

    let normalized = raw
        .trim()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();

    if !normalized
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_')
    {
        return Err(ValidationError::invalid_format(
            "persona_name",
            format!("'{}' contains unsupported characters", raw),
        ));
    }
    Ok(normalized)
}

/// Title-cases a persona key the way it is shown to the user:
/// every letter following a non-letter is upper-cased (`cto_jack` → `Cto_Jack`).
pub fn display_name(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut at_word_start = true;
    for c in key.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Author name used for Actor replies.
pub fn actor_author(key: &str) -> String {
    format!("Actor_{}", display_name(key))
}
