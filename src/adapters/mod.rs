//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Completion providers (Gemini, OpenAI, resilience wrapper, mock)
//! - `persona` - Persona record loading
//! - `storage` - Session stores (in-memory, YAML files)

pub mod ai;
pub mod persona;
pub mod storage;
