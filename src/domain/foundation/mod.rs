//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, validation errors and the state machine trait
//! that form the vocabulary of the simulator domain.

mod errors;
mod ids;
mod state_machine;

pub use errors::{require_non_empty, ValidationError};
pub use ids::{AppId, SessionId, SessionKey, UserId};
pub use state_machine::StateMachine;
