//! Domain layer containing the simulator's business rules.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (identifiers, validation errors, state machine trait)
//! - `simulation` - Phases, transition rules, session transcripts and structured outputs

pub mod foundation;
pub mod simulation;
