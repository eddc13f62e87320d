//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod simulation;

pub use simulation::{
    AdvanceSessionCommand, AdvanceSessionError, AdvanceSessionHandler, AdvanceSessionResult,
    EndSessionCommand, EndSessionError, EndSessionHandler, GetSessionStateError,
    GetSessionStateHandler, GetSessionStateQuery, GetSessionStateResult, StartSessionCommand,
    StartSessionError, StartSessionHandler, StartSessionResult,
};
