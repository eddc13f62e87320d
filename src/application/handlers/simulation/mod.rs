//! Simulation Command and Query Handlers
//!
//! CQRS handlers for the lifecycle of one simulated conversation.
//!
//! ## Commands
//! - `StartSession` - Create an empty session in the listener phase
//! - `AdvanceSession` - Dispatch one user message and commit the turn
//! - `EndSession` - Remove a session
//!
//! ## Queries
//! - `GetSessionState` - Read the current phase state of a session

mod advance_session;
mod end_session;
mod get_session_state;
mod start_session;

pub use advance_session::{
    AdvanceSessionCommand, AdvanceSessionError, AdvanceSessionHandler, AdvanceSessionResult,
};
pub use end_session::{EndSessionCommand, EndSessionError, EndSessionHandler};
pub use get_session_state::{
    GetSessionStateError, GetSessionStateHandler, GetSessionStateQuery, GetSessionStateResult,
};
pub use start_session::{
    StartSessionCommand, StartSessionError, StartSessionHandler, StartSessionResult,
};
