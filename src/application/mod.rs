//! Application layer - Responders, the turn dispatcher, and handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, handlers separate commands (write) from queries (read).

mod dispatcher;
pub mod handlers;
pub mod responders;

pub use dispatcher::{DispatcherSettings, TurnDispatcher, DEFAULT_PERSONA};
pub use handlers::{
    AdvanceSessionCommand, AdvanceSessionError, AdvanceSessionHandler, AdvanceSessionResult,
    EndSessionCommand, EndSessionError, EndSessionHandler, GetSessionStateError,
    GetSessionStateHandler, GetSessionStateQuery, GetSessionStateResult, StartSessionCommand,
    StartSessionError, StartSessionHandler, StartSessionResult,
};
pub use responders::Responder;
