//! Simulation domain - phases, transcripts and structured outputs.
//!
//! # Module Organization
//!
//! - `phase` - The four conversation phases and their ordering
//! - `transition` - Keyword and turn-ceiling transition rules
//! - `phase_state` - Per-session bookkeeping read by the responders
//! - `session` - Event log with an incremental history cursor
//! - `outputs` - Structured outputs and their schemas
//! - `persona` - Persona records and name normalization
//! - `prompts` - Responder system prompts

mod errors;
mod events;
mod outputs;
mod persona;
mod phase;
mod phase_state;
pub mod prompts;
mod session;
mod transition;

pub use errors::{ExtractionError, SimulationError};
pub use events::{OutputEvent, DISPATCHER_AUTHOR, USER_AUTHOR};
pub use outputs::{
    parse_structured, CoordinatorReply, Feedback, FieldType, ListenerReply, OutputSchema,
    ProblemSummary, SchemaField, SimulationConfig, StructuredOutput, DEFAULT_MAX_TURNS,
    MAX_TURNS_LIMIT,
};
pub use persona::{actor_author, display_name, normalize_persona_name, Persona};
pub use phase::Phase;
pub use phase_state::{HistoryEntry, PhaseState};
pub use session::{Session, SessionEvent};
pub use transition::{PhaseTransitionEvaluator, Transition, TransitionCause, TriggerTable};
