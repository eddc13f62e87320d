//! Phase responders.
//!
//! One responder per phase, each turning the working phase state into output
//! events through a single completion call (plus at most one re-prompt when a
//! structured reply does not conform).
//!
//! - `ListenerResponder` - Problem intake, produces a `ProblemSummary`
//! - `CoordinatorResponder` - Persona negotiation, produces a `SimulationConfig`
//! - `ActorResponder` - Stays in character as the configured persona
//! - `FacilitatorResponder` - Transcript-grounded `Feedback` and follow-ups

mod actor;
mod coordinator;
mod facilitator;
mod listener;

pub use actor::ActorResponder;
pub use coordinator::CoordinatorResponder;
pub use facilitator::FacilitatorResponder;
pub use listener::ListenerResponder;

use async_trait::async_trait;

use crate::domain::foundation::SessionKey;
use crate::domain::simulation::{
    normalize_persona_name, parse_structured, HistoryEntry, OutputEvent, PhaseState,
    SimulationError, StructuredOutput,
};
use crate::ports::{
    AIError, AIProvider, CompletionRequest, Message, MessageRole, PersonaRepositoryError,
};

/// Everything a responder may read or update during one turn.
///
/// `state` is the dispatcher's working copy; nothing written here is visible
/// to the caller unless the whole turn succeeds.
pub struct TurnContext<'a> {
    pub key: &'a SessionKey,
    pub state: &'a mut PhaseState,
    /// Normalized key of the persona the Actor plays.
    pub persona_key: &'a str,
}

/// A phase-specific reply generator.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Author name stamped on the events this responder produces.
    fn name(&self) -> &str;

    /// Produces the events answering the latest user message.
    async fn respond(&self, ctx: &mut TurnContext<'_>) -> Result<Vec<OutputEvent>, SimulationError>;
}

impl From<AIError> for SimulationError {
    fn from(err: AIError) -> Self {
        if err.is_retryable() {
            SimulationError::ServiceUnavailable(err.to_string())
        } else {
            SimulationError::CompletionFailed(err.to_string())
        }
    }
}

impl From<PersonaRepositoryError> for SimulationError {
    fn from(err: PersonaRepositoryError) -> Self {
        match err {
            PersonaRepositoryError::NotFound(name) => SimulationError::PersonaNotFound(name),
            PersonaRepositoryError::InvalidName { name, .. } => {
                SimulationError::PersonaNotFound(name)
            }
            PersonaRepositoryError::Invalid { name, reason } => {
                SimulationError::PersonaUnavailable { name, reason }
            }
            PersonaRepositoryError::IoError(reason) => SimulationError::PersonaUnavailable {
                name: String::new(),
                reason,
            },
        }
    }
}

/// Persona key the Actor should play: `requested` (as settled by the
/// Coordinator) when present, else `default_persona`.
pub fn resolve_persona(
    requested: Option<&str>,
    default_persona: &str,
) -> Result<String, SimulationError> {
    match requested {
        Some(requested) => normalize_persona_name(requested)
            .map_err(|_| SimulationError::PersonaNotFound(requested.to_string())),
        None => Ok(default_persona.to_string()),
    }
}

/// Converts transcript entries into completion messages.
///
/// User lines become user messages and everything else becomes assistant
/// messages; dispatcher announcements are skipped. Providers expect the
/// conversation to open with a user message, so `opening_cue` is prepended
/// when it would not.
pub(crate) fn transcript_messages<'e>(
    entries: impl IntoIterator<Item = &'e HistoryEntry>,
    opening_cue: &str,
) -> Vec<Message> {
    let mut messages: Vec<Message> = entries
        .into_iter()
        .filter(|entry| !entry.is_from_dispatcher())
        .map(|entry| {
            if entry.is_from_user() {
                Message::user(entry.message.clone())
            } else {
                Message::assistant(entry.message.clone())
            }
        })
        .collect();

    if messages.first().map(|m| m.role) != Some(MessageRole::User) {
        messages.insert(0, Message::user(opening_cue));
    }
    messages
}

/// Requests a structured reply of type `T`.
///
/// A reply that fails to parse or validate is sent back once with the
/// validation error; a second failure is `MalformedStructuredOutput`.
pub(crate) async fn complete_structured<T: StructuredOutput>(
    provider: &dyn AIProvider,
    request: CompletionRequest,
) -> Result<T, SimulationError> {
    let responder = request.metadata.responder.clone();
    let request = request.with_schema_for::<T>();

    tracing::debug!(responder = %responder, model = %request.model, "Requesting structured completion");
    let first = provider.complete(request.clone()).await?;
    let err = match parse_structured::<T>(&first.content) {
        Ok(parsed) => return Ok(parsed),
        Err(err) => err,
    };

    tracing::warn!(responder = %responder, error = %err, "Structured reply rejected, re-prompting once");
    let retry = request
        .with_message(MessageRole::Assistant, first.content)
        .with_message(
            MessageRole::User,
            format!(
                "Your previous reply could not be used ({}). Reply again with a single JSON object matching the requested schema.",
                err
            ),
        );
    let second = provider.complete(retry).await?;
    parse_structured::<T>(&second.content)
        .map_err(|err| SimulationError::malformed(responder, err.to_string()))
}

/// Requests a free-text reply.
pub(crate) async fn complete_text(
    provider: &dyn AIProvider,
    request: CompletionRequest,
) -> Result<String, SimulationError> {
    tracing::debug!(
        responder = %request.metadata.responder,
        model = %request.model,
        "Requesting completion"
    );
    let response = provider.complete(request).await?;
    Ok(response.content.trim().to_string())
}
