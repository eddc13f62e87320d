//! Turn Dispatcher - routes each user message to the responder for its phase.
//!
//! A dispatch works on a copy of the session and only replaces the caller's
//! session once every step has succeeded. A failed or cancelled dispatch
//! therefore leaves history, turn count and phase exactly as they were.

use std::sync::Arc;

use crate::domain::simulation::{
    OutputEvent, Phase, PhaseTransitionEvaluator, Session, SimulationError, TriggerTable,
    DEFAULT_MAX_TURNS, DISPATCHER_AUTHOR, USER_AUTHOR,
};
use crate::ports::{AIProvider, PersonaRepository};

use super::responders::{
    resolve_persona, ActorResponder, CoordinatorResponder, FacilitatorResponder,
    ListenerResponder, Responder, TurnContext,
};

/// Default persona played when the Coordinator does not settle on another.
pub const DEFAULT_PERSONA: &str = "stephen";

/// Settings shared by every dispatch.
#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    /// Model for the Listener, Coordinator and Facilitator.
    pub orchestrator_model: String,
    /// Model for the Actor.
    pub persona_model: String,
    pub default_persona: String,
    /// Turn ceiling when the Coordinator did not negotiate one.
    pub max_conversation_turns: u32,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            orchestrator_model: "gemini-1.5-flash".to_string(),
            persona_model: "gemini-1.5-flash".to_string(),
            default_persona: DEFAULT_PERSONA.to_string(),
            max_conversation_turns: DEFAULT_MAX_TURNS,
        }
    }
}

/// Phase to responder lookup table plus the transition rules.
pub struct TurnDispatcher {
    evaluator: PhaseTransitionEvaluator,
    default_persona: String,
    listener: ListenerResponder,
    coordinator: CoordinatorResponder,
    actor: ActorResponder,
    facilitator: FacilitatorResponder,
}

impl TurnDispatcher {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        personas: Arc<dyn PersonaRepository>,
        settings: DispatcherSettings,
    ) -> Self {
        Self::with_triggers(provider, personas, settings, TriggerTable::default())
    }

    /// Builds a dispatcher with custom trigger keywords.
    pub fn with_triggers(
        provider: Arc<dyn AIProvider>,
        personas: Arc<dyn PersonaRepository>,
        settings: DispatcherSettings,
        triggers: TriggerTable,
    ) -> Self {
        Self {
            evaluator: PhaseTransitionEvaluator::new(triggers, settings.max_conversation_turns),
            listener: ListenerResponder::new(provider.clone(), &settings.orchestrator_model),
            coordinator: CoordinatorResponder::new(
                provider.clone(),
                personas.clone(),
                &settings.orchestrator_model,
                &settings.default_persona,
                settings.max_conversation_turns,
            ),
            actor: ActorResponder::new(provider.clone(), personas, &settings.persona_model),
            facilitator: FacilitatorResponder::new(provider, &settings.orchestrator_model),
            default_persona: settings.default_persona,
        }
    }

    /// The responder handling `phase`.
    pub fn responder_for(&self, phase: Phase) -> &dyn Responder {
        match phase {
            Phase::Listener => &self.listener,
            Phase::Coordinator => &self.coordinator,
            Phase::Simulation => &self.actor,
            Phase::Feedback => &self.facilitator,
        }
    }

    /// Processes one user message.
    ///
    /// Returns the transition announcement (if any) followed by the
    /// responder's events. On error `session` is left untouched.
    pub async fn dispatch(
        &self,
        session: &mut Session,
        user_message: &str,
    ) -> Result<Vec<OutputEvent>, SimulationError> {
        let mut working = session.clone();
        // Anything appended before this call but never synced belongs to an
        // earlier turn; fold it in first so this turn only sees its own events.
        working.sync_history();

        let from = working.current_phase();
        let transition = self.evaluator.apply(&mut working.phase_state, user_message);
        working.append_in(from, USER_AUTHOR, user_message);

        let persona_key = resolve_persona(
            working.phase_state.requested_persona(),
            &self.default_persona,
        )?;

        let mut output = Vec::new();
        if let Some(transition) = &transition {
            let announcement = OutputEvent::announcement(transition.announcement(&persona_key));
            working.append(DISPATCHER_AUTHOR, &announcement.text);
            output.push(announcement);
        }
        working.sync_history();

        let phase = working.current_phase();
        let responder = self.responder_for(phase);
        tracing::debug!(
            session = %working.key,
            phase = %phase,
            responder = responder.name(),
            turn = working.phase_state.turn_count,
            "Dispatching turn"
        );

        let events = {
            let mut ctx = TurnContext {
                key: &working.key,
                state: &mut working.phase_state,
                persona_key: &persona_key,
            };
            responder.respond(&mut ctx).await?
        };

        for event in &events {
            working.append(&event.author, &event.text);
        }
        working.sync_history();
        output.extend(events);

        *session = working;
        Ok(output)
    }
}
