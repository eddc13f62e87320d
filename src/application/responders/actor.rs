//! Actor - plays the configured persona during the simulation.
//!
//! The persona is resolved per turn from the phase state, so one responder
//! serves every persona; records come from the (cached) persona repository.

use std::sync::Arc;

use async_trait::async_trait;

use super::{complete_text, transcript_messages, Responder, TurnContext};
use crate::domain::simulation::{actor_author, prompts, OutputEvent, SimulationError};
use crate::ports::{AIProvider, CompletionRequest, PersonaRepository, RequestMetadata};

const NAME: &str = "Actor";
const OPENING_CUE: &str = "The meeting is starting now. Open the meeting in character.";

pub struct ActorResponder {
    provider: Arc<dyn AIProvider>,
    personas: Arc<dyn PersonaRepository>,
    model: String,
}

impl ActorResponder {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        personas: Arc<dyn PersonaRepository>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            personas,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Responder for ActorResponder {
    fn name(&self) -> &str {
        NAME
    }

    async fn respond(&self, ctx: &mut TurnContext<'_>) -> Result<Vec<OutputEvent>, SimulationError> {
        let persona = self.personas.load(ctx.persona_key).await?;
        let author = actor_author(ctx.persona_key);

        let request = CompletionRequest::new(&self.model, RequestMetadata::new(ctx.key.clone(), &author))
            .with_system_prompt(prompts::actor(
                ctx.persona_key,
                &persona,
                ctx.state.simulation_config.as_ref(),
            ))
            .with_messages(transcript_messages(&ctx.state.simulation_history, OPENING_CUE));

        let reply = complete_text(self.provider.as_ref(), request).await?;
        Ok(vec![OutputEvent::new(author, reply)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::adapters::persona::YamlPersonaRepository;
    use crate::application::responders::test_support::*;
    use crate::domain::simulation::{Phase, USER_AUTHOR};
    use crate::ports::{AIError, MessageRole};

    fn personas_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("cto_jack.yaml"),
            "name: Jack\ndescription: Impatient CTO\ninstruction: Push back on anything that adds on-call load.\n",
        )
        .unwrap();
        dir
    }

    fn responder(provider: &MockAIProvider, dir: &tempfile::TempDir) -> ActorResponder {
        ActorResponder::new(
            Arc::new(provider.clone()),
            Arc::new(YamlPersonaRepository::new(dir.path())),
            "gemini-1.5-flash",
        )
    }

    #[tokio::test]
    async fn replies_in_character_as_persona() {
        let dir = personas_dir();
        let provider = MockAIProvider::new().with_response("  Who is going to carry the pager for this?  ");
        let key = key();
        let mut state = state_in(Phase::Simulation);
        state
            .simulation_history
            .push(entry(USER_AUTHOR, "I want to adopt a new queue", Phase::Simulation, Some(1)));

        let events = responder(&provider, &dir)
            .respond(&mut TurnContext { key: &key, state: &mut state, persona_key: "cto_jack" })
            .await
            .unwrap();

        assert_eq!(
            events,
            vec![OutputEvent::new("Actor_Cto_Jack", "Who is going to carry the pager for this?")]
        );
        let call = provider.last_call().unwrap();
        assert_eq!(call.metadata.responder, "Actor_Cto_Jack");
        assert!(call.system_prompt.unwrap().contains("Push back on anything that adds on-call load."));
        assert_eq!(call.messages[0].content, "I want to adopt a new queue");
    }

    #[tokio::test]
    async fn first_simulation_turn_opens_the_meeting() {
        let dir = personas_dir();
        let provider = MockAIProvider::new().with_response("You have ten minutes.");
        let key = key();
        let mut state = state_in(Phase::Simulation);

        responder(&provider, &dir)
            .respond(&mut TurnContext { key: &key, state: &mut state, persona_key: "cto_jack" })
            .await
            .unwrap();

        let call = provider.last_call().unwrap();
        assert_eq!(call.messages.len(), 1);
        assert_eq!(call.messages[0].role, MessageRole::User);
        assert_eq!(call.messages[0].content, OPENING_CUE);
    }

    #[tokio::test]
    async fn missing_persona_is_reported_without_a_model_call() {
        let dir = personas_dir();
        let provider = MockAIProvider::new();
        let key = key();
        let mut state = state_in(Phase::Simulation);

        let err = responder(&provider, &dir)
            .respond(&mut TurnContext { key: &key, state: &mut state, persona_key: "nonexistent_persona" })
            .await
            .unwrap_err();

        assert_eq!(err, SimulationError::PersonaNotFound("nonexistent_persona".to_string()));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn completion_failure_is_propagated() {
        let dir = personas_dir();
        let provider = MockAIProvider::new().with_error(AIError::rate_limited(5));
        let key = key();
        let mut state = state_in(Phase::Simulation);

        let err = responder(&provider, &dir)
            .respond(&mut TurnContext { key: &key, state: &mut state, persona_key: "cto_jack" })
            .await
            .unwrap_err();

        assert!(matches!(err, SimulationError::ServiceUnavailable(_)));
    }
}
