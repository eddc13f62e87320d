//! Coordinator - negotiates the persona and meeting setup.

use std::sync::Arc;

use async_trait::async_trait;

use super::{complete_structured, resolve_persona, transcript_messages, Responder, TurnContext};
use crate::domain::simulation::{prompts, CoordinatorReply, OutputEvent, SimulationError};
use crate::ports::{AIProvider, CompletionRequest, PersonaRepository, RequestMetadata};

const NAME: &str = "Coordinator";
const OPENING_CUE: &str = "I would like to practice a conversation about this problem.";

pub struct CoordinatorResponder {
    provider: Arc<dyn AIProvider>,
    personas: Arc<dyn PersonaRepository>,
    model: String,
    default_persona: String,
    default_max_turns: u32,
}

impl CoordinatorResponder {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        personas: Arc<dyn PersonaRepository>,
        model: impl Into<String>,
        default_persona: impl Into<String>,
        default_max_turns: u32,
    ) -> Self {
        Self {
            provider,
            personas,
            model: model.into(),
            default_persona: default_persona.into(),
            default_max_turns,
        }
    }

    async fn system_prompt(&self, ctx: &TurnContext<'_>) -> String {
        let mut prompt = prompts::coordinator(
            ctx.state.problem_summary.as_ref(),
            &self.default_persona,
            self.default_max_turns,
        );
        match self.personas.list().await {
            Ok(available) if !available.is_empty() => {
                prompt.push_str(&format!(
                    "\n\n**Available personas:** {}. `target_persona` must be one of these.",
                    available.join(", ")
                ));
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(error = %err, "Could not list personas"),
        }
        prompt
    }
}

#[async_trait]
impl Responder for CoordinatorResponder {
    fn name(&self) -> &str {
        NAME
    }

    async fn respond(&self, ctx: &mut TurnContext<'_>) -> Result<Vec<OutputEvent>, SimulationError> {
        let request = CompletionRequest::new(&self.model, RequestMetadata::new(ctx.key.clone(), NAME))
            .with_system_prompt(self.system_prompt(ctx).await)
            .with_messages(transcript_messages(&ctx.state.conversation_history, OPENING_CUE));

        let reply: CoordinatorReply = complete_structured(self.provider.as_ref(), request).await?;

        let mut text = reply.reply;
        if let Some(config) = reply.simulation_config {
            // The persona has to exist before the simulation can start.
            let persona_key = resolve_persona(Some(config.target_persona.as_str()), &self.default_persona)?;
            self.personas.load(&persona_key).await?;

            let config = config.with_default_max_turns(self.default_max_turns);
            tracing::info!(session = %ctx.key, persona = %persona_key, max_turns = ?config.max_turns, "Simulation configured");
            text.push_str("\n\n");
            text.push_str(&config.render());
            ctx.state.simulation_config = Some(config);
        }
        Ok(vec![OutputEvent::new(NAME, text)])
    }
}
