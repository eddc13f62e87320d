//! Facilitator - debrief grounded in the simulation transcript.
//!
//! The first feedback-phase turn produces a structured `Feedback`, which is
//! stored so later turns answer follow-up questions against it. An empty
//! transcript yields a fixed notice and no model call.

use std::sync::Arc;

use async_trait::async_trait;

use super::{complete_structured, complete_text, transcript_messages, Responder, TurnContext};
use crate::domain::simulation::{prompts, Feedback, OutputEvent, Phase, SimulationError};
use crate::ports::{AIProvider, CompletionRequest, Message, RequestMetadata};

const NAME: &str = "Facilitator";
const FEEDBACK_REQUEST: &str = "The simulation is over. Please give me your feedback.";

pub struct FacilitatorResponder {
    provider: Arc<dyn AIProvider>,
    model: String,
}

impl FacilitatorResponder {
    pub fn new(provider: Arc<dyn AIProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    fn request(&self, ctx: &TurnContext<'_>) -> CompletionRequest {
        CompletionRequest::new(&self.model, RequestMetadata::new(ctx.key.clone(), NAME))
    }
}

#[async_trait]
impl Responder for FacilitatorResponder {
    fn name(&self) -> &str {
        NAME
    }

    async fn respond(&self, ctx: &mut TurnContext<'_>) -> Result<Vec<OutputEvent>, SimulationError> {
        if ctx.state.simulation_history.is_empty() {
            return Ok(vec![OutputEvent::new(NAME, prompts::EMPTY_TRANSCRIPT_NOTICE)]);
        }
        let transcript = ctx.state.simulation_transcript();

        if let Some(feedback) = &ctx.state.feedback {
            let request = self
                .request(ctx)
                .with_system_prompt(prompts::facilitator_follow_up(
                    ctx.persona_key,
                    &transcript,
                    &feedback.render(),
                ))
                .with_messages(transcript_messages(
                    ctx.state.history_for(Phase::Feedback),
                    FEEDBACK_REQUEST,
                ));
            let reply = complete_text(self.provider.as_ref(), request).await?;
            return Ok(vec![OutputEvent::new(NAME, reply)]);
        }

        let request = self
            .request(ctx)
            .with_system_prompt(prompts::facilitator(ctx.persona_key, &transcript))
            .with_messages(vec![Message::user(FEEDBACK_REQUEST)]);
        let feedback: Feedback = complete_structured(self.provider.as_ref(), request).await?;

        tracing::info!(session = %ctx.key, "Feedback delivered");
        let text = feedback.render();
        ctx.state.feedback = Some(feedback);
        Ok(vec![OutputEvent::new(NAME, text)])
    }
}
