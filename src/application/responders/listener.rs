//! Listener - problem intake and summarization.

use std::sync::Arc;

use async_trait::async_trait;

use super::{complete_structured, transcript_messages, Responder, TurnContext};
use crate::domain::simulation::{prompts, ListenerReply, OutputEvent, SimulationError};
use crate::ports::{AIProvider, CompletionRequest, RequestMetadata};

const NAME: &str = "Listener";
const OPENING_CUE: &str = "Hello, I would like help with a problem at work.";

pub struct ListenerResponder {
    provider: Arc<dyn AIProvider>,
    model: String,
}

impl ListenerResponder {
    pub fn new(provider: Arc<dyn AIProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Responder for ListenerResponder {
    fn name(&self) -> &str {
        NAME
    }

    async fn respond(&self, ctx: &mut TurnContext<'_>) -> Result<Vec<OutputEvent>, SimulationError> {
        let request = CompletionRequest::new(&self.model, RequestMetadata::new(ctx.key.clone(), NAME))
            .with_system_prompt(prompts::listener())
            .with_messages(transcript_messages(&ctx.state.conversation_history, OPENING_CUE));

        let reply: ListenerReply = complete_structured(self.provider.as_ref(), request).await?;

        let mut text = reply.reply;
        if let Some(summary) = reply.problem_summary {
            tracing::info!(session = %ctx.key, "Problem summary captured");
            text.push_str("\n\n");
            text.push_str(&summary.render());
            // A later summary replaces an earlier one as the user refines the problem.
            ctx.state.problem_summary = Some(summary);
        }
        Ok(vec![OutputEvent::new(NAME, text)])
    }
}
