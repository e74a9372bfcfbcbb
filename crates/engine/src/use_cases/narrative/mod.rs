//! Story generation: follow-up questions, opening questions and the final
//! narrative artifact.
//!
//! [`NarrativeGenerator`] talks to the LLM port and substitutes a canned
//! result whenever the call or the parse fails. [`MockNavigator`] serves the
//! same interface from fixed pools when no usable credential is configured.

mod extract;
mod mock;
mod prompts;

use std::sync::Arc;

use async_trait::async_trait;
use memory_keeper_domain::{last_user_turn, user_transcript, ConversationTurn, NarrativeArtifact};

use crate::infrastructure::ports::{ClockPort, LlmError, LlmPort, LlmRequest};

pub use extract::{extract_json, parse_narrative};
pub use mock::{MockLatency, MockNavigator};
pub use prompts::{fallback_narrative, fallback_opening_question, FALLBACK_FOLLOW_UP};

#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("No user message found to generate follow-up")]
    NoUserInput,
}

/// Failure of a single generation attempt, before fallback substitution.
#[derive(Debug, thiserror::Error)]
enum GenerationError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("Unparseable narrative: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The three story operations, live or canned.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoryNavigator: Send + Sync {
    /// Next question for the conversation. Needs at least one user turn.
    async fn produce_follow_up(
        &self,
        theme: &str,
        history: &[ConversationTurn],
    ) -> Result<String, NarrativeError>;

    async fn produce_opening_question(&self, topic: &str) -> String;

    /// Narrative built from the user turns only.
    async fn produce_narrative(
        &self,
        quest_title: &str,
        turns: &[ConversationTurn],
    ) -> NarrativeArtifact;
}

/// LLM-backed navigator.
pub struct NarrativeGenerator {
    llm: Arc<dyn LlmPort>,
    clock: Arc<dyn ClockPort>,
}

impl NarrativeGenerator {
    pub fn new(llm: Arc<dyn LlmPort>, clock: Arc<dyn ClockPort>) -> Self {
        Self { llm, clock }
    }

    async fn request_text(&self, prompt: String) -> Result<String, LlmError> {
        let response = self.llm.generate(LlmRequest::prompt(prompt)).await?;
        Ok(response.content.trim().to_string())
    }

    async fn try_narrative(
        &self,
        quest_title: &str,
        transcript: &str,
    ) -> Result<NarrativeArtifact, GenerationError> {
        let raw = self
            .request_text(prompts::narrative_prompt(quest_title, transcript))
            .await?;
        parse_narrative(&raw, self.clock.now()).map_err(|e| {
            tracing::debug!(raw = %raw, "Model output was not a narrative object");
            GenerationError::from(e)
        })
    }
}

#[async_trait]
impl StoryNavigator for NarrativeGenerator {
    async fn produce_follow_up(
        &self,
        theme: &str,
        history: &[ConversationTurn],
    ) -> Result<String, NarrativeError> {
        let last = last_user_turn(history).ok_or(NarrativeError::NoUserInput)?;

        match self
            .request_text(prompts::follow_up_prompt(theme, &last.text))
            .await
        {
            Ok(question) => Ok(question),
            Err(e) => {
                tracing::warn!(error = %e, theme = %theme, "Follow-up generation failed, using fallback");
                Ok(FALLBACK_FOLLOW_UP.to_string())
            }
        }
    }

    async fn produce_opening_question(&self, topic: &str) -> String {
        match self.request_text(prompts::opening_prompt(topic)).await {
            Ok(question) => question,
            Err(e) => {
                tracing::warn!(error = %e, topic = %topic, "Opening question generation failed, using fallback");
                fallback_opening_question(topic)
            }
        }
    }

    async fn produce_narrative(
        &self,
        quest_title: &str,
        turns: &[ConversationTurn],
    ) -> NarrativeArtifact {
        let transcript = user_transcript(turns);

        match self.try_narrative(quest_title, &transcript).await {
            Ok(artifact) => {
                tracing::info!(
                    quest_title = %quest_title,
                    title = %artifact.title,
                    "Generated narrative"
                );
                artifact
            }
            Err(e) => {
                tracing::warn!(error = %e, quest_title = %quest_title, "Narrative generation failed, using fallback");
                fallback_narrative(quest_title, &transcript, self.clock.now())
            }
        }
    }
}
