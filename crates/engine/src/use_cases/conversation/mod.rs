//! Conversation orchestration.
//!
//! Drives one session: start from a quest or topic, append answers and
//! follow-up questions, then turn the answers into a saved narrative.

use std::sync::Arc;

use memory_keeper_domain::{
    find_quest, ConversationTurn, DomainError, NarrativeArtifact, Quest, Session,
    MIN_USER_TURNS_TO_COMPLETE,
};

use crate::infrastructure::ports::ClockPort;
use crate::use_cases::narrative::{NarrativeError, StoryNavigator};
use crate::use_cases::records::{DuplicateGuard, RecordError, SaveOutcome};

/// How a session picks its theme.
#[derive(Debug, Clone)]
pub enum SessionStart {
    Quest(String),
    Topic(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    #[error("Unknown quest: {0}")]
    UnknownQuest(String),
    #[error("Answer text is required")]
    EmptyAnswer,
    #[error("At least {required} answers are needed, got {actual}")]
    NotEnoughAnswers { required: usize, actual: usize },
    #[error("Session is already completed")]
    AlreadyCompleted,
    #[error(transparent)]
    Narrative(#[from] NarrativeError),
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// A generated narrative and what happened when saving it.
#[derive(Debug, Clone)]
pub struct SavedNarrative {
    pub artifact: NarrativeArtifact,
    pub outcome: SaveOutcome,
}

pub struct ConversationOrchestrator {
    navigator: Arc<dyn StoryNavigator>,
    guard: Arc<DuplicateGuard>,
    clock: Arc<dyn ClockPort>,
}

impl ConversationOrchestrator {
    pub fn new(
        navigator: Arc<dyn StoryNavigator>,
        guard: Arc<DuplicateGuard>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            navigator,
            guard,
            clock,
        }
    }

    /// New session whose first turn is the quest's opening question.
    pub async fn start(&self, start: SessionStart) -> Result<Session, ConversationError> {
        let quest = match start {
            SessionStart::Quest(id) => {
                find_quest(&id).ok_or(ConversationError::UnknownQuest(id))?
            }
            SessionStart::Topic(topic) => {
                let question = self.navigator.produce_opening_question(&topic).await;
                Quest::custom(&topic, question)
            }
        };

        let session = Session::start(
            quest.id,
            quest.title,
            quest.initial_question,
            self.clock.now(),
        );
        tracing::info!(session_id = %session.id(), quest_title = %session.quest_title(), "Started session");
        Ok(session)
    }

    /// Append the user's answer and the next question. Returns the question.
    pub async fn respond(
        &self,
        session: &mut Session,
        text: &str,
    ) -> Result<String, ConversationError> {
        session
            .append_user_turn(text, self.clock.now())
            .map_err(map_domain_error)?;

        let question = self
            .navigator
            .produce_follow_up(session.quest_title(), session.turns())
            .await?;

        session
            .append_assistant_turn(question.clone(), self.clock.now())
            .map_err(map_domain_error)?;
        Ok(question)
    }

    /// Mark the session complete, generate its narrative and save it.
    ///
    /// `session` is modified even when saving fails; callers that keep
    /// sessions should only store it back on success.
    pub async fn complete(
        &self,
        session: &mut Session,
    ) -> Result<SavedNarrative, ConversationError> {
        session
            .complete(self.clock.now())
            .map_err(|e| match e {
                DomainError::InvalidStateTransition(_) => ConversationError::AlreadyCompleted,
                _ => ConversationError::NotEnoughAnswers {
                    required: MIN_USER_TURNS_TO_COMPLETE,
                    actual: session.user_turn_count(),
                },
            })?;

        self.narrate_and_save(session.quest_title(), session.turns())
            .await
    }

    /// Generate a narrative from arbitrary turns and save it through the guard.
    pub async fn narrate_and_save(
        &self,
        quest_title: &str,
        turns: &[ConversationTurn],
    ) -> Result<SavedNarrative, ConversationError> {
        let artifact = self.navigator.produce_narrative(quest_title, turns).await;
        let outcome = self
            .guard
            .save_if_not_duplicate(&artifact, quest_title)
            .await?;
        Ok(SavedNarrative { artifact, outcome })
    }
}

fn map_domain_error(err: DomainError) -> ConversationError {
    match err {
        DomainError::InvalidStateTransition(_) => ConversationError::AlreadyCompleted,
        _ => ConversationError::EmptyAnswer,
    }
}
