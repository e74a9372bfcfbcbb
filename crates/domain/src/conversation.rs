//! Conversation turns and the session aggregate that orders them.
//!
//! A session is created when a quest is picked and grows by appending turns.
//! Insertion order is the conversation order; nothing ever reorders or edits
//! a turn once it has been appended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, SessionId, TurnId};

/// Number of user answers required before a session may be completed.
pub const MIN_USER_TURNS_TO_COMPLETE: usize = 3;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    #[serde(alias = "ai")]
    Assistant,
    User,
}

/// One utterance in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    #[serde(default)]
    pub id: TurnId,
    #[serde(alias = "type")]
    pub role: TurnRole,
    #[serde(alias = "content")]
    pub text: String,
    #[serde(default = "Utc::now", alias = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(role: TurnRole, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: TurnId::new(),
            role,
            text: text.into(),
            created_at,
        }
    }

    pub fn assistant(text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self::new(TurnRole::Assistant, text, created_at)
    }

    pub fn user(text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self::new(TurnRole::User, text, created_at)
    }

    #[inline]
    pub fn is_user(&self) -> bool {
        self.role == TurnRole::User
    }
}

/// The most recent user turn in `turns`, if any.
pub fn last_user_turn(turns: &[ConversationTurn]) -> Option<&ConversationTurn> {
    turns.iter().rev().find(|turn| turn.is_user())
}

/// All user answers joined by a blank line, assistant turns excluded.
pub fn user_transcript(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .filter(|turn| turn.is_user())
        .map(|turn| turn.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A single memory quest conversation.
///
/// # Invariants
///
/// - `turns` only ever grows, in the order turns are produced
/// - once `completed_at` is set no further turns are accepted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    id: SessionId,
    quest_id: String,
    quest_title: String,
    turns: Vec<ConversationTurn>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Start a session whose first turn is the assistant's opening question.
    pub fn start(
        quest_id: impl Into<String>,
        quest_title: impl Into<String>,
        opening_question: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            quest_id: quest_id.into(),
            quest_title: quest_title.into(),
            turns: vec![ConversationTurn::assistant(opening_question, now)],
            started_at: now,
            completed_at: None,
        }
    }

    #[inline]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[inline]
    pub fn quest_id(&self) -> &str {
        &self.quest_id
    }

    #[inline]
    pub fn quest_title(&self) -> &str {
        &self.quest_title
    }

    #[inline]
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    #[inline]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[inline]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn user_turn_count(&self) -> usize {
        self.turns.iter().filter(|turn| turn.is_user()).count()
    }

    /// Whether enough answers have been collected to write the narrative.
    pub fn can_complete(&self) -> bool {
        !self.is_completed() && self.user_turn_count() >= MIN_USER_TURNS_TO_COMPLETE
    }

    /// Append a user answer. Blank answers are rejected.
    pub fn append_user_turn(
        &mut self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<&ConversationTurn, DomainError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::validation("Answer cannot be empty"));
        }
        self.push(ConversationTurn::user(text, now))
    }

    /// Append an assistant question.
    pub fn append_assistant_turn(
        &mut self,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<&ConversationTurn, DomainError> {
        self.push(ConversationTurn::assistant(text, now))
    }

    /// Mark the session complete. Requires at least three user answers.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.is_completed() {
            return Err(DomainError::invalid_state_transition(
                "Session is already completed",
            ));
        }
        let answers = self.user_turn_count();
        if answers < MIN_USER_TURNS_TO_COMPLETE {
            return Err(DomainError::validation(format!(
                "At least {} answers are needed to finish a session, got {}",
                MIN_USER_TURNS_TO_COMPLETE, answers
            )));
        }
        self.completed_at = Some(now);
        Ok(())
    }

    fn push(&mut self, turn: ConversationTurn) -> Result<&ConversationTurn, DomainError> {
        if self.is_completed() {
            return Err(DomainError::invalid_state_transition(
                "Session is already completed",
            ));
        }
        self.turns.push(turn);
        Ok(&self.turns[self.turns.len() - 1])
    }
}
