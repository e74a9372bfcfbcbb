//! Memory Keeper domain types.
//!
//! Conversation turns and sessions, generated narratives, persisted records
//! and the quest catalogue. No I/O lives here.

extern crate self as memory_keeper_domain;

pub mod conversation;
pub mod error;
pub mod ids;
pub mod narrative;
pub mod quest;

pub use conversation::{
    last_user_turn, user_transcript, ConversationTurn, Session, TurnRole,
    MIN_USER_TURNS_TO_COMPLETE,
};
pub use error::DomainError;
pub use ids::{RecordId, SessionId, TurnId};
pub use narrative::{NarrativeArtifact, StoredRecord};
pub use quest::{find_quest, predefined_quests, Quest};
