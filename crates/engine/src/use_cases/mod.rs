//! Use cases - User story orchestration.
//!
//! Each module covers one area: story generation, record storage,
//! conversation sessions and the LLM status probe.

pub mod conversation;
pub mod health;
pub mod narrative;
pub mod records;

// Re-export main types
pub use conversation::{ConversationError, ConversationOrchestrator, SavedNarrative, SessionStart};
pub use health::{LlmStatus, LlmStatusProbe};
pub use narrative::{MockNavigator, NarrativeError, NarrativeGenerator, StoryNavigator};
pub use records::{DuplicateGuard, RecordError, RecordGateway, SaveOutcome};
