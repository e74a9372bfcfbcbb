//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions at the infrastructure edge. Everything else is concrete types.
//! Ports exist for:
//! - Record storage (could swap SQLite -> Postgres)
//! - LLM calls (could swap Gemini -> Claude/OpenAI)
//! - Clock/Random (for testing)

mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::RecordRepo;

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    ChatMessage, FinishReason, LlmPort, LlmRequest, LlmResponse, MessageRole, TokenUsage,
};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use external::MockLlmPort;

#[cfg(test)]
pub use repos::MockRecordRepo;

#[cfg(test)]
pub use testing::{MockClockPort, MockRandomPort};

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};

// =============================================================================
// Error Types
// =============================================================================
pub use error::{LlmError, RepoError};
