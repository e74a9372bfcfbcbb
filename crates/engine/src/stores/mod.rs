//! In-memory state storage modules.
//!
//! Stores manage runtime state that doesn't belong in the database:
//! - `SessionStore` - conversation sessions awaiting their next turn

pub mod session;

// Re-export store types
pub use session::SessionStore;
