//! Memory Keeper Engine library.
//!
//! Server-side code for guided memory conversations and the narratives
//! written from them.
//!
//! ## Structure
//!
//! - `use_cases/` - Story generation, record storage and conversation orchestration
//! - `stores/` - In-memory session state
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

pub use app::App;
