//! Application state and composition.

use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::ports::{ClockPort, RecordRepo};
use crate::stores::SessionStore;
use crate::use_cases::{
    ConversationOrchestrator, DuplicateGuard, LlmStatusProbe, RecordGateway, StoryNavigator,
};

/// Main application state.
///
/// Holds the use cases and the session store.
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
    pub sessions: Arc<SessionStore>,
    /// Whether generation is served by the canned navigator.
    pub mock_mode: bool,
}

/// Container for all use cases.
pub struct UseCases {
    pub navigator: Arc<dyn StoryNavigator>,
    pub records: Arc<RecordGateway>,
    pub guard: Arc<DuplicateGuard>,
    pub conversation: Arc<ConversationOrchestrator>,
    pub llm_status: Arc<LlmStatusProbe>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        navigator: Arc<dyn StoryNavigator>,
        record_repo: Arc<dyn RecordRepo>,
        llm_status: LlmStatusProbe,
        clock: Arc<dyn ClockPort>,
        mock_mode: bool,
        session_ttl: Duration,
    ) -> Self {
        let records = Arc::new(RecordGateway::new(record_repo));
        let guard = Arc::new(DuplicateGuard::new(records.clone(), clock.clone()));
        let conversation = Arc::new(ConversationOrchestrator::new(
            navigator.clone(),
            guard.clone(),
            clock,
        ));

        Self {
            use_cases: UseCases {
                navigator,
                records,
                guard,
                conversation,
                llm_status: Arc::new(llm_status),
            },
            sessions: Arc::new(SessionStore::new(session_ttl)),
            mock_mode,
        }
    }
}
