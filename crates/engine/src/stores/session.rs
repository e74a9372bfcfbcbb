//! Conversation session storage.

use std::time::Duration;

use memory_keeper_domain::{Session, SessionId};

use crate::infrastructure::cache::TtlCache;

/// Sessions live in memory only and expire after a period of inactivity.
///
/// Readers get a copy. Writers store the whole session back, last write wins.
pub struct SessionStore {
    sessions: TtlCache<SessionId, Session>,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: TtlCache::new(idle_ttl),
        }
    }

    /// Copy of a live session. Reading counts as activity.
    pub async fn get(&self, id: SessionId) -> Option<Session> {
        if !self.sessions.touch(&id).await {
            return None;
        }
        self.sessions.get(&id).await
    }

    pub async fn save(&self, session: Session) {
        self.sessions.insert(session.id(), session).await;
    }

    /// Drop idle sessions, returning how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        self.sessions.cleanup_expired().await
    }

    pub async fn len(&self) -> usize {
        self.sessions.len().await
    }
}
