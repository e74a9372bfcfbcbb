//! Repository port traits for database access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use memory_keeper_domain::{NarrativeArtifact, RecordId, StoredRecord};

use super::error::RepoError;

// =============================================================================
// Record Storage
// =============================================================================

/// Durable storage for generated narratives (`records` table).
///
/// The store assigns ids and timestamps. Records are never updated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordRepo: Send + Sync {
    /// Persist an artifact under `quest_title` and return the stored row.
    async fn insert(
        &self,
        artifact: &NarrativeArtifact,
        quest_title: &str,
    ) -> Result<StoredRecord, RepoError>;

    /// All records, newest first.
    async fn list(&self) -> Result<Vec<StoredRecord>, RepoError>;

    async fn get(&self, id: RecordId) -> Result<Option<StoredRecord>, RepoError>;

    /// Delete one record. Returns whether a row was removed.
    async fn delete(&self, id: RecordId) -> Result<bool, RepoError>;

    /// Records for `quest_title` created at or after `since`, newest first.
    async fn list_recent_for_quest(
        &self,
        quest_title: &str,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<StoredRecord>, RepoError>;
}
