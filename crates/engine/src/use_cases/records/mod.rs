//! Record storage facade and the duplicate-save guard.

mod duplicate_guard;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use memory_keeper_domain::{NarrativeArtifact, RecordId, StoredRecord};

use crate::infrastructure::ports::{RecordRepo, RepoError};

/// Write-path failure. Read paths never surface one.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Failed to save record: {0}")]
    Save(#[from] RepoError),
}

pub use duplicate_guard::{
    DuplicateGuard, SaveOutcome, DUPLICATE_LENGTH_THRESHOLD, DUPLICATE_LOOKBACK_MINUTES,
    DUPLICATE_SCAN_LIMIT,
};

/// Read paths fail soft: store errors are logged and surface as empty or
/// absent results. Inserts propagate their error.
pub struct RecordGateway {
    repo: Arc<dyn RecordRepo>,
}

impl RecordGateway {
    pub fn new(repo: Arc<dyn RecordRepo>) -> Self {
        Self { repo }
    }

    /// Newest first. Empty on store failure.
    pub async fn list(&self) -> Vec<StoredRecord> {
        match self.repo.list().await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list records");
                Vec::new()
            }
        }
    }

    /// `None` both when the record is missing and when the store fails.
    pub async fn get(&self, id: RecordId) -> Option<StoredRecord> {
        match self.repo.get(id).await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(error = %e, record_id = %id, "Failed to fetch record");
                None
            }
        }
    }

    /// `true` only if a row was removed.
    pub async fn delete(&self, id: RecordId) -> bool {
        match self.repo.delete(id).await {
            Ok(true) => {
                tracing::info!(record_id = %id, "Deleted record");
                true
            }
            Ok(false) => {
                tracing::warn!(record_id = %id, "Delete matched no record");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, record_id = %id, "Failed to delete record");
                false
            }
        }
    }

    pub async fn insert(
        &self,
        artifact: &NarrativeArtifact,
        quest_title: &str,
    ) -> Result<StoredRecord, RecordError> {
        let record = self.repo.insert(artifact, quest_title).await?;
        tracing::info!(record_id = %record.id, quest_title = %quest_title, "Stored record");
        Ok(record)
    }

    /// Records for `quest_title` created at or after `since`, newest first.
    /// Unlike the other reads this returns the store error to the caller.
    pub async fn recent_for_quest(
        &self,
        quest_title: &str,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<StoredRecord>, RepoError> {
        self.repo
            .list_recent_for_quest(quest_title, since, limit)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockRecordRepo;

    fn artifact() -> NarrativeArtifact {
        NarrativeArtifact {
            title: "T".into(),
            content: "C".into(),
            wisdom: vec![],
            family_prompts: vec![],
            generated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn list_is_empty_on_store_error() {
        let mut repo = MockRecordRepo::new();
        repo.expect_list()
            .returning(|| Err(RepoError::database("records.list", "locked")));

        assert!(RecordGateway::new(Arc::new(repo)).list().await.is_empty());
    }

    #[tokio::test]
    async fn get_is_absent_on_store_error() {
        let mut repo = MockRecordRepo::new();
        repo.expect_get()
            .returning(|_| Err(RepoError::database("records.get", "locked")));

        assert!(RecordGateway::new(Arc::new(repo))
            .get(RecordId::new())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn delete_is_false_on_missing_row() {
        let mut repo = MockRecordRepo::new();
        repo.expect_delete().returning(|_| Ok(false));
        assert!(!RecordGateway::new(Arc::new(repo)).delete(RecordId::new()).await);
    }

    #[tokio::test]
    async fn delete_is_false_on_store_error() {
        let mut repo = MockRecordRepo::new();
        repo.expect_delete()
            .returning(|_| Err(RepoError::database("records.delete", "locked")));
        assert!(!RecordGateway::new(Arc::new(repo)).delete(RecordId::new()).await);
    }

    #[tokio::test]
    async fn delete_is_true_when_row_removed() {
        let mut repo = MockRecordRepo::new();
        repo.expect_delete().returning(|_| Ok(true));
        assert!(RecordGateway::new(Arc::new(repo)).delete(RecordId::new()).await);
    }

    #[tokio::test]
    async fn insert_propagates_store_error() {
        let mut repo = MockRecordRepo::new();
        repo.expect_insert()
            .returning(|_, _| Err(RepoError::database("records.insert", "disk full")));

        let result = RecordGateway::new(Arc::new(repo))
            .insert(&artifact(), "Q")
            .await;
        assert!(result.is_err());
    }
}
