//! Best-effort suppression of near-identical saves.
//!
//! Check-then-insert is not transactional. Two concurrent saves of the same
//! narrative can both pass the check and produce two rows.

use std::sync::Arc;

use chrono::Duration;
use memory_keeper_domain::{NarrativeArtifact, StoredRecord};

use super::{RecordError, RecordGateway};
use crate::infrastructure::ports::ClockPort;

pub const DUPLICATE_LOOKBACK_MINUTES: i64 = 10;
pub const DUPLICATE_SCAN_LIMIT: u32 = 5;
/// Content lengths closer than this (in characters) count as the same narrative.
pub const DUPLICATE_LENGTH_THRESHOLD: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted(StoredRecord),
    /// Existing id and timestamps carrying the new artifact's text.
    Duplicate(StoredRecord),
}

impl SaveOutcome {
    pub fn was_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }

    pub fn record(&self) -> &StoredRecord {
        match self {
            Self::Inserted(record) | Self::Duplicate(record) => record,
        }
    }
}

pub struct DuplicateGuard {
    records: Arc<RecordGateway>,
    clock: Arc<dyn ClockPort>,
}

impl DuplicateGuard {
    pub fn new(records: Arc<RecordGateway>, clock: Arc<dyn ClockPort>) -> Self {
        Self { records, clock }
    }

    pub async fn save_if_not_duplicate(
        &self,
        artifact: &NarrativeArtifact,
        quest_title: &str,
    ) -> Result<SaveOutcome, RecordError> {
        if let Some(existing) = self.find_recent_match(artifact, quest_title).await {
            tracing::info!(
                record_id = %existing.id,
                quest_title = %quest_title,
                "Similar record saved recently, skipping insert"
            );
            return Ok(SaveOutcome::Duplicate(StoredRecord {
                id: existing.id,
                title: artifact.title.clone(),
                content: artifact.content.clone(),
                wisdom: artifact.wisdom.clone(),
                family_prompts: artifact.family_prompts.clone(),
                quest_title: quest_title.to_string(),
                created_at: existing.created_at,
                updated_at: existing.updated_at,
            }));
        }

        let record = self.records.insert(artifact, quest_title).await?;
        Ok(SaveOutcome::Inserted(record))
    }

    /// A lookup failure is logged and treated as "no match".
    async fn find_recent_match(
        &self,
        artifact: &NarrativeArtifact,
        quest_title: &str,
    ) -> Option<StoredRecord> {
        let since = self.clock.now() - Duration::minutes(DUPLICATE_LOOKBACK_MINUTES);
        let recent = match self
            .records
            .recent_for_quest(quest_title, since, DUPLICATE_SCAN_LIMIT)
            .await
        {
            Ok(recent) => recent,
            Err(e) => {
                tracing::warn!(error = %e, quest_title = %quest_title, "Duplicate check failed, saving anyway");
                return None;
            }
        };

        let new_len = artifact.content_len();
        recent
            .into_iter()
            .find(|record| record.content_len().abs_diff(new_len) < DUPLICATE_LENGTH_THRESHOLD)
    }
}
