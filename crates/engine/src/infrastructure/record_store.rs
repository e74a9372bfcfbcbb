//! SQLite-backed narrative record storage.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use memory_keeper_domain::{NarrativeArtifact, RecordId, StoredRecord};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::infrastructure::ports::{ClockPort, RecordRepo, RepoError};

const SELECT_COLUMNS: &str =
    "id, title, content, wisdom, family_prompts, quest_title, created_at, updated_at";

/// SQLite implementation of [`RecordRepo`].
///
/// `wisdom` and `family_prompts` are stored as JSON array text. Timestamps are
/// RFC 3339 UTC with millisecond precision so they order lexicographically.
pub struct SqliteRecordRepo {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteRecordRepo {
    pub async fn new(db_path: &str, clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("records", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                wisdom TEXT NOT NULL,
                family_prompts TEXT NOT NULL,
                quest_title TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("records", e))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_records_quest_created ON records (quest_title, created_at)",
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("records", e))?;

        Ok(Self { pool, clock })
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::serialization(format!("bad timestamp '{}': {}", raw, e)))
}

fn parse_list(raw: &str) -> Result<Vec<String>, RepoError> {
    serde_json::from_str(raw).map_err(RepoError::serialization)
}

fn row_to_record(row: &SqliteRow) -> Result<StoredRecord, RepoError> {
    let id: String = row.get("id");
    let id = id.parse::<RecordId>().map_err(RepoError::serialization)?;

    Ok(StoredRecord {
        id,
        title: row.get("title"),
        content: row.get("content"),
        wisdom: parse_list(&row.get::<String, _>("wisdom"))?,
        family_prompts: parse_list(&row.get::<String, _>("family_prompts"))?,
        quest_title: row.get("quest_title"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
        updated_at: parse_timestamp(&row.get::<String, _>("updated_at"))?,
    })
}

/// Decode a result set, skipping rows that no longer decode.
fn decode_rows(rows: &[SqliteRow], operation: &'static str) -> Vec<StoredRecord> {
    rows.iter()
        .filter_map(|row| match row_to_record(row) {
            Ok(record) => Some(record),
            Err(e) => {
                let id: String = row.get("id");
                tracing::warn!(operation, record_id = %id, error = %e, "Skipping undecodable record row");
                None
            }
        })
        .collect()
}

#[async_trait]
impl RecordRepo for SqliteRecordRepo {
    async fn insert(
        &self,
        artifact: &NarrativeArtifact,
        quest_title: &str,
    ) -> Result<StoredRecord, RepoError> {
        let id = RecordId::new();
        // Stored text has millisecond precision; keep the returned value in step.
        let now = self.clock.now().trunc_subsecs(3);
        let stamp = format_timestamp(now);
        let wisdom = serde_json::to_string(&artifact.wisdom).map_err(RepoError::serialization)?;
        let family_prompts =
            serde_json::to_string(&artifact.family_prompts).map_err(RepoError::serialization)?;

        sqlx::query(
            r#"
            INSERT INTO records (id, title, content, wisdom, family_prompts, quest_title, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&artifact.title)
        .bind(&artifact.content)
        .bind(wisdom)
        .bind(family_prompts)
        .bind(quest_title)
        .bind(&stamp)
        .bind(&stamp)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("records.insert", e))?;

        Ok(StoredRecord {
            id,
            title: artifact.title.clone(),
            content: artifact.content.clone(),
            wisdom: artifact.wisdom.clone(),
            family_prompts: artifact.family_prompts.clone(),
            quest_title: quest_title.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn list(&self) -> Result<Vec<StoredRecord>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM records ORDER BY created_at DESC, rowid DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("records.list", e))?;

        Ok(decode_rows(&rows, "records.list"))
    }

    async fn get(&self, id: RecordId) -> Result<Option<StoredRecord>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM records WHERE id = ?",
            SELECT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("records.get", e))?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn delete(&self, id: RecordId) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM records WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("records.delete", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_recent_for_quest(
        &self,
        quest_title: &str,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<StoredRecord>, RepoError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM records
            WHERE quest_title = ? AND created_at >= ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
            SELECT_COLUMNS
        ))
        .bind(quest_title)
        .bind(format_timestamp(since))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("records.list_recent_for_quest", e))?;

        Ok(decode_rows(&rows, "records.list_recent_for_quest"))
    }
}
