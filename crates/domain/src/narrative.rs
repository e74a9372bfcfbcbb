//! Generated narratives and their persisted form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::RecordId;

/// The title/content/wisdom/prompts bundle written from a completed session.
///
/// Transient until persisted. `wisdom` and `family_prompts` may be empty;
/// readers hide empty sections rather than rejecting them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeArtifact {
    pub title: String,
    pub content: String,
    pub wisdom: Vec<String>,
    pub family_prompts: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl NarrativeArtifact {
    /// Content length in characters, the unit the duplicate guard compares.
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// A narrative that has been written to the record store.
///
/// Never updated after creation; `updated_at` equals `created_at` for every
/// record this service writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: RecordId,
    pub title: String,
    pub content: String,
    pub wisdom: Vec<String>,
    pub family_prompts: Vec<String>,
    pub quest_title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredRecord {
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Plain-text rendering for download.
    pub fn to_plain_text(&self) -> String {
        let mut out = format!("{}\n\n{}", self.title, self.content);

        if !self.wisdom.is_empty() {
            out.push_str("\n\nWisdom to Remember:\n");
            out.push_str(&bullets(&self.wisdom));
        }

        if !self.family_prompts.is_empty() {
            out.push_str("\n\nQuestions for the Family:\n");
            out.push_str(&bullets(&self.family_prompts));
        }

        out
    }

    /// File name for the plain-text download, e.g. `my_first_day.txt`.
    pub fn export_file_name(&self) -> String {
        let slug: String = self
            .title
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}.txt", slug)
    }
}

fn bullets(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| format!("• {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
