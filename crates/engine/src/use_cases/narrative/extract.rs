//! Recovery of the narrative JSON object from free-form model output.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use memory_keeper_domain::NarrativeArtifact;
use regex_lite::Regex;
use serde::Deserialize;

static FENCED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_-]*\s*(.*?)\s*```").expect("valid regex")
});

/// Interior of the first fenced block, or the whole trimmed text when unfenced.
pub fn extract_json(text: &str) -> &str {
    FENCED_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or_else(|| text.trim())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NarrativePayload {
    title: String,
    content: String,
    #[serde(default)]
    wisdom: Vec<String>,
    #[serde(default, alias = "family_prompts")]
    family_prompts: Vec<String>,
}

/// Parse model output into an artifact stamped with `generated_at`.
///
/// `title` and `content` are required. Missing `wisdom` or `familyPrompts`
/// become empty lists.
pub fn parse_narrative(
    raw: &str,
    generated_at: DateTime<Utc>,
) -> Result<NarrativeArtifact, serde_json::Error> {
    let payload: NarrativePayload = serde_json::from_str(extract_json(raw))?;
    Ok(NarrativeArtifact {
        title: payload.title,
        content: payload.content,
        wisdom: payload.wisdom,
        family_prompts: payload.family_prompts,
        generated_at,
    })
}
