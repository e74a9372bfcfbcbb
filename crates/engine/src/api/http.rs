//! HTTP routes.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use memory_keeper_domain::{predefined_quests, ConversationTurn, NarrativeArtifact, RecordId};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::app::App;
use crate::use_cases::{ConversationError, NarrativeError, SavedNarrative};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/quests", get(list_quests))
        .route("/records", get(list_records))
        .route("/records/{id}", get(get_record).delete(delete_record))
        .route("/records/{id}/export", get(export_record))
        .route("/generate-narrative", post(generate_narrative))
        .route("/generate-followup", post(generate_followup))
        .route("/generate-opening", post(generate_opening))
        .route("/llm/status", get(llm_status))
}

async fn health() -> &'static str {
    "OK"
}

async fn list_quests() -> Json<serde_json::Value> {
    let quests = predefined_quests();
    Json(json!({ "success": true, "count": quests.len(), "data": quests }))
}

// =============================================================================
// Records
// =============================================================================

async fn list_records(State(app): State<Arc<App>>) -> Json<serde_json::Value> {
    let records = app.use_cases.records.list().await;
    Json(json!({ "success": true, "count": records.len(), "data": records }))
}

/// Blank ids are a client error. Ids that are not UUIDs cannot exist.
fn parse_record_id(raw: &str) -> Result<Option<RecordId>, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::BadRequest("Record ID is required".to_string()));
    }
    Ok(raw.parse().ok())
}

async fn get_record(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_record_id(&id)?.ok_or(ApiError::NotFound("Record not found"))?;
    let record = app
        .use_cases
        .records
        .get(id)
        .await
        .ok_or(ApiError::NotFound("Record not found"))?;
    Ok(Json(json!({ "success": true, "data": record })))
}

async fn delete_record(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let failed = || ApiError::Internal("Failed to delete record".to_string());

    let id = parse_record_id(&id)?.ok_or_else(failed)?;
    if !app.use_cases.records.delete(id).await {
        return Err(failed());
    }
    Ok(Json(
        json!({ "success": true, "message": "Record deleted successfully" }),
    ))
}

async fn export_record(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_record_id(&id)?.ok_or(ApiError::NotFound("Record not found"))?;
    let record = app
        .use_cases
        .records
        .get(id)
        .await
        .ok_or(ApiError::NotFound("Record not found"))?;

    let disposition = format!("attachment; filename=\"{}\"", record.export_file_name());
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        record.to_plain_text(),
    )
        .into_response())
}

// =============================================================================
// Generation
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateNarrativeBody {
    quest_title: Option<String>,
    #[serde(alias = "messages")]
    turns: Option<Vec<ConversationTurn>>,
}

/// Artifact fields plus where it was saved.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeResponse {
    #[serde(flatten)]
    pub artifact: NarrativeArtifact,
    pub id: RecordId,
    pub saved: bool,
    pub mock_mode: bool,
}

impl NarrativeResponse {
    pub fn new(saved: SavedNarrative, mock_mode: bool) -> Self {
        Self {
            id: saved.outcome.record().id,
            saved: saved.outcome.was_inserted(),
            artifact: saved.artifact,
            mock_mode,
        }
    }
}

async fn generate_narrative(
    State(app): State<Arc<App>>,
    ApiJson(body): ApiJson<GenerateNarrativeBody>,
) -> Result<Json<NarrativeResponse>, ApiError> {
    let (Some(quest_title), Some(turns)) = (non_blank(body.quest_title), body.turns) else {
        return Err(ApiError::BadRequest(
            "Quest title and turns are required".to_string(),
        ));
    };

    let saved = app
        .use_cases
        .conversation
        .narrate_and_save(&quest_title, &turns)
        .await?;
    Ok(Json(NarrativeResponse::new(saved, app.mock_mode)))
}

#[derive(Debug, Deserialize)]
struct GenerateFollowupBody {
    #[serde(alias = "questTheme")]
    theme: Option<String>,
    #[serde(alias = "conversationHistory")]
    history: Option<Vec<ConversationTurn>>,
}

async fn generate_followup(
    State(app): State<Arc<App>>,
    ApiJson(body): ApiJson<GenerateFollowupBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (Some(theme), Some(history)) = (non_blank(body.theme), body.history) else {
        return Err(ApiError::BadRequest(
            "Theme and conversation history are required".to_string(),
        ));
    };

    let question = app
        .use_cases
        .navigator
        .produce_follow_up(&theme, &history)
        .await?;
    Ok(Json(json!({ "question": question, "mockMode": app.mock_mode })))
}

#[derive(Debug, Deserialize)]
struct GenerateOpeningBody {
    #[serde(alias = "customTopic")]
    topic: Option<String>,
}

async fn generate_opening(
    State(app): State<Arc<App>>,
    ApiJson(body): ApiJson<GenerateOpeningBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let topic = non_blank(body.topic)
        .ok_or_else(|| ApiError::BadRequest("Topic is required".to_string()))?;

    let question = app
        .use_cases
        .navigator
        .produce_opening_question(&topic)
        .await;
    Ok(Json(json!({ "question": question, "mockMode": app.mock_mode })))
}

async fn llm_status(State(app): State<Arc<App>>) -> Json<crate::use_cases::LlmStatus> {
    Json(app.use_cases.llm_status.check().await)
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// =============================================================================
// Extraction and errors
// =============================================================================

/// `Json` extractor whose rejections render as 400 [`ApiError`]s.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::from(rejection)),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(&'static str),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<NarrativeError> for ApiError {
    fn from(e: NarrativeError) -> Self {
        match e {
            NarrativeError::NoUserInput => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl From<ConversationError> for ApiError {
    fn from(e: ConversationError) -> Self {
        match e {
            ConversationError::UnknownQuest(_)
            | ConversationError::EmptyAnswer
            | ConversationError::NotEnoughAnswers { .. } => ApiError::BadRequest(e.to_string()),
            ConversationError::AlreadyCompleted => ApiError::Conflict(e.to_string()),
            ConversationError::Narrative(inner) => inner.into(),
            ConversationError::Record(inner) => {
                tracing::error!(error = %inner, "Failed to save narrative");
                ApiError::Internal("Failed to save narrative".to_string())
            }
        }
    }
}
