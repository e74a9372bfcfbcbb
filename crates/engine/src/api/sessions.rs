//! Session routes: a conversation driven turn by turn over HTTP.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use memory_keeper_domain::{Session, SessionId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::http::{non_blank, ApiError, ApiJson, NarrativeResponse};
use crate::app::App;
use crate::use_cases::SessionStart;

pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/sessions", post(start_session))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}/turns", post(add_turn))
        .route("/sessions/{id}/complete", post(complete_session))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartSessionBody {
    quest_id: Option<String>,
    #[serde(alias = "customTopic")]
    topic: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartedSession {
    session: Session,
    mock_mode: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView {
    can_complete: bool,
    session: Session,
}

#[derive(Debug, Deserialize)]
struct TurnBody {
    #[serde(alias = "content")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TurnReply {
    question: String,
    can_complete: bool,
    mock_mode: bool,
    session: Session,
}

fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound("Session not found"))
}

async fn load(app: &App, raw_id: &str) -> Result<Session, ApiError> {
    let id = parse_session_id(raw_id)?;
    app.sessions
        .get(id)
        .await
        .ok_or(ApiError::NotFound("Session not found"))
}

async fn start_session(
    State(app): State<Arc<App>>,
    ApiJson(body): ApiJson<StartSessionBody>,
) -> Result<(StatusCode, Json<StartedSession>), ApiError> {
    let start = match (non_blank(body.quest_id), non_blank(body.topic)) {
        (Some(quest_id), _) => SessionStart::Quest(quest_id.trim().to_string()),
        (None, Some(topic)) => SessionStart::Topic(topic.trim().to_string()),
        (None, None) => {
            return Err(ApiError::BadRequest(
                "Either questId or topic is required".to_string(),
            ))
        }
    };

    let session = app.use_cases.conversation.start(start).await?;
    app.sessions.save(session.clone()).await;

    Ok((
        StatusCode::CREATED,
        Json(StartedSession {
            session,
            mock_mode: app.mock_mode,
        }),
    ))
}

async fn get_session(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = load(&app, &id).await?;
    Ok(Json(SessionView {
        can_complete: session.can_complete(),
        session,
    }))
}

async fn add_turn(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<TurnBody>,
) -> Result<Json<TurnReply>, ApiError> {
    let mut session = load(&app, &id).await?;
    let text = body.text.unwrap_or_default();

    let question = app
        .use_cases
        .conversation
        .respond(&mut session, &text)
        .await?;
    app.sessions.save(session.clone()).await;

    Ok(Json(TurnReply {
        question,
        can_complete: session.can_complete(),
        mock_mode: app.mock_mode,
        session,
    }))
}

async fn complete_session(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<NarrativeResponse>, ApiError> {
    let mut session = load(&app, &id).await?;

    let saved = app
        .use_cases
        .conversation
        .complete(&mut session)
        .await?;
    tracing::info!(
        session_id = %session.id(),
        record_id = %saved.outcome.record().id,
        "Completed session"
    );
    app.sessions.save(session).await;

    Ok(Json(NarrativeResponse::new(saved, app.mock_mode)))
}
