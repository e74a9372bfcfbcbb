//! In-process HTTP tests against the real router, a SQLite file and the
//! canned navigator.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use memory_keeper_domain::{RecordId, SessionId};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::router;
use crate::app::App;
use crate::infrastructure::clock::{FixedRandom, SystemClock};
use crate::infrastructure::ports::ClockPort;
use crate::infrastructure::record_store::SqliteRecordRepo;
use crate::use_cases::narrative::{MockLatency, MockNavigator};
use crate::use_cases::LlmStatusProbe;

struct TestServer {
    router: Router,
    _dir: tempfile::TempDir,
}

impl TestServer {
    async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("http.db");
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
        let repo = SqliteRecordRepo::new(path.to_str().unwrap(), clock.clone())
            .await
            .expect("repo");
        let navigator = MockNavigator::with_latency(
            Arc::new(FixedRandom(0)),
            clock.clone(),
            MockLatency::none(),
        );
        let app = Arc::new(App::new(
            Arc::new(navigator),
            Arc::new(repo),
            LlmStatusProbe::mock("gemini-2.5-flash"),
            clock,
            true,
            Duration::from_secs(60),
        ));

        Self {
            router: router(app),
            _dir: dir,
        }
    }

    async fn raw(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, _, text) = self.raw(request).await;
        let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
        (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }
}

fn narrative_request(quest_title: &str) -> Value {
    json!({
        "questTitle": quest_title,
        "messages": [
            {"id": "1", "type": "ai", "content": "Q0", "timestamp": "2025-01-01T10:00:00Z"},
            {"id": "2", "type": "user", "content": "A1", "timestamp": "2025-01-01T10:01:00Z"},
            {"type": "ai", "content": "Q1"},
            {"type": "user", "content": "A2"}
        ]
    })
}

#[tokio::test]
async fn health_returns_ok() {
    let server = TestServer::new().await;
    assert_eq!(server.get("/health").await, (StatusCode::OK, json!("OK")));
    assert_eq!(server.get("/").await, (StatusCode::OK, json!("OK")));
}

#[tokio::test]
async fn quests_lists_catalogue() {
    let server = TestServer::new().await;
    let (status, body) = server.get("/quests").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 4);
    assert_eq!(body["data"][0]["id"], "high-school-years");
}

#[tokio::test]
async fn unknown_record_is_404_without_data() {
    let server = TestServer::new().await;
    let uri = format!("/records/{}", RecordId::new());

    let (status, body) = server.get(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    assert!(body.get("data").is_none());

    let (status, _) = server.get("/records/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_record_id_is_400() {
    let server = TestServer::new().await;
    let (status, body) = server.get("/records/%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Record ID is required");
}

#[tokio::test]
async fn generate_narrative_saves_once_then_reuses_id() {
    let server = TestServer::new().await;

    let (status, first) = server
        .post("/generate-narrative", narrative_request("Your Love Story"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["title"], "Memories from Your Love Story");
    assert_eq!(first["saved"], true);
    assert_eq!(first["mockMode"], true);
    assert!(first["familyPrompts"].is_array());
    assert!(first["generatedAt"].is_string());

    let (status, second) = server
        .post("/generate-narrative", narrative_request("Your Love Story"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["saved"], false);
    assert_eq!(second["id"], first["id"]);

    let (status, list) = server.get("/records").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["success"], true);
    assert_eq!(list["count"], 1);
    assert_eq!(list["data"][0]["questTitle"], "Your Love Story");
}

#[tokio::test]
async fn generate_narrative_validates_input() {
    let server = TestServer::new().await;

    let (status, body) = server
        .post("/generate-narrative", json!({"turns": []}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = server
        .post("/generate-narrative", json!({"questTitle": "  ", "turns": []}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .post("/generate-narrative", json!({"questTitle": "Q"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/generate-narrative")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, _) = server.raw(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_existing_then_missing_record() {
    let server = TestServer::new().await;
    let (_, created) = server
        .post("/generate-narrative", narrative_request("The High School Years"))
        .await;
    let uri = format!("/records/{}", created["id"].as_str().unwrap());

    let (status, body) = server.delete(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["message"].is_string());

    let (status, _) = server.get(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // zero rows affected counts as failure
    let (status, body) = server.delete(&uri).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn export_renders_plain_text_attachment() {
    let server = TestServer::new().await;
    let (_, created) = server
        .post("/generate-narrative", narrative_request("Your Love Story"))
        .await;
    let uri = format!("/records/{}/export", created["id"].as_str().unwrap());

    let request = Request::builder().uri(&uri).body(Body::empty()).unwrap();
    let (status, headers, text) = server.raw(request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(
        headers[header::CONTENT_DISPOSITION].to_str().unwrap(),
        "attachment; filename=\"memories_from_your_love_story.txt\""
    );
    assert!(text.starts_with("Memories from Your Love Story\n\n"));
    assert!(text.contains("Wisdom to Remember:\n• "));
    assert!(text.contains("Questions for the Family:\n• "));
}

#[tokio::test]
async fn followup_requires_a_user_turn() {
    let server = TestServer::new().await;

    let (status, body) = server
        .post(
            "/generate-followup",
            json!({"questTheme": "School", "conversationHistory": [{"type": "ai", "content": "Q0"}]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = server
        .post(
            "/generate-followup",
            json!({"theme": "School", "history": [{"role": "user", "text": "I loved chemistry"}]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["question"],
        "That sounds fascinating! Can you tell me more about how that made you feel?"
    );
    assert_eq!(body["mockMode"], true);

    let (status, _) = server
        .post("/generate-followup", json!({"theme": "School"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn opening_question_uses_topic() {
    let server = TestServer::new().await;

    let (status, body) = server
        .post("/generate-opening", json!({"customTopic": "my first bicycle"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["question"]
        .as_str()
        .unwrap()
        .contains("my first bicycle"));

    let (status, _) = server.post("/generate-opening", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn llm_status_in_mock_mode() {
    let server = TestServer::new().await;
    let (status, body) = server.get("/llm/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["mockMode"], true);
    assert_eq!(body["model"], "gemini-2.5-flash");
}

#[tokio::test]
async fn session_flow_from_start_to_saved_narrative() {
    let server = TestServer::new().await;

    let (status, started) = server
        .post("/sessions", json!({"questId": "love-story"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(started["mockMode"], true);
    assert_eq!(started["session"]["questTitle"], "Your Love Story");
    assert_eq!(started["session"]["turns"][0]["role"], "assistant");
    let id = started["session"]["id"].as_str().unwrap().to_string();

    let (status, _) = server
        .post(&format!("/sessions/{}/turns", id), json!({"text": "   "}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for answer in ["We met at a dance.", "He stepped on my toes."] {
        let (status, reply) = server
            .post(&format!("/sessions/{}/turns", id), json!({"text": answer}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["canComplete"], false);
    }

    let (status, _) = server
        .post(&format!("/sessions/{}/complete", id), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, reply) = server
        .post(
            &format!("/sessions/{}/turns", id),
            json!({"content": "We married in June."}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["canComplete"], true);
    assert_eq!(reply["session"]["turns"].as_array().unwrap().len(), 7);

    let (status, done) = server
        .post(&format!("/sessions/{}/complete", id), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["saved"], true);
    assert_eq!(done["title"], "Memories from Your Love Story");

    let (status, view) = server.get(&format!("/sessions/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(view["session"]["completedAt"].is_string());
    assert_eq!(view["canComplete"], false);

    let (status, _) = server
        .post(&format!("/sessions/{}/complete", id), json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = server
        .post(&format!("/sessions/{}/turns", id), json!({"text": "More"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn session_start_validation() {
    let server = TestServer::new().await;

    let (status, _) = server.post("/sessions", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .post("/sessions", json!({"questId": "space-travel"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, started) = server
        .post("/sessions", json!({"topic": "the old bakery"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(started["session"]["questTitle"], "the old bakery");

    let (status, _) = server
        .get(&format!("/sessions/{}", SessionId::new()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
