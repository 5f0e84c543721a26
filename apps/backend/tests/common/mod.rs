//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext with an in-memory SQLite history store
//! - A local stub of the Gemini generateContent endpoint
//! - Helpers for driving a session through its steps

pub mod fixtures;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    Json, Router,
};
use axum_test::TestServer;
use serde_json::{json, Value};
use uuid::Uuid;

use linguaflow_backend::db::Database;
use linguaflow_backend::services::drill::SessionRegistry;
use linguaflow_backend::services::genai::{GenAiClient, GenAiConfig};
use linguaflow_backend::{build_router, AppState};

pub const STUB_API_KEY: &str = "test-key";
pub const STUB_AUDIO: &str = "UklGRiQAAABXQVZF";
/// How long the stub takes to answer a prompt containing "slowly".
const SLOW_REPLY: Duration = Duration::from_millis(500);

/// Test context containing the database, the session registry and the router.
pub struct TestContext {
    pub db: Arc<Database>,
    pub sessions: SessionRegistry,
    app: Router,
}

impl TestContext {
    /// Create a test context backed by the stub model server.
    pub async fn new() -> Self {
        let addr = spawn_stub_model().await;
        Self::with_genai(GenAiConfig {
            api_key: Some(STUB_API_KEY.to_string()),
            base_url: format!("http://{addr}"),
            ..GenAiConfig::default()
        })
        .await
    }

    /// Create a test context with no API key configured.
    pub async fn new_without_genai() -> Self {
        Self::with_genai(GenAiConfig::default()).await
    }

    async fn with_genai(config: GenAiConfig) -> Self {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let db = Arc::new(db);
        let sessions = SessionRegistry::new();

        let state = AppState {
            db: db.clone(),
            genai: GenAiClient::new(config),
            sessions: sessions.clone(),
        };

        Self {
            db,
            sessions,
            app: build_router(state),
        }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).expect("Failed to build test server")
    }
}

/// Start a session from the sample words and return its id.
pub async fn start_session(server: &TestServer) -> Uuid {
    let response = server
        .post("/api/sessions")
        .json(&fixtures::create_session_request(
            "Ecology",
            &fixtures::sample_words(),
        ))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("session id")
}

/// Post one drill event and return the response body.
pub async fn send_event(server: &TestServer, id: Uuid, event: Value) -> Value {
    let response = server
        .post(&format!("/api/sessions/{id}/events"))
        .json(&event)
        .await;
    response.assert_status_ok();
    response.json()
}

/// Drive the current word from Learn to ComposeSentence.
pub async fn advance_to_compose(server: &TestServer, id: Uuid, word: &str, sentence: &str) {
    send_event(server, id, fixtures::event("begin_drilling")).await;
    for _ in 0..3 {
        send_event(server, id, fixtures::input_changed(word)).await;
        send_event(server, id, fixtures::event("submit_word")).await;
    }
    send_event(server, id, fixtures::input_changed(sentence)).await;
    let body = send_event(server, id, fixtures::event("submit_sentence")).await;
    assert_eq!(body["snapshot"]["step"], "compose_sentence");
}

/// Serve a fake generateContent endpoint on an ephemeral port.
async fn spawn_stub_model() -> SocketAddr {
    let app = Router::new().fallback(stub_generate);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub model");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    addr
}

async fn stub_generate(uri: Uri, headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some(STUB_API_KEY) {
        return error_body(StatusCode::UNAUTHORIZED, "API key not valid");
    }

    let prompt = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    if prompt.contains("FAIL") {
        return error_body(StatusCode::INTERNAL_SERVER_ERROR, "stub failure");
    }

    if prompt.contains("slowly") {
        tokio::time::sleep(SLOW_REPLY).await;
    }

    if uri.path().contains("tts") {
        if prompt.contains("silence") {
            return (StatusCode::OK, Json(json!({ "candidates": [] })));
        }
        return (StatusCode::OK, Json(fixtures::audio_candidate(STUB_AUDIO)));
    }

    let payload = if prompt.starts_with("Generate details for") {
        let word = quoted_after(&prompt, "word \"").unwrap_or_default();
        serde_json::to_value(fixtures::word(&word, &word)).unwrap_or_default()
    } else if prompt.starts_with("Generate ") {
        serde_json::to_value(fixtures::sample_words()).unwrap_or_default()
    } else if prompt.contains("user-written sentence") {
        let sentence = quoted_after(&prompt, "Sentence: \"").unwrap_or_default();
        if sentence.contains("badly") {
            json!({
                "isCorrect": false,
                "correctedSentence": "The habitat is protected.",
                "explanation": "用法不当"
            })
        } else {
            json!({ "isCorrect": true, "explanation": "很好" })
        }
    } else if prompt.contains("academic-style article") {
        json!({
            "title": "Forests",
            "content": "Every habitat suffers from erosion under a thin canopy.",
            "translation": "每个栖息地……"
        })
    } else if prompt.contains("short essay") {
        json!({
            "score": 12,
            "critique": "词汇丰富",
            "improvedVersion": "A polished essay."
        })
    } else {
        return error_body(StatusCode::BAD_REQUEST, "unexpected prompt");
    };

    (StatusCode::OK, Json(fixtures::text_candidate(&payload)))
}

fn error_body(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({ "error": { "code": status.as_u16(), "message": message } })),
    )
}

fn quoted_after(text: &str, marker: &str) -> Option<String> {
    let start = text.find(marker)? + marker.len();
    let end = text[start..].find('"')? + start;
    Some(text[start..end].to_string())
}
