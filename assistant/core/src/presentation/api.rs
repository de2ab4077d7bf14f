// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! HTTP API
//!
//! | Route | Method | Handler |
//! |-------|--------|---------|
//! | `/health` | GET | uptime |
//! | `/api/chat` | POST | `ChatService::handle_chat` |
//! | `/api/self-edit` | POST | guardrail, then `SelfEditPipeline::request_self_edit` |
//! | `/api/review-learn` | POST | `LearningReviewService::review` |
//! | `/api/system-status` | GET | memory size and personality |
//! | `/api/learning-status` | GET | current plan and recent learning log |
//! | `/api/test-persona` | GET | `ChatService::probe_persona` |
//!
//! Provider failures never surface as 5xx. `/api/chat` answers 400 only for
//! a missing message, `/api/self-edit` answers 403 only for a guardrail
//! rejection.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::warn;

use crate::application::assistant::Assistant;
use crate::domain::self_edit::SelfEditError;

pub struct AppState {
    pub assistant: Assistant,
    pub start_time: Instant,
}

pub fn app(assistant: Assistant, body_limit: usize) -> Router {
    let state = Arc::new(AppState {
        assistant,
        start_time: Instant::now(),
    });

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/self-edit", post(self_edit_handler))
        .route("/api/review-learn", post(review_learn_handler))
        .route("/api/system-status", get(system_status_handler))
        .route("/api/learning-status", get(learning_status_handler))
        .route("/api/test-persona", get(test_persona_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfEditRequest {
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
    }))
}

async fn chat_handler(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    // Parsed by hand so that a malformed body gets the same 400 as a missing field
    let message = serde_json::from_slice::<ChatRequest>(&body)
        .ok()
        .and_then(|request| request.message)
        .filter(|message| !message.trim().is_empty());

    let Some(message) = message else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No message provided" })),
        )
            .into_response();
    };

    let response = state.assistant.chat.handle_chat(&message).await;
    Json(response).into_response()
}

async fn self_edit_handler(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    let request = serde_json::from_slice::<SelfEditRequest>(&body).unwrap_or(SelfEditRequest {
        file_path: None,
        feedback: None,
    });
    let file_path = request.file_path.unwrap_or_default();

    if let Err(rejection) = state.assistant.guardrail.check(&file_path) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "success": false, "error": rejection.to_string() })),
        )
            .into_response();
    }

    let feedback = request.feedback.unwrap_or_default();
    match state
        .assistant
        .self_edit
        .request_self_edit(&PathBuf::from(&file_path), &feedback)
        .await
    {
        Ok(receipt) => Json(json!({
            "success": true,
            "target": receipt.target,
            "committedAt": receipt.committed_at,
        }))
        .into_response(),
        Err(e) => {
            let skipped = matches!(e, SelfEditError::NotConfigured);
            Json(json!({
                "success": false,
                "skipped": skipped,
                "state": e.final_state(),
                "error": e.to_string(),
            }))
            .into_response()
        }
    }
}

async fn review_learn_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    match state.assistant.learning.review().await {
        Ok(plan) => Json(json!({ "success": true, "result": plan })),
        Err(e) => {
            warn!("Learning review failed: {}", e);
            Json(json!({ "success": true, "result": null, "error": e.to_string() }))
        }
    }
}

async fn system_status_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let memory = state.assistant.memory.snapshot().await;
    Json(json!({
        "status": "operational",
        "memory": memory.turn_count(),
        "personality": memory.personality,
        "time": chrono::Utc::now(),
    }))
}

async fn learning_status_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.assistant.learning.status().await)
}

async fn test_persona_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.assistant.chat.probe_persona().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::chat::ChatService;
    use crate::application::dispatcher::FailoverDispatcher;
    use crate::application::learning_review::LearningReviewService;
    use crate::application::persona::PersonaGenerator;
    use crate::application::self_edit::SelfEditPipeline;
    use crate::domain::audit::AuditSink;
    use crate::domain::guardrail::EditGuardrail;
    use crate::domain::persona::{PersonaProfile, PersonaSanitizer};
    use crate::infrastructure::audit_log::InMemoryAuditSink;
    use crate::infrastructure::file_store::LocalFileStore;
    use crate::infrastructure::repositories::{InMemoryLearningQueue, InMemoryMemoryRepository};
    use crate::infrastructure::validator::CommandSyntaxValidator;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn assistant() -> Assistant {
        let error_log: Arc<dyn AuditSink> = Arc::new(InMemoryAuditSink::new());
        let memory = Arc::new(InMemoryMemoryRepository::new());
        let queue = Arc::new(InMemoryLearningQueue::new());
        let dispatcher = Arc::new(FailoverDispatcher::new(error_log.clone()));
        let generator = Arc::new(PersonaGenerator::new(
            PersonaProfile::default(),
            Arc::new(PersonaSanitizer::new()),
        ));

        Assistant {
            chat: Arc::new(ChatService::new(
                vec![],
                dispatcher.clone(),
                generator.clone(),
                memory.clone(),
                queue.clone(),
            )),
            self_edit: Arc::new(SelfEditPipeline::new(
                None,
                dispatcher.clone(),
                generator,
                Arc::new(LocalFileStore::new()),
                Arc::new(CommandSyntaxValidator::new(vec!["true".into()])),
                Arc::new(InMemoryAuditSink::new()),
            )),
            learning: Arc::new(LearningReviewService::new(
                None,
                dispatcher,
                memory.clone(),
                Arc::new(LocalFileStore::new()),
                Arc::new(InMemoryAuditSink::new()),
                "vevo-test-missing-plan.json",
            )),
            memory,
            learning_queue: queue,
            guardrail: EditGuardrail::default(),
            error_log,
        }
    }

    async fn send(
        app: Router,
        method: &str,
        uri: &str,
        body: &str,
    ) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(assistant(), 1024), "GET", "/health", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_chat_without_message_is_rejected() {
        let assistant = assistant();
        let memory = assistant.memory.clone();
        let queue = assistant.learning_queue.clone();
        let router = app(assistant, 1024);

        for body in ["{}", r#"{"message": "   "}"#, "not json"] {
            let (status, json) = send(router.clone(), "POST", "/api/chat", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["error"], "No message provided");
        }
        assert_eq!(memory.turn_count().await, 0);
        assert!(queue.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_chat_without_providers_falls_back() {
        let assistant = assistant();
        let queue = assistant.learning_queue.clone();
        let (status, body) = send(
            app(assistant, 1024),
            "POST",
            "/api/chat",
            r#"{"message": "what is the tide today?"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isFallback"], true);
        assert_eq!(body["confidence"], 0.2);
        assert_eq!(body["memory_update"], true);
        assert_eq!(queue.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_chat_arithmetic_shortcut() {
        let (status, body) =
            send(app(assistant(), 1024), "POST", "/api/chat", r#"{"message": "2 + 2"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "Math result: 4");
        assert_eq!(body["sources"], json!(["mathCore"]));
        assert_eq!(body["isFallback"], false);
        assert!(body["reasoning_summary"]
            .as_str()
            .unwrap()
            .starts_with("Used mathCore for computation"));
    }

    #[tokio::test]
    async fn test_self_edit_guardrail() {
        let router = app(assistant(), 1024);

        let (status, body) = send(
            router.clone(),
            "POST",
            "/api/self-edit",
            r#"{"filePath": "src/core/engine.js", "feedback": "faster"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);

        let (status, _) = send(router, "POST", "/api/self-edit", r#"{"feedback": "x"}"#).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_self_edit_without_credential_is_skipped() {
        let (status, body) = send(
            app(assistant(), 1024),
            "POST",
            "/api/self-edit",
            r#"{"filePath": "ai/mathCore.js", "feedback": "faster"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["skipped"], true);
        assert_eq!(body["state"], "idle");
    }

    #[tokio::test]
    async fn test_status_endpoints() {
        let router = app(assistant(), 1024);

        let (status, body) = send(router.clone(), "GET", "/api/system-status", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "operational");
        assert_eq!(body["memory"], 0);
        assert_eq!(body["personality"], "friendly");

        let (_, body) = send(router.clone(), "GET", "/api/learning-status", "").await;
        assert!(body["learningPlan"].is_null());
        assert_eq!(body["recentLogs"], json!([]));

        let (_, body) = send(router, "GET", "/api/test-persona", "").await;
        assert_eq!(body["persona"], "jarvis");
        assert!(body["sample"].as_str().unwrap().starts_with("I am Jarvis"));
    }

    #[tokio::test]
    async fn test_review_without_credential_reports_null_result() {
        let (status, body) = send(app(assistant(), 1024), "POST", "/api/review-learn", "").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["result"].is_null());
    }
}
