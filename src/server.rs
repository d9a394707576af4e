//! HTTP API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/ingest?filename=manual.pdf` | Ingest a PDF sent as the raw request body |
//! | `POST` | `/chat` | Ask a question within a session |
//! | `POST` | `/clear_history` | Drop a session's conversation history |
//! | `GET`  | `/session_info/{session_id}` | Message and exchange counts for a session |
//! | `GET`  | `/stats` | Session totals and index size |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Only PDF files are supported" } }
//! ```
//!
//! Error codes: `bad_request` (400), `processing_failed` (500),
//! `chat_failed` (500), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser front-ends
//! can call the API directly.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tower_http::cors::{Any, CorsLayer};

use manual_qa_core::assistant::Assistant;
use manual_qa_core::error::QaError;
use manual_qa_core::ingest::NoProgress;
use manual_qa_core::intent::Intent;
use manual_qa_core::memory::SessionInfo;

use crate::app::open_assistant;
use crate::config::Config;
use crate::extract::{document_from_pdf, ExtractError};

/// Largest accepted upload.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    assistant: Assistant,
}

/// Starts the HTTP server on `[server].bind` and runs until the process
/// is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let assistant = open_assistant(config).await?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(AppState { assistant }).layer(cors);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    println!("Manual QA server listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/ingest", post(handle_ingest))
        .route("/chat", post(handle_chat))
        .route("/clear_history", post(handle_clear_history))
        .route("/session_info/{session_id}", get(handle_session_info))
        .route("/stats", get(handle_stats))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn processing_failed(message: impl std::fmt::Display) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "processing_failed".to_string(),
        message: format!("Processing failed: {}", message),
    }
}

/// Chat failures carry a generic message; the cause only goes to stderr.
fn chat_failed() -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "chat_failed".to_string(),
        message: "Failed to process question".to_string(),
    }
}

fn internal(message: impl std::fmt::Display) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.to_string(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /ingest ============

#[derive(Deserialize)]
struct IngestQuery {
    filename: Option<String>,
}

#[derive(Serialize)]
struct IngestResponse {
    status: String,
    chunks_added: usize,
    chunk_types: BTreeMap<String, usize>,
    message: String,
}

/// Handler for `POST /ingest`.
///
/// The PDF is the raw request body; `filename` names it in provenance and
/// must end in `.pdf`. Extraction failures and empty documents are 400,
/// embedding or storage failures are 500 `processing_failed`.
async fn handle_ingest(
    State(state): State<AppState>,
    Query(query): Query<IngestQuery>,
    body: Bytes,
) -> Result<Json<IngestResponse>, AppError> {
    let filename = query
        .filename
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| bad_request("filename query parameter is required"))?;

    if body.is_empty() {
        return Err(bad_request("request body must contain the PDF"));
    }

    let name = filename.clone();
    let document = tokio::task::spawn_blocking(move || document_from_pdf(&name, &body))
        .await
        .map_err(internal)?
        .map_err(|e: ExtractError| bad_request(e.to_string()))?;

    let report = state
        .assistant
        .ingest(&document, &NoProgress)
        .await
        .map_err(|e| match e {
            QaError::InvalidInput(msg) => bad_request(msg),
            other => processing_failed(other),
        })?;

    eprintln!(
        "ingest {}  pages={} chunks={}",
        report.source, report.pages, report.chunks_added
    );

    Ok(Json(IngestResponse {
        status: "success".to_string(),
        chunks_added: report.chunks_added,
        chunk_types: report.chunk_types,
        message: format!("Successfully processed {}", filename),
    }))
}

// ============ POST /chat ============

#[derive(Deserialize)]
struct ChatRequest {
    session_id: String,
    question: String,
    #[serde(default)]
    question_type: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    answer: String,
    sources: Vec<String>,
    question_type: Intent,
    context_used: usize,
}

/// Handler for `POST /chat`.
///
/// `question_type`, when present, overrides the keyword classifier and
/// must name a known intent.
async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let intent = match req.question_type.as_deref() {
        Some(t) if !t.trim().is_empty() => {
            Some(t.parse::<Intent>().map_err(|e| bad_request(e.to_string()))?)
        }
        _ => None,
    };

    let answer = state
        .assistant
        .ask(&req.session_id, &req.question, intent)
        .await
        .map_err(|e| match e {
            QaError::InvalidInput(msg) => bad_request(msg),
            other => {
                eprintln!("chat {}  failed: {}", req.session_id, other);
                chat_failed()
            }
        })?;

    eprintln!(
        "chat {}  intent={} query={:?} context={}",
        req.session_id, answer.intent, answer.search_query, answer.context_used
    );

    Ok(Json(ChatResponse {
        answer: answer.text,
        sources: answer.sources,
        question_type: answer.intent,
        context_used: answer.context_used,
    }))
}

// ============ POST /clear_history ============

#[derive(Deserialize)]
struct ClearHistoryRequest {
    session_id: String,
}

#[derive(Serialize)]
struct ClearHistoryResponse {
    status: String,
    message: String,
}

async fn handle_clear_history(
    State(state): State<AppState>,
    Json(req): Json<ClearHistoryRequest>,
) -> Json<ClearHistoryResponse> {
    let response = if state.assistant.clear_history(&req.session_id) {
        ClearHistoryResponse {
            status: "success".to_string(),
            message: format!("History cleared for session {}", req.session_id),
        }
    } else {
        ClearHistoryResponse {
            status: "not_found".to_string(),
            message: format!("No history found for session {}", req.session_id),
        }
    };
    Json(response)
}

// ============ GET /session_info/{session_id} ============

async fn handle_session_info(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<SessionInfo> {
    Json(state.assistant.session_info(&session_id))
}

// ============ GET /stats ============

#[derive(Serialize)]
struct StatsResponse {
    active_sessions: usize,
    total_messages: usize,
    documents_in_db: u64,
    chunks_by_category: BTreeMap<String, u64>,
}

async fn handle_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.assistant.stats().await.map_err(internal)?;
    Ok(Json(StatsResponse {
        active_sessions: stats.active_sessions,
        total_messages: stats.total_messages,
        documents_in_db: stats.documents_in_db,
        chunks_by_category: stats.chunks_by_category,
    }))
}
