//! HTTP route handlers for the API.

use crate::AppState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use researchbot_common::ResearchError;
use researchbot_coordinator::ResearchMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Root status response.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub description: String,
}

pub async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    let description = match state.bot.mode() {
        ResearchMode::SelfReflective => "ResearchBot - Agentic RAG with self-reflection",
        ResearchMode::MultiAgent => "ResearchBot - Multi-agent RAG with long-term memory",
    };
    Json(RootResponse {
        status: "ok",
        version: VERSION,
        description: description.to_string(),
    })
}

/// Detailed health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub mode: ResearchMode,
    pub features: Vec<&'static str>,
    pub model: String,
    pub embedding_model: String,
    pub documents_indexed: usize,
    pub uptime_seconds: u64,
}

fn features(mode: ResearchMode) -> Vec<&'static str> {
    match mode {
        ResearchMode::SelfReflective => vec![
            "Query planning and decomposition",
            "Dynamic retrieval strategies",
            "Multi-source synthesis with citations",
            "Self-reflection and confidence scoring",
            "Iterative research loops",
        ],
        ResearchMode::MultiAgent => vec![
            "Query analyst, document researcher and report writer",
            "Fixed-order delegation",
            "Per-user long-term memory",
            "Multi-source synthesis with citations",
        ],
    }
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let bot = &state.bot;
    Json(HealthResponse {
        status: "healthy",
        version: VERSION,
        mode: bot.mode(),
        features: features(bot.mode()),
        model: bot.model_name().to_string(),
        embedding_model: bot.config().memory.embedding_model.clone(),
        documents_indexed: bot.knowledge().len(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Chat request body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub max_iterations: Option<u32>,
}

/// Chat response body.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub version: &'static str,
    pub mode: ResearchMode,
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ErrorResponse {
    fn bad_request(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: "INVALID_REQUEST",
            status: StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JsonRejection> for ErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<ResearchError> for ErrorResponse {
    fn from(e: ResearchError) -> Self {
        let status = match &e {
            ResearchError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            e if e.is_upstream() => StatusCode::BAD_GATEWAY,
            ResearchError::Config(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            error: e.to_string(),
            code: e.code(),
            status,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Answer a research question.
///
/// The request is cancelled if the client goes away before it completes.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ErrorResponse> {
    let Json(request) = body?;
    if request.message.trim().is_empty() {
        return Err(ErrorResponse::bad_request("message must not be empty"));
    }

    info!(
        content_preview = %request.message.chars().take(50).collect::<String>(),
        user_id = ?request.user_id,
        "Received research question"
    );

    let bot = &state.bot;
    let research = bot.request(
        &request.message,
        request.user_id.as_deref(),
        request.max_iterations,
    );

    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let reply = bot.research_with(&research, cancel).await.map_err(|e| {
        error!(request_id = %research.id, error = %e, "Research request failed");
        ErrorResponse::from(e)
    })?;

    Ok(Json(ChatResponse {
        reply,
        version: VERSION,
        mode: bot.mode(),
    }))
}

/// Index request body.
#[derive(Debug, Deserialize)]
pub struct IndexRequest {
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub status: &'static str,
    pub directory: String,
    pub chunks_indexed: usize,
}

/// Index documents from a directory into the knowledge base.
pub async fn index(
    State(state): State<Arc<AppState>>,
    body: Result<Json<IndexRequest>, JsonRejection>,
) -> Result<Json<IndexResponse>, ErrorResponse> {
    let Json(request) = body?;
    if matches!(&request.extensions, Some(exts) if exts.is_empty()) {
        return Err(ErrorResponse::bad_request(
            "extensions must list at least one suffix",
        ));
    }

    let bot = &state.bot;
    let directory = request
        .directory
        .unwrap_or_else(|| bot.config().knowledge.documents_dir.clone());

    let report = bot
        .index_documents(&directory, request.extensions.as_deref())
        .await?;
    if report.files_skipped > 0 {
        warn!(skipped = report.files_skipped, "Some documents could not be read");
    }

    Ok(Json(IndexResponse {
        status: "indexed",
        directory: directory.display().to_string(),
        chunks_indexed: report.chunks_indexed,
    }))
}
