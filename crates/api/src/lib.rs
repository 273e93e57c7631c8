//! HTTP API for ResearchBot.
//!
//! # Endpoints
//!
//! - `GET /` - Status, version and description
//! - `GET /api/health` - Detailed health check with feature list
//! - `POST /api/chat` - Ask a research question
//! - `POST /api/index` - Index a directory of documents
//!
//! # Architecture
//!
//! ```text
//! Client (web frontend, curl, ...)
//!    │
//!    ▼
//! ┌─────────────────┐
//! │   API Server    │ ◄── This crate
//! │     (Axum)      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   ResearchBot   │
//! └─────────────────┘
//! ```

pub mod routes;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use state::AppState;

/// Create the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::root))
        .route("/api/health", get(routes::health))
        .route("/api/chat", post(routes::chat))
        .route("/api/index", post(routes::index))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the API server on the given address.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let router = create_router(state);

    info!(%addr, "Starting ResearchBot API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
