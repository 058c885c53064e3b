//! JSON HTTP server around the [`Engine`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/ingest` | Rebuild the index; returns `{ "indexed": n }` |
//! | `POST` | `/search` | `{ question, top_k? }` → ranked chunks |
//! | `POST` | `/ask` | `{ question, industry?, scenario?, top_k?, use_external_generation? }` → answer |
//! | `GET`  | `/status` | `{ "indexed": n }` |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "invalid input: question must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::engine::{AskRequest, Engine, SearchRequest};
use crate::error::EngineError;
use crate::models::{AskResponse, SearchHit, StatusResponse};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    engine: Arc<Engine>,
}

/// Starts the HTTP server.
///
/// Builds the engine from `config`, runs one ingest so the first queries
/// have something to search, then serves until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let engine = Arc::new(Engine::from_config(config)?);
    let report = engine.ingest().await?;
    if !report.skipped.is_empty() {
        warn!(skipped = report.skipped.len(), "some documents could not be read");
    }

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(addr = %config.server.bind, indexed = report.indexed, "server listening");
    println!("Listening on http://{}", config.server.bind);

    axum::serve(listener, router(engine)).await?;
    Ok(())
}

/// Routes for `engine`, exposed separately so tests can drive them.
pub fn router(engine: Arc<Engine>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ingest", post(handle_ingest))
        .route("/search", post(handle_search))
        .route("/ask", post(handle_ask))
        .route("/status", get(handle_status))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { engine })
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

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidInput(_) => bad_request(err.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

// ============ Handlers ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn handle_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(state.engine.status())
}

async fn handle_ingest(State(state): State<AppState>) -> Result<Json<StatusResponse>, AppError> {
    let report = state.engine.ingest().await.map_err(|e| {
        error!(error = %e, "ingest failed");
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal",
            message: e.to_string(),
        }
    })?;
    Ok(Json(StatusResponse {
        indexed: report.indexed,
    }))
}

async fn handle_search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    let Json(req) = payload?;
    let results = state.engine.search(&req)?;
    Ok(Json(results.iter().map(SearchHit::from).collect()))
}

async fn handle_ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let Json(req) = payload?;
    let answer = state.engine.ask(&req).await?;
    Ok(Json(AskResponse::from(&answer)))
}
