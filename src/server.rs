//! HTTP chat server.
//!
//! Serves one shared [`ChatSession`] over a small JSON API, for front-ends
//! that want the assistant without embedding the crate.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/chat` | Submit `{ "text": "..." }`, returns the bot reply |
//! | `GET`  | `/transcript` | Every message of the session so far |
//! | `POST` | `/reload` | Reload the corpus from the backend |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "busy", "message": "a response is already in flight" } }
//! ```
//!
//! Error codes: `bad_request` (400), `busy` (409), `internal` (500).
//!
//! A submission that arrives while another is being answered is rejected
//! with `409`, never queued.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::client::HttpApi;
use crate::config::Config;
use crate::models::ChatMessage;
use crate::session::{ChatSession, SessionOptions};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    /// The one conversation this server hosts. Held for the whole submission.
    session: Arc<Mutex<ChatSession>>,
}

/// Starts the chat server on `[server].bind`.
///
/// The corpus is loaded once before the listener opens; a failed load
/// leaves the session running on an empty corpus.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let api = HttpApi::new(&config.api)?;
    tracing::info!(backend = %api.base_url(), "starting chat session");
    let session = ChatSession::start(Box::new(api), SessionOptions::from(&config.chat)).await;

    let app = router(Arc::new(Mutex::new(session)));

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "chat server listening");
    println!("Chat server listening on http://{}", config.server.bind);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Builds the router around an existing session.
pub fn router(session: Arc<Mutex<ChatSession>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(handle_chat))
        .route("/transcript", get(handle_transcript))
        .route("/reload", post(handle_reload))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { session })
}

// ============ Error response ============

/// JSON error envelope: `{"error": {"code": "...", "message": "..."}}`.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable code (`bad_request`, `busy`, `internal`).
    code: String,
    /// Human-readable description.
    message: String,
}

/// Handler error carrying its HTTP status and the body's code.
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

fn busy() -> AppError {
    AppError {
        status: StatusCode::CONFLICT,
        code: "busy".to_string(),
        message: "a response is already in flight".to_string(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
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

// ============ POST /chat ============

#[derive(Deserialize)]
struct ChatRequest {
    text: String,
}

#[derive(Serialize)]
struct ChatResponse {
    message: ChatMessage,
}

async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(bad_request("text must not be empty"));
    }

    let mut session = state.session.try_lock_owned().map_err(|_| busy())?;

    // Detached so a dropped connection cannot abandon a reply half-written.
    let reply = tokio::spawn(async move { session.submit(&req.text).await.cloned() })
        .await
        .map_err(|e| internal(e.to_string()))?;

    reply.map(|message| Json(ChatResponse { message })).ok_or_else(busy)
}

// ============ GET /transcript ============

#[derive(Serialize)]
struct TranscriptResponse {
    messages: Vec<ChatMessage>,
}

async fn handle_transcript(State(state): State<AppState>) -> Json<TranscriptResponse> {
    let session = state.session.lock().await;
    Json(TranscriptResponse {
        messages: session.transcript().to_vec(),
    })
}

// ============ POST /reload ============

#[derive(Serialize)]
struct ReloadResponse {
    employees: usize,
    departments: usize,
}

async fn handle_reload(
    State(state): State<AppState>,
) -> Result<Json<ReloadResponse>, AppError> {
    let mut session = state.session.try_lock_owned().map_err(|_| busy())?;
    let counts = tokio::spawn(async move {
        session.reload().await;
        (
            session.corpus().employees.len(),
            session.corpus().departments.len(),
        )
    })
    .await
    .map_err(|e| internal(e.to_string()))?;

    Ok(Json(ReloadResponse {
        employees: counts.0,
        departments: counts.1,
    }))
}
