//! API Server
//!
//! HTTP front end for raggit. Loads a repository, answers questions about it
//! and keeps user notes, talking to the engine only through
//! `sdk::RepoAssistant`.
//!
//! # Endpoints
//!
//! - GET / - Landing page
//! - GET /chat - Chat page
//! - POST /setup_repo - Clone or refresh a repository and make it active
//! - POST /query - Ask a question about the active repository
//! - POST /save_note - Store a note about an answer
//! - GET /api/status - Get server status
//!
//! Failures are reported as HTTP 200 with `{status: "error", message, ...}`.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use anyhow::Context;
use sdk::{
    ErrorBody, MessageBody, QueryBody, QueryRequest, RepoAssistant, SaveNoteRequest,
    SetupRepoRequest,
};
use serde::Serialize;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tower_http::trace::TraceLayer;

const INDEX_HTML: &str = include_str!("../assets/index.html");
const CHAT_HTML: &str = include_str!("../assets/chat.html");

/// A note saved from the chat page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    pub query: String,
    pub response: String,
    pub note: String,
}

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    assistant: Arc<dyn RepoAssistant>,
    notes: Arc<Mutex<Vec<Note>>>,
}

impl AppState {
    pub fn new(assistant: Arc<dyn RepoAssistant>) -> Self {
        Self {
            assistant,
            notes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of the notes saved so far
    pub fn notes(&self) -> Vec<Note> {
        self.notes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Build the router with every endpoint
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/chat", get(chat_handler))
        .route("/setup_repo", post(setup_repo_handler))
        .route("/query", post(query_handler))
        .route("/save_note", post(save_note_handler))
        .route("/api/status", get(status_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(addr: &str, assistant: Arc<dyn RepoAssistant>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local = listener
        .local_addr()
        .context("Failed to get local address")?;
    tracing::info!("API server listening on http://{}", local);

    axum::serve(listener, router(AppState::new(assistant)))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("API server shutting down gracefully");
        })
        .await
        .context("API server error")
}

fn error_response(body: ErrorBody) -> Response {
    Json(body).into_response()
}

fn malformed(rejection: JsonRejection) -> Response {
    tracing::warn!("Rejected request body: {}", rejection.body_text());
    error_response(ErrorBody::message(format!(
        "Invalid request body: {}",
        rejection.body_text()
    )))
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn chat_handler() -> Html<&'static str> {
    Html(CHAT_HTML)
}

async fn setup_repo_handler(
    State(state): State<AppState>,
    payload: Result<Json<SetupRepoRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => return malformed(rejection),
    };

    let repo_url = match request.repo_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => return error_response(ErrorBody::message("Repository URL is required")),
    };

    match state
        .assistant
        .load_repository(&repo_url, request.target_directory.as_deref())
        .await
    {
        Ok(path) => {
            tracing::info!("Repository {} loaded at {}", repo_url, path.display());
            Json(MessageBody::success("Repository loaded successfully")).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to load repository {}: {}", repo_url, e);
            error_response(ErrorBody::from(&e))
        }
    }
}

async fn query_handler(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => return malformed(rejection),
    };

    let query = match request.query.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => return error_response(ErrorBody::message("Query is required")),
    };

    match state.assistant.ask(&query).await {
        Ok(reply) => Json(QueryBody::from(reply)).into_response(),
        Err(e) => {
            tracing::error!("Query failed: {}", e);
            error_response(ErrorBody::from(&e))
        }
    }
}

async fn save_note_handler(
    State(state): State<AppState>,
    payload: Result<Json<SaveNoteRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => return malformed(rejection),
    };

    let note = Note {
        query: request.query.unwrap_or_default(),
        response: request.response.unwrap_or_default(),
        note: request.note.unwrap_or_default(),
    };

    let count = {
        let mut notes = state.notes.lock().unwrap_or_else(|e| e.into_inner());
        notes.push(note);
        notes.len()
    };
    tracing::info!("Saved note ({} total)", count);

    Json(MessageBody::success("Note saved successfully")).into_response()
}

async fn status_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let repository = state
        .assistant
        .current_repository()
        .await
        .map(|p| p.display().to_string());

    Json(json!({
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "repository": repository,
    }))
}
