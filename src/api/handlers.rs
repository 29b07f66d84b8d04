//! HTTP request handlers

use super::assets::{index_html, serve_static};
use super::render;
use super::types::{ChatRequest, ErrorResponse};
use super::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

const MISSING_FIELDS: &str = "sessionId and chatInput required";
const PROCESSING_FAILED: &str = "Failed to process request";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Root serves the chat page
        .route("/", get(serve_index))
        .route("/assets/*path", get(serve_static))
        .route("/api/chat", post(chat))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Page
// ============================================================

async fn serve_index(State(state): State<AppState>) -> Response {
    let welcome = render::assistant_bubble(&render::welcome(), state.allows_raw_html());
    match index_html(&welcome) {
        Some(page) => Html(page).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - UI not found</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Chat
// ============================================================

/// One tutor exchange. Replies as JSON, or as a rendered bubble when the
/// client asks for HTML.
async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let req = ChatRequest::parse(&body)
        .ok_or_else(|| AppError::BadRequest(MISSING_FIELDS.to_string()))?;

    let reply = state
        .chat
        .respond(&req.session_id, &req.chat_input)
        .await
        .map_err(|e| {
            tracing::error!(session_id = %req.session_id, error = %e, "Chat request failed");
            AppError::Internal(PROCESSING_FAILED.to_string())
        })?;

    if wants_html(&headers) {
        let bubble = render::assistant_bubble(&reply, state.allows_raw_html());
        Ok(Html(bubble).into_response())
    } else {
        Ok(Json(reply).into_response())
    }
}

fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("finsense ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
