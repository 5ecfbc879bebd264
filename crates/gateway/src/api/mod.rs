pub mod chat;
pub mod generate;
pub mod roster;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use pf_recovery::error::USER_FACING_FAILURE;
use pf_recovery::GenerationError;

use crate::state::AppState;

/// Build the full API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/health", get(roster::health))
        .route("/v1/roster", get(roster::list_roster))
        .route("/v1/generate/:task", post(generate::generate))
        .route("/v1/chat", post(chat::chat))
}

/// Build a standardized JSON error response: `{ "error": "<message>" }`.
pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Map a failed generation onto a response. The error taxonomy is logged,
/// never returned.
pub(crate) fn generation_error(err: &GenerationError) -> Response {
    match err {
        GenerationError::Cancelled => {
            api_error(StatusCode::SERVICE_UNAVAILABLE, "generation cancelled")
        }
        GenerationError::Exhausted { .. } | GenerationError::MalformedStructuredOutput { .. } => {
            tracing::warn!(kind = err.kind(), error = %err, "generation failed");
            api_error(StatusCode::BAD_GATEWAY, USER_FACING_FAILURE)
        }
    }
}
