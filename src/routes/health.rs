//! Health check endpoint for container orchestration.
//!
//! Liveness probe: returns 200 OK with the number of open assistant sessions
//! in a response header, so operators can watch load without a metrics stack.

use axum::{extract::State, response::IntoResponse};

use crate::state::AppState;

pub const OPEN_SESSIONS_HEADER: &str = "x-open-sessions";

/// Health check handler.
///
/// Only checks that the process can respond to HTTP.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(OPEN_SESSIONS_HEADER, state.sessions.len().to_string())],
        "ok",
    )
}
