//! Landing page handler.
//!
//! The landing page is static marketing content. When the visitor holds a
//! live assistant session, the assistant modal is rendered on top of it at
//! the session's current step.

use axum::{extract::State, http::Uri, response::Html, Extension};
use axum_extra::extract::PrivateCookieJar;
use tracing::instrument;

use super::assistant::{assistant_view, current_session, remove_session_cookie};
use super::insert_page_context;
use crate::assistant::session::cookie_names;
use crate::error::{AppError, AppErrorResponse, ResultExt};
use crate::middleware::RequestId;
use crate::state::AppState;

/// Landing page handler.
#[instrument(name = "home::index", skip(state, request_id, jar))]
pub async fn index(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Html<String>), AppErrorResponse> {
    let mut context = tera::Context::new();
    insert_page_context(&mut context, &state);

    let mut jar = jar;
    if let Some((_, handle)) = current_session(&state, &jar).await {
        let mut session = handle.lock().await;
        let stale_after = state.config.ui.locating_stale_after();
        context.insert(
            "assistant",
            &assistant_view(&mut session, &state.facilities, stale_after),
        );
        context.insert("assistant_open", &true);
    } else if jar.get(cookie_names::SESSION).is_some() {
        // The cookie outlived its session (idle eviction or restart)
        tracing::debug!("Dropping cookie for expired assistant session");
        jar = remove_session_cookie(jar);
    }

    let html = state
        .tera
        .render("landing.html", &context)
        .map_err(AppError::from)
        .with_request_id(&request_id)?;
    Ok((jar, Html(html)))
}

/// Fallback for unknown paths.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
