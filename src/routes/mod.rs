//! HTTP route handlers for the Health-SOS site.
//!
//! Routes are grouped by how they may be cached. The landing page and the
//! assistant depend on the visitor's session cookie and are never cached
//! publicly; facility reference data and static assets are.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod api;
pub mod assistant;
pub mod health;
pub mod home;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{CACHE_CONTROL_API, CACHE_CONTROL_PRIVATE, CACHE_CONTROL_STATIC};
use crate::http::static_files::create_static_service;
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Insert the values every page template needs. The assistant modal is
/// closed unless the caller opens it.
pub fn insert_page_context(context: &mut tera::Context, state: &AppState) {
    context.insert("config", &state.config.ui);
    context.insert("assistant_open", &false);
    context.insert("current_year", &chrono::Utc::now().format("%Y").to_string());
}

/// Creates the Axum router with all routes and cache headers.
pub fn create_router(state: AppState) -> Router {
    // Landing page renders the open assistant, so it is per-visitor
    let home_routes = Router::new()
        .route("/", get(home::index))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_PRIVATE),
        ));

    // Assistant transitions - stateful, never cached
    let assistant_routes = Router::new()
        .route("/assistant/open", post(assistant::open))
        .route("/assistant/close", post(assistant::close))
        .route("/assistant/start", post(assistant::start))
        .route("/assistant/recipient", post(assistant::recipient))
        .route("/assistant/severity", post(assistant::severity))
        .route("/assistant/location", post(assistant::location))
        .route("/assistant/locate", post(assistant::locate))
        .route("/assistant/location/device", post(assistant::device_location))
        .route("/assistant/retry-location", post(assistant::retry_location))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_PRIVATE),
        ));

    // Facility reference data - moderate cache
    let api_routes = Router::new()
        .route("/api/facilities", get(api::facilities))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_API),
        ));

    // Static files - long cache with immutable hint, with theme fallback
    let static_routes = Router::new()
        .nest_service("/static", create_static_service(&state.config.theme))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_STATIC),
        ));

    // Health check - no caching, always fresh for liveness probes
    let health_routes = Router::new().route("/health", get(health::health));

    Router::new()
        .merge(home_routes)
        .merge(assistant_routes)
        .merge(api_routes)
        .merge(health_routes)
        .merge(static_routes)
        .fallback(home::not_found)
        .with_state(state)
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
