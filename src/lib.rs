//! Health-SOS: emergency-healthcare landing page and the Dr. Masuka assistant.
//!
//! The landing page is rendered server-side with Tera. The assistant is a
//! short guided flow (who needs help, how severe, where) kept in an
//! in-memory session per visitor, ending in a list of nearby facilities.

pub mod assistant;
pub mod config;
pub mod error;
pub mod facility;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod templates;

pub use config::AppConfig;
pub use error::{AppError, AppErrorResponse};
pub use routes::create_router;
pub use state::AppState;

/// Build the application router from configuration: load templates for the
/// configured theme, set up shared state, and wire all routes.
pub fn build_app(config: AppConfig) -> Result<axum::Router, AppError> {
    let tera = templates::init_templates(&config.theme)?;
    let state = AppState::new(config, tera);
    Ok(create_router(state))
}
