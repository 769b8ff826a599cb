//! Shared application state for request handlers.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use tera::Tera;

use crate::assistant::session::{cookie_key, SessionStore};
use crate::config::AppConfig;
use crate::facility::FacilityDirectory;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Contains the application configuration, the Tera template engine, the
/// facility directory, the assistant session store and the key for the
/// private session cookie.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tera: Arc<Tera>,
    pub facilities: Arc<FacilityDirectory>,
    pub sessions: SessionStore,
    pub cookie_key: Key,
}

impl AppState {
    /// Creates a new application state from the given configuration and templates.
    pub fn new(config: AppConfig, tera: Tera) -> Self {
        let facilities = FacilityDirectory::from_config(&config.facilities);
        let sessions = SessionStore::new(&config.session);
        let cookie_key = cookie_key(config.session.cookie_secret.as_deref());

        Self {
            config: Arc::new(config),
            tera: Arc::new(tera),
            facilities: Arc::new(facilities),
            sessions,
            cookie_key,
        }
    }
}

/// Lets `PrivateCookieJar` find the cookie key in the state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
