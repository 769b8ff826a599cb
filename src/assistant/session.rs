//! Assistant sessions: one wizard per open modal.
//!
//! Sessions live only in memory. The visitor's browser holds the session id
//! in a private (encrypted) cookie; closing the modal drops the session, and
//! idle sessions are evicted by the cache.

use std::sync::Arc;
use std::time::Duration;

use axum_extra::extract::cookie::Key;
use chrono::{DateTime, Utc};
use hkdf::Hkdf;
use moka::future::Cache;
use sha2::Sha256;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::wizard::Wizard;
use crate::config::SessionConfig;

/// Cookie names used by the assistant
pub mod cookie_names {
    /// Private cookie holding the assistant session id
    pub const SESSION: &str = "health_sos_assistant";
}

/// State of one open assistant modal.
#[derive(Debug)]
pub struct AssistantSession {
    pub id: Uuid,
    pub opened_at: DateTime<Utc>,
    pub wizard: Wizard,
    /// One-shot message for the next render (e.g. a rejected manual location)
    notice: Option<String>,
}

impl AssistantSession {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            opened_at: Utc::now(),
            wizard: Wizard::new(),
            notice: None,
        }
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    /// Take the pending notice, clearing it.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}

/// Shared handle to a session. Requests for the same session serialize on the mutex.
pub type SessionHandle = Arc<Mutex<AssistantSession>>;

#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<Uuid, SessionHandle>,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        let sessions = Cache::builder()
            .max_capacity(config.max_sessions)
            .time_to_idle(Duration::from_secs(config.idle_timeout_seconds))
            .build();
        Self { sessions }
    }

    /// Open a fresh session at the greeting step.
    pub async fn open(&self) -> (Uuid, SessionHandle) {
        let session = AssistantSession::new();
        let id = session.id;
        let handle = Arc::new(Mutex::new(session));
        self.sessions.insert(id, handle.clone()).await;
        tracing::debug!(session_id = %id, "Opened assistant session");
        (id, handle)
    }

    pub async fn get(&self, id: &Uuid) -> Option<SessionHandle> {
        self.sessions.get(id).await
    }

    /// Discard a session. Returns the removed session, if it was still live.
    pub async fn close(&self, id: &Uuid) -> Option<SessionHandle> {
        let removed = self.sessions.remove(id).await;
        if let Some(handle) = &removed {
            let session = handle.lock().await;
            let open_for = Utc::now().signed_duration_since(session.opened_at);
            tracing::debug!(
                session_id = %id,
                step = %session.wizard.step(),
                open_for_secs = open_for.num_seconds(),
                "Closed assistant session"
            );
        }
        removed
    }

    /// Approximate number of live sessions.
    pub fn len(&self) -> u64 {
        self.sessions.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cookie key for the session cookie.
///
/// Derived from the configured secret so sessions survive restarts; without
/// one a random key is generated and sessions end with the process.
pub fn cookie_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) => derive_cookie_key(secret),
        None => {
            tracing::warn!(
                "No session.cookie_secret configured, open assistant sessions will not survive a restart"
            );
            Key::generate()
        }
    }
}

/// Derive a 64-byte cookie key from a secret using HKDF-SHA256.
fn derive_cookie_key(secret: &str) -> Key {
    let hkdf = Hkdf::<Sha256>::new(None, secret.as_bytes());
    let mut key_bytes = [0u8; 64];
    hkdf.expand(b"health-sos-assistant-cookie", &mut key_bytes)
        .expect("64 bytes is a valid length for HKDF-SHA256");

    Key::from(&key_bytes)
}
