//! Handlers for the Dr. Masuka assistant modal.
//!
//! Routes:
//! - POST /assistant/open - Start a fresh session at the greeting
//! - POST /assistant/close - Discard the session
//! - POST /assistant/start, /recipient, /severity, /location - Wizard steps
//! - POST /assistant/locate - Mark a device location request as in flight
//! - POST /assistant/location/device - Outcome of the device location request
//! - POST /assistant/retry-location - Back from results to the location step
//!
//! Form posts redirect back to the landing page, which renders the modal at
//! the session's current step. The browser holds only the session id, in a
//! private cookie.

use axum::{
    extract::State,
    http::StatusCode,
    response::Redirect,
    Form,
};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::Duration as TimeDuration;
use tracing::instrument;
use uuid::Uuid;

use crate::assistant::session::cookie_names;
use crate::assistant::{
    AssistantSession, Coordinates, LocationError, Recipient, SessionHandle, Severity,
    SeverityPresentation, Step, Wizard, WizardError,
};
use crate::facility::{Facility, FacilityDirectory};
use crate::state::AppState;

/// Where every assistant form post lands
const RETURN_TO: &str = "/";

#[derive(Debug, Deserialize)]
pub struct RecipientForm {
    pub recipient: Recipient,
}

#[derive(Debug, Deserialize)]
pub struct SeverityForm {
    pub severity: Severity,
}

#[derive(Debug, Deserialize)]
pub struct LocationForm {
    #[serde(default)]
    pub location: String,
}

/// Outcome of `navigator.geolocation.getCurrentPosition`, posted by app.js.
/// Either both coordinates or an error code are present.
#[derive(Debug, Deserialize)]
pub struct DeviceLocationForm {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub error: Option<LocationError>,
}

impl DeviceLocationForm {
    fn into_outcome(self) -> Result<Coordinates, LocationError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon).map_err(|e| {
                tracing::warn!(latitude = lat, longitude = lon, error = %e, "Rejected device coordinates");
                LocationError::PositionUnavailable
            }),
            _ => {
                tracing::warn!("Device location post carried neither coordinates nor an error");
                Err(LocationError::PositionUnavailable)
            }
        }
    }
}

/// What the modal templates need to render the current step.
#[derive(Debug, Serialize)]
pub struct AssistantView<'a> {
    pub step: Step,
    pub recipient: Option<Recipient>,
    pub recipient_label: Option<&'static str>,
    pub severity: Option<SeverityPresentation>,
    /// Choices offered on the severity step
    pub severity_options: Vec<SeverityPresentation>,
    pub location: &'a str,
    pub locating: bool,
    /// Milliseconds until an in-flight device request counts as abandoned
    pub locating_retry_ms: Option<u64>,
    pub location_error: Option<&'static str>,
    pub notice: Option<String>,
    pub facilities: Vec<&'a Facility>,
}

/// Build the template view for a session, consuming its pending notice.
///
/// A device location request older than `stale_after` is shown as not
/// locating, so the visitor can start another one.
pub fn assistant_view<'a>(
    session: &'a mut AssistantSession,
    directory: &'a FacilityDirectory,
    stale_after: Duration,
) -> AssistantView<'a> {
    let notice = session.take_notice();
    let wizard: &'a Wizard = &session.wizard;

    let remaining = wizard.locating_remaining(stale_after);
    let facilities = match (wizard.step(), wizard.recipient()) {
        (Step::Results, Some(recipient)) => directory.for_recipient(recipient),
        _ => Vec::new(),
    };

    AssistantView {
        step: wizard.step(),
        recipient: wizard.recipient(),
        recipient_label: wizard.recipient().map(Recipient::label),
        severity: wizard.severity().map(Severity::presentation),
        severity_options: Severity::ALL.iter().map(|s| s.presentation()).collect(),
        location: wizard.location(),
        locating: remaining.is_some(),
        locating_retry_ms: remaining
            .map(|left| u64::try_from(left.as_millis()).unwrap_or(u64::MAX)),
        location_error: wizard.location_error().map(LocationError::message),
        notice,
        facilities,
    }
}

fn session_id(jar: &PrivateCookieJar) -> Option<Uuid> {
    jar.get(cookie_names::SESSION)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// Look up the visitor's live session, if any.
pub async fn current_session(
    state: &AppState,
    jar: &PrivateCookieJar,
) -> Option<(Uuid, SessionHandle)> {
    let id = session_id(jar)?;
    let handle = state.sessions.get(&id).await?;
    Some((id, handle))
}

pub fn remove_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    let cookie = Cookie::build((cookie_names::SESSION, ""))
        .path("/")
        .max_age(TimeDuration::ZERO)
        .build();
    jar.remove(cookie)
}

/// Cookie lifetime matching the session idle timeout.
fn session_cookie_max_age(idle_timeout_seconds: u64) -> TimeDuration {
    TimeDuration::seconds(i64::try_from(idle_timeout_seconds).unwrap_or(i64::MAX))
}

/// Whether a rejection should be shown to the visitor. Out-of-order posts
/// (double submits, stale tabs) just re-render the current step.
fn is_user_facing(err: &WizardError) -> bool {
    matches!(
        err,
        WizardError::EmptyLocation | WizardError::LocationTooLong { .. }
    )
}

/// Apply one wizard operation to the visitor's session and redirect back.
async fn transition<F>(
    state: &AppState,
    jar: &PrivateCookieJar,
    action: &'static str,
    apply: F,
) -> Redirect
where
    F: FnOnce(&mut Wizard) -> Result<(), WizardError>,
{
    let Some((id, handle)) = current_session(state, jar).await else {
        tracing::debug!(action, "No live assistant session");
        return Redirect::to(RETURN_TO);
    };

    let mut session = handle.lock().await;
    let from = session.wizard.step();
    match apply(&mut session.wizard) {
        Ok(()) => {
            tracing::info!(
                session_id = %id,
                action,
                from = %from,
                to = %session.wizard.step(),
                "Assistant transition"
            );
        }
        Err(err) => {
            tracing::warn!(
                session_id = %id,
                action,
                step = %from,
                error = %err,
                "Assistant transition rejected"
            );
            if is_user_facing(&err) {
                session.set_notice(err.to_string());
            }
        }
    }

    Redirect::to(RETURN_TO)
}

/// Open the assistant. Any session the visitor already had is discarded,
/// so every opening starts at the greeting.
#[instrument(name = "assistant::open", skip(state, jar))]
pub async fn open(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Redirect) {
    if let Some(previous) = session_id(&jar) {
        state.sessions.close(&previous).await;
    }

    let (id, _) = state.sessions.open().await;
    tracing::info!(session_id = %id, "Assistant opened");

    let cookie = Cookie::build((cookie_names::SESSION, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(session_cookie_max_age(state.config.session.idle_timeout_seconds))
        .build();

    (jar.add(cookie), Redirect::to(RETURN_TO))
}

/// Close the assistant, discarding all of its state.
#[instrument(name = "assistant::close", skip(state, jar))]
pub async fn close(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Redirect) {
    if let Some(id) = session_id(&jar) {
        if state.sessions.close(&id).await.is_some() {
            tracing::info!(session_id = %id, "Assistant closed");
        }
    }
    (remove_session_cookie(jar), Redirect::to(RETURN_TO))
}

#[instrument(name = "assistant::start", skip(state, jar))]
pub async fn start(State(state): State<AppState>, jar: PrivateCookieJar) -> Redirect {
    transition(&state, &jar, "start", Wizard::start).await
}

#[instrument(name = "assistant::recipient", skip(state, jar, form), fields(recipient = %form.recipient))]
pub async fn recipient(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<RecipientForm>,
) -> Redirect {
    transition(&state, &jar, "choose_recipient", |w| {
        w.choose_recipient(form.recipient)
    })
    .await
}

#[instrument(name = "assistant::severity", skip(state, jar, form), fields(severity = %form.severity))]
pub async fn severity(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<SeverityForm>,
) -> Redirect {
    transition(&state, &jar, "choose_severity", |w| {
        w.choose_severity(form.severity)
    })
    .await
}

/// Manual location entry. The location text is not logged.
#[instrument(name = "assistant::location", skip(state, jar, form))]
pub async fn location(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<LocationForm>,
) -> Redirect {
    transition(&state, &jar, "submit_location", |w| {
        w.submit_location(&form.location)
    })
    .await
}

/// Called by app.js just before it asks the browser for the position.
///
/// Returns 204 when the request may proceed, 409 when one is already in
/// flight (or the wizard is not on the location step), 404 without a session.
#[instrument(name = "assistant::locate", skip(state, jar))]
pub async fn locate(State(state): State<AppState>, jar: PrivateCookieJar) -> StatusCode {
    let Some((id, handle)) = current_session(&state, &jar).await else {
        return StatusCode::NOT_FOUND;
    };

    let stale_after = state.config.ui.locating_stale_after();
    let mut session = handle.lock().await;
    match session.wizard.begin_locating(stale_after) {
        Ok(()) => {
            tracing::info!(session_id = %id, "Device location requested");
            StatusCode::NO_CONTENT
        }
        Err(err) => {
            tracing::warn!(session_id = %id, error = %err, "Device location request refused");
            StatusCode::CONFLICT
        }
    }
}

/// Outcome of the device location request. Coordinates are not logged.
#[instrument(name = "assistant::device_location", skip(state, jar, form))]
pub async fn device_location(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<DeviceLocationForm>,
) -> Redirect {
    let outcome = form.into_outcome();
    if let Err(reason) = outcome {
        tracing::info!(reason = %reason, "Device location unavailable");
    }
    transition(&state, &jar, "resolve_location", |w| {
        w.resolve_location(outcome)
    })
    .await
}

#[instrument(name = "assistant::retry_location", skip(state, jar))]
pub async fn retry_location(State(state): State<AppState>, jar: PrivateCookieJar) -> Redirect {
    transition(&state, &jar, "retry_location", Wizard::retry_location).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const STALE: Duration = Duration::from_secs(15);

    fn form(lat: Option<f64>, lon: Option<f64>, error: Option<LocationError>) -> DeviceLocationForm {
        DeviceLocationForm {
            latitude: lat,
            longitude: lon,
            error,
        }
    }

    #[test]
    fn device_form_with_coordinates() {
        let outcome = form(Some(-1.2921), Some(36.8219), None).into_outcome();
        assert_eq!(outcome.unwrap().to_string(), "-1.2921, 36.8219");
    }

    #[test]
    fn device_form_error_wins() {
        let outcome = form(Some(1.0), Some(1.0), Some(LocationError::Timeout)).into_outcome();
        assert_eq!(outcome, Err(LocationError::Timeout));
    }

    #[test]
    fn device_form_bad_or_missing_coordinates() {
        assert_eq!(
            form(Some(123.0), Some(0.0), None).into_outcome(),
            Err(LocationError::PositionUnavailable)
        );
        assert_eq!(
            form(Some(1.0), None, None).into_outcome(),
            Err(LocationError::PositionUnavailable)
        );
    }

    #[test]
    fn only_input_problems_are_shown() {
        assert!(is_user_facing(&WizardError::EmptyLocation));
        assert!(is_user_facing(&WizardError::LocationTooLong { max: 200 }));
        assert!(!is_user_facing(&WizardError::AlreadyLocating));
        assert!(!is_user_facing(&WizardError::InvalidTransition {
            step: Step::Greeting,
            action: "start"
        }));
    }

    #[test]
    fn cookie_max_age_matches_idle_timeout() {
        assert_eq!(session_cookie_max_age(1800), TimeDuration::seconds(1800));
        assert_eq!(session_cookie_max_age(u64::MAX), TimeDuration::seconds(i64::MAX));
    }

    #[tokio::test]
    async fn view_shows_abandoned_request_as_idle() {
        let store = crate::assistant::SessionStore::new(&Default::default());
        let directory = FacilityDirectory::default();
        let (_, handle) = store.open().await;
        let mut session = handle.lock().await;

        session.wizard.start().unwrap();
        session.wizard.choose_recipient(Recipient::Human).unwrap();
        session.wizard.choose_severity(Severity::Urgent).unwrap();
        session.wizard.begin_locating(STALE).unwrap();

        let view = assistant_view(&mut session, &directory, STALE);
        assert!(view.locating);
        assert!(view.locating_retry_ms.is_some_and(|ms| ms <= 15_000));

        let view = assistant_view(&mut session, &directory, Duration::ZERO);
        assert!(!view.locating);
        assert_eq!(view.locating_retry_ms, None);
    }

    #[tokio::test]
    async fn view_lists_facilities_only_on_results() {
        let store = crate::assistant::SessionStore::new(&Default::default());
        let directory = FacilityDirectory::default();
        let (_, handle) = store.open().await;
        let mut session = handle.lock().await;

        session.wizard.start().unwrap();
        session.wizard.choose_recipient(Recipient::Animal).unwrap();
        session.wizard.choose_severity(Severity::Critical).unwrap();
        assert!(assistant_view(&mut session, &directory, STALE)
            .facilities
            .is_empty());

        session.wizard.submit_location("Suburbs").unwrap();
        session.set_notice("stale");
        let view = assistant_view(&mut session, &directory, STALE);
        assert_eq!(view.step, Step::Results);
        assert_eq!(view.recipient_label, Some("Animal"));
        assert_eq!(view.facilities.len(), 1);
        assert_eq!(view.facilities[0].name, "Pet Emergency Vet");
        assert_eq!(view.severity.as_ref().map(|s| s.label), Some("Critical"));
        assert_eq!(view.notice.as_deref(), Some("stale"));
    }
}
