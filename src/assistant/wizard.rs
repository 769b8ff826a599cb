//! The Dr. Masuka assistant flow.
//!
//! A linear state machine: greeting, recipient, severity, location, results.
//! Every operation is valid in exactly one step; anything else is rejected
//! with [`WizardError::InvalidTransition`] and leaves the wizard untouched.
//! The one backward edge is [`Wizard::retry_location`] from results.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

use super::location::{normalize_manual_location, Coordinates, LocationError};
use super::selection::{Recipient, Severity};

/// Current step of the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Greeting,
    Recipient,
    Severity,
    Location,
    Results,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Greeting => "greeting",
            Step::Recipient => "recipient",
            Step::Severity => "severity",
            Step::Location => "location",
            Step::Results => "results",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("cannot {action} while on the {step} step")]
    InvalidTransition { step: Step, action: &'static str },

    #[error("Please enter a city, zip code, or address.")]
    EmptyLocation,

    #[error("Location must be at most {max} characters.")]
    LocationTooLong { max: usize },

    #[error("A location request is already in progress.")]
    AlreadyLocating,

    #[error("The device reported coordinates out of range.")]
    InvalidCoordinates,
}

#[derive(Debug, Clone)]
pub struct Wizard {
    step: Step,
    recipient: Option<Recipient>,
    severity: Option<Severity>,
    location: String,
    /// Set while a device location request is in flight
    locating_since: Option<Instant>,
    location_error: Option<LocationError>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            step: Step::Greeting,
            recipient: None,
            severity: None,
            location: String::new(),
            locating_since: None,
            location_error: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn recipient(&self) -> Option<Recipient> {
        self.recipient
    }

    pub fn severity(&self) -> Option<Severity> {
        self.severity
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Whether a device location request is in flight and younger than
    /// `stale_after`. An older request counts as abandoned.
    pub fn is_locating(&self, stale_after: Duration) -> bool {
        self.locating_remaining(stale_after).is_some()
    }

    /// Time left before the in-flight device location request is abandoned.
    pub fn locating_remaining(&self, stale_after: Duration) -> Option<Duration> {
        self.locating_since
            .and_then(|since| stale_after.checked_sub(since.elapsed()))
            .filter(|left| !left.is_zero())
    }

    /// Failure of the most recent device location request, if any.
    pub fn location_error(&self) -> Option<LocationError> {
        self.location_error
    }

    fn expect_step(&self, expected: Step, action: &'static str) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition {
                step: self.step,
                action,
            })
        }
    }

    /// Leave the greeting and ask who needs help.
    pub fn start(&mut self) -> Result<(), WizardError> {
        self.expect_step(Step::Greeting, "start")?;
        self.step = Step::Recipient;
        Ok(())
    }

    pub fn choose_recipient(&mut self, recipient: Recipient) -> Result<(), WizardError> {
        self.expect_step(Step::Recipient, "choose a recipient")?;
        self.recipient = Some(recipient);
        self.step = Step::Severity;
        Ok(())
    }

    pub fn choose_severity(&mut self, severity: Severity) -> Result<(), WizardError> {
        self.expect_step(Step::Severity, "choose a severity")?;
        self.severity = Some(severity);
        self.step = Step::Location;
        Ok(())
    }

    /// Submit a manually typed location. Blank input keeps the wizard on the
    /// location step.
    pub fn submit_location(&mut self, input: &str) -> Result<(), WizardError> {
        self.expect_step(Step::Location, "submit a location")?;
        let location = normalize_manual_location(input)?;
        self.location = location;
        self.locating_since = None;
        self.location_error = None;
        self.step = Step::Results;
        Ok(())
    }

    /// Mark a device location request as in flight.
    ///
    /// A request older than `stale_after` is treated as abandoned, so a
    /// visitor who navigated away mid-request is not locked out.
    pub fn begin_locating(&mut self, stale_after: Duration) -> Result<(), WizardError> {
        self.expect_step(Step::Location, "request the device location")?;
        if self.is_locating(stale_after) {
            return Err(WizardError::AlreadyLocating);
        }
        self.locating_since = Some(Instant::now());
        self.location_error = None;
        Ok(())
    }

    /// Complete a device location request.
    ///
    /// Success stores the coordinates as "lat, lon" and shows results; a
    /// failure stays on the location step and records why.
    pub fn resolve_location(
        &mut self,
        outcome: Result<Coordinates, LocationError>,
    ) -> Result<(), WizardError> {
        self.expect_step(Step::Location, "resolve the device location")?;
        self.locating_since = None;
        match outcome {
            Ok(coords) => {
                self.location = coords.to_string();
                self.location_error = None;
                self.step = Step::Results;
            }
            Err(err) => {
                self.location_error = Some(err);
            }
        }
        Ok(())
    }

    /// Go back from results to try another location. Recipient and severity
    /// are kept.
    pub fn retry_location(&mut self) -> Result<(), WizardError> {
        self.expect_step(Step::Results, "try a different location")?;
        self.location_error = None;
        self.step = Step::Location;
        Ok(())
    }
}
