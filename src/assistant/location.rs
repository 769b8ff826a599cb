//! Location input: manual text or coordinates from the device.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::wizard::WizardError;
use crate::config::MAX_LOCATION_LENGTH;

/// A position reported by the browser's geolocation API.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WizardError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(WizardError::InvalidCoordinates);
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(WizardError::InvalidCoordinates);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Renders as "lat, lon" with four decimal places, which is what the
/// assistant stores as the location.
impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Why a device location request failed.
///
/// The first three mirror the error codes of the browser geolocation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Unsupported,
}

impl LocationError {
    pub fn as_str(self) -> &'static str {
        match self {
            LocationError::PermissionDenied => "permission_denied",
            LocationError::PositionUnavailable => "position_unavailable",
            LocationError::Timeout => "timeout",
            LocationError::Unsupported => "unsupported",
        }
    }

    /// Message shown on the location step after a failed request.
    pub fn message(self) -> &'static str {
        match self {
            LocationError::PermissionDenied => {
                "Location access was denied. Please enter your location manually."
            }
            LocationError::PositionUnavailable => {
                "Your position could not be determined. Please enter your location manually."
            }
            LocationError::Timeout => {
                "Getting your location took too long. Try again or enter it manually."
            }
            LocationError::Unsupported => {
                "This device cannot share its location. Please enter your location manually."
            }
        }
    }
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim manually entered location text and check it can be submitted.
pub fn normalize_manual_location(input: &str) -> Result<String, WizardError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(WizardError::EmptyLocation);
    }
    if trimmed.chars().count() > MAX_LOCATION_LENGTH {
        return Err(WizardError::LocationTooLong {
            max: MAX_LOCATION_LENGTH,
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_format_to_four_decimals() {
        let c = Coordinates::new(-17.829_21, 31.053_37).unwrap();
        assert_eq!(c.to_string(), "-17.8292, 31.0534");

        let c = Coordinates::new(51.5, -0.12).unwrap();
        assert_eq!(c.to_string(), "51.5000, -0.1200");
    }

    #[test]
    fn coordinates_reject_out_of_range() {
        assert!(Coordinates::new(90.1, 0.0).is_err());
        assert!(Coordinates::new(-90.1, 0.0).is_err());
        assert!(Coordinates::new(0.0, 180.5).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(0.0, f64::INFINITY).is_err());
        assert!(Coordinates::new(90.0, -180.0).is_ok());
    }

    #[test]
    fn manual_location_is_trimmed() {
        assert_eq!(
            normalize_manual_location("  Harare, Zimbabwe \n").unwrap(),
            "Harare, Zimbabwe"
        );
    }

    #[test]
    fn blank_manual_location_is_rejected() {
        assert_eq!(normalize_manual_location(""), Err(WizardError::EmptyLocation));
        assert_eq!(normalize_manual_location(" \t\n"), Err(WizardError::EmptyLocation));
    }

    #[test]
    fn overlong_manual_location_is_rejected() {
        let long = "a".repeat(MAX_LOCATION_LENGTH + 1);
        assert_eq!(
            normalize_manual_location(&long),
            Err(WizardError::LocationTooLong {
                max: MAX_LOCATION_LENGTH
            })
        );
        let exact = "b".repeat(MAX_LOCATION_LENGTH);
        assert!(normalize_manual_location(&exact).is_ok());
    }

    #[test]
    fn location_error_codes_parse_from_form_values() {
        let e: LocationError = serde_json::from_str("\"permission_denied\"").unwrap();
        assert_eq!(e, LocationError::PermissionDenied);
        assert_eq!(LocationError::Timeout.to_string(), "timeout");
    }
}
