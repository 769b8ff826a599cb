//! The Dr. Masuka emergency assistant.
//!
//! - `wizard`: the step-by-step flow (greeting, recipient, severity, location, results)
//! - `selection`: recipient and severity choices and their display copy
//! - `location`: manual location text and device coordinates
//! - `session`: in-memory sessions, one per open assistant modal

pub mod location;
pub mod selection;
pub mod session;
pub mod wizard;

pub use location::{Coordinates, LocationError};
pub use selection::{Recipient, Severity, SeverityPresentation};
pub use session::{AssistantSession, SessionHandle, SessionStore};
pub use wizard::{Step, Wizard, WizardError};
