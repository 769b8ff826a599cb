//! The two choices a visitor makes before giving a location: who needs help,
//! and how severe the situation is.
//!
//! Both are pure lookups into display copy. Severity only changes what the
//! assistant says, never which facilities are listed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Who the emergency is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recipient {
    Human,
    Animal,
}

impl Recipient {
    pub const ALL: [Recipient; 2] = [Recipient::Human, Recipient::Animal];

    /// Lowercase identifier, as used in forms and query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Recipient::Human => "human",
            Recipient::Animal => "animal",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Recipient::Human => "Human",
            Recipient::Animal => "Animal",
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-declared urgency of the emergency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Urgent,
    Mild,
}

/// Display copy for a severity level.
#[derive(Debug, Clone, Serialize)]
pub struct SeverityPresentation {
    pub severity: Severity,
    pub label: &'static str,
    /// CSS classes for the severity badge
    pub badge_class: &'static str,
    /// Short line under the label on the severity buttons
    pub description: &'static str,
    /// Advice shown once the severity is chosen
    pub message: &'static str,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::Urgent, Severity::Mild];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Urgent => "urgent",
            Severity::Mild => "mild",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Urgent => "Urgent",
            Severity::Mild => "Mild",
        }
    }

    pub fn badge_class(self) -> &'static str {
        match self {
            Severity::Critical => "bg-destructive text-destructive-foreground",
            Severity::Urgent => "bg-warning text-warning-foreground",
            Severity::Mild => "bg-success text-success-foreground",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Severity::Critical => "Life-threatening emergency",
            Severity::Urgent => "Needs immediate attention",
            Severity::Mild => "Non-emergency care needed",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Severity::Critical => {
                "Calling emergency services immediately. Please stay calm and follow basic first aid if trained."
            }
            Severity::Urgent => {
                "Finding the nearest appropriate medical facility for immediate care."
            }
            Severity::Mild => "Locating nearby healthcare options for non-emergency treatment.",
        }
    }

    pub fn presentation(self) -> SeverityPresentation {
        SeverityPresentation {
            severity: self,
            label: self.label(),
            badge_class: self.badge_class(),
            description: self.description(),
            message: self.message(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
