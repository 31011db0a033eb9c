//! Record kind and severity types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The domain type of a record.
///
/// Every record kind shares the same soft-delete lifecycle; the kind
/// selects per-kind retention overrides and drives list/export filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    /// A community emergency report (flooding, road closure, injury).
    #[serde(alias = "report")]
    EmergencyReport,
    /// A shared location broadcast by a user awaiting assistance.
    #[serde(alias = "share")]
    LocationShare,
}

impl RecordKind {
    /// Returns all record kind variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::EmergencyReport, Self::LocationShare]
    }

    /// Returns the kind as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EmergencyReport => "emergency-report",
            Self::LocationShare => "location-share",
        }
    }

    /// Uppercase suffix used in per-kind environment variable names.
    #[must_use]
    pub const fn env_suffix(&self) -> &'static str {
        match self {
            Self::EmergencyReport => "REPORT",
            Self::LocationShare => "SHARE",
        }
    }

    /// Parses a record kind from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "emergency-report" | "emergency_report" | "report" => Some(Self::EmergencyReport),
            "location-share" | "location_share" | "share" => Some(Self::LocationShare),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity of an emergency report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// No immediate danger.
    Low,
    /// Needs attention but not life-threatening.
    #[default]
    Medium,
    /// Urgent, property or safety at risk.
    High,
    /// Life-threatening, dispatch immediately.
    Critical,
}

impl Severity {
    /// Returns the severity as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Parses a severity from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
