//! Domain payloads carried by records.
//!
//! Payload contents are opaque to the soft-delete lifecycle: the
//! tombstone manager and sweep planner never read them, they only move
//! them around intact.

use crate::models::{RecordKind, Severity};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A community emergency report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyReport {
    /// Name of the person filing the report.
    pub reporter_name: String,
    /// Free-form location description (address, landmark, intersection).
    pub location: String,
    /// What is happening.
    pub description: String,
    /// How urgent the situation is.
    #[serde(default)]
    pub severity: Severity,
}

impl EmergencyReport {
    /// Validates required fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the reporter name, location,
    /// or description is empty after trimming.
    pub fn validate(&self) -> Result<()> {
        if self.reporter_name.trim().is_empty() {
            return Err(Error::InvalidInput("reporter name is required".to_string()));
        }
        if self.location.trim().is_empty() {
            return Err(Error::InvalidInput("location is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(Error::InvalidInput("description is required".to_string()));
        }
        Ok(())
    }
}

/// A location shared by a user awaiting assistance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationShare {
    /// Name of the person sharing their location.
    pub sharer_name: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Optional note ("on the roof", "need medication").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl LocationShare {
    /// Validates required fields and coordinate ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the sharer name is empty or a
    /// coordinate is non-finite or out of range.
    pub fn validate(&self) -> Result<()> {
        if self.sharer_name.trim().is_empty() {
            return Err(Error::InvalidInput("sharer name is required".to_string()));
        }
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::InvalidInput(format!(
                "latitude {} out of range [-90, 90]",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::InvalidInput(format!(
                "longitude {} out of range [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// The domain data a record carries, tagged by kind on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RecordPayload {
    /// Emergency report payload.
    EmergencyReport(EmergencyReport),
    /// Location share payload.
    LocationShare(LocationShare),
}

impl RecordPayload {
    /// Returns the record kind this payload belongs to.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::EmergencyReport(_) => RecordKind::EmergencyReport,
            Self::LocationShare(_) => RecordKind::LocationShare,
        }
    }

    /// Validates the payload contents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when a required field is missing
    /// or out of range.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::EmergencyReport(report) => report.validate(),
            Self::LocationShare(share) => share.validate(),
        }
    }

    /// One-line human summary for list output.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::EmergencyReport(report) => format!(
                "[{}] {} at {}",
                report.severity, report.reporter_name, report.location
            ),
            Self::LocationShare(share) => {
                let note = share.note.as_deref().unwrap_or("no note");
                format!(
                    "{} at ({:.4}, {:.4}): {}",
                    share.sharer_name, share.latitude, share.longitude, note
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_validation() {
        let report = EmergencyReport {
            reporter_name: "Dana Cruz".to_string(),
            location: "5th and Main".to_string(),
            description: "Street flooding past the curb".to_string(),
            severity: Severity::High,
        };
        assert!(report.validate().is_ok());

        let blank = EmergencyReport {
            reporter_name: "  ".to_string(),
            ..report
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_share_coordinate_range() {
        let share = LocationShare {
            sharer_name: "Ari".to_string(),
            latitude: 29.95,
            longitude: -90.07,
            note: None,
        };
        assert!(share.validate().is_ok());

        let bad = LocationShare {
            latitude: 91.0,
            ..share.clone()
        };
        assert!(bad.validate().is_err());

        let nan = LocationShare {
            longitude: f64::NAN,
            ..share
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_payload_kind() {
        let payload = RecordPayload::LocationShare(LocationShare {
            sharer_name: "Ari".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            note: None,
        });
        assert_eq!(payload.kind(), RecordKind::LocationShare);
    }
}
