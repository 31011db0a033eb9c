//! Data models for winder.
//!
//! This module contains the record types that participate in the
//! soft-delete lifecycle and the trait the lifecycle logic is written
//! against.

mod kind;
mod payload;
mod record;
mod soft_delete;

pub use kind::{RecordKind, Severity};
pub use payload::{EmergencyReport, LocationShare, RecordPayload};
pub use record::{Record, RecordId};
pub use soft_delete::SoftDeletable;
