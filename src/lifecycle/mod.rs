//! Record lifecycle services.
//!
//! Services orchestrate the record store and enforce the soft-delete
//! state machine: live, soft-deleted (restorable within the grace
//! window), purged.

mod manager;
mod records;

pub use manager::{SoftDeleteOutcome, TombstoneManager, UndoOutcome};
pub use records::{KindCounts, RecordFilter, RecordService, StateFilter, StoreStatus};
