//! Record store abstraction.
//!
//! The store is the authoritative home of records; the lifecycle layer
//! only reads and writes whole records through the [`RecordStore`]
//! trait. Three adapters are provided:
//! - **Memory**: `RwLock<HashMap>`, for tests and ephemeral use
//! - **Filesystem**: one JSON document per record
//! - **`SQLite`**: a single `records` table

// Allow significant_drop_tightening - dropping database connections slightly early
// provides no meaningful benefit.
#![allow(clippy::significant_drop_tightening)]

mod filesystem;
mod memory;
mod sqlite;
mod traits;

pub use filesystem::FilesystemStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::RecordStore;
