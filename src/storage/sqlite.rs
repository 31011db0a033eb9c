//! `SQLite`-based record store.
//!
//! Durable storage with the whole record set in a single `records`
//! table. The payload is stored as a JSON column so the schema never
//! changes when a payload grows a field.

use crate::models::{Record, RecordId, RecordKind, RecordPayload};
use crate::storage::RecordStore;
use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tracing::instrument;

/// Acquires the connection lock, recovering from poison.
fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            // Recover from poison - this is safe because we log the issue
            // and the connection state should still be valid
            tracing::warn!("SQLite mutex was poisoned, recovering");
            metrics::counter!("sqlite_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Applies connection pragmas shared by file-backed and in-memory stores.
fn configure_connection(conn: &Connection) {
    // Enable WAL mode for better concurrent read performance.
    // pragma_update returns the new journal mode as a string, ignore it.
    let _ = conn.pragma_update(None, "journal_mode", "WAL");
    let _ = conn.pragma_update(None, "synchronous", "NORMAL");
    // Wait up to 5 seconds for locks instead of failing with SQLITE_BUSY
    let _ = conn.pragma_update(None, "busy_timeout", "5000");
}

/// Records operation counter and duration metrics.
fn record_operation_metrics(operation: &'static str, start: Instant, status: &'static str) {
    metrics::counter!(
        "storage_operations_total",
        "backend" => "sqlite",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "storage_operation_duration_ms",
        "backend" => "sqlite",
        "operation" => operation,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64() * 1000.0);
}

/// Raw row from the `records` table before type conversion.
struct RecordRow {
    id: String,
    kind: String,
    created_at: i64,
    deleted_at: Option<i64>,
    payload: String,
}

fn build_record_from_row(row: RecordRow) -> Result<Record> {
    let payload: RecordPayload =
        serde_json::from_str(&row.payload).map_err(|e| Error::Storage {
            operation: "deserialize_payload".to_string(),
            cause: e.to_string(),
        })?;

    let kind = RecordKind::parse(&row.kind).unwrap_or(payload.kind());

    Ok(Record {
        id: RecordId::new(row.id),
        kind,
        created_at: u64::try_from(row.created_at).unwrap_or(0),
        deleted_at: row.deleted_at.and_then(|t| u64::try_from(t).ok()),
        payload,
    })
}

/// `SQLite`-based record store.
///
/// # Concurrency Model
///
/// Uses a `Mutex<Connection>` for thread-safe access. `SQLite`'s WAL
/// mode and `busy_timeout` pragma mitigate contention:
///
/// - **WAL mode**: Allows concurrent readers with a single writer
/// - **`busy_timeout`**: Waits up to 5 seconds for locks instead of failing immediately
/// - **NORMAL synchronous**: Balances durability with performance
///
/// # Schema
///
/// One `records` table: id, kind, `created_at`, `deleted_at`, payload
/// (JSON). `deleted_at` NULL means live; the partial index on it keeps
/// sweep scans over tombstones cheap.
pub struct SqliteStore {
    /// Connection to the `SQLite` database.
    ///
    /// Protected by Mutex because `rusqlite::Connection` is not `Sync`.
    conn: Mutex<Connection>,
    /// Path to the `SQLite` database (None for in-memory).
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Creates a new `SQLite` record store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use winder::SqliteStore;
    ///
    /// let store = SqliteStore::new("./records.db")?;
    /// # Ok::<(), winder::Error>(())
    /// ```
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        let conn = Connection::open(&db_path).map_err(|e| Error::Storage {
            operation: "open_sqlite".to_string(),
            cause: e.to_string(),
        })?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
        };

        store.initialize()?;
        Ok(store)
    }

    /// Creates an in-memory `SQLite` record store (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::Storage {
            operation: "open_sqlite_in_memory".to_string(),
            cause: e.to_string(),
        })?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: None,
        };

        store.initialize()?;
        Ok(store)
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub const fn db_path(&self) -> Option<&PathBuf> {
        self.db_path.as_ref()
    }

    /// Initializes the database schema.
    ///
    /// # Errors
    ///
    /// Returns an error if schema initialization fails.
    fn initialize(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);

        configure_connection(&conn);

        conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                deleted_at INTEGER,
                payload TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| Error::Storage {
            operation: "create_records_table".to_string(),
            cause: e.to_string(),
        })?;

        Self::create_indexes(&conn);

        Ok(())
    }

    /// Creates indexes for common query patterns.
    fn create_indexes(conn: &Connection) {
        // Index on kind for filtered listings
        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_records_kind ON records(kind)",
            [],
        );

        // Index on created_at for retention scans
        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_records_created_at ON records(created_at DESC)",
            [],
        );

        // Partial index for soft-deleted records
        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_records_deleted ON records(deleted_at) WHERE deleted_at IS NOT NULL",
            [],
        );
    }
}

impl RecordStore for SqliteStore {
    #[instrument(skip(self, record), fields(operation = "put", backend = "sqlite", record.id = %record.id.as_str()))]
    fn put(&self, record: &Record) -> Result<()> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);

            let payload_json =
                serde_json::to_string(&record.payload).map_err(|e| Error::Storage {
                    operation: "serialize_payload".to_string(),
                    cause: e.to_string(),
                })?;

            // Cast u64 to i64 for SQLite (rusqlite has no ToSql for u64)
            #[allow(clippy::cast_possible_wrap)]
            let created_at_i64 = record.created_at as i64;
            #[allow(clippy::cast_possible_wrap)]
            let deleted_at_i64 = record.deleted_at.map(|t| t as i64);

            conn.execute(
                "INSERT OR REPLACE INTO records (id, kind, created_at, deleted_at, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id.as_str(),
                    record.kind.as_str(),
                    created_at_i64,
                    deleted_at_i64,
                    payload_json
                ],
            )
            .map_err(|e| Error::Storage {
                operation: "insert_record".to_string(),
                cause: e.to_string(),
            })?;

            Ok(())
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("put", start, status);
        result
    }

    #[instrument(skip(self), fields(operation = "get", backend = "sqlite", record.id = %id.as_str()))]
    fn get(&self, id: &RecordId) -> Result<Option<Record>> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);

            let row: Option<RecordRow> = conn
                .query_row(
                    "SELECT id, kind, created_at, deleted_at, payload
                     FROM records
                     WHERE id = ?1",
                    params![id.as_str()],
                    |row| {
                        Ok(RecordRow {
                            id: row.get(0)?,
                            kind: row.get(1)?,
                            created_at: row.get(2)?,
                            deleted_at: row.get(3)?,
                            payload: row.get(4)?,
                        })
                    },
                )
                .optional()
                .map_err(|e| Error::Storage {
                    operation: "get_record".to_string(),
                    cause: e.to_string(),
                })?;

            row.map(build_record_from_row).transpose()
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("get", start, status);
        result
    }

    #[instrument(skip(self), fields(operation = "delete", backend = "sqlite", record.id = %id.as_str()))]
    fn delete(&self, id: &RecordId) -> Result<bool> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);

            let deleted = conn
                .execute("DELETE FROM records WHERE id = ?1", params![id.as_str()])
                .map_err(|e| Error::Storage {
                    operation: "delete_record".to_string(),
                    cause: e.to_string(),
                })?;

            Ok(deleted > 0)
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("delete", start, status);
        result
    }

    #[instrument(skip(self), fields(operation = "list_ids", backend = "sqlite"))]
    fn list_ids(&self) -> Result<Vec<RecordId>> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);

            let mut stmt = conn
                .prepare("SELECT id FROM records")
                .map_err(|e| Error::Storage {
                    operation: "prepare_list_ids".to_string(),
                    cause: e.to_string(),
                })?;

            let ids: Vec<RecordId> = stmt
                .query_map([], |row| {
                    let id: String = row.get(0)?;
                    Ok(RecordId::new(id))
                })
                .map_err(|e| Error::Storage {
                    operation: "list_ids".to_string(),
                    cause: e.to_string(),
                })?
                .filter_map(std::result::Result::ok)
                .collect();

            Ok(ids)
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("list_ids", start, status);
        result
    }

    #[instrument(skip(self), fields(operation = "list", backend = "sqlite"))]
    fn list(&self) -> Result<Vec<Record>> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);

            let mut stmt = conn
                .prepare(
                    "SELECT id, kind, created_at, deleted_at, payload
                     FROM records
                     ORDER BY created_at DESC",
                )
                .map_err(|e| Error::Storage {
                    operation: "prepare_list".to_string(),
                    cause: e.to_string(),
                })?;

            let rows = stmt
                .query_map([], |row| {
                    Ok(RecordRow {
                        id: row.get(0)?,
                        kind: row.get(1)?,
                        created_at: row.get(2)?,
                        deleted_at: row.get(3)?,
                        payload: row.get(4)?,
                    })
                })
                .map_err(|e| Error::Storage {
                    operation: "list_records".to_string(),
                    cause: e.to_string(),
                })?;

            let mut records = Vec::new();
            for row_result in rows {
                let row = row_result.map_err(|e| Error::Storage {
                    operation: "list_record_row".to_string(),
                    cause: e.to_string(),
                })?;
                records.push(build_record_from_row(row)?);
            }

            Ok(records)
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("list", start, status);
        result
    }

    #[instrument(skip(self), fields(operation = "exists", backend = "sqlite", record.id = %id.as_str()))]
    fn exists(&self, id: &RecordId) -> Result<bool> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);

            let exists: bool = conn
                .query_row(
                    "SELECT 1 FROM records WHERE id = ?1",
                    params![id.as_str()],
                    |_| Ok(true),
                )
                .optional()
                .map_err(|e| Error::Storage {
                    operation: "exists".to_string(),
                    cause: e.to_string(),
                })?
                .unwrap_or(false);

            Ok(exists)
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("exists", start, status);
        result
    }

    #[instrument(skip(self), fields(operation = "count", backend = "sqlite"))]
    fn count(&self) -> Result<usize> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);

            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
                .map_err(|e| Error::Storage {
                    operation: "count".to_string(),
                    cause: e.to_string(),
                })?;

            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            Ok(count as usize)
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("count", start, status);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmergencyReport, LocationShare, Severity};

    fn create_test_record(id: &str) -> Record {
        Record::new(
            RecordId::new(id),
            1_700_000_000,
            RecordPayload::EmergencyReport(EmergencyReport {
                reporter_name: "Dana Cruz".to_string(),
                location: "5th and Main".to_string(),
                description: "Street flooding".to_string(),
                severity: Severity::High,
            }),
        )
    }

    #[test]
    fn test_put_and_get() {
        let store = SqliteStore::in_memory().unwrap();

        let record = create_test_record("id1");
        store.put(&record).unwrap();

        let retrieved = store.get(&record.id).unwrap();
        assert_eq!(retrieved, Some(record));
    }

    #[test]
    fn test_get_nonexistent() {
        let store = SqliteStore::in_memory().unwrap();

        let result = store.get(&RecordId::new("nonexistent")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_put_replaces_and_persists_deleted_at() {
        let store = SqliteStore::in_memory().unwrap();

        let mut record = create_test_record("id1");
        store.put(&record).unwrap();

        record.deleted_at = Some(1_700_000_500);
        store.put(&record).unwrap();

        let retrieved = store.get(&record.id).unwrap().unwrap();
        assert_eq!(retrieved.deleted_at, Some(1_700_000_500));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_delete() {
        let store = SqliteStore::in_memory().unwrap();

        let record = create_test_record("id1");
        store.put(&record).unwrap();

        assert!(store.get(&record.id).unwrap().is_some());
        assert!(store.delete(&record.id).unwrap());
        assert!(store.get(&record.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_nonexistent() {
        let store = SqliteStore::in_memory().unwrap();

        assert!(!store.delete(&RecordId::new("nonexistent")).unwrap());
    }

    #[test]
    fn test_list_ids() {
        let store = SqliteStore::in_memory().unwrap();

        store.put(&create_test_record("id1")).unwrap();
        store.put(&create_test_record("id2")).unwrap();
        store.put(&create_test_record("id3")).unwrap();

        let ids = store.list_ids().unwrap();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&RecordId::new("id1")));
    }

    #[test]
    fn test_list_orders_newest_first() {
        let store = SqliteStore::in_memory().unwrap();

        let mut older = create_test_record("older");
        older.created_at = 1_700_000_000;
        let mut newer = create_test_record("newer");
        newer.created_at = 1_700_000_900;

        store.put(&older).unwrap();
        store.put(&newer).unwrap();

        let records = store.list().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, newer.id);
        assert_eq!(records[1].id, older.id);
    }

    #[test]
    fn test_exists() {
        let store = SqliteStore::in_memory().unwrap();

        store.put(&create_test_record("id1")).unwrap();

        assert!(store.exists(&RecordId::new("id1")).unwrap());
        assert!(!store.exists(&RecordId::new("id2")).unwrap());
    }

    #[test]
    fn test_share_payload_round_trip() {
        let store = SqliteStore::in_memory().unwrap();

        let share = Record::new(
            RecordId::new("share1"),
            1_700_000_050,
            RecordPayload::LocationShare(LocationShare {
                sharer_name: "Ari".to_string(),
                latitude: 29.95,
                longitude: -90.07,
                note: Some("on the roof".to_string()),
            }),
        );
        store.put(&share).unwrap();

        let retrieved = store.get(&share.id).unwrap().unwrap();
        assert_eq!(retrieved.kind, RecordKind::LocationShare);
        assert_eq!(retrieved, share);
    }
}
