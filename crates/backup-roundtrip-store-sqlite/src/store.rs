// crates/backup-roundtrip-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Call Log Store
// Description: Durable RecordStore backed by a SQLite `calls` table.
// Purpose: Persist call records with strict decoding on read.
// Dependencies: backup-roundtrip-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`RecordStore`] using `SQLite`. Rows use
//! the platform call-log column names. Reads decode every column strictly and
//! fail closed on values that cannot have been written by this store.
//!
//! ## Invariants
//! - `_id` is `AUTOINCREMENT`: identifiers are never reused.
//! - Account component and account id are both present or both absent.
//! - Durations are non-negative.

// ============================================================================//
// SECTION: Imports
// ============================================================================//

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use backup_roundtrip_core::AccountRef;
use backup_roundtrip_core::CallRecord;
use backup_roundtrip_core::CallType;
use backup_roundtrip_core::Presentation;
use backup_roundtrip_core::RecordId;
use backup_roundtrip_core::RecordStore;
use backup_roundtrip_core::StoreError;
use backup_roundtrip_core::StoredRecord;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================//
// SECTION: Constants
// ============================================================================//

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================//
// SECTION: Config
// ============================================================================//

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` call log store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a configuration with default pragmas for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================//
// SECTION: Errors
// ============================================================================//

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Row contents that this store could not have written.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store input.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

/// Maps a rusqlite error into the store error space.
fn db_error(err: &rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================//
// SECTION: Store
// ============================================================================//

/// Raw column values of one `calls` row.
type RawRow = (i64, String, i64, i64, i64, i64, Option<String>, Option<String>);

/// `SQLite`-backed call log store.
#[derive(Clone)]
pub struct SqliteRecordStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// Opens an `SQLite`-backed call log store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the database path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Deletes every row.
    fn delete_rows(&self) -> Result<(), SqliteStoreError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        guard.execute("DELETE FROM calls", params![]).map_err(|err| db_error(&err))?;
        drop(guard);
        Ok(())
    }

    /// Inserts one row.
    fn insert_row(&self, record: &CallRecord) -> Result<(), SqliteStoreError> {
        let duration = i64::try_from(record.duration_secs).map_err(|_| {
            SqliteStoreError::Invalid(format!(
                "duration {} exceeds sqlite integer range",
                record.duration_secs
            ))
        })?;
        let (component, account_id) = match &record.account {
            Some(account) => {
                (Some(account.component_name.as_str()), Some(account.account_id.as_str()))
            }
            None => (None, None),
        };
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        guard
            .execute(
                "INSERT INTO calls (number, date, duration, type, presentation, \
                 subscription_component_name, subscription_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6, \
                 ?7)",
                params![
                    record.number,
                    record.date_ms,
                    duration,
                    record.call_type.code(),
                    record.presentation.code(),
                    component,
                    account_id
                ],
            )
            .map_err(|err| db_error(&err))?;
        drop(guard);
        Ok(())
    }

    /// Loads every row in identifier order.
    fn query_rows(&self) -> Result<Vec<StoredRecord>, SqliteStoreError> {
        let raw: Vec<RawRow> = {
            let guard = self
                .connection
                .lock()
                .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
            let mut statement = guard
                .prepare(
                    "SELECT _id, number, date, duration, type, presentation, \
                     subscription_component_name, subscription_id FROM calls ORDER BY _id",
                )
                .map_err(|err| db_error(&err))?;
            let rows = statement
                .query_map(params![], |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                        row.get(7)?,
                    ))
                })
                .map_err(|err| db_error(&err))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| db_error(&err))?;
            rows
        };
        raw.into_iter().map(decode_row).collect()
    }
}

impl RecordStore for SqliteRecordStore {
    fn delete_all(&self) -> Result<(), StoreError> {
        self.delete_rows().map_err(StoreError::from)
    }

    fn insert(&self, record: &CallRecord) -> Result<(), StoreError> {
        self.insert_row(record).map_err(StoreError::from)
    }

    fn query_all(&self) -> Result<Vec<StoredRecord>, StoreError> {
        self.query_rows().map_err(StoreError::from)
    }
}

// ============================================================================//
// SECTION: Helpers
// ============================================================================//

/// Decodes raw column values into a stored record.
fn decode_row(raw: RawRow) -> Result<StoredRecord, SqliteStoreError> {
    let (id, number, date, duration, call_type, presentation, component, account_id) = raw;
    let duration_secs = u64::try_from(duration)
        .map_err(|_| SqliteStoreError::Corrupt(format!("negative duration for call {id}")))?;
    let call_type = i32::try_from(call_type)
        .ok()
        .and_then(|code| CallType::from_code(code).ok())
        .ok_or_else(|| SqliteStoreError::Corrupt(format!("unknown call type for call {id}")))?;
    let presentation = i32::try_from(presentation)
        .ok()
        .and_then(|code| Presentation::from_code(code).ok())
        .ok_or_else(|| SqliteStoreError::Corrupt(format!("unknown presentation for call {id}")))?;
    let account = match (component, account_id) {
        (Some(component_name), Some(account_id)) => Some(AccountRef {
            component_name,
            account_id,
        }),
        (None, None) => None,
        _ => {
            return Err(SqliteStoreError::Corrupt(format!(
                "partial account reference for call {id}"
            )));
        }
    };
    Ok(StoredRecord {
        id: RecordId::new(id),
        record: CallRecord {
            number,
            date_ms: date,
            duration_secs,
            call_type,
            presentation,
            account,
        },
    })
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with durable defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection =
        Connection::open_with_flags(&config.path, flags).map_err(|err| db_error(&err))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| db_error(&err))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| db_error(&err))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| db_error(&err))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| db_error(&err))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| db_error(&err))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| db_error(&err))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| db_error(&err))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS calls (
                    _id INTEGER PRIMARY KEY AUTOINCREMENT,
                    number TEXT NOT NULL,
                    date INTEGER NOT NULL,
                    duration INTEGER NOT NULL,
                    type INTEGER NOT NULL,
                    presentation INTEGER NOT NULL,
                    subscription_component_name TEXT,
                    subscription_id TEXT
                );",
            )
            .map_err(|err| db_error(&err))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| db_error(&err))?;
    Ok(())
}
