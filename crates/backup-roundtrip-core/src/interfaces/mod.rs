// crates/backup-roundtrip-core/src/interfaces/mod.rs
// ============================================================================
// Module: Backup Round-Trip Interfaces
// Description: Collaborator contracts for backup managers, record stores, and sleeping.
// Purpose: Define the seams the verifier drives without knowing the backend.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The verifier owns no persistent data. It drives a [`TransportAdministrator`]
//! (the backup manager) and a [`RecordStore`] (the data being backed up), and
//! waits through a [`Sleeper`]. Administrators speak the backup manager's
//! human-readable text; parsing lives in [`crate::runtime::status`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;

use crate::core::CallRecord;
use crate::core::PackageName;
use crate::core::StoredRecord;
use crate::core::TransportName;

// ============================================================================
// SECTION: Transport Administrator
// ============================================================================

/// Backup manager command errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    /// Command could not be issued (process spawn, I/O).
    #[error("backup manager io error: {0}")]
    Io(String),
    /// Command ran but reported failure.
    #[error("backup manager command failed: {0}")]
    Command(String),
    /// Administrator state is unusable.
    #[error("backup manager state error: {0}")]
    State(String),
}

/// Control surface of a backup manager.
///
/// Methods returning `String` hand back the manager's raw text output. Output
/// formats are fixed external contracts:
/// - status: `Backup Manager currently enabled|disabled`
/// - transport switch: `... (formerly <previous>)`
/// - transport listing: whitespace-separated names, `*` marks the active one
pub trait TransportAdministrator {
    /// Lists available transports as raw text.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the listing cannot be obtained.
    fn list_transports(&self) -> Result<String, AdminError>;

    /// Reports whether the backup service is enabled, as raw text.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the status cannot be obtained.
    fn enabled_status(&self) -> Result<String, AdminError>;

    /// Enables or disables the backup service, returning raw output.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the command fails.
    fn set_enabled(&self, enabled: bool) -> Result<String, AdminError>;

    /// Activates a transport, returning the raw confirmation text.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the command fails.
    fn select_transport(&self, transport: &TransportName) -> Result<String, AdminError>;

    /// Schedules a backup of `package`.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the request fails.
    fn request_backup(&self, package: &PackageName) -> Result<(), AdminError>;

    /// Runs all scheduled backups.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the run cannot be started.
    fn run_pending_backups(&self) -> Result<(), AdminError>;

    /// Restores `package` from the active transport.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the request fails.
    fn request_restore(&self, package: &PackageName) -> Result<(), AdminError>;

    /// Reports whether backup work has drained.
    ///
    /// `Ok(None)` means the administrator exposes no completion signal and
    /// callers must fall back to a fixed settle delay.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the signal cannot be read.
    fn is_idle(&self) -> Result<Option<bool>, AdminError> {
        Ok(None)
    }
}

impl<T: TransportAdministrator + ?Sized> TransportAdministrator for &T {
    fn list_transports(&self) -> Result<String, AdminError> {
        (**self).list_transports()
    }

    fn enabled_status(&self) -> Result<String, AdminError> {
        (**self).enabled_status()
    }

    fn set_enabled(&self, enabled: bool) -> Result<String, AdminError> {
        (**self).set_enabled(enabled)
    }

    fn select_transport(&self, transport: &TransportName) -> Result<String, AdminError> {
        (**self).select_transport(transport)
    }

    fn request_backup(&self, package: &PackageName) -> Result<(), AdminError> {
        (**self).request_backup(package)
    }

    fn run_pending_backups(&self) -> Result<(), AdminError> {
        (**self).run_pending_backups()
    }

    fn request_restore(&self, package: &PackageName) -> Result<(), AdminError> {
        (**self).request_restore(package)
    }

    fn is_idle(&self) -> Result<Option<bool>, AdminError> {
        (**self).is_idle()
    }
}

// ============================================================================
// SECTION: Record Store
// ============================================================================

/// Record store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("record store io error: {0}")]
    Io(String),
    /// Backend engine error.
    #[error("record store error: {0}")]
    Store(String),
    /// Stored data failed an integrity check.
    #[error("record store corruption: {0}")]
    Corrupt(String),
    /// Store schema version is not supported.
    #[error("record store version mismatch: {0}")]
    VersionMismatch(String),
    /// Stored data could not be interpreted.
    #[error("record store invalid data: {0}")]
    Invalid(String),
}

/// Store holding the records under test.
pub trait RecordStore {
    /// Deletes every record. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when deletion fails.
    fn delete_all(&self) -> Result<(), StoreError>;

    /// Inserts one record; the store assigns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when insertion fails.
    fn insert(&self, record: &CallRecord) -> Result<(), StoreError>;

    /// Returns every record in identifier order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn query_all(&self) -> Result<Vec<StoredRecord>, StoreError>;
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn delete_all(&self) -> Result<(), StoreError> {
        (**self).delete_all()
    }

    fn insert(&self, record: &CallRecord) -> Result<(), StoreError> {
        (**self).insert(record)
    }

    fn query_all(&self) -> Result<Vec<StoredRecord>, StoreError> {
        (**self).query_all()
    }
}

// ============================================================================
// SECTION: Sleeper
// ============================================================================

/// Blocking wait used for settle intervals.
pub trait Sleeper {
    /// Blocks the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Sleeper backed by [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<T: Sleeper + ?Sized> Sleeper for &T {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}
