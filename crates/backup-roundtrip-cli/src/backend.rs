// crates/backup-roundtrip-cli/src/backend.rs
// ============================================================================
// Module: Backend Wiring
// Description: Builds the backup manager and record store named by configuration.
// Purpose: Keep collaborator construction out of the command dispatcher.
// Dependencies: backup-roundtrip-{config, core, local, shell, store-sqlite}, thiserror
// ============================================================================

//! ## Overview
//! A [`Backend`] pairs a [`TransportAdministrator`] with a [`RecordStore`].
//! The local backend opens the `SQLite` call log and a file-backed manager
//! whose call-log agent shares the same database. The device backend drives
//! `bmgr` and `content` through one [`ProcessRunner`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use backup_roundtrip_config::BackendKind;
use backup_roundtrip_config::BackupRoundTripConfig;
use backup_roundtrip_config::ConfigError;
use backup_roundtrip_core::AdminError;
use backup_roundtrip_core::CallRecord;
use backup_roundtrip_core::PackageName;
use backup_roundtrip_core::RecordStore;
use backup_roundtrip_core::RoundTripReport;
use backup_roundtrip_core::RoundTripVerifier;
use backup_roundtrip_core::RunLog;
use backup_roundtrip_core::ThreadSleeper;
use backup_roundtrip_core::TransportAdministrator;
use backup_roundtrip_core::VerificationError;
use backup_roundtrip_core::VerifierConfig;
use backup_roundtrip_local::BACKUP_DIR;
use backup_roundtrip_local::CallLogBackupAgent;
use backup_roundtrip_local::LocalBackupManager;
use backup_roundtrip_local::ManagerError;
use backup_roundtrip_local::backup_set_path;
use backup_roundtrip_shell::BmgrAdministrator;
use backup_roundtrip_shell::ContentProviderStore;
use backup_roundtrip_shell::ProcessRunner;
use backup_roundtrip_store_sqlite::SqliteRecordStore;
use backup_roundtrip_store_sqlite::SqliteStoreError;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Backend construction errors.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Configuration is invalid for the selected backend.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Local call log could not be opened.
    #[error(transparent)]
    Store(#[from] SqliteStoreError),
    /// Local backup manager could not be opened.
    #[error(transparent)]
    Manager(#[from] ManagerError),
}

// ============================================================================
// SECTION: Backend
// ============================================================================

/// Collaborators selected by configuration.
pub enum Backend {
    /// File-backed manager over a `SQLite` call log.
    Local {
        /// Local backup manager.
        manager: LocalBackupManager,
        /// Call log store shared with the manager's agent.
        store: SqliteRecordStore,
    },
    /// Device reached through `bmgr` and `content`.
    Device {
        /// `bmgr` administrator.
        admin: BmgrAdministrator<ProcessRunner>,
        /// Call log content provider.
        store: ContentProviderStore<ProcessRunner>,
    },
}

impl Backend {
    /// Opens the backend selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the package name is invalid or local
    /// state cannot be opened.
    pub fn open(config: &BackupRoundTripConfig) -> Result<Self, BackendError> {
        match config.backend.kind {
            BackendKind::Local => {
                let local = &config.backend.local;
                let store = SqliteRecordStore::new(local.store_config())?;
                let mut manager = LocalBackupManager::open(local.state_dir.clone())?;
                manager.register_agent(config.package()?, CallLogBackupAgent::new(store.clone()));
                Ok(Self::Local {
                    manager,
                    store,
                })
            }
            BackendKind::Device => {
                let device = &config.backend.device;
                let runner = ProcessRunner::new(
                    device.program.clone(),
                    device.prefix_args(),
                    device.remote_shell,
                );
                Ok(Self::Device {
                    admin: BmgrAdministrator::new(runner.clone()),
                    store: ContentProviderStore::new(runner),
                })
            }
        }
    }

    /// Returns the backend kind.
    #[must_use]
    pub const fn kind(&self) -> BackendKind {
        match self {
            Self::Local {
                ..
            } => BackendKind::Local,
            Self::Device {
                ..
            } => BackendKind::Device,
        }
    }

    /// Returns the raw transport listing.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the backup manager cannot be queried.
    pub fn list_transports(&self) -> Result<String, AdminError> {
        match self {
            Self::Local {
                manager,
                ..
            } => manager.list_transports(),
            Self::Device {
                admin,
                ..
            } => admin.list_transports(),
        }
    }

    /// Runs one round trip for `package` through this backend.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError`] when the run is skipped or fails.
    pub fn run_round_trip(
        &self,
        package: &PackageName,
        record: &CallRecord,
        config: VerifierConfig,
        log: Arc<dyn RunLog>,
    ) -> Result<RoundTripReport, VerificationError> {
        match self {
            Self::Local {
                manager,
                store,
            } => verify(manager, store, package, record, config, log),
            Self::Device {
                admin,
                store,
            } => verify(admin, store, package, record, config, log),
        }
    }
}

/// Runs the verifier over borrowed collaborators.
fn verify<A, S>(
    admin: &A,
    store: &S,
    package: &PackageName,
    record: &CallRecord,
    config: VerifierConfig,
    log: Arc<dyn RunLog>,
) -> Result<RoundTripReport, VerificationError>
where
    A: TransportAdministrator,
    S: RecordStore,
{
    RoundTripVerifier::new(admin, store, ThreadSleeper, config)
        .with_log(log)
        .run_round_trip(package, record)
}

/// Returns where the local backend keeps the backup set for the configured package.
///
/// # Errors
///
/// Returns [`ConfigError`] when the configured package name is invalid.
pub fn local_backup_set_path(config: &BackupRoundTripConfig) -> Result<PathBuf, ConfigError> {
    let backups = config.backend.local.state_dir.join(BACKUP_DIR);
    Ok(backup_set_path(&backups, &config.package()?))
}
