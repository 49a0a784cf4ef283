// crates/backup-roundtrip-local/src/manager.rs
// ============================================================================
// Module: Local Backup Manager
// Description: File-backed backup manager with platform-compatible output.
// Purpose: Drive backups and restores through registered agents without a device.
// Dependencies: backup-roundtrip-core, serde, serde_json
// ============================================================================

//! ## Overview
//! [`LocalBackupManager`] offers two transports. `local/FileTransport` writes
//! one backup set per package under `<state_dir>/backups`, and
//! `local/NullTransport` accepts and discards everything. The enabled flag and
//! active transport persist in `manager-state.json`, so a run that dies leaves
//! evidence for the next one. Command output uses the platform backup
//! manager's wording.
//!
//! ## Invariants
//! - Scheduled backups run only while the service is enabled.
//! - Operations are synchronous, so the idle signal is always available.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;

use backup_roundtrip_core::AdminError;
use backup_roundtrip_core::PackageName;
use backup_roundtrip_core::TransportAdministrator;
use backup_roundtrip_core::TransportName;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::agent::AgentError;
use crate::agent::BackupAgent;
use crate::backupset::backup_set_path;
use crate::backupset::read_backup_set;
use crate::backupset::write_backup_set;
use crate::format::FormatError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Transport that persists backup sets to disk.
pub const FILE_TRANSPORT: &str = "local/FileTransport";
/// Transport that discards backups.
pub const NULL_TRANSPORT: &str = "local/NullTransport";
/// Transports offered, in listing order.
const TRANSPORTS: [&str; 2] = [FILE_TRANSPORT, NULL_TRANSPORT];
/// Persisted manager state filename.
pub const MANAGER_STATE_FILE: &str = "manager-state.json";
/// Directory for backup sets inside the state directory.
pub const BACKUP_DIR: &str = "backups";
/// Maximum manager state file size.
const MAX_STATE_FILE_SIZE: u64 = 64 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Local manager errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    /// State directory or file I/O failed.
    #[error("local backup manager io error: {0}")]
    Io(String),
    /// Persisted state is unusable.
    #[error("local backup manager state error: {0}")]
    State(String),
    /// A backup agent failed.
    #[error(transparent)]
    Agent(#[from] AgentError),
    /// A backup set could not be read or written.
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl From<ManagerError> for AdminError {
    fn from(error: ManagerError) -> Self {
        match error {
            ManagerError::Io(message) => Self::Io(message),
            ManagerError::State(message) => Self::State(message),
            ManagerError::Agent(err) => Self::Command(err.to_string()),
            ManagerError::Format(err) => Self::Command(err.to_string()),
        }
    }
}

// ============================================================================
// SECTION: State
// ============================================================================

/// Manager state persisted between processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerState {
    /// Backup service flag.
    pub enabled: bool,
    /// Active transport.
    pub transport: String,
}

impl Default for ManagerState {
    fn default() -> Self {
        Self {
            enabled: false,
            transport: NULL_TRANSPORT.to_string(),
        }
    }
}

/// Mutable manager state guarded by the manager mutex.
#[derive(Debug)]
struct ManagerInner {
    /// Persisted state.
    state: ManagerState,
    /// Packages scheduled for backup, in request order.
    pending: Vec<PackageName>,
}

/// Agent registered for a package.
type SharedAgent = Box<dyn BackupAgent + Send + Sync>;

// ============================================================================
// SECTION: Manager
// ============================================================================

/// File-backed backup manager.
pub struct LocalBackupManager {
    /// Directory holding state and backup sets.
    state_dir: PathBuf,
    /// Guarded state.
    inner: Mutex<ManagerInner>,
    /// Agents by package.
    agents: BTreeMap<PackageName, SharedAgent>,
}

impl LocalBackupManager {
    /// Opens (or initializes) manager state under `state_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError`] when the directory cannot be created or the
    /// persisted state is invalid.
    pub fn open(state_dir: impl Into<PathBuf>) -> Result<Self, ManagerError> {
        let state_dir = state_dir.into();
        fs::create_dir_all(&state_dir).map_err(|err| ManagerError::Io(err.to_string()))?;
        let state = load_state(&state_dir.join(MANAGER_STATE_FILE))?;
        Ok(Self {
            state_dir,
            inner: Mutex::new(ManagerInner {
                state,
                pending: Vec::new(),
            }),
            agents: BTreeMap::new(),
        })
    }

    /// Registers the agent responsible for `package`.
    pub fn register_agent(
        &mut self,
        package: PackageName,
        agent: impl BackupAgent + Send + Sync + 'static,
    ) {
        self.agents.insert(package, Box::new(agent));
    }

    /// Returns the state directory.
    #[must_use]
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Returns the directory holding backup sets.
    #[must_use]
    pub fn backup_dir(&self) -> PathBuf {
        self.state_dir.join(BACKUP_DIR)
    }

    /// Returns a snapshot of the persisted state.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::State`] when the state lock is poisoned.
    pub fn state(&self) -> Result<ManagerState, ManagerError> {
        Ok(self.lock()?.state.clone())
    }

    /// Locks the manager state.
    fn lock(&self) -> Result<MutexGuard<'_, ManagerInner>, ManagerError> {
        self.inner
            .lock()
            .map_err(|_| ManagerError::State("manager state lock poisoned".to_string()))
    }

    /// Looks up the agent for `package`.
    fn agent(&self, package: &PackageName) -> Result<&SharedAgent, AdminError> {
        self.agents
            .get(package)
            .ok_or_else(|| AdminError::Command(format!("no backup agent for package {package}")))
    }

    /// Writes `state` to the state file atomically.
    fn persist(&self, state: &ManagerState) -> Result<(), ManagerError> {
        let path = self.state_dir.join(MANAGER_STATE_FILE);
        let bytes =
            serde_json::to_vec_pretty(state).map_err(|err| ManagerError::State(err.to_string()))?;
        let temp_path = path.with_extension("tmp");
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|err| ManagerError::Io(err.to_string()))?;
        file.write_all(&bytes).map_err(|err| ManagerError::Io(err.to_string()))?;
        file.sync_all().map_err(|err| ManagerError::Io(err.to_string()))?;
        fs::rename(&temp_path, &path).map_err(|err| ManagerError::Io(err.to_string()))?;
        Ok(())
    }
}

impl TransportAdministrator for LocalBackupManager {
    fn list_transports(&self) -> Result<String, AdminError> {
        let inner = self.lock()?;
        let mut out = String::new();
        for name in TRANSPORTS {
            let marker = if name == inner.state.transport { "  * " } else { "    " };
            let _ = writeln!(out, "{marker}{name}");
        }
        Ok(out)
    }

    fn enabled_status(&self) -> Result<String, AdminError> {
        let inner = self.lock()?;
        Ok(format!("Backup Manager currently {}\n", enabled_word(inner.state.enabled)))
    }

    fn set_enabled(&self, enabled: bool) -> Result<String, AdminError> {
        let mut inner = self.lock()?;
        let mut next = inner.state.clone();
        next.enabled = enabled;
        self.persist(&next)?;
        inner.state = next;
        Ok(format!("Backup Manager now {}\n", enabled_word(enabled)))
    }

    fn select_transport(&self, transport: &TransportName) -> Result<String, AdminError> {
        let mut inner = self.lock()?;
        if !TRANSPORTS.contains(&transport.as_str()) {
            return Ok(format!("Unknown transport '{transport}' specified; no changes made.\n"));
        }
        let mut next = inner.state.clone();
        let previous = std::mem::replace(&mut next.transport, transport.as_str().to_string());
        self.persist(&next)?;
        inner.state = next;
        Ok(format!("Selected transport {transport} (formerly {previous})\n"))
    }

    fn request_backup(&self, package: &PackageName) -> Result<(), AdminError> {
        self.agent(package)?;
        let mut inner = self.lock()?;
        if !inner.pending.contains(package) {
            inner.pending.push(package.clone());
        }
        Ok(())
    }

    fn run_pending_backups(&self) -> Result<(), AdminError> {
        let mut inner = self.lock()?;
        if !inner.state.enabled {
            return Ok(());
        }
        let pending = std::mem::take(&mut inner.pending);
        for package in pending {
            let entities = self.agent(&package)?.on_backup().map_err(ManagerError::from)?;
            if inner.state.transport == FILE_TRANSPORT {
                let path = backup_set_path(&self.backup_dir(), &package);
                write_backup_set(&path, &entities).map_err(ManagerError::from)?;
            }
        }
        Ok(())
    }

    fn request_restore(&self, package: &PackageName) -> Result<(), AdminError> {
        let agent = self.agent(package)?;
        let inner = self.lock()?;
        if inner.state.transport != FILE_TRANSPORT {
            return Ok(());
        }
        let path = backup_set_path(&self.backup_dir(), package);
        if !path.exists() {
            return Ok(());
        }
        let entities = read_backup_set(&path).map_err(ManagerError::from)?;
        agent.on_restore(&entities).map_err(ManagerError::from)?;
        Ok(())
    }

    fn is_idle(&self) -> Result<Option<bool>, AdminError> {
        Ok(Some(self.lock()?.pending.is_empty()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the platform word for the enabled flag.
const fn enabled_word(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

/// Loads persisted state, defaulting when the file is absent.
fn load_state(path: &Path) -> Result<ManagerState, ManagerError> {
    if !path.exists() {
        return Ok(ManagerState::default());
    }
    let metadata = fs::metadata(path).map_err(|err| ManagerError::Io(err.to_string()))?;
    if metadata.len() > MAX_STATE_FILE_SIZE {
        return Err(ManagerError::State("manager state file exceeds size limit".to_string()));
    }
    let bytes = fs::read(path).map_err(|err| ManagerError::Io(err.to_string()))?;
    let state: ManagerState =
        serde_json::from_slice(&bytes).map_err(|err| ManagerError::State(err.to_string()))?;
    if !TRANSPORTS.contains(&state.transport.as_str()) {
        return Err(ManagerError::State(format!(
            "persisted transport {} is not offered",
            state.transport
        )));
    }
    Ok(state)
}
