// crates/backup-roundtrip-core/tests/common/mod.rs
// ============================================================================
// Module: Shared Test Collaborators
// Description: Scripted backup manager, sticky store, and recording sleeper.
// Purpose: Drive the verifier deterministically without real backup services.
// Dependencies: backup-roundtrip-core
// ============================================================================

//! Shared fakes for verifier tests.

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Shared helpers are not used by every test binary."
)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use backup_roundtrip_core::AdminError;
use backup_roundtrip_core::CallRecord;
use backup_roundtrip_core::InMemoryRecordStore;
use backup_roundtrip_core::PackageName;
use backup_roundtrip_core::RecordStore;
use backup_roundtrip_core::Sleeper;
use backup_roundtrip_core::StoreError;
use backup_roundtrip_core::StoredRecord;
use backup_roundtrip_core::TransportAdministrator;
use backup_roundtrip_core::TransportName;

/// Transport the fakes offer by default as the round-trip target.
pub const LOCAL_TRANSPORT: &str = "android/com.android.internal.backup.LocalTransport";
/// Transport active before a run.
pub const CLOUD_TRANSPORT: &str = "com.google.android.gms/.backup.BackupTransportService";
/// Package used by tests.
pub const PACKAGE: &str = "com.android.providers.calllogbackup";

/// Mutable fake manager state.
#[derive(Debug)]
pub struct FakeState {
    /// Offered transports.
    pub transports: Vec<String>,
    /// Active transport.
    pub current: String,
    /// Backup service flag.
    pub enabled: bool,
    /// Every command issued, in order.
    pub calls: Vec<String>,
    /// Packages queued for backup.
    pub pending: Vec<String>,
    /// Records captured by the last backup.
    pub snapshot: Option<Vec<CallRecord>>,
    /// Replacement output for `enabled_status`.
    pub status_override: Option<String>,
    /// Replacement output for `select_transport`.
    pub switch_override: Option<String>,
    /// Transport name whose selection fails.
    pub fail_select: Option<String>,
    /// Restore rewrites durations to this value.
    pub corrupt_duration: Option<u64>,
    /// Restore is silently ignored.
    pub restore_noop: bool,
    /// Scripted idle responses; empty means no signal.
    pub idle_script: VecDeque<Option<bool>>,
}

/// Scripted backup manager that snapshots a shared in-memory store.
pub struct FakeAdmin {
    /// Manager state.
    pub state: Mutex<FakeState>,
    /// Store the manager backs up.
    store: InMemoryRecordStore,
}

impl FakeAdmin {
    /// Creates a manager offering the local and cloud transports, cloud active, disabled.
    pub fn new(store: InMemoryRecordStore) -> Self {
        Self {
            state: Mutex::new(FakeState {
                transports: vec![LOCAL_TRANSPORT.to_string(), CLOUD_TRANSPORT.to_string()],
                current: CLOUD_TRANSPORT.to_string(),
                enabled: false,
                calls: Vec::new(),
                pending: Vec::new(),
                snapshot: None,
                status_override: None,
                switch_override: None,
                fail_select: None,
                corrupt_duration: None,
                restore_noop: false,
                idle_script: VecDeque::new(),
            }),
            store,
        }
    }

    /// Applies a mutation to the state.
    pub fn configure(&self, f: impl FnOnce(&mut FakeState)) {
        f(&mut self.state.lock().unwrap());
    }

    /// Returns the recorded command log.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Returns the active transport.
    pub fn current(&self) -> String {
        self.state.lock().unwrap().current.clone()
    }

    /// Returns the enabled flag.
    pub fn enabled(&self) -> bool {
        self.state.lock().unwrap().enabled
    }

    /// Records a command.
    fn log(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl TransportAdministrator for FakeAdmin {
    fn list_transports(&self) -> Result<String, AdminError> {
        self.log("list".to_string());
        let state = self.state.lock().unwrap();
        let mut out = String::new();
        for name in &state.transports {
            if *name == state.current {
                out.push_str(&format!("  * {name}\n"));
            } else {
                out.push_str(&format!("    {name}\n"));
            }
        }
        Ok(out)
    }

    fn enabled_status(&self) -> Result<String, AdminError> {
        self.log("enabled".to_string());
        let state = self.state.lock().unwrap();
        if let Some(text) = &state.status_override {
            return Ok(text.clone());
        }
        let word = if state.enabled { "enabled" } else { "disabled" };
        Ok(format!("Backup Manager currently {word}\n"))
    }

    fn set_enabled(&self, enabled: bool) -> Result<String, AdminError> {
        self.log(format!("enable {enabled}"));
        let mut state = self.state.lock().unwrap();
        state.enabled = enabled;
        let word = if enabled { "enabled" } else { "disabled" };
        Ok(format!("Backup Manager now {word}\n"))
    }

    fn select_transport(&self, transport: &TransportName) -> Result<String, AdminError> {
        self.log(format!("transport {transport}"));
        let mut state = self.state.lock().unwrap();
        if state.fail_select.as_deref() == Some(transport.as_str()) {
            return Err(AdminError::Command(format!("cannot select {transport}")));
        }
        let previous = std::mem::replace(&mut state.current, transport.as_str().to_string());
        if let Some(text) = &state.switch_override {
            return Ok(text.clone());
        }
        Ok(format!("Selected transport {transport} (formerly {previous})\n"))
    }

    fn request_backup(&self, package: &PackageName) -> Result<(), AdminError> {
        self.log(format!("backup {package}"));
        self.state.lock().unwrap().pending.push(package.as_str().to_string());
        Ok(())
    }

    fn run_pending_backups(&self) -> Result<(), AdminError> {
        self.log("run".to_string());
        let rows = self.store.query_all().map_err(|err| AdminError::State(err.to_string()))?;
        let mut state = self.state.lock().unwrap();
        if state.enabled && !state.pending.is_empty() {
            state.pending.clear();
            state.snapshot = Some(rows.into_iter().map(|row| row.record).collect());
        }
        Ok(())
    }

    fn request_restore(&self, package: &PackageName) -> Result<(), AdminError> {
        self.log(format!("restore {package}"));
        let (snapshot, corrupt, noop) = {
            let state = self.state.lock().unwrap();
            (state.snapshot.clone(), state.corrupt_duration, state.restore_noop)
        };
        if noop {
            return Ok(());
        }
        for mut record in snapshot.unwrap_or_default() {
            if let Some(duration) = corrupt {
                record.duration_secs = duration;
            }
            self.store.insert(&record).map_err(|err| AdminError::State(err.to_string()))?;
        }
        Ok(())
    }

    fn is_idle(&self) -> Result<Option<bool>, AdminError> {
        Ok(self.state.lock().unwrap().idle_script.pop_front().flatten())
    }
}

/// Store whose `delete_all` stops working after a fixed number of calls.
pub struct StickyStore {
    /// Backing store.
    pub inner: InMemoryRecordStore,
    /// Remaining effective deletes.
    deletes_left: AtomicUsize,
}

impl StickyStore {
    /// Creates a store honoring `deletes` calls to `delete_all`.
    pub fn new(inner: InMemoryRecordStore, deletes: usize) -> Self {
        Self {
            inner,
            deletes_left: AtomicUsize::new(deletes),
        }
    }
}

impl RecordStore for StickyStore {
    fn delete_all(&self) -> Result<(), StoreError> {
        let left = self.deletes_left.load(Ordering::SeqCst);
        if left == 0 {
            return Ok(());
        }
        self.deletes_left.store(left - 1, Ordering::SeqCst);
        self.inner.delete_all()
    }

    fn insert(&self, record: &CallRecord) -> Result<(), StoreError> {
        self.inner.insert(record)
    }

    fn query_all(&self) -> Result<Vec<StoredRecord>, StoreError> {
        self.inner.query_all()
    }
}

/// Sleeper that records requested durations without blocking.
#[derive(Default)]
pub struct RecordingSleeper {
    /// Requested sleeps.
    pub sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    /// Returns every requested sleep.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    /// Returns the total requested sleep.
    pub fn total(&self) -> Duration {
        self.sleeps().into_iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Parses a transport name.
pub fn transport(name: &str) -> TransportName {
    TransportName::parse(name).unwrap()
}

/// Parses the test package name.
pub fn package() -> PackageName {
    PackageName::parse(PACKAGE).unwrap()
}
