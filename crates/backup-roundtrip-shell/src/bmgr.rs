// crates/backup-roundtrip-shell/src/bmgr.rs
// ============================================================================
// Module: bmgr Administrator
// Description: TransportAdministrator over the device `bmgr` tool.
// Purpose: Control the platform backup manager from the host.
// Dependencies: backup-roundtrip-core
// ============================================================================

//! ## Overview
//! Each operation is one `bmgr` invocation; raw stdout is returned for the
//! status adapter to parse. `bmgr` exposes no completion signal, so settle
//! waits fall back to the fixed delay.

// ============================================================================
// SECTION: Imports
// ============================================================================

use backup_roundtrip_core::AdminError;
use backup_roundtrip_core::PackageName;
use backup_roundtrip_core::TransportAdministrator;
use backup_roundtrip_core::TransportName;

use crate::runner::CommandRunner;

// ============================================================================
// SECTION: Administrator
// ============================================================================

/// Backup manager driven through `bmgr`.
#[derive(Debug, Clone)]
pub struct BmgrAdministrator<R> {
    /// Device command runner.
    runner: R,
}

impl<R: CommandRunner> BmgrAdministrator<R> {
    /// Creates an administrator over `runner`.
    #[must_use]
    pub const fn new(runner: R) -> Self {
        Self {
            runner,
        }
    }

    /// Returns the runner.
    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs `bmgr` with `args` and returns stdout.
    fn bmgr(&self, args: &[&str]) -> Result<String, AdminError> {
        let mut line = Vec::with_capacity(args.len() + 1);
        line.push("bmgr");
        line.extend_from_slice(args);
        Ok(self.runner.run(&line)?.stdout)
    }
}

impl<R: CommandRunner> TransportAdministrator for BmgrAdministrator<R> {
    fn list_transports(&self) -> Result<String, AdminError> {
        self.bmgr(&["list", "transports"])
    }

    fn enabled_status(&self) -> Result<String, AdminError> {
        self.bmgr(&["enabled"])
    }

    fn set_enabled(&self, enabled: bool) -> Result<String, AdminError> {
        self.bmgr(&["enable", if enabled { "true" } else { "false" }])
    }

    fn select_transport(&self, transport: &TransportName) -> Result<String, AdminError> {
        self.bmgr(&["transport", transport.as_str()])
    }

    fn request_backup(&self, package: &PackageName) -> Result<(), AdminError> {
        self.bmgr(&["backup", package.as_str()]).map(drop)
    }

    fn run_pending_backups(&self) -> Result<(), AdminError> {
        self.bmgr(&["run"]).map(drop)
    }

    fn request_restore(&self, package: &PackageName) -> Result<(), AdminError> {
        self.bmgr(&["restore", package.as_str()]).map(drop)
    }
}
