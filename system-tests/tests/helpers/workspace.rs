// system-tests/tests/helpers/workspace.rs
// ============================================================================
// Module: Round-Trip Workspace
// Description: Per-test local backend directory with a generated config file.
// Purpose: Give each suite an isolated manager state and call log.
// Dependencies: backup-roundtrip-local, serde_json
// ============================================================================

//! Isolated local-backend workspaces for system-tests.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use backup_roundtrip_local::MANAGER_STATE_FILE;
use backup_roundtrip_local::ManagerState;

/// Local backend workspace rooted in a test artifact directory.
pub struct RoundTripWorkspace {
    root: PathBuf,
}

impl RoundTripWorkspace {
    /// Creates the workspace and writes `backup-roundtrip.toml` into it.
    pub fn create(root: &Path) -> Result<Self, String> {
        fs::create_dir_all(root).map_err(|err| format!("create workspace: {err}"))?;
        let workspace = Self {
            root: root.to_path_buf(),
        };
        let contents = format!(
            "[settle]\nmode = \"fixed\"\ninterval_ms = 0\n\n[backend]\nkind = \
             \"local\"\n\n[backend.local]\nstate_dir = '{}'\n",
            workspace.state_dir().display()
        );
        fs::write(workspace.config_path(), contents)
            .map_err(|err| format!("write config: {err}"))?;
        Ok(workspace)
    }

    /// Returns the workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the generated config path.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("backup-roundtrip.toml")
    }

    /// Returns the local manager state directory.
    pub fn state_dir(&self) -> PathBuf {
        self.root.join("state")
    }

    /// Writes the manager state a run should start from.
    pub fn write_manager_state(&self, state: &ManagerState) -> Result<(), String> {
        fs::create_dir_all(self.state_dir()).map_err(|err| format!("create state dir: {err}"))?;
        let bytes =
            serde_json::to_vec_pretty(state).map_err(|err| format!("encode state: {err}"))?;
        fs::write(self.state_dir().join(MANAGER_STATE_FILE), bytes)
            .map_err(|err| format!("write state: {err}"))
    }

    /// Reads the manager state left behind by a run.
    pub fn read_manager_state(&self) -> Result<ManagerState, String> {
        let bytes = fs::read(self.state_dir().join(MANAGER_STATE_FILE))
            .map_err(|err| format!("read state: {err}"))?;
        serde_json::from_slice(&bytes).map_err(|err| format!("decode state: {err}"))
    }
}
