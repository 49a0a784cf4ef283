// crates/backup-roundtrip-shell/tests/common/mod.rs
// ============================================================================
// Module: Scripted Device
// Description: In-process stand-in for `bmgr` and `content` on a device.
// Purpose: Exercise shell collaborators without a device or process spawns.
// Dependencies: backup-roundtrip-shell, backup-roundtrip-core
// ============================================================================

//! Shared fakes for shell collaborator tests.

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Shared helpers are not used by every test binary."
)]

use std::fmt::Write as _;
use std::sync::Mutex;

use backup_roundtrip_core::AccountRef;
use backup_roundtrip_core::CallRecord;
use backup_roundtrip_core::CallType;
use backup_roundtrip_core::Presentation;
use backup_roundtrip_shell::CommandOutput;
use backup_roundtrip_shell::CommandRunner;
use backup_roundtrip_shell::ShellError;

/// Device-side local transport.
pub const LOCAL_TRANSPORT: &str = "android/com.android.internal.backup.LocalTransport";
/// Device-side cloud transport, active by default.
pub const CLOUD_TRANSPORT: &str = "com.google.android.gms/.backup.BackupTransportService";
/// Call log backup package.
pub const PACKAGE: &str = "com.android.providers.calllogbackup";

/// Mutable device state.
#[derive(Debug)]
pub struct DeviceState {
    /// Offered transports.
    pub transports: Vec<String>,
    /// Active transport.
    pub current: String,
    /// Backup service flag.
    pub enabled: bool,
    /// Call log rows with their ids.
    pub rows: Vec<(i64, CallRecord)>,
    /// Next row id.
    pub next_id: i64,
    /// Packages queued for backup.
    pub pending: Vec<String>,
    /// Snapshot held by the local transport.
    pub snapshot: Option<Vec<CallRecord>>,
    /// Every command issued, space-joined.
    pub commands: Vec<String>,
    /// Command prefix (`bmgr`/`content` plus verb) that fails.
    pub fail_prefix: Option<String>,
}

/// Scripted device answering `bmgr` and `content`.
pub struct FakeDevice {
    /// Device state.
    pub state: Mutex<DeviceState>,
}

impl Default for FakeDevice {
    fn default() -> Self {
        Self {
            state: Mutex::new(DeviceState {
                transports: vec![LOCAL_TRANSPORT.to_string(), CLOUD_TRANSPORT.to_string()],
                current: CLOUD_TRANSPORT.to_string(),
                enabled: false,
                rows: Vec::new(),
                next_id: 1,
                pending: Vec::new(),
                snapshot: None,
                commands: Vec::new(),
                fail_prefix: None,
            }),
        }
    }
}

impl FakeDevice {
    /// Returns every command issued.
    pub fn commands(&self) -> Vec<String> {
        self.state.lock().unwrap().commands.clone()
    }

    /// Applies a mutation to the state.
    pub fn configure(&self, f: impl FnOnce(&mut DeviceState)) {
        f(&mut self.state.lock().unwrap());
    }

    /// Returns the active transport and enabled flag.
    pub fn transport_state(&self) -> (String, bool) {
        let state = self.state.lock().unwrap();
        (state.current.clone(), state.enabled)
    }
}

impl CommandRunner for FakeDevice {
    fn run(&self, args: &[&str]) -> Result<CommandOutput, ShellError> {
        let mut state = self.state.lock().unwrap();
        let line = args.join(" ");
        state.commands.push(line.clone());
        if let Some(prefix) = &state.fail_prefix
            && line.starts_with(prefix.as_str())
        {
            return Err(ShellError::Failed {
                command: line,
                status: "1".to_string(),
                stderr: "Error: simulated".to_string(),
            });
        }
        let stdout = match args {
            ["bmgr", "list", "transports"] => {
                let mut out = String::new();
                for name in &state.transports {
                    let marker = if *name == state.current { "  * " } else { "    " };
                    let _ = writeln!(out, "{marker}{name}");
                }
                out
            }
            ["bmgr", "enabled"] => {
                format!("Backup Manager currently {}\n", word(state.enabled))
            }
            ["bmgr", "enable", flag] => {
                state.enabled = *flag == "true";
                format!("Backup Manager now {}\n", word(state.enabled))
            }
            ["bmgr", "transport", name] => {
                let previous = std::mem::replace(&mut state.current, (*name).to_string());
                format!("Selected transport {name} (formerly {previous})\n")
            }
            ["bmgr", "backup", package] => {
                state.pending.push((*package).to_string());
                String::new()
            }
            ["bmgr", "run"] => {
                if state.enabled && !state.pending.is_empty() {
                    state.pending.clear();
                    let records = state.rows.iter().map(|(_, record)| record.clone()).collect();
                    state.snapshot = Some(records);
                }
                String::new()
            }
            ["bmgr", "restore", _] => {
                for record in state.snapshot.clone().unwrap_or_default() {
                    let id = state.next_id;
                    state.next_id += 1;
                    state.rows.push((id, record));
                }
                "restoreStarting: 1 packages\nrestoreFinished: 0\ndone\n".to_string()
            }
            ["content", "delete", "--uri", _] => {
                state.rows.clear();
                String::new()
            }
            ["content", "insert", "--uri", _, binds @ ..] => {
                let record = record_from_binds(binds);
                let id = state.next_id;
                state.next_id += 1;
                state.rows.push((id, record));
                String::new()
            }
            ["content", "query", ..] => render_rows(&state.rows),
            _ => {
                return Err(ShellError::Failed {
                    command: line,
                    status: "255".to_string(),
                    stderr: "unknown command".to_string(),
                });
            }
        };
        Ok(CommandOutput {
            stdout,
            stderr: String::new(),
        })
    }
}

/// Returns the platform word for the enabled flag.
fn word(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

/// Rebuilds a record from `--bind column:type:value` pairs.
fn record_from_binds(binds: &[&str]) -> CallRecord {
    let mut record = CallRecord {
        number: String::new(),
        date_ms: 0,
        duration_secs: 0,
        call_type: CallType::Incoming,
        presentation: Presentation::Allowed,
        account: None,
    };
    let mut component = None;
    let mut account_id = None;
    for pair in binds.chunks(2) {
        assert_eq!(pair[0], "--bind");
        let mut parts = pair[1].splitn(3, ':');
        let column = parts.next().unwrap();
        let _kind = parts.next().unwrap();
        let value = parts.next().unwrap();
        match column {
            "number" => record.number = value.to_string(),
            "date" => record.date_ms = value.parse().unwrap(),
            "duration" => record.duration_secs = value.parse().unwrap(),
            "type" => record.call_type = CallType::from_code(value.parse().unwrap()).unwrap(),
            "presentation" => {
                record.presentation = Presentation::from_code(value.parse().unwrap()).unwrap();
            }
            "subscription_component_name" => component = Some(value.to_string()),
            "subscription_id" => account_id = Some(value.to_string()),
            other => panic!("unexpected bind column {other}"),
        }
    }
    if let (Some(component_name), Some(account_id)) = (component, account_id) {
        record.account = Some(AccountRef {
            component_name,
            account_id,
        });
    }
    record
}

/// Renders rows the way `content query` prints them.
pub fn render_rows(rows: &[(i64, CallRecord)]) -> String {
    if rows.is_empty() {
        return "No result found.\n".to_string();
    }
    let mut out = String::new();
    for (index, (id, record)) in rows.iter().enumerate() {
        let (component, account_id) = record.account.as_ref().map_or(
            ("NULL".to_string(), "NULL".to_string()),
            |account| (account.component_name.clone(), account.account_id.clone()),
        );
        let _ = writeln!(
            out,
            "Row: {index} _id={id}, number={}, date={}, duration={}, type={}, presentation={}, \
             subscription_component_name={component}, subscription_id={account_id}",
            record.number,
            record.date_ms,
            record.duration_secs,
            record.call_type.code(),
            record.presentation.code()
        );
    }
    out
}
