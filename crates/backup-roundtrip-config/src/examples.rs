// crates/backup-roundtrip-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payloads.
// Purpose: Deterministic examples for docs and the `config example` command.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for round-trip configuration. The output is static and
//! must always load and validate.

/// Returns a canonical example `backup-roundtrip.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[target]
package = "com.android.providers.calllogbackup"
# transport = "android/com.android.internal.backup.LocalTransport"

[settle]
mode = "fixed"
interval_ms = 4000
poll_initial_ms = 100
poll_max_ms = 1000

[seed]
number = "555-1234"
date_ms = 0
duration_secs = 2000
call_type = "outgoing"
presentation = "allowed"
# account_component = "com.android.phone/com.android.services.telephony.TelephonyConnectionService"
# account_id = "0"

[backend]
kind = "local"

[backend.local]
state_dir = ".backup-roundtrip"
# database = ".backup-roundtrip/calllog.sqlite"
journal_mode = "wal"
sync_mode = "full"
busy_timeout_ms = 5000

[backend.device]
program = "adb"
args = ["shell"]
# serial = "emulator-5554"
remote_shell = true

[log]
# file = "backup-roundtrip.log"
stderr = false
"#,
    )
}
