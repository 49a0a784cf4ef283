// system-tests/tests/suites/state_restoration.rs
// ============================================================================
// Module: State Restoration Tests
// Description: Backup manager state survives failing and passing runs.
// Purpose: Validate that teardown restores the enabled flag and transport.
// Dependencies: system-tests helpers, backup-roundtrip-local
// ============================================================================

//! Teardown coverage for backup-roundtrip system-tests.

use backup_roundtrip_local::FILE_TRANSPORT;
use backup_roundtrip_local::ManagerState;
use backup_roundtrip_local::NULL_TRANSPORT;
use helpers::artifacts::TestReporter;
use helpers::cli::cli_binary;
use helpers::cli::run_cli;
use helpers::workspace::RoundTripWorkspace;

use crate::helpers;

#[test]
fn discarding_transport_fails_and_restores_state() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("discarding_transport_fails_and_restores_state")?;
    let Some(cli) = cli_binary() else {
        reporter.finish("skip", vec!["backup-roundtrip binary unavailable".to_string()], vec![])?;
        return Ok(());
    };
    let workspace = RoundTripWorkspace::create(&reporter.artifacts().root().join("workspace"))?;
    let config = workspace.config_path();
    let config = config.to_string_lossy();

    let run =
        run_cli(&cli, workspace.root(), &["run", "--config", &config, "--transport", NULL_TRANSPORT])?;
    reporter.artifacts().write_output("run", &run)?;
    if run.status.code() != Some(1) {
        return Err(format!("discarded backup should exit 1, got {:?}", run.status.code()).into());
    }
    let stderr = String::from_utf8_lossy(&run.stderr);
    if !stderr.contains("FAIL (data_integrity)") {
        return Err(format!("unexpected failure output: {stderr}").into());
    }
    let state = workspace.read_manager_state()?;
    if state != ManagerState::default() {
        return Err(format!("manager state not restored after failure: {state:?}").into());
    }

    reporter.finish(
        "pass",
        vec!["null transport run failed with state restored".to_string()],
        vec!["run.stderr".to_string()],
    )?;
    Ok(())
}

#[test]
fn enabled_manager_stays_enabled_after_pass() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("enabled_manager_stays_enabled_after_pass")?;
    let Some(cli) = cli_binary() else {
        reporter.finish("skip", vec!["backup-roundtrip binary unavailable".to_string()], vec![])?;
        return Ok(());
    };
    let workspace = RoundTripWorkspace::create(&reporter.artifacts().root().join("workspace"))?;
    let initial = ManagerState {
        enabled: true,
        transport: NULL_TRANSPORT.to_string(),
    };
    workspace.write_manager_state(&initial)?;
    let config = workspace.config_path();
    let config = config.to_string_lossy();

    let run =
        run_cli(&cli, workspace.root(), &["run", "--config", &config, "--transport", FILE_TRANSPORT])?;
    reporter.artifacts().write_output("run", &run)?;
    if run.status.code() != Some(0) {
        return Err(format!("run exited with {:?}", run.status.code()).into());
    }
    let state = workspace.read_manager_state()?;
    if state != initial {
        return Err(format!("manager state drifted: {state:?}").into());
    }

    let transports = run_cli(&cli, workspace.root(), &["transports", "--config", &config])?;
    reporter.artifacts().write_output("transports", &transports)?;
    let listing = String::from_utf8_lossy(&transports.stdout);
    if !listing.contains(&format!("* {NULL_TRANSPORT}")) {
        return Err(format!("previous transport not reselected: {listing}").into());
    }

    reporter.finish(
        "pass",
        vec!["enabled flag and transport restored after pass".to_string()],
        vec!["run.stdout".to_string(), "transports.stdout".to_string()],
    )?;
    Ok(())
}
