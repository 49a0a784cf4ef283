// system-tests/tests/suites/local_round_trip.rs
// ============================================================================
// Module: Local Round-Trip Tests
// Description: End-to-end backup, clear, and restore through the local backend.
// Purpose: Validate verdicts, exit codes, and JSON output of `backup-roundtrip run`.
// Dependencies: system-tests helpers, backup-roundtrip-local, serde_json
// ============================================================================

//! Local backend round-trip coverage for backup-roundtrip system-tests.

use backup_roundtrip_local::FILE_TRANSPORT;
use backup_roundtrip_local::ManagerState;
use helpers::artifacts::TestReporter;
use helpers::cli::cli_binary;
use helpers::cli::run_cli;
use helpers::workspace::RoundTripWorkspace;
use serde_json::Value;

use crate::helpers;

#[test]
fn local_round_trip_passes_and_keeps_backup_set() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("local_round_trip_passes_and_keeps_backup_set")?;
    let Some(cli) = cli_binary() else {
        reporter.finish("skip", vec!["backup-roundtrip binary unavailable".to_string()], vec![])?;
        return Ok(());
    };
    let workspace = RoundTripWorkspace::create(&reporter.artifacts().root().join("workspace"))?;
    let config = workspace.config_path();
    let config = config.to_string_lossy();

    let run = run_cli(&cli, workspace.root(), &["run", "--config", &config])?;
    reporter.artifacts().write_output("run", &run)?;
    if run.status.code() != Some(0) {
        return Err(format!("run exited with {:?}", run.status.code()).into());
    }
    let stdout = String::from_utf8_lossy(&run.stdout);
    if !stdout.starts_with("PASS:") || !stdout.contains("number=555-1234") {
        return Err(format!("unexpected pass output: {stdout}").into());
    }

    let inspect = run_cli(&cli, workspace.root(), &["backup", "inspect", "--config", &config])?;
    reporter.artifacts().write_output("inspect", &inspect)?;
    if inspect.status.code() != Some(0) {
        return Err(format!("inspect exited with {:?}", inspect.status.code()).into());
    }
    let listing = String::from_utf8_lossy(&inspect.stdout);
    if !listing.contains("1 entities") {
        return Err(format!("backup set should hold one entity: {listing}").into());
    }

    let state = workspace.read_manager_state()?;
    if state != ManagerState::default() {
        return Err(format!("manager state not restored: {state:?}").into());
    }

    reporter.finish(
        "pass",
        vec!["local round trip passed and backup set decoded".to_string()],
        vec!["run.stdout".to_string(), "inspect.stdout".to_string()],
    )?;
    Ok(())
}

#[test]
fn local_round_trip_json_reports_restored_records() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("local_round_trip_json_reports_restored_records")?;
    let Some(cli) = cli_binary() else {
        reporter.finish("skip", vec!["backup-roundtrip binary unavailable".to_string()], vec![])?;
        return Ok(());
    };
    let workspace = RoundTripWorkspace::create(&reporter.artifacts().root().join("workspace"))?;
    let config = workspace.config_path();
    let config = config.to_string_lossy();

    let run = run_cli(&cli, workspace.root(), &["run", "--config", &config, "--format", "json"])?;
    reporter.artifacts().write_output("run", &run)?;
    if run.status.code() != Some(0) {
        return Err(format!("run exited with {:?}", run.status.code()).into());
    }
    let output: Value = serde_json::from_slice(&run.stdout)?;
    if output["verdict"] != "pass" || output["transport"] != FILE_TRANSPORT {
        return Err(format!("unexpected verdict: {output}").into());
    }
    let restored = output["report"]["restored"]
        .as_array()
        .ok_or("report.restored should be an array")?;
    if restored.len() != 1 {
        return Err(format!("expected one restored record, got {}", restored.len()).into());
    }
    if restored[0]["record"]["number"] != "555-1234" {
        return Err(format!("restored record mismatch: {}", restored[0]).into());
    }
    reporter.artifacts().write_json("run.json", &output)?;

    reporter.finish(
        "pass",
        vec!["json verdict reported one restored record".to_string()],
        vec!["run.json".to_string()],
    )?;
    Ok(())
}

#[test]
fn missing_transport_skips_without_touching_state() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("missing_transport_skips_without_touching_state")?;
    let Some(cli) = cli_binary() else {
        reporter.finish("skip", vec!["backup-roundtrip binary unavailable".to_string()], vec![])?;
        return Ok(());
    };
    let workspace = RoundTripWorkspace::create(&reporter.artifacts().root().join("workspace"))?;
    let initial = ManagerState {
        enabled: true,
        transport: FILE_TRANSPORT.to_string(),
    };
    workspace.write_manager_state(&initial)?;
    let config = workspace.config_path();
    let config = config.to_string_lossy();

    let run = run_cli(
        &cli,
        workspace.root(),
        &["run", "--config", &config, "--transport", "local/MissingTransport"],
    )?;
    reporter.artifacts().write_output("run", &run)?;
    if run.status.code() != Some(2) {
        return Err(format!("skip should exit 2, got {:?}", run.status.code()).into());
    }
    if !String::from_utf8_lossy(&run.stdout).starts_with("SKIP:") {
        return Err("skip output missing".into());
    }
    let state = workspace.read_manager_state()?;
    if state != initial {
        return Err(format!("skipped run changed manager state: {state:?}").into());
    }

    reporter.finish(
        "pass",
        vec!["unavailable transport skipped with exit 2".to_string()],
        vec!["run.stdout".to_string()],
    )?;
    Ok(())
}
