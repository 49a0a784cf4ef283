// system-tests/tests/suites/run_log.rs
// ============================================================================
// Module: Run Log Tests
// Description: Structured run events written by `--log-file`.
// Purpose: Validate that each JSON line names an event, a level, and a stage.
// Dependencies: system-tests helpers, serde_json
// ============================================================================

//! Run log coverage for backup-roundtrip system-tests.

use std::fs;

use helpers::artifacts::TestReporter;
use helpers::cli::cli_binary;
use helpers::cli::run_cli;
use helpers::workspace::RoundTripWorkspace;
use serde_json::Value;

use crate::helpers;

#[test]
fn log_file_records_stage_events() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("log_file_records_stage_events")?;
    let Some(cli) = cli_binary() else {
        reporter.finish("skip", vec!["backup-roundtrip binary unavailable".to_string()], vec![])?;
        return Ok(());
    };
    let workspace = RoundTripWorkspace::create(&reporter.artifacts().root().join("workspace"))?;
    let config = workspace.config_path();
    let config = config.to_string_lossy();
    let log_path = reporter.artifacts().root().join("run.log.jsonl");
    let log_arg = log_path.to_string_lossy();

    let run = run_cli(&cli, workspace.root(), &["run", "--config", &config, "--log-file", &log_arg])?;
    reporter.artifacts().write_output("run", &run)?;
    if run.status.code() != Some(0) {
        return Err(format!("run exited with {:?}", run.status.code()).into());
    }

    let text = fs::read_to_string(&log_path)?;
    let events = text
        .lines()
        .map(serde_json::from_str::<Value>)
        .collect::<Result<Vec<_>, _>>()?;
    if events.is_empty() {
        return Err("run log is empty".into());
    }
    for event in &events {
        if !event["event"].is_string() || !event["level"].is_string() || !event["stage"].is_string()
        {
            return Err(format!("event missing required fields: {event}").into());
        }
    }
    let stages: Vec<&str> = events
        .iter()
        .filter(|event| event["event"] == "stage")
        .filter_map(|event| event["stage"].as_str())
        .collect();
    if !stages.contains(&"restored") || !stages.contains(&"verified") {
        return Err(format!("stage events incomplete: {stages:?}").into());
    }
    if events.iter().any(|event| event["level"] == "error") {
        return Err("passing run logged an error event".into());
    }

    reporter.finish(
        "pass",
        vec![format!("{} run events recorded", events.len())],
        vec!["run.log.jsonl".to_string()],
    )?;
    Ok(())
}
