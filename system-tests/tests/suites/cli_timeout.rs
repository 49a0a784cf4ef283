// system-tests/tests/suites/cli_timeout.rs
// ============================================================================
// Module: CLI Timeout Tests
// Description: Per-invocation deadlines enforced by the CLI runner.
// Purpose: Validate that a hung child is killed and reported as an error.
// Dependencies: system-tests helpers
// ============================================================================

//! CLI runner deadline coverage for backup-roundtrip system-tests.

use std::path::Path;
use std::time::Duration;
use std::time::Instant;

use helpers::cli::run_cli_with_timeout;

use crate::helpers;

#[cfg(unix)]
#[test]
fn hung_child_is_killed_at_deadline() -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    let result = run_cli_with_timeout(
        Path::new("/bin/sh"),
        Path::new("/"),
        &["-c", "sleep 30"],
        Duration::from_millis(200),
    );
    match result {
        Err(err) if err.contains("timed out after 200 ms") => {}
        other => return Err(format!("expected a timeout, got {other:?}").into()),
    }
    if started.elapsed() >= Duration::from_secs(10) {
        return Err("child outlived its deadline".into());
    }
    Ok(())
}

#[cfg(unix)]
#[test]
fn fast_child_output_is_captured() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_cli_with_timeout(
        Path::new("/bin/sh"),
        Path::new("/"),
        &["-c", "echo out; echo err >&2; exit 3"],
        Duration::from_secs(10),
    )?;
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(output.stdout, b"out\n");
    assert_eq!(output.stderr, b"err\n");
    Ok(())
}
