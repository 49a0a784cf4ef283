// system-tests/tests/helpers/cli.rs
// ============================================================================
// Module: CLI Helpers
// Description: Shared helpers for locating and invoking the backup-roundtrip CLI.
// Purpose: Provide consistent CLI binary resolution across system-test suites.
// Dependencies: system-tests, std::process
// ============================================================================

//! Helpers for invoking the backup-roundtrip CLI in system-tests.

use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::process::Child;
use std::process::Command;
use std::process::Output;
use std::process::Stdio;
use std::sync::OnceLock;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;
use std::time::Instant;

use system_tests::config::SystemTestConfig;

/// Locates the backup-roundtrip CLI binary, building it if necessary.
pub fn cli_binary() -> Option<PathBuf> {
    if let Ok(config) = SystemTestConfig::load()
        && let Some(path) = config.cli_binary
        && path.exists()
    {
        return Some(path);
    }
    if let Some(path) = option_env!("CARGO_BIN_EXE_backup-roundtrip") {
        let candidate = PathBuf::from(path);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    build_cli_binary().map_or_else(|_| resolve_cli_from_current_exe(), Some)
}

/// Upper bound for one CLI invocation when no override is configured.
const DEFAULT_CLI_TIMEOUT: Duration = Duration::from_secs(120);
/// Interval between exit checks while waiting on the CLI.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs the CLI with arguments inside `cwd` and returns the process output.
///
/// The child is killed once the configured timeout elapses.
pub fn run_cli(binary: &Path, cwd: &Path, args: &[&str]) -> Result<Output, String> {
    let timeout = SystemTestConfig::load()?.timeout.unwrap_or(DEFAULT_CLI_TIMEOUT);
    run_cli_with_timeout(binary, cwd, args, timeout)
}

/// Runs `binary` inside `cwd`, killing it when `timeout` elapses first.
pub fn run_cli_with_timeout(
    binary: &Path,
    cwd: &Path,
    args: &[&str],
    timeout: Duration,
) -> Result<Output, String> {
    let mut child = Command::new(binary)
        .args(args)
        .current_dir(cwd)
        .env_remove("BACKUP_ROUNDTRIP_CONFIG")
        .env_remove("BACKUP_ROUNDTRIP_LANG")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| format!("run backup-roundtrip failed: {err}"))?;
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let status = wait_with_deadline(&mut child, timeout)?;
    Ok(Output {
        status,
        stdout: join_drain(stdout)?,
        stderr: join_drain(stderr)?,
    })
}

fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
) -> Result<std::process::ExitStatus, String> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) =
            child.try_wait().map_err(|err| format!("wait for backup-roundtrip failed: {err}"))?
        {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(format!("backup-roundtrip timed out after {} ms", timeout.as_millis()));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<std::io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn join_drain(handle: JoinHandle<std::io::Result<Vec<u8>>>) -> Result<Vec<u8>, String> {
    handle
        .join()
        .map_err(|_| "output reader panicked".to_string())?
        .map_err(|err| format!("read backup-roundtrip output failed: {err}"))
}

fn resolve_cli_from_current_exe() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let profile_dir = exe.parent()?.parent()?;
    let candidate = profile_dir.join(format!("backup-roundtrip{}", exe_suffix()));
    if candidate.exists() { Some(candidate) } else { None }
}

fn target_dir_from_current_exe() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let profile_dir = exe.parent()?.parent()?;
    profile_dir.parent().map(PathBuf::from)
}

fn build_cli_binary() -> Result<PathBuf, String> {
    static BUILD_RESULT: OnceLock<Result<PathBuf, String>> = OnceLock::new();
    let result = BUILD_RESULT.get_or_init(|| {
        let Some(target_dir) = target_dir_from_current_exe() else {
            return Err("unable to resolve target dir from current exe".to_string());
        };
        let output = Command::new("cargo")
            .args([
                "build",
                "-p",
                "backup-roundtrip-cli",
                "--bin",
                "backup-roundtrip",
                "--target-dir",
            ])
            .arg(&target_dir)
            .output()
            .map_err(|err| format!("spawn cargo build failed: {err}"))?;
        if !output.status.success() {
            return Err(format!(
                "cargo build backup-roundtrip-cli failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }
        resolve_cli_from_target_dir(&target_dir)
            .ok_or_else(|| "backup-roundtrip binary not found after build".to_string())
    });
    result.clone()
}

fn resolve_cli_from_target_dir(target_dir: &Path) -> Option<PathBuf> {
    let candidate = target_dir.join("debug").join(format!("backup-roundtrip{}", exe_suffix()));
    if candidate.exists() { Some(candidate) } else { None }
}

const fn exe_suffix() -> &'static str {
    if cfg!(windows) { ".exe" } else { "" }
}
