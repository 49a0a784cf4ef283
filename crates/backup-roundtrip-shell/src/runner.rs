// crates/backup-roundtrip-shell/src/runner.rs
// ============================================================================
// Module: Command Runner
// Description: Command execution seam and the process-backed runner.
// Purpose: Isolate process spawning so device collaborators stay testable.
// Dependencies: backup-roundtrip-core, thiserror
// ============================================================================

//! ## Overview
//! A [`CommandRunner`] executes one device command and returns its output. A
//! non-zero exit is an error carrying stderr. [`ProcessRunner`] prefixes every
//! command with fixed arguments (for example `adb -s <serial> shell`); when the
//! command is interpreted by a remote shell each argument is single-quoted so
//! it arrives as exactly one word.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::process::Command;

use backup_roundtrip_core::AdminError;
use backup_roundtrip_core::StoreError;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Device command errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    /// Command could not be started.
    #[error("failed to start {program}: {message}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// OS error text.
        message: String,
    },
    /// Command exited unsuccessfully.
    #[error("command `{command}` failed with status {status}: {stderr}")]
    Failed {
        /// Command line as issued.
        command: String,
        /// Exit status (`signal` when terminated by a signal).
        status: String,
        /// Captured stderr, trimmed.
        stderr: String,
    },
    /// Command output could not be interpreted.
    #[error("unexpected command output: {0}")]
    Output(String),
}

impl From<ShellError> for AdminError {
    fn from(error: ShellError) -> Self {
        match error {
            ShellError::Spawn {
                ..
            } => Self::Io(error.to_string()),
            ShellError::Failed {
                ..
            }
            | ShellError::Output(_) => Self::Command(error.to_string()),
        }
    }
}

impl From<ShellError> for StoreError {
    fn from(error: ShellError) -> Self {
        match error {
            ShellError::Spawn {
                ..
            } => Self::Io(error.to_string()),
            ShellError::Failed {
                ..
            } => Self::Store(error.to_string()),
            ShellError::Output(message) => Self::Corrupt(message),
        }
    }
}

// ============================================================================
// SECTION: Runner Contract
// ============================================================================

/// Captured output of a successful command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

/// Executes device commands.
pub trait CommandRunner {
    /// Runs `args` on the device.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError`] when the command cannot start or exits non-zero.
    fn run(&self, args: &[&str]) -> Result<CommandOutput, ShellError>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, args: &[&str]) -> Result<CommandOutput, ShellError> {
        (**self).run(args)
    }
}

// ============================================================================
// SECTION: Process Runner
// ============================================================================

/// Runner that spawns a local program per command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRunner {
    /// Program to execute (for example `adb`).
    program: String,
    /// Arguments placed before every command.
    prefix_args: Vec<String>,
    /// Quote command arguments for a remote shell.
    remote_shell: bool,
}

impl ProcessRunner {
    /// Creates a runner.
    #[must_use]
    pub fn new(program: impl Into<String>, prefix_args: Vec<String>, remote_shell: bool) -> Self {
        Self {
            program: program.into(),
            prefix_args,
            remote_shell,
        }
    }

    /// Returns the arguments passed to the program for `args`.
    #[must_use]
    pub fn command_line(&self, args: &[&str]) -> Vec<String> {
        let mut line = self.prefix_args.clone();
        for arg in args {
            if self.remote_shell {
                line.push(quote_remote(arg));
            } else {
                line.push((*arg).to_string());
            }
        }
        line
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, args: &[&str]) -> Result<CommandOutput, ShellError> {
        let line = self.command_line(args);
        let output = Command::new(&self.program).args(&line).output().map_err(|err| {
            ShellError::Spawn {
                program: self.program.clone(),
                message: err.to_string(),
            }
        })?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            let status = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |code| code.to_string());
            return Err(ShellError::Failed {
                command: format!("{} {}", self.program, line.join(" ")),
                status,
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(CommandOutput {
            stdout,
            stderr,
        })
    }
}

// ============================================================================
// SECTION: Quoting
// ============================================================================

/// Quotes `arg` for a POSIX shell unless it is made of safe characters only.
#[must_use]
pub fn quote_remote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg.chars().all(|c| c.is_ascii_alphanumeric() || "_-./:=,@%+".contains(c));
    if safe {
        return arg.to_string();
    }
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('\'');
    for c in arg.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}
