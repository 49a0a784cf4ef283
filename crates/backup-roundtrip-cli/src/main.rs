// crates/backup-roundtrip-cli/src/main.rs
// ============================================================================
// Module: Backup Round-Trip CLI Entry Point
// Description: Command dispatcher for round-trip runs and backup diagnostics.
// Purpose: Provide a localized CLI whose exit code reports pass, fail, or skip.
// Dependencies: clap, backup-roundtrip-{config, core, local}, serde, tokio.
// ============================================================================

//! ## Overview
//! `backup-roundtrip run` drives one backup, clear, restore cycle against the
//! configured backend and exits 0 on pass, 1 on failure, and 2 when the target
//! transport is unavailable. Supporting commands list transports, validate or
//! print configuration, and decode local backup sets. All user-facing strings
//! are routed through the i18n catalog.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use backup_roundtrip_cli::backend::Backend;
use backup_roundtrip_cli::backend::local_backup_set_path;
use backup_roundtrip_cli::i18n::Locale;
use backup_roundtrip_cli::i18n::set_locale;
use backup_roundtrip_cli::t;
use backup_roundtrip_config::BackupRoundTripConfig;
use backup_roundtrip_config::LogConfig;
use backup_roundtrip_config::SettleModeConfig;
use backup_roundtrip_config::config_toml_example;
use backup_roundtrip_core::CallRecord;
use backup_roundtrip_core::FileRunLog;
use backup_roundtrip_core::NoopRunLog;
use backup_roundtrip_core::PackageName;
use backup_roundtrip_core::RoundTripReport;
use backup_roundtrip_core::RunLog;
use backup_roundtrip_core::RunVerdict;
use backup_roundtrip_core::StderrRunLog;
use backup_roundtrip_core::TeeRunLog;
use backup_roundtrip_core::TransportName;
use backup_roundtrip_core::VerificationError;
use backup_roundtrip_core::VerifierConfig;
use backup_roundtrip_core::runtime::status::parse_current_transport;
use backup_roundtrip_core::runtime::status::parse_transport_list;
use backup_roundtrip_local::decode_record;
use backup_roundtrip_local::read_backup_set;
use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits and Constants
// ============================================================================

/// Environment variable for CLI locale selection.
const LANG_ENV: &str = "BACKUP_ROUNDTRIP_LANG";
/// Grace period for blocking work still running at exit.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "backup-roundtrip", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `BACKUP_ROUNDTRIP_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one backup, clear, and restore round trip.
    Run(RunCommand),
    /// List transports offered by the configured backend.
    Transports(TransportsCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Local backup set utilities.
    Backup {
        /// Selected backup subcommand.
        #[command(subcommand)]
        command: BackupCommand,
    },
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Optional config file path (defaults to backup-roundtrip.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Package whose data is backed up.
    #[arg(long, value_name = "PACKAGE")]
    package: Option<String>,
    /// Transport the round trip must run through.
    #[arg(long, value_name = "TRANSPORT")]
    transport: Option<String>,
    /// Settle interval in milliseconds.
    #[arg(long, value_name = "MS")]
    settle_ms: Option<u64>,
    /// Settle strategy.
    #[arg(long, value_enum, value_name = "MODE")]
    settle_mode: Option<SettleModeArg>,
    /// Abandon the run after this many seconds.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1 ..))]
    overall_timeout_secs: Option<u64>,
    /// Append JSON-lines run events to this file.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for `transports`.
#[derive(Args, Debug)]
struct TransportsCommand {
    /// Optional config file path (defaults to backup-roundtrip.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a backup round-trip configuration file.
    Validate(ConfigValidateCommand),
    /// Print an example configuration covering every section.
    Example,
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to backup-roundtrip.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Backup subcommands.
#[derive(Subcommand, Debug)]
enum BackupCommand {
    /// Decode a local backup set and print its records.
    Inspect(BackupInspectCommand),
}

/// Arguments for `backup inspect`.
#[derive(Args, Debug)]
struct BackupInspectCommand {
    /// Backup set file (defaults to the configured package's local backup set).
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
    /// Optional config file path used when `--file` is absent.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Output formats for structured CLI commands.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Canonical JSON output.
    Json,
}

/// Settle strategies selectable on the command line.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum SettleModeArg {
    /// Wait the full settle interval.
    Fixed,
    /// Poll the backup manager for idle, falling back to the interval.
    Poll,
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

impl From<SettleModeArg> for SettleModeConfig {
    fn from(value: SettleModeArg) -> Self {
        match value {
            SettleModeArg::Fixed => Self::Fixed,
            SettleModeArg::Poll => Self::Poll,
        }
    }
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// JSON summary of a round-trip run.
#[derive(Serialize)]
struct RunOutput<'a> {
    /// Final classification.
    verdict: RunVerdict,
    /// Package under test.
    package: &'a PackageName,
    /// Transport under test.
    transport: &'a TransportName,
    /// Report for a passing run.
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a RoundTripReport>,
    /// Failure or skip cause.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RunErrorOutput>,
}

/// JSON rendering of a verification error.
#[derive(Serialize)]
struct RunErrorOutput {
    /// Stable error label.
    kind: &'static str,
    /// Error description.
    message: String,
}

/// JSON listing of transports.
#[derive(Serialize)]
struct TransportsOutput {
    /// Backend that was queried.
    backend: &'static str,
    /// Currently selected transport, when marked.
    current: Option<TransportName>,
    /// Offered transports in listing order.
    transports: Vec<TransportName>,
}

/// One decoded backup entity.
#[derive(Serialize)]
struct InspectedEntity {
    /// Entity key.
    key: String,
    /// Decoded record.
    record: CallRecord,
}

/// JSON rendering of a decoded backup set.
#[derive(Serialize)]
struct InspectOutput {
    /// Backup set path.
    path: String,
    /// Decoded entities in set order.
    entities: Vec<InspectedEntity>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
///
/// The runtime is built by hand so a round trip abandoned by
/// `--overall-timeout-secs` does not hold the process open at shutdown.
fn main() -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => return emit_error(&t!("main.runtime_failed", error = err)),
    };
    let code = match runtime.block_on(run()) {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    };
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    code
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Run(command) => command_run(command).await,
        Commands::Transports(command) => command_transports(&command),
        Commands::Config {
            command,
        } => command_config(command),
        Commands::Backup {
            command,
        } => command_backup(command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let mut config = load_config(command.config.as_deref())?;
    apply_run_overrides(&mut config, &command)?;
    let package = config
        .package()
        .map_err(|err| CliError::new(t!("config.override_invalid", error = err)))?;
    let transport = config
        .transport()
        .map_err(|err| CliError::new(t!("config.override_invalid", error = err)))?;
    let verifier_config = VerifierConfig {
        transport: transport.clone(),
        settle: config.settle.policy(),
    };
    let record = config.seed.record();
    let log = build_run_log(&config.log)?;
    let backend = open_backend(&config)?;

    let task_package = package.clone();
    let task = tokio::task::spawn_blocking(move || {
        backend.run_round_trip(&task_package, &record, verifier_config, log)
    });
    let joined = match command.overall_timeout_secs {
        Some(secs) => {
            if let Ok(joined) = tokio::time::timeout(Duration::from_secs(secs), task).await {
                joined
            } else {
                write_stderr_line(&t!("run.timeout", secs = secs))
                    .map_err(|err| CliError::new(output_error("stderr", &err)))?;
                return Ok(ExitCode::FAILURE);
            }
        }
        None => task.await,
    };
    let outcome = joined.map_err(|err| CliError::new(t!("run.task_failed", error = err)))?;
    emit_run_outcome(&package, &transport, &outcome, command.format)
}

/// Applies command-line overrides and revalidates the configuration.
fn apply_run_overrides(
    config: &mut BackupRoundTripConfig,
    command: &RunCommand,
) -> CliResult<()> {
    if let Some(package) = &command.package {
        config.target.package.clone_from(package);
    }
    if let Some(transport) = &command.transport {
        config.target.transport = Some(transport.clone());
    }
    if let Some(settle_ms) = command.settle_ms {
        config.settle.interval_ms = settle_ms;
    }
    if let Some(mode) = command.settle_mode {
        config.settle.mode = mode.into();
    }
    if let Some(path) = &command.log_file {
        config.log.file = Some(path.clone());
    }
    config.validate().map_err(|err| CliError::new(t!("config.override_invalid", error = err)))
}

/// Builds the run event sink from log settings.
fn build_run_log(config: &LogConfig) -> CliResult<Arc<dyn RunLog>> {
    let mut sinks: Vec<Box<dyn RunLog>> = Vec::new();
    if config.stderr {
        sinks.push(Box::new(StderrRunLog));
    }
    if let Some(path) = &config.file {
        let sink = FileRunLog::new(path).map_err(|err| {
            CliError::new(t!("log.open_failed", path = path.display(), error = err))
        })?;
        sinks.push(Box::new(sink));
    }
    if sinks.is_empty() {
        return Ok(Arc::new(NoopRunLog));
    }
    Ok(Arc::new(TeeRunLog::new(sinks)))
}

/// Writes the run outcome and maps it to the process exit code.
fn emit_run_outcome(
    package: &PackageName,
    transport: &TransportName,
    outcome: &Result<RoundTripReport, VerificationError>,
    format: OutputFormat,
) -> CliResult<ExitCode> {
    let verdict = match outcome {
        Ok(_) => RunVerdict::Pass,
        Err(err) => err.verdict(),
    };
    if format == OutputFormat::Json {
        let output = RunOutput {
            verdict,
            package,
            transport,
            report: outcome.as_ref().ok(),
            error: outcome.as_ref().err().map(|err| RunErrorOutput {
                kind: err.kind(),
                message: err.to_string(),
            }),
        };
        write_json(&output)?;
        return Ok(ExitCode::from(verdict.exit_status()));
    }
    match outcome {
        Ok(report) => {
            write_stdout_line(&t!(
                "run.pass",
                count = report.restored.len(),
                package = package,
                transport = transport
            ))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            for stored in &report.restored {
                write_stdout_line(&t!("run.record", record = stored))
                    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            }
            write_stdout_line(&t!(
                "run.settle",
                backup = report.backup_settle.as_str(),
                backup_ms = report.backup_settle.waited_ms(),
                restore = report.restore_settle.as_str(),
                restore_ms = report.restore_settle.waited_ms()
            ))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        Err(err) if verdict == RunVerdict::Skip => {
            write_stdout_line(&t!("run.skip", error = err))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        Err(err) => {
            write_stderr_line(&t!("run.fail", kind = err.kind(), error = err))
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        }
    }
    Ok(ExitCode::from(verdict.exit_status()))
}

// ============================================================================
// SECTION: Transports Command
// ============================================================================

/// Executes the `transports` command.
fn command_transports(command: &TransportsCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let backend = open_backend(&config)?;
    let listing = backend
        .list_transports()
        .map_err(|err| CliError::new(t!("transports.failed", error = err)))?;
    let transports = parse_transport_list(&listing);
    let current = parse_current_transport(&listing);
    if command.format == OutputFormat::Json {
        write_json(&TransportsOutput {
            backend: backend.kind().as_str(),
            current,
            transports,
        })?;
        return Ok(ExitCode::SUCCESS);
    }
    if transports.is_empty() {
        write_stdout_line(&t!("transports.none"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    for transport in &transports {
        let marker = if current.as_ref() == Some(transport) { "*" } else { " " };
        write_stdout_line(&t!("transports.entry", marker = marker, transport = transport))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
        ConfigCommand::Example => command_config_example(),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let source = config
        .source
        .as_ref()
        .map_or_else(|| t!("config.source.defaults"), |path| path.display().to_string());
    write_stdout_line(&t!("config.validate.ok", source = source))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Prints the example configuration.
fn command_config_example() -> CliResult<ExitCode> {
    write_stdout_bytes(config_toml_example().as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Backup Commands
// ============================================================================

/// Dispatches backup subcommands.
fn command_backup(command: BackupCommand) -> CliResult<ExitCode> {
    match command {
        BackupCommand::Inspect(command) => command_backup_inspect(&command),
    }
}

/// Executes the `backup inspect` command.
fn command_backup_inspect(command: &BackupInspectCommand) -> CliResult<ExitCode> {
    let path = match &command.file {
        Some(path) => path.clone(),
        None => {
            let config = load_config(command.config.as_deref())?;
            local_backup_set_path(&config)
                .map_err(|err| CliError::new(t!("backup.inspect.path_failed", error = err)))?
        }
    };
    let entities = read_backup_set(&path).map_err(|err| {
        CliError::new(t!("backup.inspect.read_failed", path = path.display(), error = err))
    })?;
    let mut decoded = Vec::with_capacity(entities.len());
    for entity in entities {
        let record = decode_record(&entity.data).map_err(|err| {
            CliError::new(t!(
                "backup.inspect.decode_failed",
                key = entity.key,
                path = path.display(),
                error = err
            ))
        })?;
        decoded.push(InspectedEntity {
            key: entity.key,
            record,
        });
    }
    if command.format == OutputFormat::Json {
        write_json(&InspectOutput {
            path: path.display().to_string(),
            entities: decoded,
        })?;
        return Ok(ExitCode::SUCCESS);
    }
    write_stdout_line(&t!("backup.inspect.header", path = path.display(), count = decoded.len()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    for entity in &decoded {
        write_stdout_line(&t!("backup.inspect.entry", key = entity.key, record = entity.record))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Shared Helpers
// ============================================================================

/// Loads and validates configuration.
fn load_config(path: Option<&Path>) -> CliResult<BackupRoundTripConfig> {
    BackupRoundTripConfig::load(path)
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Opens the configured backend.
fn open_backend(config: &BackupRoundTripConfig) -> CliResult<Backend> {
    Backend::open(config).map_err(|err| {
        CliError::new(t!("backend.open_failed", kind = config.backend.kind.as_str(), error = err))
    })
}

/// Resolves the CLI locale from flags or environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes canonical JSON to stdout with a trailing newline.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = serde_jcs::to_vec(value)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

// ============================================================================
// SECTION: Tests
// ============================================================================
