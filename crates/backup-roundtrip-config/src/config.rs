// crates/backup-roundtrip-config/src/config.rs
// ============================================================================
// Module: Backup Round-Trip Configuration
// Description: Configuration loading and validation for round-trip runs.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: backup-roundtrip-core, backup-roundtrip-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Resolution order is an explicit path, then `BACKUP_ROUNDTRIP_CONFIG`, then
//! `backup-roundtrip.toml` in the working directory. Only the implicit default
//! file may be absent, in which case built-in defaults apply. Every section is
//! validated before use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use backup_roundtrip_core::AccountRef;
use backup_roundtrip_core::CallRecord;
use backup_roundtrip_core::CallType;
use backup_roundtrip_core::PackageName;
use backup_roundtrip_core::Presentation;
use backup_roundtrip_core::SettleMode;
use backup_roundtrip_core::SettlePolicy;
use backup_roundtrip_core::TransportName;
use backup_roundtrip_store_sqlite::SqliteStoreConfig;
use backup_roundtrip_store_sqlite::SqliteStoreMode;
use backup_roundtrip_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "backup-roundtrip.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "BACKUP_ROUNDTRIP_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Package whose backup agent owns the call log.
pub const DEFAULT_PACKAGE: &str = "com.android.providers.calllogbackup";
/// Transport targeted on a device.
pub const DEFAULT_DEVICE_TRANSPORT: &str = "android/com.android.internal.backup.LocalTransport";
/// Transport targeted by the local backend.
pub const DEFAULT_LOCAL_TRANSPORT: &str = "local/FileTransport";
/// Default settle interval in milliseconds.
pub(crate) const DEFAULT_SETTLE_INTERVAL_MS: u64 = 4_000;
/// Maximum settle interval in milliseconds.
pub(crate) const MAX_SETTLE_INTERVAL_MS: u64 = 600_000;
/// Default first idle-poll delay in milliseconds.
pub(crate) const DEFAULT_POLL_INITIAL_MS: u64 = 100;
/// Default largest idle-poll delay in milliseconds.
pub(crate) const DEFAULT_POLL_MAX_MS: u64 = 1_000;
/// Minimum idle-poll delay in milliseconds.
pub(crate) const MIN_POLL_DELAY_MS: u64 = 10;
/// Maximum length of the seeded number.
pub(crate) const MAX_SEED_NUMBER_LENGTH: usize = 256;
/// Maximum length of seeded account fields.
pub(crate) const MAX_SEED_ACCOUNT_LENGTH: usize = 1024;
/// Default local backend state directory.
pub(crate) const DEFAULT_STATE_DIR: &str = ".backup-roundtrip";
/// Database filename inside the local state directory.
pub(crate) const DEFAULT_DATABASE_NAME: &str = "calllog.sqlite";
/// Default SQLite busy timeout in milliseconds.
pub(crate) const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default device command runner program.
pub(crate) const DEFAULT_DEVICE_PROGRAM: &str = "adb";
/// Maximum number of device runner prefix arguments.
pub(crate) const MAX_DEVICE_ARGS: usize = 32;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Backup round-trip configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackupRoundTripConfig {
    /// Package and transport under test.
    #[serde(default)]
    pub target: TargetConfig,
    /// Settle waits after backup and restore.
    #[serde(default)]
    pub settle: SettleConfig,
    /// Record seeded before backup.
    #[serde(default)]
    pub seed: SeedConfig,
    /// Backend selection.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Run event logging.
    #[serde(default)]
    pub log: LogConfig,
    /// File the configuration was loaded from (not serialized).
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl BackupRoundTripConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        if !explicit && !resolved.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml(content)?;
        config.source = Some(resolved);
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.package()?;
        self.transport()?;
        self.settle.validate()?;
        self.seed.validate()?;
        self.backend.validate()?;
        self.log.validate()?;
        Ok(())
    }

    /// Returns the validated target package.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the package name is invalid.
    pub fn package(&self) -> Result<PackageName, ConfigError> {
        PackageName::parse(&self.target.package)
            .map_err(|err| ConfigError::Invalid(format!("target.package: {err}")))
    }

    /// Returns the target transport, defaulted per backend kind.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the transport name is invalid.
    pub fn transport(&self) -> Result<TransportName, ConfigError> {
        let raw = self.target.transport.as_deref().unwrap_or(match self.backend.kind {
            BackendKind::Local => DEFAULT_LOCAL_TRANSPORT,
            BackendKind::Device => DEFAULT_DEVICE_TRANSPORT,
        });
        TransportName::parse(raw)
            .map_err(|err| ConfigError::Invalid(format!("target.transport: {err}")))
    }
}

/// Package and transport under test.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Package whose backup agent is exercised.
    #[serde(default = "default_package")]
    pub package: String,
    /// Transport to route the round trip through (backend default when unset).
    #[serde(default)]
    pub transport: Option<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            package: default_package(),
            transport: None,
        }
    }
}

/// Settle strategy names accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleModeConfig {
    /// Fixed delay.
    #[default]
    Fixed,
    /// Poll for idle with backoff.
    Poll,
}

impl SettleModeConfig {
    /// Maps the configured name to the runtime mode.
    #[must_use]
    pub const fn to_mode(self) -> SettleMode {
        match self {
            Self::Fixed => SettleMode::FixedDelay,
            Self::Poll => SettleMode::PollIdle,
        }
    }
}

/// Settle waits after backup and restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SettleConfig {
    /// Strategy.
    #[serde(default)]
    pub mode: SettleModeConfig,
    /// Upper bound for each wait in milliseconds.
    #[serde(default = "default_settle_interval_ms")]
    pub interval_ms: u64,
    /// First idle-poll delay in milliseconds.
    #[serde(default = "default_poll_initial_ms")]
    pub poll_initial_ms: u64,
    /// Largest idle-poll delay in milliseconds.
    #[serde(default = "default_poll_max_ms")]
    pub poll_max_ms: u64,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            mode: SettleModeConfig::Fixed,
            interval_ms: DEFAULT_SETTLE_INTERVAL_MS,
            poll_initial_ms: DEFAULT_POLL_INITIAL_MS,
            poll_max_ms: DEFAULT_POLL_MAX_MS,
        }
    }
}

impl SettleConfig {
    /// Validates settle bounds.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms > MAX_SETTLE_INTERVAL_MS {
            return Err(ConfigError::Invalid(format!(
                "settle.interval_ms must be at most {MAX_SETTLE_INTERVAL_MS}"
            )));
        }
        if self.poll_initial_ms < MIN_POLL_DELAY_MS {
            return Err(ConfigError::Invalid(format!(
                "settle.poll_initial_ms must be at least {MIN_POLL_DELAY_MS}"
            )));
        }
        if self.poll_max_ms < self.poll_initial_ms {
            return Err(ConfigError::Invalid(
                "settle.poll_max_ms must be at least settle.poll_initial_ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the runtime settle policy.
    #[must_use]
    pub const fn policy(&self) -> SettlePolicy {
        SettlePolicy {
            mode: self.mode.to_mode(),
            interval: Duration::from_millis(self.interval_ms),
            poll_initial: Duration::from_millis(self.poll_initial_ms),
            poll_max: Duration::from_millis(self.poll_max_ms),
        }
    }
}

/// Record seeded before backup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedConfig {
    /// Remote party number.
    #[serde(default = "default_seed_number")]
    pub number: String,
    /// Call start (epoch millis).
    #[serde(default)]
    pub date_ms: i64,
    /// Call duration in seconds.
    #[serde(default = "default_seed_duration")]
    pub duration_secs: u64,
    /// Call direction.
    #[serde(default = "default_seed_call_type")]
    pub call_type: CallType,
    /// Number presentation.
    #[serde(default)]
    pub presentation: Presentation,
    /// Account component name.
    #[serde(default)]
    pub account_component: Option<String>,
    /// Account identifier.
    #[serde(default)]
    pub account_id: Option<String>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        let sample = CallRecord::sample();
        Self {
            number: sample.number,
            date_ms: sample.date_ms,
            duration_secs: sample.duration_secs,
            call_type: sample.call_type,
            presentation: sample.presentation,
            account_component: None,
            account_id: None,
        }
    }
}

impl SeedConfig {
    /// Validates seed fields.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.number.is_empty() {
            return Err(ConfigError::Invalid("seed.number must be non-empty".to_string()));
        }
        if self.number.len() > MAX_SEED_NUMBER_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "seed.number exceeds {MAX_SEED_NUMBER_LENGTH} bytes"
            )));
        }
        if i64::try_from(self.duration_secs).is_err() {
            return Err(ConfigError::Invalid("seed.duration_secs is too large".to_string()));
        }
        match (&self.account_component, &self.account_id) {
            (Some(component), Some(id)) => {
                if component.is_empty() || id.is_empty() {
                    return Err(ConfigError::Invalid(
                        "seed account fields must be non-empty".to_string(),
                    ));
                }
                if component.len() > MAX_SEED_ACCOUNT_LENGTH || id.len() > MAX_SEED_ACCOUNT_LENGTH {
                    return Err(ConfigError::Invalid(format!(
                        "seed account fields exceed {MAX_SEED_ACCOUNT_LENGTH} bytes"
                    )));
                }
            }
            (None, None) => {}
            _ => {
                return Err(ConfigError::Invalid(
                    "seed.account_component and seed.account_id must be set together"
                        .to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Returns the record to seed.
    #[must_use]
    pub fn record(&self) -> CallRecord {
        let account = match (&self.account_component, &self.account_id) {
            (Some(component_name), Some(account_id)) => Some(AccountRef {
                component_name: component_name.clone(),
                account_id: account_id.clone(),
            }),
            _ => None,
        };
        CallRecord {
            number: self.number.clone(),
            date_ms: self.date_ms,
            duration_secs: self.duration_secs,
            call_type: self.call_type,
            presentation: self.presentation,
            account,
        }
    }
}

/// Backend family driven by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Self-contained local backup host.
    #[default]
    Local,
    /// Device reached through a command runner.
    Device,
}

impl BackendKind {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Device => "device",
        }
    }
}

/// Backend selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendConfig {
    /// Backend family.
    #[serde(default)]
    pub kind: BackendKind,
    /// Local backend settings.
    #[serde(default)]
    pub local: LocalBackendConfig,
    /// Device backend settings.
    #[serde(default)]
    pub device: DeviceBackendConfig,
}

impl BackendConfig {
    /// Validates the selected backend only.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.kind {
            BackendKind::Local => self.local.validate(),
            BackendKind::Device => self.device.validate(),
        }
    }
}

/// Local backend settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalBackendConfig {
    /// Directory holding manager state and backup sets.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
    /// Call log database path (defaults inside `state_dir`).
    #[serde(default)]
    pub database: Option<PathBuf>,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// `SQLite` busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for LocalBackendConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            database: None,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl LocalBackendConfig {
    /// Validates local backend paths.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("backend.local.state_dir", &self.state_dir.to_string_lossy())?;
        if let Some(database) = &self.database {
            validate_path_string("backend.local.database", &database.to_string_lossy())?;
        }
        Ok(())
    }

    /// Returns the resolved call log database path.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(|| self.state_dir.join(DEFAULT_DATABASE_NAME))
    }

    /// Returns the store configuration for the call log database.
    #[must_use]
    pub fn store_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: self.database_path(),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
        }
    }
}

/// Device backend settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceBackendConfig {
    /// Program used to reach the device.
    #[serde(default = "default_device_program")]
    pub program: String,
    /// Arguments placed before every device command.
    #[serde(default = "default_device_args")]
    pub args: Vec<String>,
    /// Optional device serial (`-s <serial>`).
    #[serde(default)]
    pub serial: Option<String>,
    /// Quote arguments for a remote shell.
    #[serde(default = "default_true")]
    pub remote_shell: bool,
}

impl Default for DeviceBackendConfig {
    fn default() -> Self {
        Self {
            program: default_device_program(),
            args: default_device_args(),
            serial: None,
            remote_shell: true,
        }
    }
}

impl DeviceBackendConfig {
    /// Validates device runner settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.program.trim().is_empty() {
            return Err(ConfigError::Invalid("backend.device.program must be set".to_string()));
        }
        if self.args.len() > MAX_DEVICE_ARGS {
            return Err(ConfigError::Invalid(format!(
                "backend.device.args exceeds {MAX_DEVICE_ARGS} entries"
            )));
        }
        if let Some(serial) = &self.serial
            && (serial.is_empty() || serial.chars().any(char::is_whitespace))
        {
            return Err(ConfigError::Invalid(
                "backend.device.serial must be a single non-empty word".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the arguments placed before every device command.
    #[must_use]
    pub fn prefix_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.args.len() + 2);
        if let Some(serial) = &self.serial {
            args.push("-s".to_string());
            args.push(serial.clone());
        }
        args.extend(self.args.iter().cloned());
        args
    }
}

/// Run event logging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    /// Append JSON-lines run events to this file.
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Also write run events to stderr.
    #[serde(default)]
    pub stderr: bool,
}

impl LogConfig {
    /// Validates log paths.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(file) = &self.file {
            validate_path_string("log.file", &file.to_string_lossy())?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Returns the default target package.
fn default_package() -> String {
    DEFAULT_PACKAGE.to_string()
}

/// Returns the default settle interval.
const fn default_settle_interval_ms() -> u64 {
    DEFAULT_SETTLE_INTERVAL_MS
}

/// Returns the default first poll delay.
const fn default_poll_initial_ms() -> u64 {
    DEFAULT_POLL_INITIAL_MS
}

/// Returns the default largest poll delay.
const fn default_poll_max_ms() -> u64 {
    DEFAULT_POLL_MAX_MS
}

/// Returns the default seeded number.
fn default_seed_number() -> String {
    CallRecord::sample().number
}

/// Returns the default seeded duration.
fn default_seed_duration() -> u64 {
    CallRecord::sample().duration_secs
}

/// Returns the default seeded call type.
fn default_seed_call_type() -> CallType {
    CallRecord::sample().call_type
}

/// Returns the default local state directory.
fn default_state_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_DIR)
}

/// Returns the default `SQLite` busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default device program.
fn default_device_program() -> String {
    DEFAULT_DEVICE_PROGRAM.to_string()
}

/// Returns the default device prefix arguments.
fn default_device_args() -> Vec<String> {
    vec!["shell".to_string()]
}

/// Returns `true` for serde defaults.
const fn default_true() -> bool {
    true
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
///
/// The boolean is true when the path was named explicitly.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
