// crates/backup-roundtrip-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Provides message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings for localized output.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The backup round-trip CLI stores user-facing strings in a small translation
//! catalog so messaging stays consistent across locales. All runtime output
//! should be routed through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to English and then to the key itself.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported CLI locales.
///
/// # Invariants
/// - [`Locale::En`] is the default fallback locale.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// Catalan.
    Ca,
}

impl Locale {
    /// Returns the canonical locale label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ca => "ca",
        }
    }

    /// Attempts to parse a locale value (case-insensitive, tolerant of region tags).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let normalized = value.to_ascii_lowercase();
        let lang = normalized.split(['-', '_', '.']).next().unwrap_or("");
        match lang {
            "en" => Some(Self::En),
            "ca" => Some(Self::Ca),
            _ => None,
        }
    }
}

/// Ordered list of supported CLI locales.
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::Ca];

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Global locale selection for CLI output.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the CLI locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

/// Returns the current CLI locale (defaults to English).
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "backup-roundtrip {version}"),
    ("main.runtime_failed", "Failed to start the async runtime: {error}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.json_failed", "Failed to render JSON output: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.override_invalid", "Invalid command-line override: {error}"),
    ("config.validate.ok", "Config valid ({source})."),
    ("config.source.defaults", "built-in defaults"),
    ("backend.open_failed", "Failed to open {kind} backend: {error}"),
    ("log.open_failed", "Failed to open run log {path}: {error}"),
    (
        "run.pass",
        "PASS: {count} record(s) survived backup and restore of {package} through {transport}.",
    ),
    ("run.record", "  {record}"),
    (
        "run.settle",
        "Settle waits: backup {backup} ({backup_ms} ms), restore {restore} ({restore_ms} ms).",
    ),
    ("run.skip", "SKIP: {error}"),
    ("run.fail", "FAIL ({kind}): {error}"),
    (
        "run.timeout",
        "Round trip exceeded {secs}s and was abandoned; backup manager state may need manual \
         restoration.",
    ),
    ("run.task_failed", "Round trip task failed: {error}"),
    ("transports.failed", "Failed to list transports: {error}"),
    ("transports.entry", "{marker} {transport}"),
    ("transports.none", "No transports reported."),
    ("backup.inspect.path_failed", "Cannot locate the backup set: {error}"),
    ("backup.inspect.read_failed", "Failed to read backup set {path}: {error}"),
    ("backup.inspect.decode_failed", "Backup entity {key} in {path} is invalid: {error}"),
    ("backup.inspect.header", "{path}: {count} entities"),
    ("backup.inspect.entry", "  [{key}] {record}"),
    ("i18n.lang.invalid_env", "Invalid value for {env}: {value}. Expected 'en' or 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Note: non-English output is machine-translated and may be inaccurate.",
    ),
];

/// Catalan catalog entries.
const CATALOG_CA: &[(&str, &str)] = &[
    ("main.version", "backup-roundtrip {version}"),
    ("main.runtime_failed", "No s'ha pogut iniciar l'entorn d'execució asíncron: {error}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "sortida"),
    ("output.write_failed", "No s'ha pogut escriure a {stream}: {error}"),
    ("output.json_failed", "No s'ha pogut generar la sortida JSON: {error}"),
    ("config.load_failed", "No s'ha pogut carregar la configuració: {error}"),
    ("config.override_invalid", "Valor no vàlid a la línia d'ordres: {error}"),
    ("config.validate.ok", "Configuració vàlida ({source})."),
    ("config.source.defaults", "valors per defecte integrats"),
    ("backend.open_failed", "No s'ha pogut obrir el backend {kind}: {error}"),
    ("log.open_failed", "No s'ha pogut obrir el registre d'execució {path}: {error}"),
    (
        "run.pass",
        "CORRECTE: {count} registre(s) han sobreviscut a la còpia i restauració de {package} a \
         través de {transport}.",
    ),
    ("run.record", "  {record}"),
    (
        "run.settle",
        "Esperes d'estabilització: còpia {backup} ({backup_ms} ms), restauració {restore} \
         ({restore_ms} ms).",
    ),
    ("run.skip", "OMÈS: {error}"),
    ("run.fail", "ERROR ({kind}): {error}"),
    (
        "run.timeout",
        "La prova ha superat {secs}s i s'ha abandonat; pot caldre restaurar manualment l'estat \
         del gestor de còpies.",
    ),
    ("run.task_failed", "La tasca de la prova ha fallat: {error}"),
    ("transports.failed", "No s'han pogut llistar els transports: {error}"),
    ("transports.entry", "{marker} {transport}"),
    ("transports.none", "No s'ha informat de cap transport."),
    ("backup.inspect.path_failed", "No es pot localitzar el conjunt de còpia: {error}"),
    ("backup.inspect.read_failed", "No s'ha pogut llegir el conjunt de còpia {path}: {error}"),
    ("backup.inspect.decode_failed", "L'entitat {key} de {path} no és vàlida: {error}"),
    ("backup.inspect.header", "{path}: {count} entitats"),
    ("backup.inspect.entry", "  [{key}] {record}"),
    ("i18n.lang.invalid_env", "Valor no vàlid per a {env}: {value}. S'esperava 'en' o 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Nota: la sortida que no és en anglès està traduïda automàticament i pot ser inexacta.",
    ),
];

/// Returns the raw catalog entries for `locale`.
#[cfg(test)]
pub(crate) const fn catalog_entries_for(locale: Locale) -> &'static [(&'static str, &'static str)] {
    match locale {
        Locale::En => CATALOG_EN,
        Locale::Ca => CATALOG_CA,
    }
}

/// Returns the message catalog for the requested locale.
pub(crate) fn catalog_for(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static CATALOG_CA_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    match locale {
        Locale::En => CATALOG_EN_MAP.get_or_init(|| CATALOG_EN.iter().copied().collect()),
        Locale::Ca => CATALOG_CA_MAP.get_or_init(|| CATALOG_CA.iter().copied().collect()),
    }
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the selected locale while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let locale = current_locale();
    let template = catalog_for(locale)
        .get(key)
        .copied()
        .or_else(|| catalog_for(Locale::En).get(key).copied())
        .unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
