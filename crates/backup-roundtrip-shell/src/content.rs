// crates/backup-roundtrip-shell/src/content.rs
// ============================================================================
// Module: Content Provider Call Log Store
// Description: RecordStore over the device `content` tool and call log provider.
// Purpose: Seed, clear, and read the device call log from the host.
// Dependencies: backup-roundtrip-core
// ============================================================================

//! ## Overview
//! Writes use `content insert --bind column:type:value`; reads use
//! `content query` with a fixed projection and parse its `Row: N key=value, ...`
//! lines. `No result found.` means an empty table and `NULL` means an absent
//! value.
//!
//! ## Invariants
//! - Row parsing is strict: missing columns, unknown codes, negative
//!   durations, and half-present accounts are corruption.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use backup_roundtrip_core::AccountRef;
use backup_roundtrip_core::CallRecord;
use backup_roundtrip_core::CallType;
use backup_roundtrip_core::Presentation;
use backup_roundtrip_core::RecordId;
use backup_roundtrip_core::RecordStore;
use backup_roundtrip_core::StoreError;
use backup_roundtrip_core::StoredRecord;

use crate::runner::CommandRunner;
use crate::runner::ShellError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Call log provider URI.
pub const CALLS_URI: &str = "content://call_log/calls";
/// Output line for an empty query.
const NO_RESULT: &str = "No result found.";
/// Prefix of every query row line.
const ROW_PREFIX: &str = "Row: ";
/// Null marker in query output.
const NULL_VALUE: &str = "NULL";
/// Columns read back, in projection order.
const COLUMNS: [&str; 8] = [
    "_id",
    "number",
    "date",
    "duration",
    "type",
    "presentation",
    "subscription_component_name",
    "subscription_id",
];

// ============================================================================
// SECTION: Store
// ============================================================================

/// Call log store driven through `content`.
#[derive(Debug, Clone)]
pub struct ContentProviderStore<R> {
    /// Device command runner.
    runner: R,
}

impl<R: CommandRunner> ContentProviderStore<R> {
    /// Creates a store over `runner`.
    #[must_use]
    pub const fn new(runner: R) -> Self {
        Self {
            runner,
        }
    }

    /// Returns the runner.
    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }
}

impl<R: CommandRunner> RecordStore for ContentProviderStore<R> {
    fn delete_all(&self) -> Result<(), StoreError> {
        self.runner.run(&["content", "delete", "--uri", CALLS_URI])?;
        Ok(())
    }

    fn insert(&self, record: &CallRecord) -> Result<(), StoreError> {
        let duration = i64::try_from(record.duration_secs).map_err(|_| {
            StoreError::Invalid(format!("duration {} exceeds i64", record.duration_secs))
        })?;
        let mut binds = vec![
            format!("number:s:{}", record.number),
            format!("date:l:{}", record.date_ms),
            format!("duration:l:{duration}"),
            format!("type:i:{}", record.call_type.code()),
            format!("presentation:i:{}", record.presentation.code()),
        ];
        if let Some(account) = &record.account {
            binds.push(format!("subscription_component_name:s:{}", account.component_name));
            binds.push(format!("subscription_id:s:{}", account.account_id));
        }
        let mut args = vec!["content", "insert", "--uri", CALLS_URI];
        for bind in &binds {
            args.push("--bind");
            args.push(bind.as_str());
        }
        self.runner.run(&args)?;
        Ok(())
    }

    fn query_all(&self) -> Result<Vec<StoredRecord>, StoreError> {
        let projection = COLUMNS.join(":");
        let output = self.runner.run(&[
            "content",
            "query",
            "--uri",
            CALLS_URI,
            "--projection",
            projection.as_str(),
        ])?;
        Ok(parse_query_output(&output.stdout)?)
    }
}

// ============================================================================
// SECTION: Query Output Parsing
// ============================================================================

/// Parses `content query` output into records ordered by id.
///
/// # Errors
///
/// Returns [`ShellError::Output`] when a line is not a row or a row is not a
/// valid call record.
pub fn parse_query_output(text: &str) -> Result<Vec<StoredRecord>, ShellError> {
    let mut rows = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == NO_RESULT {
            return Ok(Vec::new());
        }
        let Some(rest) = line.strip_prefix(ROW_PREFIX) else {
            return Err(ShellError::Output(format!("unexpected query line: {line}")));
        };
        let Some((_, fields)) = rest.split_once(' ') else {
            return Err(ShellError::Output(format!("row without fields: {line}")));
        };
        rows.push(parse_row(fields)?);
    }
    rows.sort_by_key(|row| row.id);
    Ok(rows)
}

/// Converts one row's fields into a stored record.
fn parse_row(fields: &str) -> Result<StoredRecord, ShellError> {
    let values = split_fields(fields);
    let id = RecordId::new(required_i64(&values, "_id")?);
    let number = optional(&values, "number")?.unwrap_or_default().to_string();
    let date_ms = required_i64(&values, "date")?;
    let duration = required_i64(&values, "duration")?;
    let duration_secs = u64::try_from(duration)
        .map_err(|_| ShellError::Output(format!("negative duration {duration}")))?;
    let call_type = CallType::from_code(required_i32(&values, "type")?)
        .map_err(|err| ShellError::Output(err.to_string()))?;
    let presentation = match optional(&values, "presentation")? {
        Some(raw) => Presentation::from_code(parse_int(raw, "presentation")?)
            .map_err(|err| ShellError::Output(err.to_string()))?,
        None => Presentation::default(),
    };
    let account = match (
        optional(&values, "subscription_component_name")?,
        optional(&values, "subscription_id")?,
    ) {
        (Some(component_name), Some(account_id)) => Some(AccountRef {
            component_name: component_name.to_string(),
            account_id: account_id.to_string(),
        }),
        (None, None) => None,
        _ => return Err(ShellError::Output("partial account reference".to_string())),
    };
    Ok(StoredRecord {
        id,
        record: CallRecord {
            number,
            date_ms,
            duration_secs,
            call_type,
            presentation,
            account,
        },
    })
}

/// Splits `key=value, key=value` on separators that precede a known column.
///
/// Values may themselves contain `", "`; only a separator followed by a
/// projected column name and `=` ends a field.
fn split_fields(fields: &str) -> BTreeMap<&str, &str> {
    let mut values = BTreeMap::new();
    let mut start = 0;
    let mut search = 0;
    loop {
        let boundary = fields[search ..].find(", ").map(|offset| search + offset);
        match boundary {
            Some(index) if starts_with_column(&fields[index + 2 ..]) => {
                insert_field(&mut values, &fields[start .. index]);
                start = index + 2;
                search = start;
            }
            Some(index) => search = index + 2,
            None => {
                insert_field(&mut values, &fields[start ..]);
                return values;
            }
        }
    }
}

/// Returns true when `text` begins with `<column>=`.
fn starts_with_column(text: &str) -> bool {
    COLUMNS
        .iter()
        .any(|column| text.strip_prefix(column).is_some_and(|rest| rest.starts_with('=')))
}

/// Inserts one `key=value` field.
fn insert_field<'a>(values: &mut BTreeMap<&'a str, &'a str>, field: &'a str) {
    if let Some((key, value)) = field.split_once('=') {
        values.insert(key.trim(), value);
    }
}

/// Returns a column value, `None` for `NULL`.
fn optional<'a>(
    values: &BTreeMap<&str, &'a str>,
    column: &str,
) -> Result<Option<&'a str>, ShellError> {
    match values.get(column) {
        Some(&NULL_VALUE) => Ok(None),
        Some(value) => Ok(Some(*value)),
        None => Err(ShellError::Output(format!("row is missing column {column}"))),
    }
}

/// Returns a required integer column.
fn required_i64(values: &BTreeMap<&str, &str>, column: &str) -> Result<i64, ShellError> {
    let raw = optional(values, column)?
        .ok_or_else(|| ShellError::Output(format!("column {column} is NULL")))?;
    parse_int(raw, column)
}

/// Returns a required 32-bit integer column.
fn required_i32(values: &BTreeMap<&str, &str>, column: &str) -> Result<i32, ShellError> {
    let raw = optional(values, column)?
        .ok_or_else(|| ShellError::Output(format!("column {column} is NULL")))?;
    parse_int(raw, column)
}

/// Parses an integer column value.
fn parse_int<T: std::str::FromStr>(raw: &str, column: &str) -> Result<T, ShellError> {
    raw.trim()
        .parse()
        .map_err(|_| ShellError::Output(format!("column {column} is not an integer: {raw}")))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
