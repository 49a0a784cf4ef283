// crates/backup-roundtrip-local/src/format.rs
// ============================================================================
// Module: Call Record Entity Format
// Description: Versioned binary encoding of one call record.
// Purpose: Keep backup payloads stable across releases.
// Dependencies: backup-roundtrip-core, thiserror
// ============================================================================

//! ## Overview
//! One backup entity holds one call record:
//!
//! | Field | Encoding |
//! |---|---|
//! | version | `u32` (= [`ENTITY_VERSION`]) |
//! | date | `i64` epoch millis |
//! | duration | `u64` seconds |
//! | number | string |
//! | type | `i32` platform code |
//! | presentation | `i32` platform code |
//! | account component | optional string |
//! | account id | optional string |
//!
//! ## Invariants
//! - Decoding fails closed on truncation, trailing bytes, unknown versions, and
//!   unknown codes.
//! - Account fields are either both present or both absent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use backup_roundtrip_core::AccountRef;
use backup_roundtrip_core::CallRecord;
use backup_roundtrip_core::CallType;
use backup_roundtrip_core::Presentation;
use backup_roundtrip_core::UnknownCodeError;
use thiserror::Error;

use crate::wire::ByteReader;
use crate::wire::ByteWriter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Current entity format version.
pub const ENTITY_VERSION: u32 = 1;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Binary backup format errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Input ended before a field was complete.
    #[error("backup data truncated at {field}: needed {needed} bytes, {available} available")]
    Truncated {
        /// Field being read.
        field: &'static str,
        /// Bytes required.
        needed: usize,
        /// Bytes left.
        available: usize,
    },
    /// Input continued past the end of the structure.
    #[error("backup data has {0} trailing bytes")]
    TrailingBytes(usize),
    /// Entity version is not supported.
    #[error("unsupported backup entity version {0}")]
    UnsupportedVersion(u32),
    /// Backup set container version is not supported.
    #[error("unsupported backup set version {0}")]
    UnsupportedContainer(u32),
    /// String field is not UTF-8.
    #[error("backup data field {field} is not utf-8")]
    InvalidUtf8 {
        /// Field being read.
        field: &'static str,
    },
    /// Optional-field flag is neither 0 nor 1.
    #[error("backup data field {field} has invalid presence flag {flag}")]
    InvalidFlag {
        /// Field being read.
        field: &'static str,
        /// Offending flag.
        flag: u8,
    },
    /// Value is too large for its length prefix.
    #[error("backup data field {field} exceeds {max} bytes")]
    TooLong {
        /// Field being written.
        field: &'static str,
        /// Maximum allowed bytes.
        max: usize,
    },
    /// Platform code is unknown.
    #[error(transparent)]
    UnknownCode(#[from] UnknownCodeError),
    /// Only one of the account fields is present.
    #[error("backup entity has a partial account reference")]
    PartialAccount,
    /// Container failed an integrity check.
    #[error("backup set corrupt: {0}")]
    Corrupt(String),
    /// Backup set file could not be read or written.
    #[error("backup set io error: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: Codec
// ============================================================================

/// Encodes a call record as a version-1 entity.
///
/// # Errors
///
/// Returns [`FormatError::TooLong`] when a string exceeds its length prefix.
pub fn encode_record(record: &CallRecord) -> Result<Vec<u8>, FormatError> {
    let mut writer = ByteWriter::default();
    writer.put_u32(ENTITY_VERSION);
    writer.put_i64(record.date_ms);
    writer.put_u64(record.duration_secs);
    writer.put_str("number", &record.number)?;
    writer.put_i32(record.call_type.code());
    writer.put_i32(record.presentation.code());
    let account = record.account.as_ref();
    writer.put_opt_str(
        "account_component",
        account.map(|account| account.component_name.as_str()),
    )?;
    writer.put_opt_str("account_id", account.map(|account| account.account_id.as_str()))?;
    Ok(writer.into_bytes())
}

/// Decodes a call record entity.
///
/// # Errors
///
/// Returns [`FormatError`] when the payload is malformed or uses an unknown
/// version or code.
pub fn decode_record(bytes: &[u8]) -> Result<CallRecord, FormatError> {
    let mut reader = ByteReader::new(bytes);
    let version = reader.u32("version")?;
    if version != ENTITY_VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }
    let date_ms = reader.i64("date")?;
    let duration_secs = reader.u64("duration")?;
    let number = reader.str("number")?;
    let call_type = CallType::from_code(reader.i32("type")?)?;
    let presentation = Presentation::from_code(reader.i32("presentation")?)?;
    let component = reader.opt_str("account_component")?;
    let account_id = reader.opt_str("account_id")?;
    reader.finish()?;
    let account = match (component, account_id) {
        (Some(component_name), Some(account_id)) => Some(AccountRef {
            component_name,
            account_id,
        }),
        (None, None) => None,
        _ => return Err(FormatError::PartialAccount),
    };
    Ok(CallRecord {
        number,
        date_ms,
        duration_secs,
        call_type,
        presentation,
        account,
    })
}
