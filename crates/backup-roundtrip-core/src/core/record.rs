// crates/backup-roundtrip-core/src/core/record.rs
// ============================================================================
// Module: Call Records
// Description: Call-log record model used by stores, agents, and the verifier.
// Purpose: Provide the content fields compared across a backup round trip.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`CallRecord`] holds the content of one logged call. Stores attach a
//! [`RecordId`] when persisting, producing a [`StoredRecord`]. Round-trip
//! equality is defined over the content fields only; identifiers are
//! store-assigned and are not expected to survive a restore.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::RecordId;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Raised when a stored numeric code has no matching enumeration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} code: {code}")]
pub struct UnknownCodeError {
    /// Enumeration label.
    pub kind: &'static str,
    /// Offending code.
    pub code: i32,
}

// ============================================================================
// SECTION: Enumerations
// ============================================================================

/// Call direction/type.
///
/// # Invariants
/// - Codes match the platform call-log contract and are stable on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    /// Incoming answered call.
    Incoming,
    /// Outgoing call.
    Outgoing,
    /// Missed incoming call.
    Missed,
    /// Voicemail.
    Voicemail,
    /// Rejected incoming call.
    Rejected,
    /// Blocked incoming call.
    Blocked,
    /// Call answered on another device.
    AnsweredExternally,
}

impl CallType {
    /// Returns the stable numeric code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Incoming => 1,
            Self::Outgoing => 2,
            Self::Missed => 3,
            Self::Voicemail => 4,
            Self::Rejected => 5,
            Self::Blocked => 6,
            Self::AnsweredExternally => 7,
        }
    }

    /// Resolves a numeric code.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCodeError`] when the code is not defined.
    pub const fn from_code(code: i32) -> Result<Self, UnknownCodeError> {
        match code {
            1 => Ok(Self::Incoming),
            2 => Ok(Self::Outgoing),
            3 => Ok(Self::Missed),
            4 => Ok(Self::Voicemail),
            5 => Ok(Self::Rejected),
            6 => Ok(Self::Blocked),
            7 => Ok(Self::AnsweredExternally),
            _ => Err(UnknownCodeError {
                kind: "call type",
                code,
            }),
        }
    }

    /// Returns a stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
            Self::Missed => "missed",
            Self::Voicemail => "voicemail",
            Self::Rejected => "rejected",
            Self::Blocked => "blocked",
            Self::AnsweredExternally => "answered_externally",
        }
    }
}

/// Caller-ID presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Presentation {
    /// Number shown.
    #[default]
    Allowed,
    /// Number withheld by the caller.
    Restricted,
    /// Number unavailable.
    Unknown,
    /// Payphone.
    Payphone,
}

impl Presentation {
    /// Returns the stable numeric code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Allowed => 1,
            Self::Restricted => 2,
            Self::Unknown => 3,
            Self::Payphone => 4,
        }
    }

    /// Resolves a numeric code.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCodeError`] when the code is not defined.
    pub const fn from_code(code: i32) -> Result<Self, UnknownCodeError> {
        match code {
            1 => Ok(Self::Allowed),
            2 => Ok(Self::Restricted),
            3 => Ok(Self::Unknown),
            4 => Ok(Self::Payphone),
            _ => Err(UnknownCodeError {
                kind: "presentation",
                code,
            }),
        }
    }

    /// Returns a stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::Restricted => "restricted",
            Self::Unknown => "unknown",
            Self::Payphone => "payphone",
        }
    }
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// Originating calling account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountRef {
    /// Component name of the service that placed the call.
    pub component_name: String,
    /// Account identifier within that service.
    pub account_id: String,
}

/// Content fields of one logged call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallRecord {
    /// Remote party identifier.
    pub number: String,
    /// Call start time in epoch milliseconds.
    pub date_ms: i64,
    /// Call duration in seconds.
    pub duration_secs: u64,
    /// Call direction/type.
    pub call_type: CallType,
    /// Caller-ID presentation.
    #[serde(default)]
    pub presentation: Presentation,
    /// Originating account, when known.
    #[serde(default)]
    pub account: Option<AccountRef>,
}

impl CallRecord {
    /// Builds the record used by the canonical single-call scenario.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            number: "555-1234".to_string(),
            date_ms: 0,
            duration_secs: 2000,
            call_type: CallType::Outgoing,
            presentation: Presentation::Allowed,
            account: None,
        }
    }
}

impl fmt::Display for CallRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "number={} date={} duration={} type={} presentation={}",
            self.number,
            self.date_ms,
            self.duration_secs,
            self.call_type.as_str(),
            self.presentation.as_str()
        )?;
        match &self.account {
            Some(account) => {
                write!(f, " account={}:{}", account.component_name, account.account_id)
            }
            None => write!(f, " account=none"),
        }
    }
}

/// A record as persisted by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// Record content.
    pub record: CallRecord,
}

impl fmt::Display for StoredRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id={} {}", self.id, self.record)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
