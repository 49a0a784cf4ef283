// crates/backup-roundtrip-core/src/core/identifiers.rs
// ============================================================================
// Module: Backup Round-Trip Identifiers
// Description: Validated names for backup packages, transports, and records.
// Purpose: Keep collaborator arguments single-word and well-formed.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Package and transport names are passed verbatim to backup manager commands,
//! so both are validated at construction: non-empty, bounded, and free of
//! whitespace. Record identifiers are opaque integers assigned by the store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a package or transport name in bytes.
pub const MAX_NAME_LENGTH: usize = 255;

/// Marker token the backup manager uses to flag the active transport.
pub const CURRENT_TRANSPORT_MARKER: &str = "*";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Identifier validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// Identifier was empty.
    #[error("{kind} must not be empty")]
    Empty {
        /// Identifier kind label.
        kind: &'static str,
    },
    /// Identifier exceeded [`MAX_NAME_LENGTH`].
    #[error("{kind} exceeds {max} bytes")]
    TooLong {
        /// Identifier kind label.
        kind: &'static str,
        /// Maximum allowed bytes.
        max: usize,
    },
    /// Identifier contained a disallowed character.
    #[error("{kind} contains disallowed character '{character}'")]
    InvalidCharacter {
        /// Identifier kind label.
        kind: &'static str,
        /// Offending character.
        character: char,
    },
    /// Identifier collides with a reserved token.
    #[error("{kind} must not be the reserved token {token}")]
    Reserved {
        /// Identifier kind label.
        kind: &'static str,
        /// Reserved token.
        token: &'static str,
    },
}

// ============================================================================
// SECTION: Package Name
// ============================================================================

/// Name of the package whose backup agent is exercised.
///
/// # Invariants
/// - Non-empty, at most [`MAX_NAME_LENGTH`] bytes.
/// - Only ASCII alphanumerics, `.`, `_`, and `-`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageName(String);

impl PackageName {
    /// Parses and validates a package name.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the value violates the package invariants.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        let kind = "package name";
        check_length(kind, value)?;
        if let Some(character) =
            value.chars().find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
        {
            return Err(IdentifierError::InvalidCharacter {
                kind,
                character,
            });
        }
        Ok(Self(value.to_string()))
    }

    /// Returns the package name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for PackageName {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PackageName> for String {
    fn from(value: PackageName) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Transport Name
// ============================================================================

/// Name of a backup transport as reported by the backup manager.
///
/// # Invariants
/// - Non-empty, at most [`MAX_NAME_LENGTH`] bytes.
/// - No whitespace or control characters.
/// - Never equal to [`CURRENT_TRANSPORT_MARKER`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransportName(String);

impl TransportName {
    /// Parses and validates a transport name.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the value violates the transport invariants.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        let kind = "transport name";
        check_length(kind, value)?;
        if let Some(character) = value.chars().find(|c| c.is_whitespace() || c.is_control()) {
            return Err(IdentifierError::InvalidCharacter {
                kind,
                character,
            });
        }
        if value == CURRENT_TRANSPORT_MARKER {
            return Err(IdentifierError::Reserved {
                kind,
                token: CURRENT_TRANSPORT_MARKER,
            });
        }
        Ok(Self(value.to_string()))
    }

    /// Returns the transport name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransportName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for TransportName {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TransportName> for String {
    fn from(value: TransportName) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Record Identifier
// ============================================================================

/// Store-assigned record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    /// Wraps a raw store identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Checks emptiness and length bounds shared by all names.
const fn check_length(kind: &'static str, value: &str) -> Result<(), IdentifierError> {
    if value.is_empty() {
        return Err(IdentifierError::Empty {
            kind,
        });
    }
    if value.len() > MAX_NAME_LENGTH {
        return Err(IdentifierError::TooLong {
            kind,
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
