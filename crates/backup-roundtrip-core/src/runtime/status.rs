// crates/backup-roundtrip-core/src/runtime/status.rs
// ============================================================================
// Module: Backup Manager Status Parsing
// Description: Adapter from backup manager text output to typed values.
// Purpose: Isolate every fixed-format string contract in one place.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Backup managers report state as human-readable text. This module is the
//! only place that text is interpreted. A mismatch means the collaborator's
//! output contract changed, so parse failures are fatal and carry the raw
//! text for diagnosis.
//!
//! ## Invariants
//! - Enabled status accepts exactly `Backup Manager currently enabled` or
//!   `Backup Manager currently disabled`, ignoring surrounding whitespace.
//! - Transport switch confirmations must end with `(formerly <name>)`.
//! - Transport listings are whitespace separated; `*` is never a name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::CURRENT_TRANSPORT_MARKER;
use crate::core::TransportName;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix shared by both enabled-status strings.
const ENABLED_STATUS_PREFIX: &str = "Backup Manager currently ";
/// Opening of the previous-transport suffix.
const FORMERLY_OPEN: &str = "(formerly ";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Status text that did not match its fixed format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unparseable {context} output (expected {expected}): '{raw}'")]
pub struct StatusParseError {
    /// Which output was being parsed.
    pub context: &'static str,
    /// Human description of the expected shape.
    pub expected: &'static str,
    /// Raw text as received.
    pub raw: String,
}

// ============================================================================
// SECTION: Parsers
// ============================================================================

/// Parses the enabled-status line.
///
/// # Errors
///
/// Returns [`StatusParseError`] when the text is not one of the two fixed strings.
pub fn parse_enabled_status(text: &str) -> Result<bool, StatusParseError> {
    match text.trim().strip_prefix(ENABLED_STATUS_PREFIX) {
        Some("enabled") => Ok(true),
        Some("disabled") => Ok(false),
        _ => Err(StatusParseError {
            context: "enabled status",
            expected: "Backup Manager currently (enabled|disabled)",
            raw: text.to_string(),
        }),
    }
}

/// Extracts the previously active transport from a switch confirmation.
///
/// # Errors
///
/// Returns [`StatusParseError`] when the `(formerly <name>)` suffix is absent
/// or names an invalid transport.
pub fn parse_previous_transport(text: &str) -> Result<TransportName, StatusParseError> {
    let error = || StatusParseError {
        context: "transport switch",
        expected: "... (formerly <transport>)",
        raw: text.to_string(),
    };
    let body = text.trim_end().strip_suffix(')').ok_or_else(error)?;
    let start = body.rfind(FORMERLY_OPEN).ok_or_else(error)?;
    let name = &body[start + FORMERLY_OPEN.len() ..];
    TransportName::parse(name).map_err(|_| error())
}

/// Lists the transport names in a listing, skipping the active marker.
///
/// Tokens that are not valid transport names are dropped.
#[must_use]
pub fn parse_transport_list(text: &str) -> Vec<TransportName> {
    text.split_whitespace()
        .filter(|token| *token != CURRENT_TRANSPORT_MARKER)
        .filter_map(|token| TransportName::parse(token).ok())
        .collect()
}

/// Returns the transport flagged as active in a listing, if any.
#[must_use]
pub fn parse_current_transport(text: &str) -> Option<TransportName> {
    let mut tokens = text.split_whitespace();
    while let Some(token) = tokens.next() {
        if token == CURRENT_TRANSPORT_MARKER {
            return tokens.next().and_then(|name| TransportName::parse(name).ok());
        }
    }
    None
}

/// Returns true when `wanted` appears in the listing by exact match.
#[must_use]
pub fn has_transport(text: &str, wanted: &TransportName) -> bool {
    text.split_whitespace()
        .filter(|token| *token != CURRENT_TRANSPORT_MARKER)
        .any(|token| token == wanted.as_str())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
