// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for backup round-trip system-tests.
// Purpose: Provide binary resolution, workspace fixtures, and artifact utilities.
// Dependencies: system-tests, backup-roundtrip-local
// ============================================================================

//! ## Overview
//! Shared helpers for backup round-trip system-tests.
//! Invariants:
//! - Every test runs the CLI in its own state directory.
//! - Artifacts are written under the configured run root.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod cli;
pub mod workspace;
