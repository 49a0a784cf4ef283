// system-tests/src/lib.rs
// ============================================================================
// Module: Backup Round-Trip System Tests Library
// Description: Shared configuration and helpers for system test scenarios.
// Purpose: Provide common utilities for backup round-trip system-test binaries.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the backup round-trip
//! system-tests in `system-tests/tests`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
