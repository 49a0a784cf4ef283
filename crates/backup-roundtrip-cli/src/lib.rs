// crates/backup-roundtrip-cli/src/lib.rs
// ============================================================================
// Module: Backup Round-Trip CLI Library
// Description: Shared helpers for the backup round-trip command-line interface.
// Purpose: Provide reusable components (i18n, backend wiring) for the binary and tests.
// Dependencies: backup-roundtrip-{config, core, local, shell, store-sqlite}
// ============================================================================

//! ## Overview
//! This library houses the message catalog and the backend wiring that turns
//! a validated configuration into a backup manager and a record store. The
//! binary entry point (`src/main.rs`) imports these helpers so every
//! user-facing string stays in one catalog.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Backend construction from configuration.
pub mod backend;
/// Internationalization helpers and message catalog.
pub mod i18n;
