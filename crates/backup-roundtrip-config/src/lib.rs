// crates/backup-roundtrip-config/src/lib.rs
// ============================================================================
// Module: Backup Round-Trip Config Library
// Description: Canonical config model, loading, and validation.
// Purpose: Single source of truth for backup-roundtrip.toml semantics.
// Dependencies: backup-roundtrip-core, backup-roundtrip-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `backup-roundtrip-config` defines the configuration model for round-trip
//! runs: which package and transport to target, how long to settle, which
//! record to seed, and which backend to drive. Validation is strict and fails
//! closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
