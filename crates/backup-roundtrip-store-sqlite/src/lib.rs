// crates/backup-roundtrip-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Call Log Store
// Description: Durable RecordStore backend using SQLite.
// Purpose: Persist call records across processes for local round trips.
// Dependencies: backup-roundtrip-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`RecordStore`] holding call records in
//! a `calls` table shaped like the platform call log. Identifiers are assigned
//! by `SQLite` and never reused, so a restored record always carries a new id.
//!
//! [`RecordStore`]: backup_roundtrip_core::RecordStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteRecordStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
