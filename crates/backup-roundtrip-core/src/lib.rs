// crates/backup-roundtrip-core/src/lib.rs
// ============================================================================
// Module: Backup Round-Trip Core Library
// Description: Public API surface for the backup round-trip verifier.
// Purpose: Expose record types, collaborator traits, and the verifier pipeline.
// Dependencies: crate::{core, events, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Backup round-trip core proves that a record store's data survives a
//! backup, clear, and restore cycle driven through a backup manager. It is
//! backend-agnostic: the backup manager and the store are reached only through
//! [`TransportAdministrator`] and [`RecordStore`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod events;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use events::EventLevel;
pub use events::FileRunLog;
pub use events::MemoryRunLog;
pub use events::NoopRunLog;
pub use events::RunEvent;
pub use events::RunLog;
pub use events::StderrRunLog;
pub use events::TeeRunLog;
pub use interfaces::AdminError;
pub use interfaces::RecordStore;
pub use interfaces::Sleeper;
pub use interfaces::StoreError;
pub use interfaces::ThreadSleeper;
pub use interfaces::TransportAdministrator;
pub use runtime::InMemoryRecordStore;
pub use runtime::RoundTripReport;
pub use runtime::RoundTripVerifier;
pub use runtime::SettleMode;
pub use runtime::SettleOutcome;
pub use runtime::SettlePolicy;
pub use runtime::StatusParseError;
pub use runtime::TransportGuard;
pub use runtime::VerificationError;
pub use runtime::VerifierConfig;
