// crates/backup-roundtrip-core/src/runtime/mod.rs
// ============================================================================
// Module: Backup Round-Trip Runtime
// Description: Verifier pipeline, settle strategies, and status parsing.
// Purpose: Execute round-trip runs against any administrator and store.
// Dependencies: crate::{core, events, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the round-trip pipeline and its helpers. Every
//! surface (CLI, system tests) calls into [`RoundTripVerifier`] so that the
//! pipeline order and teardown guarantees hold everywhere.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod guard;
pub mod settle;
pub mod status;
pub mod store;
pub mod verifier;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use guard::TransportGuard;
pub use settle::DEFAULT_POLL_INITIAL;
pub use settle::DEFAULT_POLL_MAX;
pub use settle::DEFAULT_SETTLE_INTERVAL;
pub use settle::SettleMode;
pub use settle::SettleOutcome;
pub use settle::SettlePolicy;
pub use settle::settle;
pub use status::StatusParseError;
pub use store::InMemoryRecordStore;
pub use verifier::RoundTripReport;
pub use verifier::RoundTripVerifier;
pub use verifier::VerificationError;
pub use verifier::VerifierConfig;
