// crates/backup-roundtrip-core/src/core/mod.rs
// ============================================================================
// Module: Backup Round-Trip Core Types
// Description: Identifiers, call records, and pipeline state.
// Purpose: Provide stable, serializable types shared by every crate.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Core types are the canonical source of truth for stores, agents, the
//! verifier, and CLI reports.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod identifiers;
pub mod record;
pub mod state;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use identifiers::CURRENT_TRANSPORT_MARKER;
pub use identifiers::IdentifierError;
pub use identifiers::MAX_NAME_LENGTH;
pub use identifiers::PackageName;
pub use identifiers::RecordId;
pub use identifiers::TransportName;
pub use record::AccountRef;
pub use record::CallRecord;
pub use record::CallType;
pub use record::Presentation;
pub use record::StoredRecord;
pub use record::UnknownCodeError;
pub use state::PipelineStage;
pub use state::RunVerdict;
pub use state::TransportState;
pub use state::VerifyPhase;
