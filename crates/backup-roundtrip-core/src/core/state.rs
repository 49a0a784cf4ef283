// crates/backup-roundtrip-core/src/core/state.rs
// ============================================================================
// Module: Round-Trip State
// Description: Pipeline stages, verdicts, and backup manager state snapshots.
// Purpose: Name every state the round-trip pipeline can occupy.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The verifier walks a linear pipeline from [`PipelineStage::Idle`] to
//! [`PipelineStage::Done`]. [`PipelineStage::Skipped`] is reachable only from
//! `Idle`; [`PipelineStage::Failed`] from anywhere, after teardown.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::TransportName;

// ============================================================================
// SECTION: Transport State
// ============================================================================

/// Backup manager configuration captured before the run mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportState {
    /// Active transport.
    pub transport: TransportName,
    /// Whether the backup service is enabled.
    pub enabled: bool,
}

// ============================================================================
// SECTION: Pipeline Stages
// ============================================================================

/// Pipeline stage reached by a round-trip run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Nothing has happened yet.
    Idle,
    /// Target transport discovered.
    TransportSelected,
    /// Backup service enabled and target transport active.
    ServiceEnabled,
    /// Store cleared and seeded with the test record.
    Seeded,
    /// Backup requested and settled.
    BackedUp,
    /// Store cleared after backup.
    Cleared,
    /// Restore requested and settled.
    Restored,
    /// Restored data matched the seed.
    Verified,
    /// Teardown finished after a pass.
    Done,
    /// Capability unavailable; nothing mutated.
    Skipped,
    /// Run failed; teardown already executed.
    Failed,
}

impl PipelineStage {
    /// Returns a stable label for logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::TransportSelected => "transport_selected",
            Self::ServiceEnabled => "service_enabled",
            Self::Seeded => "seeded",
            Self::BackedUp => "backed_up",
            Self::Cleared => "cleared",
            Self::Restored => "restored",
            Self::Verified => "verified",
            Self::Done => "done",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }

    /// Returns true for terminal stages.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Skipped | Self::Failed)
    }
}

/// Point in the pipeline where store contents are asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyPhase {
    /// Immediately after seeding.
    Seeded,
    /// After the post-backup clear.
    Cleared,
    /// After restore.
    Restored,
}

impl VerifyPhase {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Seeded => "seeded",
            Self::Cleared => "cleared",
            Self::Restored => "restored",
        }
    }
}

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// Final classification of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunVerdict {
    /// Data survived the round trip.
    Pass,
    /// Assertion, parse, or collaborator failure.
    Fail,
    /// Required capability missing.
    Skip,
}

impl RunVerdict {
    /// Process exit status for the verdict.
    #[must_use]
    pub const fn exit_status(self) -> u8 {
        match self {
            Self::Pass => 0,
            Self::Fail => 1,
            Self::Skip => 2,
        }
    }

    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Skip => "skip",
        }
    }
}
