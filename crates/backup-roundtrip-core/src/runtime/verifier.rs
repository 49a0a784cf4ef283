// crates/backup-roundtrip-core/src/runtime/verifier.rs
// ============================================================================
// Module: Backup Round-Trip Verifier
// Description: Backup, clear, restore, and verify pipeline.
// Purpose: Prove that store data survives a round trip through a backup manager.
// Dependencies: crate::{core, events, interfaces, runtime}, serde, thiserror
// ============================================================================

//! ## Overview
//! [`RoundTripVerifier::run_round_trip`] is the single execution path for a
//! conformance run. It selects the target transport, enables the backup
//! service, seeds the store with one record, backs it up, clears the store,
//! restores it, and checks the restored content field by field.
//!
//! ## Invariants
//! - A missing target transport yields a skip with no administrator mutation.
//! - Once mutation begins, previous transport and enabled state are restored on
//!   every exit path before the result is returned.
//! - Record identifiers are never compared; only content fields are.
//! - No step is retried.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::core::CallRecord;
use crate::core::PackageName;
use crate::core::PipelineStage;
use crate::core::RunVerdict;
use crate::core::StoredRecord;
use crate::core::TransportName;
use crate::core::TransportState;
use crate::core::VerifyPhase;
use crate::events::NoopRunLog;
use crate::events::RunEvent;
use crate::events::RunLog;
use crate::interfaces::AdminError;
use crate::interfaces::RecordStore;
use crate::interfaces::Sleeper;
use crate::interfaces::StoreError;
use crate::interfaces::TransportAdministrator;
use crate::runtime::guard::TransportGuard;
use crate::runtime::settle::SettleOutcome;
use crate::runtime::settle::SettlePolicy;
use crate::runtime::settle::settle;
use crate::runtime::status::StatusParseError;
use crate::runtime::status::has_transport;
use crate::runtime::status::parse_current_transport;
use crate::runtime::status::parse_enabled_status;
use crate::runtime::status::parse_previous_transport;
use crate::runtime::status::parse_transport_list;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Rendering used for an empty record set in integrity failures.
const EMPTY_RECORDS: &str = "<no records>";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Verifier configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Transport the round trip must run through.
    pub transport: TransportName,
    /// Wait applied after triggering backup and after triggering restore.
    pub settle: SettlePolicy,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Round-trip failures.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// Target transport is not offered by the backup manager.
    #[error("transport {wanted} unavailable (available: {available})")]
    TransportUnavailable {
        /// Transport the run required.
        wanted: TransportName,
        /// Transports the manager listed, comma separated.
        available: String,
    },
    /// Backup manager output no longer matches its fixed format.
    #[error("unparseable {context} output: '{raw}'")]
    UnparseableStatus {
        /// Which output was being parsed.
        context: &'static str,
        /// Raw text as received.
        raw: String,
    },
    /// Store contents differ from what the pipeline expects.
    #[error("data integrity failure at {}: expected [{expected}], actual [{actual}]", .phase.as_str())]
    DataIntegrity {
        /// Checkpoint that failed.
        phase: VerifyPhase,
        /// Expected records, rendered field by field.
        expected: String,
        /// Actual records, rendered field by field.
        actual: String,
    },
    /// Record store failure.
    #[error(transparent)]
    StoreAccess(#[from] StoreError),
    /// Backup manager command failure.
    #[error(transparent)]
    Administrator(#[from] AdminError),
    /// Previous backup manager state could not be restored after a pass.
    #[error("teardown failed: {message}")]
    TeardownFailed {
        /// Restoration failure description.
        message: String,
    },
}

impl VerificationError {
    /// Classifies the error as a failed or skipped run.
    #[must_use]
    pub const fn verdict(&self) -> RunVerdict {
        match self {
            Self::TransportUnavailable {
                ..
            } => RunVerdict::Skip,
            _ => RunVerdict::Fail,
        }
    }

    /// Returns a stable label for logs and reports.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TransportUnavailable {
                ..
            } => "transport_unavailable",
            Self::UnparseableStatus {
                ..
            } => "unparseable_status",
            Self::DataIntegrity {
                ..
            } => "data_integrity",
            Self::StoreAccess(_) => "store_access",
            Self::Administrator(_) => "administrator",
            Self::TeardownFailed {
                ..
            } => "teardown_failed",
        }
    }
}

impl From<StatusParseError> for VerificationError {
    fn from(error: StatusParseError) -> Self {
        Self::UnparseableStatus {
            context: error.context,
            raw: error.raw,
        }
    }
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Summary of a passing round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundTripReport {
    /// Package whose data was backed up.
    pub package: PackageName,
    /// Transport the round trip ran through.
    pub transport: TransportName,
    /// Backup manager state restored by teardown.
    pub previous: TransportState,
    /// Stages reached, in order.
    pub stages: Vec<PipelineStage>,
    /// How the post-backup wait ended.
    pub backup_settle: SettleOutcome,
    /// How the post-restore wait ended.
    pub restore_settle: SettleOutcome,
    /// Store contents after restore.
    pub restored: Vec<StoredRecord>,
}

// ============================================================================
// SECTION: Verifier
// ============================================================================

/// Drives one backup round trip against an administrator and a store.
pub struct RoundTripVerifier<A, S, Z> {
    /// Backup manager.
    admin: A,
    /// Store whose data is backed up.
    store: S,
    /// Sleeper used for settle waits.
    sleeper: Z,
    /// Run event sink.
    log: Arc<dyn RunLog>,
    /// Verifier configuration.
    config: VerifierConfig,
}

impl<A, S, Z> RoundTripVerifier<A, S, Z>
where
    A: TransportAdministrator,
    S: RecordStore,
    Z: Sleeper,
{
    /// Creates a verifier that discards run events.
    #[must_use]
    pub fn new(admin: A, store: S, sleeper: Z, config: VerifierConfig) -> Self {
        Self {
            admin,
            store,
            sleeper,
            log: Arc::new(NoopRunLog),
            config,
        }
    }

    /// Replaces the run event sink.
    #[must_use]
    pub fn with_log(mut self, log: Arc<dyn RunLog>) -> Self {
        self.log = log;
        self
    }

    /// Returns the backup manager.
    #[must_use]
    pub const fn admin(&self) -> &A {
        &self.admin
    }

    /// Returns the record store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the verifier configuration.
    #[must_use]
    pub const fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Runs the full round trip for `package`, seeding `record`.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError::TransportUnavailable`] (a skip) when the
    /// target transport is absent, and other variants (failures) when any
    /// step or the final teardown fails.
    pub fn run_round_trip(
        &self,
        package: &PackageName,
        record: &CallRecord,
    ) -> Result<RoundTripReport, VerificationError> {
        let target = &self.config.transport;
        let listing = self.admin.list_transports()?;
        if !has_transport(&listing, target) {
            let available = parse_transport_list(&listing)
                .iter()
                .map(TransportName::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            self.log.record(
                &RunEvent::warn("skipped", PipelineStage::Skipped, "target transport unavailable")
                    .with_detail(json!({
                        "wanted": target.as_str(),
                        "available": available,
                    })),
            );
            return Err(VerificationError::TransportUnavailable {
                wanted: target.clone(),
                available,
            });
        }

        let mut stages = Vec::new();
        let mut guard = TransportGuard::new(&self.admin, self.log.as_ref());
        let listed = parse_current_transport(&listing);
        let outcome = self.drive(&mut guard, &mut stages, listed, package, record);
        let teardown = guard.release();

        match (outcome, teardown) {
            (Ok(progress), Ok(())) => {
                self.enter(&mut stages, PipelineStage::Done);
                Ok(RoundTripReport {
                    package: package.clone(),
                    transport: target.clone(),
                    previous: progress.previous,
                    stages,
                    backup_settle: progress.backup_settle,
                    restore_settle: progress.restore_settle,
                    restored: progress.restored,
                })
            }
            (Ok(_), Err(err)) => {
                let error = VerificationError::TeardownFailed {
                    message: err.to_string(),
                };
                self.record_failure(&stages, &error);
                Err(error)
            }
            (Err(error), teardown) => {
                if let Err(err) = teardown {
                    self.log.record(&RunEvent::error(
                        "teardown_failed",
                        PipelineStage::Failed,
                        format!("backup manager state not restored: {err}"),
                    ));
                }
                self.record_failure(&stages, &error);
                Err(error)
            }
        }
    }

    /// Executes steps 2 through 9 while `guard` tracks state to restore.
    fn drive(
        &self,
        guard: &mut TransportGuard<'_, A>,
        stages: &mut Vec<PipelineStage>,
        listed: Option<TransportName>,
        package: &PackageName,
        record: &CallRecord,
    ) -> Result<Progress, VerificationError> {
        let target = &self.config.transport;
        self.advance(guard, stages, PipelineStage::TransportSelected);

        let status = self.admin.enabled_status()?;
        let was_enabled = parse_enabled_status(&status)?;
        guard.record_enabled(was_enabled);
        self.admin.set_enabled(true)?;

        // The listed transport stands in until the confirmation names the previous one.
        if let Some(current) = listed {
            guard.record_transport(current);
        }
        let confirmation = self.admin.select_transport(target)?;
        let previous = parse_previous_transport(&confirmation)?;
        guard.record_transport(previous.clone());
        self.advance(guard, stages, PipelineStage::ServiceEnabled);

        self.store.delete_all()?;
        self.store.insert(record)?;
        self.verify_single(VerifyPhase::Seeded, record)?;
        self.advance(guard, stages, PipelineStage::Seeded);

        self.admin.request_backup(package)?;
        self.admin.run_pending_backups()?;
        let backup_settle = self.wait("backup", PipelineStage::Seeded)?;
        self.advance(guard, stages, PipelineStage::BackedUp);

        self.store.delete_all()?;
        let remaining = self.store.query_all()?;
        if !remaining.is_empty() {
            return Err(VerificationError::DataIntegrity {
                phase: VerifyPhase::Cleared,
                expected: EMPTY_RECORDS.to_string(),
                actual: render_records(&remaining),
            });
        }
        self.advance(guard, stages, PipelineStage::Cleared);

        self.admin.request_restore(package)?;
        let restore_settle = self.wait("restore", PipelineStage::Cleared)?;
        self.advance(guard, stages, PipelineStage::Restored);

        let restored = self.verify_single(VerifyPhase::Restored, record)?;
        self.advance(guard, stages, PipelineStage::Verified);

        Ok(Progress {
            previous: TransportState {
                transport: previous,
                enabled: was_enabled,
            },
            backup_settle,
            restore_settle,
            restored,
        })
    }

    /// Asserts the store holds exactly one record equal to `expected`.
    fn verify_single(
        &self,
        phase: VerifyPhase,
        expected: &CallRecord,
    ) -> Result<Vec<StoredRecord>, VerificationError> {
        let rows = self.store.query_all()?;
        if let [only] = rows.as_slice()
            && only.record == *expected
        {
            return Ok(rows);
        }
        Err(VerificationError::DataIntegrity {
            phase,
            expected: expected.to_string(),
            actual: render_records(&rows),
        })
    }

    /// Applies the settle policy and records how it ended.
    fn wait(
        &self,
        operation: &'static str,
        stage: PipelineStage,
    ) -> Result<SettleOutcome, VerificationError> {
        let outcome = settle(&self.config.settle, &self.admin, &self.sleeper)?;
        let detail = json!({
            "operation": operation,
            "mode": self.config.settle.mode.as_str(),
            "outcome": outcome.as_str(),
            "waited_ms": outcome.waited_ms(),
        });
        let event = if matches!(outcome, SettleOutcome::TimedOut { .. }) {
            RunEvent::warn("settle", stage, "settle bound reached before idle")
        } else {
            RunEvent::info("settle", stage, "settle finished")
        };
        self.log.record(&event.with_detail(detail));
        Ok(outcome)
    }

    /// Moves the pipeline and the guard to `stage`.
    fn advance(
        &self,
        guard: &mut TransportGuard<'_, A>,
        stages: &mut Vec<PipelineStage>,
        stage: PipelineStage,
    ) {
        guard.set_stage(stage);
        self.enter(stages, stage);
    }

    /// Appends a stage and logs the transition.
    fn enter(&self, stages: &mut Vec<PipelineStage>, stage: PipelineStage) {
        stages.push(stage);
        self.log.record(&RunEvent::info("stage", stage, format!("entered {}", stage.as_str())));
    }

    /// Logs a terminal failure.
    fn record_failure(&self, stages: &[PipelineStage], error: &VerificationError) {
        let reached = stages.last().copied().unwrap_or(PipelineStage::Idle);
        self.log.record(
            &RunEvent::error("failed", PipelineStage::Failed, error.to_string()).with_detail(
                json!({
                    "kind": error.kind(),
                    "last_stage": reached.as_str(),
                }),
            ),
        );
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Results carried from the pipeline body to teardown.
struct Progress {
    /// State teardown restores.
    previous: TransportState,
    /// Post-backup settle outcome.
    backup_settle: SettleOutcome,
    /// Post-restore settle outcome.
    restore_settle: SettleOutcome,
    /// Store contents after restore.
    restored: Vec<StoredRecord>,
}

/// Renders records for integrity failure messages.
fn render_records(rows: &[StoredRecord]) -> String {
    if rows.is_empty() {
        return EMPTY_RECORDS.to_string();
    }
    rows.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
