// crates/backup-roundtrip-core/src/runtime/guard.rs
// ============================================================================
// Module: Transport Guard
// Description: Scoped restoration of backup manager state.
// Purpose: Put the previous transport and enabled flag back on every exit path.
// Dependencies: crate::core, crate::events, crate::interfaces
// ============================================================================

//! ## Overview
//! [`TransportGuard`] records what the backup manager looked like before the
//! run touched it. State is recorded incrementally as the pipeline learns it.
//! Calling [`TransportGuard::release`] restores it and reports failures;
//! dropping an unreleased guard (early return, unwinding) restores it and logs
//! failures instead.
//!
//! ## Invariants
//! - Restoration runs at most once.
//! - The transport is restored before the enabled flag.
//! - Nothing is restored for values never recorded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::json;

use crate::core::PipelineStage;
use crate::core::TransportName;
use crate::events::RunEvent;
use crate::events::RunLog;
use crate::interfaces::AdminError;
use crate::interfaces::TransportAdministrator;

// ============================================================================
// SECTION: Guard
// ============================================================================

/// Restores previous backup manager state when released or dropped.
pub struct TransportGuard<'a, A: TransportAdministrator + ?Sized> {
    /// Administrator to restore.
    admin: &'a A,
    /// Sink for restoration events.
    log: &'a dyn RunLog,
    /// Transport active before the run.
    previous_transport: Option<TransportName>,
    /// Enabled flag before the run.
    previous_enabled: Option<bool>,
    /// Stage reported on restoration events.
    stage: PipelineStage,
    /// False once restoration has run.
    armed: bool,
}

impl<'a, A: TransportAdministrator + ?Sized> TransportGuard<'a, A> {
    /// Creates an armed guard with nothing recorded.
    #[must_use]
    pub fn new(admin: &'a A, log: &'a dyn RunLog) -> Self {
        Self {
            admin,
            log,
            previous_transport: None,
            previous_enabled: None,
            stage: PipelineStage::Idle,
            armed: true,
        }
    }

    /// Records the enabled flag to restore.
    pub const fn record_enabled(&mut self, enabled: bool) {
        self.previous_enabled = Some(enabled);
    }

    /// Records the transport to restore, replacing any earlier value.
    pub fn record_transport(&mut self, transport: TransportName) {
        self.previous_transport = Some(transport);
    }

    /// Sets the stage reported on restoration events.
    pub const fn set_stage(&mut self, stage: PipelineStage) {
        self.stage = stage;
    }

    /// Returns the recorded transport.
    #[must_use]
    pub const fn previous_transport(&self) -> Option<&TransportName> {
        self.previous_transport.as_ref()
    }

    /// Returns the recorded enabled flag.
    #[must_use]
    pub const fn previous_enabled(&self) -> Option<bool> {
        self.previous_enabled
    }

    /// Restores recorded state and disarms the guard.
    ///
    /// Both restorations are attempted even if the first fails.
    ///
    /// # Errors
    ///
    /// Returns the first [`AdminError`] encountered.
    pub fn release(mut self) -> Result<(), AdminError> {
        self.restore()
    }

    /// Performs restoration once.
    fn restore(&mut self) -> Result<(), AdminError> {
        if !self.armed {
            return Ok(());
        }
        self.armed = false;

        let mut first_error = None;
        if let Some(transport) = &self.previous_transport {
            match self.admin.select_transport(transport) {
                Ok(_) => self.log.record(
                    &RunEvent::info("teardown_transport", self.stage, "transport restored")
                        .with_detail(json!({ "transport": transport.as_str() })),
                ),
                Err(err) => first_error = Some(err),
            }
        }
        if let Some(enabled) = self.previous_enabled {
            match self.admin.set_enabled(enabled) {
                Ok(_) => self.log.record(
                    &RunEvent::info("teardown_enabled", self.stage, "enabled flag restored")
                        .with_detail(json!({ "enabled": enabled })),
                ),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl<A: TransportAdministrator + ?Sized> Drop for TransportGuard<'_, A> {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            self.log.record(&RunEvent::error(
                "teardown_failed",
                self.stage,
                format!("backup manager state not restored: {err}"),
            ));
        }
    }
}
