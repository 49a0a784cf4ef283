// crates/backup-roundtrip-core/src/runtime/settle.rs
// ============================================================================
// Module: Settle Strategies
// Description: Waiting for asynchronous backup and restore work to drain.
// Purpose: Bound the two suspension points of a round-trip run.
// Dependencies: crate::interfaces, serde
// ============================================================================

//! ## Overview
//! Backup managers finish work asynchronously. After triggering a backup or a
//! restore the verifier waits according to a [`SettlePolicy`]: either a fixed
//! delay, or polling the administrator's idle signal with exponential backoff.
//! Polling never waits longer than the policy interval, and an administrator
//! without an idle signal degrades to the fixed delay.
//!
//! ## Invariants
//! - Total time slept by [`settle`] never exceeds `interval`.
//! - A settle that times out does not fail the run; verification decides.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::interfaces::AdminError;
use crate::interfaces::Sleeper;
use crate::interfaces::TransportAdministrator;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default settle interval, tuned for the platform local transport.
pub const DEFAULT_SETTLE_INTERVAL: Duration = Duration::from_millis(4_000);
/// Default first idle-poll delay.
pub const DEFAULT_POLL_INITIAL: Duration = Duration::from_millis(100);
/// Default ceiling for a single idle-poll delay.
pub const DEFAULT_POLL_MAX: Duration = Duration::from_millis(1_000);

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Settle strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleMode {
    /// Sleep the full interval unconditionally.
    #[default]
    FixedDelay,
    /// Poll the idle signal with backoff, bounded by the interval.
    PollIdle,
}

impl SettleMode {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FixedDelay => "fixed_delay",
            Self::PollIdle => "poll_idle",
        }
    }
}

/// Parameters for one settle wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlePolicy {
    /// Strategy.
    pub mode: SettleMode,
    /// Upper bound on time spent waiting.
    pub interval: Duration,
    /// First poll delay in [`SettleMode::PollIdle`].
    pub poll_initial: Duration,
    /// Largest poll delay in [`SettleMode::PollIdle`].
    pub poll_max: Duration,
}

impl SettlePolicy {
    /// Fixed-delay policy with the given interval.
    #[must_use]
    pub const fn fixed(interval: Duration) -> Self {
        Self {
            mode: SettleMode::FixedDelay,
            interval,
            poll_initial: DEFAULT_POLL_INITIAL,
            poll_max: DEFAULT_POLL_MAX,
        }
    }

    /// Idle-polling policy with the given bound and default backoff.
    #[must_use]
    pub const fn poll(interval: Duration) -> Self {
        Self {
            mode: SettleMode::PollIdle,
            interval,
            poll_initial: DEFAULT_POLL_INITIAL,
            poll_max: DEFAULT_POLL_MAX,
        }
    }
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_SETTLE_INTERVAL)
    }
}

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// How a settle wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SettleOutcome {
    /// Fixed delay elapsed.
    Elapsed {
        /// Milliseconds slept.
        waited_ms: u64,
    },
    /// Administrator reported idle.
    Idle {
        /// Milliseconds slept before idle was observed.
        waited_ms: u64,
        /// Number of idle polls issued after the initial probe.
        polls: u32,
    },
    /// Administrator exposes no idle signal; fixed delay used instead.
    FallbackDelay {
        /// Milliseconds slept.
        waited_ms: u64,
    },
    /// Bound reached without observing idle.
    TimedOut {
        /// Milliseconds slept.
        waited_ms: u64,
        /// Number of idle polls issued after the initial probe.
        polls: u32,
    },
}

impl SettleOutcome {
    /// Milliseconds slept during the wait.
    #[must_use]
    pub const fn waited_ms(self) -> u64 {
        match self {
            Self::Elapsed {
                waited_ms,
            }
            | Self::Idle {
                waited_ms, ..
            }
            | Self::FallbackDelay {
                waited_ms,
            }
            | Self::TimedOut {
                waited_ms, ..
            } => waited_ms,
        }
    }

    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Elapsed {
                ..
            } => "elapsed",
            Self::Idle {
                ..
            } => "idle",
            Self::FallbackDelay {
                ..
            } => "fallback_delay",
            Self::TimedOut {
                ..
            } => "timed_out",
        }
    }
}

// ============================================================================
// SECTION: Settle
// ============================================================================

/// Waits according to `policy`.
///
/// # Errors
///
/// Returns [`AdminError`] when reading the idle signal fails.
pub fn settle<A, S>(
    policy: &SettlePolicy,
    admin: &A,
    sleeper: &S,
) -> Result<SettleOutcome, AdminError>
where
    A: TransportAdministrator + ?Sized,
    S: Sleeper + ?Sized,
{
    match policy.mode {
        SettleMode::FixedDelay => {
            sleeper.sleep(policy.interval);
            Ok(SettleOutcome::Elapsed {
                waited_ms: duration_ms(policy.interval),
            })
        }
        SettleMode::PollIdle => poll_until_idle(policy, admin, sleeper),
    }
}

/// Polls the idle signal with doubling delays until idle or the bound.
fn poll_until_idle<A, S>(
    policy: &SettlePolicy,
    admin: &A,
    sleeper: &S,
) -> Result<SettleOutcome, AdminError>
where
    A: TransportAdministrator + ?Sized,
    S: Sleeper + ?Sized,
{
    if admin.is_idle()?.is_none() {
        sleeper.sleep(policy.interval);
        return Ok(SettleOutcome::FallbackDelay {
            waited_ms: duration_ms(policy.interval),
        });
    }

    let mut waited = Duration::ZERO;
    let mut delay = policy.poll_initial;
    let mut polls: u32 = 0;
    loop {
        let step = delay.min(policy.interval.saturating_sub(waited));
        if step.is_zero() {
            return Ok(SettleOutcome::TimedOut {
                waited_ms: duration_ms(waited),
                polls,
            });
        }
        sleeper.sleep(step);
        waited += step;
        polls = polls.saturating_add(1);
        match admin.is_idle()? {
            Some(true) => {
                return Ok(SettleOutcome::Idle {
                    waited_ms: duration_ms(waited),
                    polls,
                });
            }
            Some(false) => {
                delay = delay.saturating_mul(2).min(policy.poll_max);
            }
            None => {
                let remaining = policy.interval.saturating_sub(waited);
                sleeper.sleep(remaining);
                return Ok(SettleOutcome::FallbackDelay {
                    waited_ms: duration_ms(waited + remaining),
                });
            }
        }
    }
}

/// Converts a duration to whole milliseconds, saturating.
fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
