// crates/backup-roundtrip-shell/src/lib.rs
// ============================================================================
// Module: Device Shell Collaborators
// Description: bmgr administrator and content-provider call log store.
// Purpose: Run round trips against a real device through a command runner.
// Dependencies: backup-roundtrip-core, thiserror
// ============================================================================

//! ## Overview
//! Every device interaction is a command executed through a [`CommandRunner`].
//! [`BmgrAdministrator`] wraps the `bmgr` tool and [`ContentProviderStore`]
//! wraps `content` against the call log provider. [`ProcessRunner`] executes
//! commands locally, typically `adb shell`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod bmgr;
pub mod content;
pub mod runner;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use bmgr::BmgrAdministrator;
pub use content::CALLS_URI;
pub use content::ContentProviderStore;
pub use content::parse_query_output;
pub use runner::CommandOutput;
pub use runner::CommandRunner;
pub use runner::ProcessRunner;
pub use runner::ShellError;
pub use runner::quote_remote;
