// crates/backup-roundtrip-local/src/agent.rs
// ============================================================================
// Module: Backup Agents
// Description: Agent contract and the call-log agent.
// Purpose: Convert a package's data to backup entities and back.
// Dependencies: backup-roundtrip-core, thiserror
// ============================================================================

//! ## Overview
//! A [`BackupAgent`] owns one package's data. The call-log agent emits one
//! entity per stored record, keyed by record id. Restore decodes the whole set
//! before touching the store and inserts only records whose content is not
//! already present, so replaying a restore is harmless.

// ============================================================================
// SECTION: Imports
// ============================================================================

use backup_roundtrip_core::CallRecord;
use backup_roundtrip_core::RecordStore;
use backup_roundtrip_core::StoreError;
use thiserror::Error;

use crate::backupset::BackupEntity;
use crate::format::FormatError;
use crate::format::decode_record;
use crate::format::encode_record;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Backup agent errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    /// Underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A record could not be encoded.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// A backup entity could not be decoded.
    #[error("backup entity {key}: {source}")]
    Entity {
        /// Entity key.
        key: String,
        /// Decode failure.
        source: FormatError,
    },
}

// ============================================================================
// SECTION: Agent Contract
// ============================================================================

/// Outcome of a restore pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestoreSummary {
    /// Records inserted.
    pub restored: usize,
    /// Records skipped because identical content was already present.
    pub skipped: usize,
}

/// Package data participant in backup and restore.
pub trait BackupAgent {
    /// Produces the full backup payload for the package.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when package data cannot be read or encoded.
    fn on_backup(&self) -> Result<Vec<BackupEntity>, AgentError>;

    /// Applies a backup payload to the package.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when the payload is invalid or cannot be applied.
    fn on_restore(&self, entities: &[BackupEntity]) -> Result<RestoreSummary, AgentError>;
}

// ============================================================================
// SECTION: Call Log Agent
// ============================================================================

/// Backup agent for the call log.
#[derive(Debug, Clone)]
pub struct CallLogBackupAgent<S> {
    /// Store holding the call log.
    store: S,
}

impl<S: RecordStore> CallLogBackupAgent<S> {
    /// Creates an agent over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
        }
    }

    /// Returns the backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<S: RecordStore> BackupAgent for CallLogBackupAgent<S> {
    fn on_backup(&self) -> Result<Vec<BackupEntity>, AgentError> {
        let rows = self.store.query_all()?;
        let mut entities = Vec::with_capacity(rows.len());
        for row in rows {
            entities.push(BackupEntity {
                key: row.id.get().to_string(),
                data: encode_record(&row.record)?,
            });
        }
        Ok(entities)
    }

    fn on_restore(&self, entities: &[BackupEntity]) -> Result<RestoreSummary, AgentError> {
        let mut incoming = Vec::with_capacity(entities.len());
        for entity in entities {
            let record = decode_record(&entity.data).map_err(|source| AgentError::Entity {
                key: entity.key.clone(),
                source,
            })?;
            incoming.push(record);
        }
        let mut existing: Vec<CallRecord> =
            self.store.query_all()?.into_iter().map(|row| row.record).collect();
        let mut summary = RestoreSummary::default();
        for record in incoming {
            if let Some(position) = existing.iter().position(|present| *present == record) {
                existing.swap_remove(position);
                summary.skipped += 1;
                continue;
            }
            self.store.insert(&record)?;
            summary.restored += 1;
        }
        Ok(summary)
    }
}
