// crates/backup-roundtrip-local/src/lib.rs
// ============================================================================
// Module: Local Backup Host
// Description: Backup agent, entity codec, and file-backed backup manager.
// Purpose: Run full backup round trips without a device.
// Dependencies: backup-roundtrip-core, serde_json, sha2
// ============================================================================

//! ## Overview
//! `backup-roundtrip-local` hosts the whole backup path in-process. A
//! [`CallLogBackupAgent`] turns stored call records into versioned binary
//! entities, backup sets are written as checksummed files, and the
//! [`LocalBackupManager`] exposes the same text surface as the platform backup
//! manager so the verifier cannot tell the two apart.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod agent;
pub mod backupset;
pub mod format;
pub mod manager;
mod wire;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use agent::AgentError;
pub use agent::BackupAgent;
pub use agent::CallLogBackupAgent;
pub use agent::RestoreSummary;
pub use backupset::BACKUP_SET_EXTENSION;
pub use backupset::BACKUP_SET_MAGIC;
pub use backupset::BACKUP_SET_VERSION;
pub use backupset::BackupEntity;
pub use backupset::backup_set_path;
pub use backupset::decode_backup_set;
pub use backupset::encode_backup_set;
pub use backupset::read_backup_set;
pub use backupset::write_backup_set;
pub use format::ENTITY_VERSION;
pub use format::FormatError;
pub use format::decode_record;
pub use format::encode_record;
pub use manager::BACKUP_DIR;
pub use manager::FILE_TRANSPORT;
pub use manager::LocalBackupManager;
pub use manager::MANAGER_STATE_FILE;
pub use manager::ManagerError;
pub use manager::ManagerState;
pub use manager::NULL_TRANSPORT;
