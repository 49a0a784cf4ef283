// crates/backup-roundtrip-local/src/backupset.rs
// ============================================================================
// Module: Backup Set Container
// Description: Checksummed file container for a package's backup entities.
// Purpose: Persist backups between the backup and restore passes.
// Dependencies: backup-roundtrip-core, sha2
// ============================================================================

//! ## Overview
//! A backup set is `RTBK`, a `u32` container version, a `u32` entity count,
//! then each entity as a `u16`-prefixed key and a `u32`-prefixed payload. The
//! last 32 bytes are the SHA-256 of everything before them.
//!
//! ## Invariants
//! - The checksum is verified before any field is interpreted.
//! - Files are replaced atomically through a temporary sibling.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use backup_roundtrip_core::PackageName;
use sha2::Digest;
use sha2::Sha256;

use crate::format::FormatError;
use crate::wire::ByteReader;
use crate::wire::ByteWriter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Leading magic bytes.
pub const BACKUP_SET_MAGIC: [u8; 4] = *b"RTBK";
/// Current container version.
pub const BACKUP_SET_VERSION: u32 = 1;
/// File extension for backup sets.
pub const BACKUP_SET_EXTENSION: &str = "rtbk";
/// SHA-256 digest length.
const DIGEST_LENGTH: usize = 32;
/// Smallest well-formed container (header plus trailer).
const MIN_SET_LENGTH: usize = BACKUP_SET_MAGIC.len() + 4 + 4 + DIGEST_LENGTH;
/// Maximum backup set size accepted from disk.
pub(crate) const MAX_BACKUP_SET_SIZE: u64 = 64 * 1024 * 1024;
/// Smallest encoded entity (empty key, empty payload).
const MIN_ENTITY_LENGTH: usize = 2 + 4;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One keyed payload produced by a backup agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntity {
    /// Entity key, unique within a set.
    pub key: String,
    /// Opaque payload.
    pub data: Vec<u8>,
}

// ============================================================================
// SECTION: Codec
// ============================================================================

/// Encodes entities into a checksummed container.
///
/// # Errors
///
/// Returns [`FormatError::TooLong`] when a key, payload, or the entity count
/// exceeds its length prefix.
pub fn encode_backup_set(entities: &[BackupEntity]) -> Result<Vec<u8>, FormatError> {
    let count = u32::try_from(entities.len()).map_err(|_| FormatError::TooLong {
        field: "entity_count",
        max: u32::MAX as usize,
    })?;
    let mut writer = ByteWriter::default();
    writer.put_bytes(&BACKUP_SET_MAGIC);
    writer.put_u32(BACKUP_SET_VERSION);
    writer.put_u32(count);
    for entity in entities {
        writer.put_str("entity_key", &entity.key)?;
        let len = u32::try_from(entity.data.len()).map_err(|_| FormatError::TooLong {
            field: "entity_data",
            max: u32::MAX as usize,
        })?;
        writer.put_u32(len);
        writer.put_bytes(&entity.data);
    }
    let mut bytes = writer.into_bytes();
    let digest = Sha256::digest(&bytes);
    bytes.extend_from_slice(&digest);
    Ok(bytes)
}

/// Decodes a checksummed container.
///
/// # Errors
///
/// Returns [`FormatError`] when the checksum, magic, version, or layout is
/// invalid.
pub fn decode_backup_set(bytes: &[u8]) -> Result<Vec<BackupEntity>, FormatError> {
    if bytes.len() < MIN_SET_LENGTH {
        return Err(FormatError::Corrupt(format!(
            "backup set is {} bytes, minimum is {MIN_SET_LENGTH}",
            bytes.len()
        )));
    }
    let (body, trailer) = bytes.split_at(bytes.len() - DIGEST_LENGTH);
    let digest = Sha256::digest(body);
    if digest.as_slice() != trailer {
        return Err(FormatError::Corrupt("checksum mismatch".to_string()));
    }
    let mut reader = ByteReader::new(body);
    if reader.take("magic", BACKUP_SET_MAGIC.len())? != BACKUP_SET_MAGIC {
        return Err(FormatError::Corrupt("bad magic".to_string()));
    }
    let version = reader.u32("container_version")?;
    if version != BACKUP_SET_VERSION {
        return Err(FormatError::UnsupportedContainer(version));
    }
    let count = reader.u32("entity_count")? as usize;
    if count > reader.remaining() / MIN_ENTITY_LENGTH {
        return Err(FormatError::Corrupt(format!(
            "entity count {count} exceeds remaining payload"
        )));
    }
    let mut entities = Vec::with_capacity(count);
    for _ in 0 .. count {
        let key = reader.str("entity_key")?;
        let len = reader.u32("entity_data")? as usize;
        let data = reader.take("entity_data", len)?.to_vec();
        entities.push(BackupEntity {
            key,
            data,
        });
    }
    reader.finish()?;
    Ok(entities)
}

// ============================================================================
// SECTION: Files
// ============================================================================

/// Returns the backup set path for `package` inside `dir`.
#[must_use]
pub fn backup_set_path(dir: &Path, package: &PackageName) -> PathBuf {
    dir.join(format!("{package}.{BACKUP_SET_EXTENSION}"))
}

/// Writes a backup set atomically.
///
/// # Errors
///
/// Returns [`FormatError`] when encoding or file I/O fails.
pub fn write_backup_set(path: &Path, entities: &[BackupEntity]) -> Result<(), FormatError> {
    let bytes = encode_backup_set(entities)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| FormatError::Io(err.to_string()))?;
    }
    let temp_path = path.with_extension("tmp");
    let mut file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|err| FormatError::Io(err.to_string()))?;
    file.write_all(&bytes).map_err(|err| FormatError::Io(err.to_string()))?;
    file.sync_all().map_err(|err| FormatError::Io(err.to_string()))?;
    fs::rename(&temp_path, path).map_err(|err| FormatError::Io(err.to_string()))?;
    Ok(())
}

/// Reads and decodes a backup set.
///
/// # Errors
///
/// Returns [`FormatError`] when the file is missing, oversized, or corrupt.
pub fn read_backup_set(path: &Path) -> Result<Vec<BackupEntity>, FormatError> {
    let metadata = fs::metadata(path).map_err(|err| FormatError::Io(err.to_string()))?;
    if metadata.len() > MAX_BACKUP_SET_SIZE {
        return Err(FormatError::Corrupt("backup set exceeds size limit".to_string()));
    }
    let bytes = fs::read(path).map_err(|err| FormatError::Io(err.to_string()))?;
    decode_backup_set(&bytes)
}
