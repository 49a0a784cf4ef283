// crates/backup-roundtrip-core/src/runtime/store.rs
// ============================================================================
// Module: In-Memory Record Store
// Description: Simple in-memory call record store for tests and demos.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of [`RecordStore`]
//! for tests and local demos. Identifiers increase monotonically and are never
//! reused, even after [`RecordStore::delete_all`], matching how durable stores
//! behave.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::CallRecord;
use crate::core::RecordId;
use crate::core::StoredRecord;
use crate::interfaces::RecordStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Mutable store contents.
#[derive(Debug, Default)]
struct StoreInner {
    /// Records keyed by identifier.
    records: BTreeMap<i64, CallRecord>,
    /// Last identifier handed out.
    last_id: i64,
}

/// In-memory call record store for tests and examples.
///
/// Clones share the same underlying records.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecordStore {
    /// Store contents protected by a mutex.
    inner: Arc<Mutex<StoreInner>>,
}

impl InMemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.records.len())
    }

    /// Returns true when the store holds no records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.records.is_empty())
    }

    /// Locks the store contents.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StoreInner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Store("record store mutex poisoned".to_string()))
    }
}

impl RecordStore for InMemoryRecordStore {
    fn delete_all(&self) -> Result<(), StoreError> {
        self.lock()?.records.clear();
        Ok(())
    }

    fn insert(&self, record: &CallRecord) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let id = guard
            .last_id
            .checked_add(1)
            .ok_or_else(|| StoreError::Invalid("record identifier space exhausted".to_string()))?;
        guard.last_id = id;
        guard.records.insert(id, record.clone());
        Ok(())
    }

    fn query_all(&self) -> Result<Vec<StoredRecord>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .records
            .iter()
            .map(|(id, record)| StoredRecord {
                id: RecordId::new(*id),
                record: record.clone(),
            })
            .collect())
    }
}
