// crates/backup-roundtrip-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Store Tests
// Description: Validate SQLite RecordStore behavior.
// Purpose: Ensure durable persistence and strict decoding.
// Dependencies: backup-roundtrip-store-sqlite, backup-roundtrip-core, rusqlite, tempfile
// ============================================================================

//! ## Overview
//! Conformance tests for the SQLite-backed call log store. Exercises
//! persistence across instances, identifier assignment, and rejection of rows
//! this store could not have written.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use backup_roundtrip_core::AccountRef;
use backup_roundtrip_core::CallRecord;
use backup_roundtrip_core::CallType;
use backup_roundtrip_core::Presentation;
use backup_roundtrip_core::RecordStore;
use backup_roundtrip_core::StoreError;
use backup_roundtrip_store_sqlite::SqliteRecordStore;
use backup_roundtrip_store_sqlite::SqliteStoreConfig;
use backup_roundtrip_store_sqlite::SqliteStoreError;
use backup_roundtrip_store_sqlite::SqliteStoreMode;
use backup_roundtrip_store_sqlite::SqliteSyncMode;
use proptest::prelude::*;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn store_for(path: &std::path::Path) -> SqliteRecordStore {
    let config = SqliteStoreConfig {
        path: path.to_path_buf(),
        busy_timeout_ms: 1_000,
        journal_mode: SqliteStoreMode::Wal,
        sync_mode: SqliteSyncMode::Full,
    };
    SqliteRecordStore::new(config).expect("store init")
}

fn account_record() -> CallRecord {
    CallRecord {
        number: "+34 600 000 000".to_string(),
        date_ms: 1_700_000_000_000,
        duration_secs: 61,
        call_type: CallType::Incoming,
        presentation: Presentation::Restricted,
        account: Some(AccountRef {
            component_name: "com.android.phone/com.android.services.telephony.TelephonyConnectionService"
                .to_string(),
            account_id: "89014103211118510720".to_string(),
        }),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn sqlite_store_roundtrip() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("calls.sqlite"));
    store.insert(&CallRecord::sample()).unwrap();
    store.insert(&account_record()).unwrap();

    let rows = store.query_all().unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].record, CallRecord::sample());
    assert_eq!(rows[1].record, account_record());
    assert!(rows[0].id < rows[1].id);
}

#[test]
fn sqlite_store_persists_across_instances() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("calls.sqlite");
    store_for(&path).insert(&CallRecord::sample()).unwrap();

    let reopened = store_for(&path);

    assert_eq!(reopened.query_all().unwrap()[0].record, CallRecord::sample());
}

#[test]
fn sqlite_store_never_reuses_identifiers() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("calls.sqlite"));
    store.insert(&CallRecord::sample()).unwrap();
    let first = store.query_all().unwrap()[0].id;

    store.delete_all().unwrap();
    store.delete_all().unwrap();
    assert!(store.query_all().unwrap().is_empty());
    store.insert(&CallRecord::sample()).unwrap();

    assert!(store.query_all().unwrap()[0].id > first);
}

#[test]
fn sqlite_store_rejects_unknown_call_type() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("calls.sqlite");
    let store = store_for(&path);
    let connection = rusqlite::Connection::open(&path).unwrap();
    connection
        .execute(
            "INSERT INTO calls (number, date, duration, type, presentation) VALUES ('1', 0, 0, \
             42, 1)",
            [],
        )
        .unwrap();

    let err = store.query_all().unwrap_err();

    assert!(matches!(err, StoreError::Corrupt(_)));
}

#[test]
fn sqlite_store_rejects_negative_duration() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("calls.sqlite");
    let store = store_for(&path);
    let connection = rusqlite::Connection::open(&path).unwrap();
    connection
        .execute(
            "INSERT INTO calls (number, date, duration, type, presentation) VALUES ('1', 0, -5, \
             2, 1)",
            [],
        )
        .unwrap();

    assert!(matches!(store.query_all().unwrap_err(), StoreError::Corrupt(_)));
}

#[test]
fn sqlite_store_rejects_partial_account() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("calls.sqlite");
    let store = store_for(&path);
    let connection = rusqlite::Connection::open(&path).unwrap();
    connection
        .execute(
            "INSERT INTO calls (number, date, duration, type, presentation, \
             subscription_component_name) VALUES ('1', 0, 0, 2, 1, 'component')",
            [],
        )
        .unwrap();

    let err = store.query_all().unwrap_err();

    assert!(err.to_string().contains("partial account"));
}

#[test]
fn sqlite_store_rejects_duration_beyond_integer_range() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("calls.sqlite"));
    let record = CallRecord {
        duration_secs: u64::MAX,
        ..CallRecord::sample()
    };

    assert!(matches!(store.insert(&record).unwrap_err(), StoreError::Invalid(_)));
}

#[test]
fn sqlite_store_rejects_version_mismatch() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("calls.sqlite");
    drop(store_for(&path));
    let connection = rusqlite::Connection::open(&path).unwrap();
    connection.execute("UPDATE store_meta SET version = 99", []).unwrap();
    drop(connection);

    let result = SqliteRecordStore::new(SqliteStoreConfig::new(&path));

    assert!(matches!(result, Err(SqliteStoreError::VersionMismatch(_))));
}

#[test]
fn sqlite_store_rejects_directory_path() {
    let temp = TempDir::new().unwrap();
    let result = SqliteRecordStore::new(SqliteStoreConfig::new(temp.path()));
    assert!(matches!(result, Err(SqliteStoreError::Invalid(_))));
}

#[test]
fn sqlite_store_rejects_overlong_path_component() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("a".repeat(256));
    let result = SqliteRecordStore::new(SqliteStoreConfig::new(path));
    assert!(matches!(result, Err(SqliteStoreError::Invalid(_))));
}

#[test]
fn sqlite_store_clones_share_connection() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("calls.sqlite"));
    let clone = store.clone();
    let handles: Vec<_> = (0 .. 4)
        .map(|_| {
            let store = clone.clone();
            std::thread::spawn(move || store.insert(&CallRecord::sample()).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(store.query_all().unwrap().len(), 4);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn sqlite_store_preserves_arbitrary_content(
        number in "[0-9+() -]{0,24}",
        date_ms in any::<i64>(),
        duration_secs in 0u64 ..= i64::MAX.unsigned_abs(),
        type_code in 1i32 ..= 7,
        presentation_code in 1i32 ..= 4,
    ) {
        let temp = TempDir::new().unwrap();
        let store = store_for(&temp.path().join("calls.sqlite"));
        let record = CallRecord {
            number,
            date_ms,
            duration_secs,
            call_type: CallType::from_code(type_code).unwrap(),
            presentation: Presentation::from_code(presentation_code).unwrap(),
            account: None,
        };
        store.insert(&record).unwrap();
        let rows = store.query_all().unwrap();
        prop_assert_eq!(rows.len(), 1);
        prop_assert_eq!(&rows[0].record, &record);
    }
}
