// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::super::*;
use super::lecture;
use std::fs;
use tempfile::TempDir;

/// Helper: a store holding one event
fn create_test_store() -> (TempDir, TimetableStore) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("timetable.json");
    let store = TimetableStore::init(path, None).unwrap();
    store.insert_event(lecture("a", "L1", "R1", "09:00", "10:00")).unwrap();
    (temp_dir, store)
}

// ============================================================================
// StoreTransaction Tests
// ============================================================================

#[test]
fn test_transaction_basic_flow() {
    let (_temp_dir, store) = create_test_store();
    let original = fs::read_to_string(store.path()).unwrap();
    let backups_before = store.list_backups().unwrap().len();

    let tx = StoreTransaction::begin(&store).unwrap();
    let backup = tx.backup_path().unwrap().to_path_buf();

    let mut document = store.read_document().unwrap();
    document.events.push(lecture("b", "L2", "R2", "11:00", "12:00"));
    tx.commit(&document).unwrap();

    // New content written
    assert_eq!(store.read_document().unwrap(), document);

    // Backup kept, holding the original
    assert_eq!(store.list_backups().unwrap().len(), backups_before + 1);
    assert_eq!(fs::read_to_string(backup).unwrap(), original);
}

#[test]
fn test_transaction_rollback() {
    let (_temp_dir, store) = create_test_store();
    let original = store.read_document().unwrap();

    let tx = StoreTransaction::begin(&store).unwrap();

    // Someone else empties the file after the backup was taken
    fs::write(store.path(), "{}").unwrap();
    assert!(store.read_document().unwrap().events.is_empty());

    tx.rollback().unwrap();
    assert_eq!(store.read_document().unwrap(), original);

    // Rollback can be repeated
    tx.rollback().unwrap();
    assert_eq!(store.read_document().unwrap(), original);
}

#[test]
fn test_commit_raw_rejects_invalid_document() {
    let (_temp_dir, store) = create_test_store();
    let original = fs::read_to_string(store.path()).unwrap();

    let tx = StoreTransaction::begin(&store).unwrap();
    let result = tx.commit_raw("{\"events\": [{\"id\": \"broken\"}]}");

    assert!(matches!(result, Err(StoreError::Malformed(_))));
    assert_eq!(fs::read_to_string(store.path()).unwrap(), original, "file must be untouched");
}

#[test]
fn test_commit_raw_rejects_duplicate_ids() {
    let (_temp_dir, store) = create_test_store();
    let original = fs::read_to_string(store.path()).unwrap();

    let mut document = store.read_document().unwrap();
    document.events.push(document.events[0].clone());
    let raw = serde_json::to_string(&document).unwrap();

    let tx = StoreTransaction::begin(&store).unwrap();
    assert!(matches!(tx.commit_raw(&raw), Err(StoreError::DuplicateId(_))));
    assert_eq!(fs::read_to_string(store.path()).unwrap(), original);
}

#[test]
fn test_commit_raw_accepts_valid_document() {
    let (_temp_dir, store) = create_test_store();

    let tx = StoreTransaction::begin(&store).unwrap();
    tx.commit_raw("{\"courses\": [], \"events\": []}").unwrap();

    assert!(store.read_document().unwrap().events.is_empty());
}

#[test]
fn test_failed_update_writes_nothing() {
    let (_temp_dir, store) = create_test_store();
    let original = fs::read_to_string(store.path()).unwrap();
    let backups_before = store.list_backups().unwrap().len();

    let result: Result<(), StoreError> =
        store.update(|_| Err(StoreError::EventNotFound("x".to_string())));

    assert!(result.is_err());
    assert_eq!(fs::read_to_string(store.path()).unwrap(), original);
    assert_eq!(store.list_backups().unwrap().len(), backups_before, "no backup for a no-op");
}

#[test]
fn test_begin_fails_when_file_vanished() {
    let (_temp_dir, store) = create_test_store();
    fs::remove_file(store.path()).unwrap();

    assert!(matches!(StoreTransaction::begin(&store), Err(StoreError::Io(_))));
}
