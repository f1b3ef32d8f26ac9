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

//! Timetable write transactions with automatic backups
//!
//! Provides atomic replace of the timetable document.

use atomic_write_file::AtomicWriteFile;
use std::{fs, io::Write, path::{Path, PathBuf}};

use crate::store::{StoreError, TimetableDocument, TimetableStore};

/// Atomic timetable write with automatic backup.
///
/// - **Atomic**: the file is replaced all-or-nothing (temp file + rename)
/// - **Durable**: a backup exists before any modification
///
/// This is not a concurrency-control mechanism. Two writers that read the
/// same document and both commit will see the later commit win.
///
/// # Lifecycle
///
/// 1. `begin()` - Creates timestamped backup immediately
/// 2. Caller prepares the new document in memory
/// 3. `commit()` - Writes atomically, or `rollback()` - Restores the backup
///
/// # Example
///
/// ```no_run
/// use timetable_manager::store::{StoreTransaction, TimetableStore};
///
/// let store = TimetableStore::open("timetable.json".into())?;
/// let mut document = store.read_document()?;
/// document.events.clear();
///
/// let tx = StoreTransaction::begin(&store)?;
/// tx.commit(&document)?;
/// # Ok::<(), timetable_manager::store::StoreError>(())
/// ```
pub struct StoreTransaction<'a> {
    store: &'a TimetableStore,
    backup_path: Option<PathBuf>,
}

impl<'a> StoreTransaction<'a> {
    /// Begins a new transaction by creating a timestamped backup.
    ///
    /// # Errors
    ///
    /// Returns an error if the timetable cannot be read or the backup
    /// cannot be written. No changes are made in that case.
    pub fn begin(store: &'a TimetableStore) -> Result<Self, StoreError> {
        let backup_path = store.create_timestamped_backup()?;

        Ok(Self {
            store,
            backup_path: Some(backup_path),
        })
    }

    /// The backup taken when the transaction began.
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup_path.as_deref()
    }

    /// Commits a document by atomically replacing the timetable file.
    ///
    /// Consumes the transaction to prevent double commits. The backup
    /// created during `begin()` is kept.
    pub fn commit(self, document: &TimetableDocument) -> Result<(), StoreError> {
        let content = document.to_json()?;
        write_atomically(&self.store.path, &content)
    }

    /// Commits raw content without decoding it first.
    ///
    /// The content must still be a valid timetable document; it is checked
    /// before anything is written.
    pub fn commit_raw(self, content: &str) -> Result<(), StoreError> {
        TimetableDocument::from_json(content)?;
        write_atomically(&self.store.path, content)
    }

    /// Restores the backup created during `begin()`.
    ///
    /// Borrows `self`, so it can be retried after a failed commit attempt.
    pub fn rollback(&self) -> Result<(), StoreError> {
        let backup_path = self
            .backup_path
            .as_ref()
            .ok_or_else(|| {
                StoreError::BackupFailed("No backup available for rollback".to_string())
            })?;

        let backup_content = fs::read_to_string(backup_path)?;
        write_atomically(&self.store.path, &backup_content)?;

        tracing::info!(backup = %backup_path.display(), "timetable rolled back");
        Ok(())
    }
}

fn write_atomically(path: &Path, content: &str) -> Result<(), StoreError> {
    let mut file = AtomicWriteFile::options()
        .open(path)
        .map_err(|e| StoreError::WriteFailed(format!("Failed to open for atomic write: {}", e)))?;

    file.write_all(content.as_bytes())
        .map_err(|e| StoreError::WriteFailed(format!("Failed to write content: {}", e)))?;

    file.commit()
        .map_err(|e| StoreError::WriteFailed(format!("Failed to commit atomic write: {}", e)))?;

    Ok(())
}
