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

//! Timetable file management with atomic writes and backup support.
//!
//! The timetable lives in a single JSON document holding the semester, the
//! course list and every scheduled event. Key features:
//!
//! - **Atomic writes**: Uses temp-file-then-rename to prevent corruption
//! - **Automatic backups**: Every write creates a timestamped backup
//! - **Rollback safety**: Failed transactions leave the original untouched
//! - **Validated reads**: Events are re-validated when the document loads
//!
//! # Example
//!
//! ```no_run
//! use timetable_manager::store::TimetableStore;
//!
//! let store = TimetableStore::open("/srv/timetable/timetable.json".into())?;
//! let document = store.read_document()?;
//! println!("{} events scheduled", document.events.len());
//! # Ok::<(), timetable_manager::store::StoreError>(())
//! ```

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::core::{
    validate_draft, validate_within_semester, Course, EventDraft, ScheduleEvent, Semester,
};
use crate::store::{
    ensure_unique_ids, watcher, EventFilter, EventStore, SnapshotCallback, StoreError,
    StoreTransaction, Subscription,
};

/// Backups sharing one millisecond timestamp before giving up.
const MAX_BACKUP_ATTEMPTS: u32 = 1000;

/// The on-disk timetable.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimetableDocument {
    pub semester: Option<Semester>,
    pub courses: Vec<Course>,
    pub events: Vec<ScheduleEvent>,
}

impl TimetableDocument {
    /// Decodes and validates a document.
    ///
    /// Every event is validated, and event ids and course ids must each be
    /// unique.
    pub fn from_json(content: &str) -> Result<Self, StoreError> {
        let document: Self = serde_json::from_str(content)?;
        ensure_unique_ids(document.events.iter().map(|event| event.id.as_str()))?;
        ensure_unique_ids(document.courses.iter().map(|course| course.id.as_str()))?;
        Ok(document)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Manages a timetable file with safe atomic operations.
///
/// Reads are plain file reads. Every write goes through a
/// [`StoreTransaction`], which backs up the current file first.
#[derive(Debug)]
pub struct TimetableStore {
    /// Path to the timetable document.
    pub(crate) path: PathBuf,
    pub(crate) backup_dir: PathBuf,
}

impl TimetableStore {
    /// Opens an existing timetable file.
    ///
    /// Creates the `backups/` directory next to the file if it does not
    /// exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the file doesn't exist.
    /// Returns `StoreError::BackupDirNotWritable` if the backup directory
    /// cannot be created.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::NotFound(path));
        }

        if path.read_link().is_ok() {
            tracing::warn!(path = %path.display(), "timetable file is a symlink");
        }

        // e.g., /srv/timetable/timetable.json → /srv/timetable/backups/
        let backup_dir = path
            .parent()
            .ok_or_else(|| {
                StoreError::BackupDirNotWritable(PathBuf::from(
                    "Timetable file has no parent directory",
                ))
            })?
            .join("backups");

        if !backup_dir.exists() {
            fs::create_dir_all(&backup_dir)
                .map_err(|_| StoreError::BackupDirNotWritable(backup_dir.clone()))?;
        }

        if backup_dir.metadata()?.permissions().readonly() {
            return Err(StoreError::BackupDirNotWritable(backup_dir));
        }

        Ok(Self { path, backup_dir })
    }

    /// Creates a new, empty timetable file and opens it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` rather than overwriting a file.
    pub fn init(path: PathBuf, semester: Option<Semester>) -> Result<Self, StoreError> {
        if path.exists() {
            return Err(StoreError::AlreadyExists(path));
        }

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let document = TimetableDocument {
            semester,
            ..Default::default()
        };
        fs::write(&path, document.to_json()?)?;
        tracing::info!(path = %path.display(), "timetable initialised");

        Self::open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and validates the whole document.
    pub fn read_document(&self) -> Result<TimetableDocument, StoreError> {
        let content = fs::read_to_string(&self.path)?;
        TimetableDocument::from_json(&content)
    }

    /// Applies `change` to the current document and commits the result.
    ///
    /// The change runs against a fresh read; if it fails, nothing is written.
    pub fn update<T>(
        &self,
        change: impl FnOnce(&mut TimetableDocument) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut document = self.read_document()?;
        let result = change(&mut document)?;

        let tx = StoreTransaction::begin(self)?;
        if let Err(e) = tx.commit(&document) {
            tracing::error!(error = %e, "commit failed, timetable left unchanged");
            return Err(e);
        }

        Ok(result)
    }

    /// Validates a draft, checks the semester, assigns an id and persists it.
    pub fn create_event(&self, draft: EventDraft) -> Result<ScheduleEvent, StoreError> {
        let event = validate_draft(draft)?;
        if let Some(semester) = self.semester()? {
            validate_within_semester(&event, &semester)?;
        }
        self.insert_event(event.clone())?;
        Ok(event)
    }

    /// All courses in the timetable.
    pub fn courses(&self) -> Result<Vec<Course>, StoreError> {
        Ok(self.read_document()?.courses)
    }

    /// Registers a course. Fails on a duplicate course id.
    pub fn add_course(&self, course: Course) -> Result<(), StoreError> {
        self.update(|document| {
            if document.courses.iter().any(|existing| existing.id == course.id) {
                return Err(StoreError::DuplicateId(course.id.clone()));
            }
            document.courses.push(course);
            Ok(())
        })
    }

    /// Replaces the semester date range.
    pub fn set_semester(&self, semester: Semester) -> Result<(), StoreError> {
        self.update(|document| {
            document.semester = Some(semester);
            Ok(())
        })
    }

    /// Copies the current file into the backup directory.
    ///
    /// Backup names look like `timetable.json.2025-10-10_221500_123`. A
    /// backup is never overwritten: when the name is taken, a counter is
    /// appended (`..._123_001`), which still sorts after the original.
    pub(crate) fn create_timestamped_backup(&self) -> Result<PathBuf, StoreError> {
        let content = fs::read_to_string(&self.path)?;

        let timestamp = Local::now().format("%Y-%m-%d_%H%M%S_%3f");

        let original_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                StoreError::BackupFailed("Timetable path has no UTF-8 file name".to_string())
            })?;
        let base_name = format!("{}.{}", original_name, timestamp);

        for attempt in 0..MAX_BACKUP_ATTEMPTS {
            let backup_path = if attempt == 0 {
                self.backup_dir.join(&base_name)
            } else {
                self.backup_dir.join(format!("{}_{:03}", base_name, attempt))
            };

            let failed = |e: io::Error| {
                StoreError::BackupFailed(format!("{}: {}", backup_path.display(), e))
            };

            let opened = OpenOptions::new().write(true).create_new(true).open(&backup_path);
            let mut file = match opened {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(failed(e)),
            };
            file.write_all(content.as_bytes()).map_err(failed)?;

            tracing::debug!(backup = %backup_path.display(), "backup created");
            return Ok(backup_path);
        }

        Err(StoreError::BackupFailed(format!(
            "no free backup name for {} after {} attempts",
            base_name, MAX_BACKUP_ATTEMPTS
        )))
    }

    /// Lists backups of this timetable, oldest first.
    pub fn list_backups(&self) -> Result<Vec<PathBuf>, StoreError> {
        let prefix = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| format!("{}.", name))
            .unwrap_or_default();

        let mut backups = Vec::new();
        for entry in fs::read_dir(&self.backup_dir)? {
            let path = entry?.path();
            let is_backup = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(&prefix));
            if path.is_file() && is_backup {
                backups.push(path);
            }
        }

        // Timestamps sort lexically
        backups.sort();
        Ok(backups)
    }

    /// Deletes all but the newest `keep` backups. Returns how many were removed.
    pub fn cleanup_old_backups(&self, keep: usize) -> Result<usize, StoreError> {
        let backups = self.list_backups()?;
        let excess = backups.len().saturating_sub(keep);

        for backup in &backups[..excess] {
            fs::remove_file(backup)?;
        }

        if excess > 0 {
            tracing::info!(removed = excess, kept = keep, "old backups removed");
        }
        Ok(excess)
    }
}

impl EventStore for TimetableStore {
    fn list_events(&self, filter: &EventFilter) -> Result<Vec<ScheduleEvent>, StoreError> {
        Ok(filter.apply(&self.read_document()?.events))
    }

    fn insert_event(&self, event: ScheduleEvent) -> Result<(), StoreError> {
        let id = event.id.clone();
        self.update(|document| {
            if document.events.iter().any(|existing| existing.id == event.id) {
                return Err(StoreError::DuplicateId(event.id.clone()));
            }
            document.events.push(event);
            Ok(())
        })?;
        tracing::info!(id = %id, "event scheduled");
        Ok(())
    }

    fn remove_event(&self, id: &str) -> Result<ScheduleEvent, StoreError> {
        let removed = self.update(|document| {
            let position = document
                .events
                .iter()
                .position(|event| event.id == id)
                .ok_or_else(|| StoreError::EventNotFound(id.to_string()))?;
            Ok(document.events.remove(position))
        })?;
        tracing::info!(id, course = %removed.course_id, "event removed");
        Ok(removed)
    }

    fn semester(&self) -> Result<Option<Semester>, StoreError> {
        Ok(self.read_document()?.semester)
    }

    fn subscribe(
        &self,
        filter: EventFilter,
        callback: SnapshotCallback,
    ) -> Result<Subscription, StoreError> {
        watcher::spawn_subscription(self.path.clone(), filter, callback)
    }
}
