use std::path::PathBuf;
use thiserror::Error;

use crate::core::ValidationError;

/// Errors that can occur while reading or writing a timetable store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Timetable file does not exist.
    #[error("Timetable file not found: {0}")]
    NotFound(PathBuf),
    /// Refused to overwrite an existing timetable on init.
    #[error("Timetable file already exists: {0}")]
    AlreadyExists(PathBuf),
    /// Backup directory cannot be created or written to.
    #[error("Backup directory not writable: {0}")]
    BackupDirNotWritable(PathBuf),
    /// Failed to create backup file.
    #[error("Failed to create backup: {0}")]
    BackupFailed(String),
    /// Atomic write operation failed.
    #[error("Atomic write failed: {0}")]
    WriteFailed(String),
    /// Timetable document could not be decoded or encoded.
    #[error("Malformed timetable document: {0}")]
    Malformed(#[from] serde_json::Error),
    /// An event failed validation on its way into the store.
    #[error("Invalid event: {0}")]
    Invalid(#[from] ValidationError),
    /// No event with this id exists.
    #[error("Event not found: {0}")]
    EventNotFound(String),
    /// An event or course with this id already exists.
    #[error("Duplicate id: {0}")]
    DuplicateId(String),
    /// File watcher could not be set up.
    #[error("Failed to watch timetable: {0}")]
    WatchFailed(#[from] notify::Error),
    /// Another thread panicked while holding the store lock.
    #[error("Store lock poisoned")]
    LockPoisoned,
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
