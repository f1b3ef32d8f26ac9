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

//! File system watcher for live timetable monitoring
//!
//! Uses OS-level file watching (Linux inotify) via the notify crate.
//! The parent directory is watched rather than the file itself: atomic
//! writes replace the file's inode, which would silently end a watch
//! placed on the file.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    sync::mpsc::{channel, Receiver},
    thread,
};

use crate::core::ScheduleEvent;
use crate::store::{EventFilter, SnapshotCallback, StoreError, Subscription, TimetableDocument};

/// Watches a timetable file for modifications
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    file_name: Option<OsString>,
}

impl FileWatcher {
    pub fn new(path: PathBuf) -> Result<Self, StoreError> {
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;

        Ok(FileWatcher {
            watcher,
            rx,
            file_name: path.file_name().map(|name| name.to_os_string()),
        })
    }

    /// Checks for modification events (non-blocking)
    pub fn check_for_changes(&self) -> bool {
        let mut changed = false;
        while let Ok(result) = self.rx.try_recv() {
            changed |= is_change(result, self.file_name.as_deref());
        }
        changed
    }
}

/// Returns true for a content-affecting event on the watched file.
fn is_change(result: notify::Result<Event>, file_name: Option<&std::ffi::OsStr>) -> bool {
    let Ok(event) = result else {
        return false;
    };

    let relevant_kind = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );

    relevant_kind && event.paths.iter().any(|path| path.file_name() == file_name)
}

fn read_snapshot(path: &Path, filter: &EventFilter) -> Result<Vec<ScheduleEvent>, StoreError> {
    let content = std::fs::read_to_string(path)?;
    let document = TimetableDocument::from_json(&content)?;
    Ok(filter.apply(&document.events))
}

/// Starts a background thread delivering snapshots after each change.
///
/// The subscription owns the OS watcher. Dropping it drops the watcher,
/// which closes the channel and ends the thread.
pub(crate) fn spawn_subscription(
    path: PathBuf,
    filter: EventFilter,
    callback: SnapshotCallback,
) -> Result<Subscription, StoreError> {
    let FileWatcher { watcher, rx, file_name } = FileWatcher::new(path.clone())?;

    thread::Builder::new()
        .name("timetable-watch".to_string())
        .spawn(move || {
            while let Ok(result) = rx.recv() {
                let mut changed = is_change(result, file_name.as_deref());

                // One write produces a burst of events; coalesce it
                while let Ok(result) = rx.try_recv() {
                    changed |= is_change(result, file_name.as_deref());
                }

                if !changed {
                    continue;
                }

                match read_snapshot(&path, &filter) {
                    Ok(snapshot) => callback(snapshot),
                    Err(e) => tracing::warn!(error = %e, "skipping unreadable timetable update"),
                }
            }
            tracing::debug!("timetable watch ended");
        })?;

    Ok(Subscription::new(move || drop(watcher)))
}
