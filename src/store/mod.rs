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

//! Event storage behind a small snapshot-oriented contract.
//!
//! The conflict detector never reaches into a store; callers fetch a
//! snapshot with [`EventStore::list_events`] and pass it in. Stores can also
//! push fresh snapshots through [`EventStore::subscribe`] so collision counts
//! stay current.
//!
//! Two implementations ship with the crate:
//!
//! - [`MemoryStore`]: in-process, notifies subscribers synchronously
//! - [`TimetableStore`]: a JSON timetable document on disk with atomic
//!   writes, timestamped backups and OS-level change notification
//!
//! # Example
//!
//! ```no_run
//! use timetable_manager::store::{EventFilter, EventStore, TimetableStore};
//!
//! let store = TimetableStore::open("/srv/timetable/timetable.json".into())?;
//! let evening = store.list_events(&EventFilter::new().department("CS"))?;
//! println!("{} CS events", evening.len());
//! # Ok::<(), timetable_manager::store::StoreError>(())
//! ```

pub mod error;
pub mod file_store;
pub mod memory;
pub mod transaction;
pub mod watcher;

pub use error::StoreError;
pub use file_store::{TimetableDocument, TimetableStore};
pub use memory::MemoryStore;
pub use transaction::StoreTransaction;

use std::collections::HashSet;

use crate::core::{ProgramType, ScheduleEvent, Semester};

/// Restricts which events a query or subscription sees.
///
/// Unset fields match everything.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EventFilter {
    pub department: Option<String>,
    pub program_type: Option<ProgramType>,
    pub lecturer_id: Option<String>,
    pub room_id: Option<String>,
    pub course_id: Option<String>,
}

impl EventFilter {
    /// A filter matching every event.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn program_type(mut self, program_type: ProgramType) -> Self {
        self.program_type = Some(program_type);
        self
    }

    pub fn lecturer(mut self, lecturer_id: impl Into<String>) -> Self {
        self.lecturer_id = Some(lecturer_id.into());
        self
    }

    pub fn room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    pub fn course(mut self, course_id: impl Into<String>) -> Self {
        self.course_id = Some(course_id.into());
        self
    }

    /// Returns true if the event passes every set criterion.
    pub fn matches(&self, event: &ScheduleEvent) -> bool {
        fn accepts(wanted: &Option<String>, actual: &str) -> bool {
            wanted.as_deref().is_none_or(|wanted| wanted == actual)
        }

        accepts(&self.department, &event.department)
            && accepts(&self.lecturer_id, &event.lecturer_id)
            && accepts(&self.room_id, &event.room_id)
            && accepts(&self.course_id, &event.course_id)
            && self.program_type.is_none_or(|program| program == event.program_type)
    }

    /// Keeps the matching events of a snapshot.
    pub fn apply<'a, I>(&self, events: I) -> Vec<ScheduleEvent>
    where
        I: IntoIterator<Item = &'a ScheduleEvent>,
    {
        events.into_iter().filter(|event| self.matches(event)).cloned().collect()
    }
}

/// Fails with `DuplicateId` on the first id seen twice.
///
/// The conflict detector treats a shared id as the same event, so a
/// snapshot with duplicate ids would hide collisions.
pub(crate) fn ensure_unique_ids<'a, I>(ids: I) -> Result<(), StoreError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(StoreError::DuplicateId(id.to_string()));
        }
    }
    Ok(())
}

/// Callback receiving a filtered snapshot after every change.
pub type SnapshotCallback = Box<dyn Fn(Vec<ScheduleEvent>) + Send + Sync + 'static>;

/// Handle for an active subscription. Dropping it stops delivery.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stops delivery immediately.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Source of scheduled events.
///
/// Mutations are not transactional with respect to conflict checks: a
/// snapshot taken before `insert_event` may already be stale.
pub trait EventStore {
    /// Returns the current events matching `filter`.
    fn list_events(&self, filter: &EventFilter) -> Result<Vec<ScheduleEvent>, StoreError>;

    /// Persists a validated event. Fails on a duplicate id.
    fn insert_event(&self, event: ScheduleEvent) -> Result<(), StoreError>;

    /// Deletes an event, returning it so the caller can report its course
    /// as unscheduled.
    fn remove_event(&self, id: &str) -> Result<ScheduleEvent, StoreError>;

    /// The semester new events must fall into, if one is configured.
    fn semester(&self) -> Result<Option<Semester>, StoreError>;

    /// Delivers the filtered snapshot to `callback` after every change.
    fn subscribe(
        &self,
        filter: EventFilter,
        callback: SnapshotCallback,
    ) -> Result<Subscription, StoreError>;
}

#[cfg(test)]
mod tests;
