// Copyright 2025 bakri (tidynest@proton.me)
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

//! Timetable Manager
//!
//! Scheduling of university lectures with conflict detection across three
//! dimensions: a lecturer in two places at once, a room booked twice, and
//! a department running two of its own lectures at the same time.
//!
//! # Features
//!
//! - **Conflict Detection:** Pairwise checks for a candidate and a global
//!   sweep over the whole timetable, deduplicated per dimension
//! - **Recurring and One-off Events:** Weekly lectures and single dates,
//!   with explicit rules for when the two are comparable
//! - **Fail-fast Validation:** Malformed records are rejected, never
//!   silently skipped
//! - **Automatic Backups:** Timestamped backups before every write
//! - **Atomic Operations:** Safe file writes with rollback on failure
//! - **Live Updates:** Subscriptions deliver fresh snapshots on change
//!
//! # Architecture
//!
//! - **`core`:** Business logic (types, parsing, validation, conflict detection)
//! - **`store`:** Event storage (in-memory and JSON file, backups, watching)
//! - **`scheduler`:** Proposal, scheduling policy and allocation reporting
//!
//! # Examples
//!
//! ## Checking a candidate
//!
//! ```no_run
//! use timetable_manager::core::{detect_conflicts, validate_draft, EventDraft};
//! use timetable_manager::store::{EventFilter, EventStore, TimetableStore};
//!
//! let store = TimetableStore::open("/tmp/timetable.json".into())?;
//! let existing = store.list_events(&EventFilter::new())?;
//!
//! let candidate = validate_draft(EventDraft {
//!     course_id: Some("CS101".into()),
//!     lecturer_id: Some("L1".into()),
//!     room_id: Some("R1".into()),
//!     department: Some("CS".into()),
//!     day_of_week: Some(2),
//!     start_time: Some("09:00".into()),
//!     end_time: Some("10:50".into()),
//!     is_recurring: true,
//!     ..Default::default()
//! })?;
//!
//! for conflict in detect_conflicts(&candidate, &existing) {
//!     println!("{}", conflict);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Scheduling with a policy
//!
//! ```no_run
//! use timetable_manager::core::EventDraft;
//! use timetable_manager::scheduler::{ConflictPolicy, Scheduler};
//! use timetable_manager::store::MemoryStore;
//!
//! let scheduler = Scheduler::new(MemoryStore::new());
//! let proposal = scheduler.schedule(EventDraft::default(), ConflictPolicy::Reject);
//! assert!(proposal.is_err());
//! ```

pub mod core;
pub mod scheduler;
pub mod store;

pub use core::{
    detect_conflicts, sweep_conflicts, Conflict, ConflictType, EventDraft, ScheduleEvent,
};
pub use scheduler::{unallocated_courses, ConflictPolicy, Scheduler, SchedulingError};
pub use store::{EventFilter, EventStore, MemoryStore, StoreError, TimetableStore};
