//! Timetable conflict detection
//!
//! Two events collide when they are temporally comparable (same weekday or
//! same date, see [`temporally_comparable`]) and their time ranges overlap.
//! Each collision is classified along three independent dimensions:
//!
//! - **Lecturer**: the same lecturer is booked twice
//! - **Room**: the same room is booked twice
//! - **Course**: the same department's students are booked twice
//!
//! A single overlapping pair yields one conflict per matching dimension.
//! The department check is deliberately coarse: it compares the
//! denormalised department string, not individual student enrolment, and
//! it does not look at `is_cross_cutting`.
//!
//! Results are advisory. Nothing here guards against a concurrent write
//! landing between detection and persistence.
//!
//! # Performance
//! - Candidate check: O(n) over the existing events
//! - Global sweep: O(n²) pairwise, fine for department-sized timetables

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::core::types::{Occurrence, ScheduleEvent};

/// The dimension along which two events collide.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictType {
    Lecturer,
    Room,
    /// Same department; covers same-course clashes too
    Course,
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictType::Lecturer => write!(f, "lecturer"),
            ConflictType::Room => write!(f, "room"),
            ConflictType::Course => write!(f, "course"),
        }
    }
}

/// A detected collision between two events.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Conflict {
    pub conflict_type: ConflictType,

    /// Ids of the two events; the checked event comes first
    pub event_ids: (String, String),

    /// Human-readable description for presentation
    pub message: String,
}

impl Conflict {
    fn between(
        conflict_type: ConflictType,
        candidate: &ScheduleEvent,
        existing: &ScheduleEvent,
    ) -> Self {
        let message = match conflict_type {
            ConflictType::Lecturer => format!(
                "Lecturer {} is double-booked: {} overlaps {}",
                candidate.lecturer_id, candidate, existing
            ),
            ConflictType::Room => format!(
                "Room {} is double-booked: {} overlaps {}",
                candidate.room_id, candidate, existing
            ),
            ConflictType::Course => format!(
                "Department {} has overlapping sessions: {} overlaps {}",
                candidate.department, candidate, existing
            ),
        };

        Self {
            conflict_type,
            event_ids: (candidate.id.clone(), existing.id.clone()),
            message,
        }
    }

    /// Returns true if the given event takes part in this conflict.
    pub fn involves(&self, event_id: &str) -> bool {
        self.event_ids.0 == event_id || self.event_ids.1 == event_id
    }

    /// Order-independent identity: the type plus the sorted id pair.
    pub fn key(&self) -> (ConflictType, &str, &str) {
        let (a, b) = (self.event_ids.0.as_str(), self.event_ids.1.as_str());
        if a <= b {
            (self.conflict_type, a, b)
        } else {
            (self.conflict_type, b, a)
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.conflict_type, self.message)
    }
}

/// Decides whether two events can be compared on time at all.
///
/// - Both recurring: same weekday
/// - Both one-off: same date
/// - Mixed: the weekday **and** the date must both match, so the recurring
///   event needs an anchor date and the one-off event an explicit weekday
pub fn temporally_comparable(a: &ScheduleEvent, b: &ScheduleEvent) -> bool {
    match (&a.occurrence, &b.occurrence) {
        (Occurrence::Recurring { day: d1, .. }, Occurrence::Recurring { day: d2, .. }) => d1 == d2,
        (Occurrence::Once { date: d1, .. }, Occurrence::Once { date: d2, .. }) => d1 == d2,
        (Occurrence::Recurring { day, anchor }, Occurrence::Once { date, day: once_day })
        | (Occurrence::Once { date, day: once_day }, Occurrence::Recurring { day, anchor }) => {
            *once_day == Some(*day) && *anchor == Some(*date)
        }
    }
}

/// Checks a candidate event against existing events.
///
/// `existing` is expected to hold only events of the candidate's program
/// type. An existing event with the candidate's own id is skipped. Conflicts
/// are not merged: a pair sharing room and lecturer yields two entries.
///
/// # Example
/// ```
/// use timetable_manager::core::{detect_conflicts, validate_draft, EventDraft};
///
/// let lecture = |lecturer: &str, start: &str, end: &str| EventDraft {
///     course_id: Some("CS101".into()),
///     lecturer_id: Some(lecturer.into()),
///     room_id: Some("R1".into()),
///     department: Some("CS".into()),
///     day_of_week: Some(1),
///     start_time: Some(start.into()),
///     end_time: Some(end.into()),
///     is_recurring: true,
///     ..Default::default()
/// };
///
/// let existing = vec![validate_draft(lecture("L1", "09:00", "10:00"))?];
/// let candidate = validate_draft(lecture("L2", "10:00", "11:00"))?;
///
/// // Touching boundaries never collide
/// assert!(detect_conflicts(&candidate, &existing).is_empty());
/// # Ok::<(), timetable_manager::core::ValidationError>(())
/// ```
pub fn detect_conflicts(candidate: &ScheduleEvent, existing: &[ScheduleEvent]) -> Vec<Conflict> {
    collisions(candidate, existing)
}

fn collisions<'a, I>(candidate: &ScheduleEvent, existing: I) -> Vec<Conflict>
where
    I: IntoIterator<Item = &'a ScheduleEvent>,
{
    let mut conflicts = Vec::new();

    for other in existing {
        if other.id == candidate.id {
            continue;
        }

        if !temporally_comparable(candidate, other) || !candidate.time.overlaps(&other.time) {
            continue;
        }

        if candidate.lecturer_id == other.lecturer_id {
            conflicts.push(Conflict::between(ConflictType::Lecturer, candidate, other));
        }
        if candidate.room_id == other.room_id {
            conflicts.push(Conflict::between(ConflictType::Room, candidate, other));
        }
        if candidate.department == other.department {
            conflicts.push(Conflict::between(ConflictType::Course, candidate, other));
        }
    }

    conflicts
}

/// Scans a whole event set pairwise and returns each collision once.
///
/// Events are only compared within the same program type. Duplicates are
/// removed by `(type, sorted id pair)`, so (A, B) and (B, A) count once.
pub fn sweep_conflicts(events: &[ScheduleEvent]) -> Vec<Conflict> {
    let mut seen = HashSet::new();
    let mut conflicts = Vec::new();

    for event in events {
        let peers = events
            .iter()
            .filter(|other| other.program_type == event.program_type);

        for conflict in collisions(event, peers) {
            let (conflict_type, a, b) = conflict.key();
            if seen.insert((conflict_type, a.to_string(), b.to_string())) {
                conflicts.push(conflict);
            }
        }
    }

    tracing::debug!(events = events.len(), conflicts = conflicts.len(), "conflict sweep finished");

    conflicts
}

/// Per-dimension conflict counts for dashboards.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ConflictSummary {
    pub lecturer: usize,
    pub room: usize,
    pub course: usize,
}

impl ConflictSummary {
    pub fn from_conflicts(conflicts: &[Conflict]) -> Self {
        conflicts.iter().fold(Self::default(), |mut summary, conflict| {
            match conflict.conflict_type {
                ConflictType::Lecturer => summary.lecturer += 1,
                ConflictType::Room => summary.room += 1,
                ConflictType::Course => summary.course += 1,
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.lecturer + self.room + self.course
    }
}

impl fmt::Display for ConflictSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lecturer, {} room, {} course ({} total)",
            self.lecturer,
            self.room,
            self.course,
            self.total()
        )
    }
}

/// Tracks a timetable snapshot and answers conflict queries against it.
pub struct ConflictDetector {
    events: Vec<ScheduleEvent>,
}

impl ConflictDetector {
    /// Creates a new empty conflict detector.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Builds a detector over an existing snapshot.
    pub fn from_events(events: Vec<ScheduleEvent>) -> Self {
        Self { events }
    }

    /// Adds an event to the tracked snapshot.
    pub fn add_event(&mut self, event: ScheduleEvent) {
        self.events.push(event);
    }

    /// Finds every conflict in the snapshot, each pair counted once.
    pub fn find_conflicts(&self) -> Vec<Conflict> {
        sweep_conflicts(&self.events)
    }

    /// Checks a proposed event against tracked events of its program type.
    pub fn conflicts_for(&self, candidate: &ScheduleEvent) -> Vec<Conflict> {
        let peers = self
            .events
            .iter()
            .filter(|event| event.program_type == candidate.program_type);

        collisions(candidate, peers)
    }

    /// Returns true if the tracked event with this id collides with another.
    pub fn has_conflict(&self, event_id: &str) -> bool {
        self.events
            .iter()
            .find(|event| event.id == event_id)
            .map(|event| !self.conflicts_for(event).is_empty())
            .unwrap_or(false)
    }

    /// Per-dimension counts over the whole snapshot.
    pub fn summary(&self) -> ConflictSummary {
        ConflictSummary::from_conflicts(&self.find_conflicts())
    }

    /// Returns the total number of events tracked.
    pub fn total_events(&self) -> usize {
        self.events.len()
    }
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new()
    }
}
