//! Lecture scheduling on top of an [`EventStore`].
//!
//! The scheduler ties validation, conflict detection and persistence
//! together:
//!
//! 1. A draft is validated and checked against the semester
//! 2. Existing events of the same program type are fetched as a snapshot
//! 3. The candidate is checked against that snapshot
//! 4. Depending on the [`ConflictPolicy`], the event is stored or refused
//!
//! Conflict checks are advisory. There is no check-then-write guarantee:
//! another writer may store a clashing event between steps 2 and 4.

use thiserror::Error;

use crate::core::{
    detect_conflicts, sweep_conflicts, validate_draft, validate_within_semester, Conflict,
    ConflictSummary, Course, EventDraft, ScheduleEvent, ValidationError,
};
use crate::store::{EventFilter, EventStore, StoreError};

/// Errors raised while scheduling
#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The proposal collides with existing events and the policy refuses it
    #[error("{} conflict(s) with the existing timetable", .0.len())]
    Conflicts(Vec<Conflict>),
}

/// What to do when a proposed event has conflicts.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ConflictPolicy {
    /// Refuse to store the event
    #[default]
    Reject,
    /// Store it anyway and report the conflicts
    Warn,
}

/// A validated candidate and the conflicts it would introduce.
#[derive(Clone, Debug, PartialEq)]
pub struct Proposal {
    pub event: ScheduleEvent,
    pub conflicts: Vec<Conflict>,
}

impl Proposal {
    pub fn is_clear(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Schedules and removes lectures against a store.
pub struct Scheduler<S> {
    store: S,
}

impl<S: EventStore> Scheduler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates a draft and checks it against the current timetable.
    ///
    /// Nothing is written.
    pub fn propose(&self, draft: EventDraft) -> Result<Proposal, SchedulingError> {
        let event = validate_draft(draft)?;
        if let Some(semester) = self.store.semester()? {
            validate_within_semester(&event, &semester)?;
        }

        let existing = self
            .store
            .list_events(&EventFilter::new().program_type(event.program_type))?;
        let conflicts = detect_conflicts(&event, &existing);

        tracing::debug!(
            id = %event.id,
            compared = existing.len(),
            conflicts = conflicts.len(),
            "proposal checked"
        );

        Ok(Proposal { event, conflicts })
    }

    /// Proposes and, if the policy allows, stores the event.
    ///
    /// With [`ConflictPolicy::Warn`] the returned proposal still lists the
    /// conflicts so they can be shown to the user.
    pub fn schedule(
        &self,
        draft: EventDraft,
        policy: ConflictPolicy,
    ) -> Result<Proposal, SchedulingError> {
        let proposal = self.propose(draft)?;

        if !proposal.is_clear() {
            match policy {
                ConflictPolicy::Reject => {
                    tracing::info!(
                        course = %proposal.event.course_id,
                        conflicts = proposal.conflicts.len(),
                        "scheduling refused"
                    );
                    return Err(SchedulingError::Conflicts(proposal.conflicts));
                }
                ConflictPolicy::Warn => {
                    tracing::warn!(
                        course = %proposal.event.course_id,
                        conflicts = proposal.conflicts.len(),
                        "scheduling despite conflicts"
                    );
                }
            }
        }

        self.store.insert_event(proposal.event.clone())?;
        Ok(proposal)
    }

    /// Removes an event. Its course becomes unscheduled unless other
    /// events still reference it.
    pub fn remove(&self, id: &str) -> Result<ScheduleEvent, SchedulingError> {
        let removed = self.store.remove_event(id)?;
        tracing::info!(id, course = %removed.course_id, "lecture unscheduled");
        Ok(removed)
    }

    /// Runs the global sweep over the filtered timetable.
    pub fn conflicts(&self, filter: &EventFilter) -> Result<Vec<Conflict>, SchedulingError> {
        let events = self.store.list_events(filter)?;
        Ok(sweep_conflicts(&events))
    }

    /// Per-dimension collision counts over the filtered timetable.
    pub fn collision_summary(
        &self,
        filter: &EventFilter,
    ) -> Result<ConflictSummary, SchedulingError> {
        Ok(ConflictSummary::from_conflicts(&self.conflicts(filter)?))
    }
}

/// Courses that have no event scheduled yet.
///
/// A cross-cutting course is allocated once any event references it. A
/// regular course additionally needs the event to be in its own department.
pub fn unallocated_courses<'a>(courses: &'a [Course], events: &[ScheduleEvent]) -> Vec<&'a Course> {
    courses
        .iter()
        .filter(|course| {
            !events.iter().any(|event| {
                event.course_id == course.id
                    && (course.is_cross_cutting || event.department == course.department)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ConflictType, ProgramType, Semester};
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    /// Helper to create a recurring Tuesday draft
    fn draft(lecturer: &str, room: &str, dept: &str, start: &str, end: &str) -> EventDraft {
        EventDraft {
            course_id: Some(format!("{}101", dept)),
            lecturer_id: Some(lecturer.to_string()),
            room_id: Some(room.to_string()),
            department: Some(dept.to_string()),
            day_of_week: Some(2),
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
            is_recurring: true,
            ..Default::default()
        }
    }

    fn course(id: &str, dept: &str, cross_cutting: bool) -> Course {
        Course {
            id: id.to_string(),
            code: id.to_uppercase(),
            title: None,
            department: dept.to_string(),
            is_cross_cutting: cross_cutting,
            program_type: ProgramType::Day,
        }
    }

    #[test]
    fn test_propose_does_not_persist() {
        let scheduler = Scheduler::new(MemoryStore::new());

        let proposal = scheduler.propose(draft("L1", "R1", "CS", "09:00", "10:00")).unwrap();
        assert!(proposal.is_clear());
        assert!(scheduler.store().list_events(&EventFilter::new()).unwrap().is_empty());
    }

    #[test]
    fn test_schedule_clear_event() {
        let scheduler = Scheduler::new(MemoryStore::new());

        let proposal = scheduler
            .schedule(draft("L1", "R1", "CS", "09:00", "10:00"), ConflictPolicy::Reject)
            .unwrap();

        let stored = scheduler.store().list_events(&EventFilter::new()).unwrap();
        assert_eq!(stored, vec![proposal.event]);
    }

    #[test]
    fn test_reject_policy_refuses_conflicts() {
        let scheduler = Scheduler::new(MemoryStore::new());
        scheduler
            .schedule(draft("L1", "R1", "CS", "09:00", "10:50"), ConflictPolicy::Reject)
            .unwrap();

        let result =
            scheduler.schedule(draft("L1", "R2", "CS", "10:00", "11:50"), ConflictPolicy::Reject);

        match result {
            Err(SchedulingError::Conflicts(conflicts)) => {
                assert_eq!(conflicts.len(), 2);
                assert!(conflicts.iter().any(|c| c.conflict_type == ConflictType::Lecturer));
                assert!(conflicts.iter().any(|c| c.conflict_type == ConflictType::Course));
            }
            other => panic!("Expected Conflicts error, got: {:?}", other),
        }
        assert_eq!(scheduler.store().list_events(&EventFilter::new()).unwrap().len(), 1);
    }

    #[test]
    fn test_warn_policy_stores_and_reports() {
        let scheduler = Scheduler::new(MemoryStore::new());
        scheduler
            .schedule(draft("L1", "R1", "CS", "09:00", "10:00"), ConflictPolicy::Warn)
            .unwrap();

        let proposal = scheduler
            .schedule(draft("L2", "R1", "EE", "09:30", "10:30"), ConflictPolicy::Warn)
            .unwrap();

        assert_eq!(proposal.conflicts.len(), 1);
        assert_eq!(proposal.conflicts[0].conflict_type, ConflictType::Room);
        assert_eq!(scheduler.store().list_events(&EventFilter::new()).unwrap().len(), 2);
        assert_eq!(scheduler.collision_summary(&EventFilter::new()).unwrap().room, 1);
    }

    #[test]
    fn test_other_program_type_is_ignored() {
        let scheduler = Scheduler::new(MemoryStore::new());
        scheduler
            .schedule(draft("L1", "R1", "CS", "18:00", "20:00"), ConflictPolicy::Reject)
            .unwrap();

        let mut evening = draft("L1", "R1", "CS", "18:00", "20:00");
        evening.program_type = Some(ProgramType::Evening);

        assert!(scheduler.schedule(evening, ConflictPolicy::Reject).is_ok());
    }

    #[test]
    fn test_semester_enforced_on_proposal() {
        let store = MemoryStore::new();
        store
            .set_semester(
                Semester::new(
                    NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
                    NaiveDate::from_ymd_opt(2025, 6, 27).unwrap(),
                )
                .unwrap(),
            )
            .unwrap();
        let scheduler = Scheduler::new(store);

        let mut outside = draft("L1", "R1", "CS", "09:00", "10:00");
        outside.is_recurring = false;
        outside.day_of_week = None;
        outside.event_date = Some("2025-08-01".to_string());

        assert!(matches!(
            scheduler.propose(outside),
            Err(SchedulingError::Validation(ValidationError::OutsideSemester { .. }))
        ));
    }

    #[test]
    fn test_malformed_draft_fails_fast() {
        let scheduler = Scheduler::new(MemoryStore::new());
        let mut broken = draft("L1", "R1", "CS", "09:00", "10:00");
        broken.is_recurring = false;

        assert!(matches!(
            scheduler.propose(broken),
            Err(SchedulingError::Validation(ValidationError::MissingField("eventDate")))
        ));
    }

    #[test]
    fn test_remove_unschedules() {
        let scheduler = Scheduler::new(MemoryStore::new());
        let proposal = scheduler
            .schedule(draft("L1", "R1", "CS", "09:00", "10:00"), ConflictPolicy::Reject)
            .unwrap();

        let removed = scheduler.remove(&proposal.event.id).unwrap();
        assert_eq!(removed.course_id, "CS101");
        assert!(matches!(
            scheduler.remove(&proposal.event.id),
            Err(SchedulingError::Store(StoreError::EventNotFound(_)))
        ));
    }

    #[test]
    fn test_unallocated_regular_course_needs_own_department() {
        let courses = vec![course("CS101", "CS", false)];

        let mut foreign = validate_draft(draft("L1", "R1", "EE", "09:00", "10:00")).unwrap();
        foreign.course_id = "CS101".to_string();
        assert_eq!(unallocated_courses(&courses, &[foreign]).len(), 1);

        let own = validate_draft(draft("L1", "R1", "CS", "09:00", "10:00")).unwrap();
        assert!(unallocated_courses(&courses, &[own]).is_empty());
    }

    #[test]
    fn test_unallocated_cross_cutting_course_any_department() {
        let courses = vec![course("GEN100", "GEN", true), course("CS101", "CS", false)];

        let mut shared = validate_draft(draft("L1", "R1", "EE", "09:00", "10:00")).unwrap();
        shared.course_id = "GEN100".to_string();

        let unallocated = unallocated_courses(&courses, &[shared]);
        assert_eq!(unallocated.len(), 1);
        assert_eq!(unallocated[0].id, "CS101");
    }
}
