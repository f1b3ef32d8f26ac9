//! Store module tests
//!
//! Contains test suites for event storage:
//! - File store tests (open, init, events, courses, backups)
//! - Transaction tests (commit, rollback, backups)
//! - Memory store tests (filters, subscriptions)
//! - Watcher tests (live change notification)

#[cfg(test)]
mod transaction_tests;

use crate::core::{EventDraft, ScheduleEvent};

/// Helper to create a draft for a recurring Tuesday lecture
pub(super) fn lecture_draft(
    id: Option<&str>,
    lecturer: &str,
    room: &str,
    start: &str,
    end: &str,
) -> EventDraft {
    EventDraft {
        id: id.map(str::to_string),
        course_id: Some("CS101".to_string()),
        lecturer_id: Some(lecturer.to_string()),
        room_id: Some(room.to_string()),
        department: Some("CS".to_string()),
        day_of_week: Some(2),
        start_time: Some(start.to_string()),
        end_time: Some(end.to_string()),
        is_recurring: true,
        ..Default::default()
    }
}

pub(super) fn lecture(
    id: &str,
    lecturer: &str,
    room: &str,
    start: &str,
    end: &str,
) -> ScheduleEvent {
    ScheduleEvent::try_from(lecture_draft(Some(id), lecturer, room, start, end)).unwrap()
}
