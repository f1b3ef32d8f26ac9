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

//! Event record validation
//!
//! Turns a loosely-typed [`EventDraft`] into a [`ScheduleEvent`] or fails
//! fast. Nothing malformed ever reaches the conflict detector:
//! - Missing references (course, lecturer, room, department)
//! - Missing or malformed `HH:MM` times, or `end <= start`
//! - Weekday outside 1-7
//! - A recurring event without a weekday
//! - A one-off event without a date, or with a weekday its date does not fall on
//! - Dates outside the current semester

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::core::parser::{self, ParseError};
use crate::core::types::{
    DayOfWeek, EventDraft, Occurrence, ScheduleEvent, Semester, TimeRange,
};

/// Validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is absent or blank
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    /// Weekday number outside 1-7
    #[error("Invalid day of week {0}: expected 1 (Monday) to 7 (Sunday)")]
    InvalidDayOfWeek(u8),

    /// End time is not strictly after start time
    #[error("End time {end} must be after start time {start}")]
    EmptyTimeRange { start: String, end: String },

    /// Malformed time or date string
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Event date falls outside the semester
    #[error("Date {date} is outside the semester ({start} to {end})")]
    OutsideSemester {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// A one-off event's weekday disagrees with its date
    #[error("Day of week {day} does not match date {date}, which is a {actual}")]
    WeekdayMismatch {
        date: NaiveDate,
        day: DayOfWeek,
        actual: DayOfWeek,
    },

    /// Semester ends before it starts
    #[error("Semester end {end} is before its start {start}")]
    InvalidSemester { start: NaiveDate, end: NaiveDate },
}

/// Returns the trimmed value of a required text field.
fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

impl TryFrom<EventDraft> for ScheduleEvent {
    type Error = ValidationError;

    fn try_from(draft: EventDraft) -> Result<Self, Self::Error> {
        let id = required(draft.id, "id")?;
        let course_id = required(draft.course_id, "courseId")?;
        let lecturer_id = required(draft.lecturer_id, "lecturerId")?;
        let room_id = required(draft.room_id, "roomId")?;
        let department = required(draft.department, "department")?;

        let start = parser::clock_time(&required(draft.start_time, "startTime")?)?;
        let end = parser::clock_time(&required(draft.end_time, "endTime")?)?;
        let time = TimeRange::new(start, end)?;

        let day = draft.day_of_week.map(DayOfWeek::try_from).transpose()?;
        let date = draft
            .event_date
            .filter(|date| !date.trim().is_empty())
            .map(|date| parser::date(&date))
            .transpose()?;

        let occurrence = if draft.is_recurring {
            Occurrence::Recurring {
                day: day.ok_or(ValidationError::MissingField("dayOfWeek"))?,
                anchor: date,
            }
        } else {
            let date = date.ok_or(ValidationError::MissingField("eventDate"))?;
            let actual = DayOfWeek::of_date(date);
            if let Some(day) = day.filter(|day| *day != actual) {
                return Err(ValidationError::WeekdayMismatch { date, day, actual });
            }
            Occurrence::Once { date, day }
        };

        Ok(ScheduleEvent {
            id,
            course_id,
            lecturer_id,
            room_id,
            department,
            occurrence,
            time,
            is_cross_cutting: draft.is_cross_cutting,
            session_type: draft.session_type.unwrap_or_default(),
            program_type: draft.program_type.unwrap_or_default(),
        })
    }
}

/// Validates a user-entered draft, assigning a fresh id when it has none.
///
/// # Example
/// ```
/// use timetable_manager::core::{validate_draft, EventDraft};
///
/// let draft = EventDraft {
///     course_id: Some("CS101".into()),
///     lecturer_id: Some("L1".into()),
///     room_id: Some("R1".into()),
///     department: Some("CS".into()),
///     day_of_week: Some(2),
///     start_time: Some("09:00".into()),
///     end_time: Some("10:50".into()),
///     is_recurring: true,
///     ..Default::default()
/// };
///
/// let event = validate_draft(draft)?;
/// assert!(!event.id.is_empty());
/// # Ok::<(), timetable_manager::core::ValidationError>(())
/// ```
pub fn validate_draft(mut draft: EventDraft) -> Result<ScheduleEvent, ValidationError> {
    if draft.id.as_deref().is_none_or(|id| id.trim().is_empty()) {
        draft.id = Some(Uuid::new_v4().to_string());
    }
    ScheduleEvent::try_from(draft)
}

/// Checks that every date recorded on the event lies within the semester.
///
/// Recurring events without an anchor date always pass.
pub fn validate_within_semester(
    event: &ScheduleEvent,
    semester: &Semester,
) -> Result<(), ValidationError> {
    match event.occurrence.event_date() {
        Some(date) if !semester.contains(date) => Err(ValidationError::OutsideSemester {
            date,
            start: semester.start,
            end: semester.end,
        }),
        _ => Ok(()),
    }
}
