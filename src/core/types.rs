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

//! src/core/types.rs
//!
//! Core type definitions for timetable management
//!
//! This module defines the fundamental types used throughout the application:
//! - `DayOfWeek`: Weekday number, Monday = 1 through Sunday = 7
//! - `ClockTime` / `TimeRange`: Wall-clock times and half-open time ranges
//! - `Occurrence`: When an event happens (weekly recurring or a single date)
//! - `ScheduleEvent`: A validated, scheduled lecture
//! - `EventDraft`: The loosely-typed record as stored and as entered by users
//! - `Course` / `Semester`: Supporting records for allocation and date checks
//!
//! `ScheduleEvent` serialises through `EventDraft`, so every event read back
//! from a store passes the same validation as a freshly entered one.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::validator::ValidationError;

/// Day of the week, Monday = 1 through Sunday = 7.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const MONDAY: DayOfWeek = DayOfWeek(1);
    pub const TUESDAY: DayOfWeek = DayOfWeek(2);
    pub const WEDNESDAY: DayOfWeek = DayOfWeek(3);
    pub const THURSDAY: DayOfWeek = DayOfWeek(4);
    pub const FRIDAY: DayOfWeek = DayOfWeek(5);
    pub const SATURDAY: DayOfWeek = DayOfWeek(6);
    pub const SUNDAY: DayOfWeek = DayOfWeek(7);

    /// Creates a day from its number, returning `None` outside 1-7.
    pub fn new(number: u8) -> Option<Self> {
        (1..=7).contains(&number).then_some(Self(number))
    }

    /// The weekday a calendar date falls on.
    pub fn of_date(date: NaiveDate) -> Self {
        Self(date.weekday().number_from_monday() as u8)
    }

    pub fn number(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = ValidationError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::new(number).ok_or(ValidationError::InvalidDayOfWeek(number))
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            1 => "Monday",
            2 => "Tuesday",
            3 => "Wednesday",
            4 => "Thursday",
            5 => "Friday",
            6 => "Saturday",
            _ => "Sunday",
        };
        write!(f, "{}", name)
    }
}

/// A wall-clock time stored as minutes since midnight.
///
/// Only times within a single day exist (00:00 to 23:59).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ClockTime(u16);

impl ClockTime {
    /// Builds a time from hours and minutes, `None` when out of range.
    pub fn from_hm(hours: u16, minutes: u16) -> Option<Self> {
        (hours < 24 && minutes < 60).then_some(Self(hours * 60 + minutes))
    }

    pub fn minutes_since_midnight(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// A half-open time range `[start, end)` within one day.
///
/// The constructor guarantees `end > start`; overnight ranges are rejected.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TimeRange {
    start: ClockTime,
    end: ClockTime,
}

impl TimeRange {
    pub fn new(start: ClockTime, end: ClockTime) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::EmptyTimeRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> ClockTime {
        self.start
    }

    pub fn end(&self) -> ClockTime {
        self.end
    }

    /// Returns true when the two ranges share at least one minute.
    ///
    /// A range ending at 10:00 does not overlap one starting at 10:00.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// When an event takes place.
///
/// Recurring events repeat weekly for the whole semester and may carry an
/// anchor date. One-off events happen on exactly one date and may carry the
/// weekday explicitly.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Occurrence {
    Recurring {
        day: DayOfWeek,
        anchor: Option<NaiveDate>,
    },
    Once {
        date: NaiveDate,
        day: Option<DayOfWeek>,
    },
}

impl Occurrence {
    pub fn is_recurring(&self) -> bool {
        matches!(self, Occurrence::Recurring { .. })
    }

    /// The weekday field as recorded on the event, if any.
    pub fn day_of_week(&self) -> Option<DayOfWeek> {
        match self {
            Occurrence::Recurring { day, .. } => Some(*day),
            Occurrence::Once { day, .. } => *day,
        }
    }

    /// The date field as recorded on the event, if any.
    pub fn event_date(&self) -> Option<NaiveDate> {
        match self {
            Occurrence::Recurring { anchor, .. } => *anchor,
            Occurrence::Once { date, .. } => Some(*date),
        }
    }
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occurrence::Recurring { day, .. } => write!(f, "every {}", day),
            Occurrence::Once { date, .. } => write!(f, "on {}", date.format("%Y-%m-%d")),
        }
    }
}

/// Teaching session classification. Descriptive only.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum SessionType {
    /// Lecture hour
    #[default]
    #[serde(rename = "LH")]
    Lecture,
    /// Practical hour
    #[serde(rename = "PH")]
    Practical,
    /// Tutorial hour
    #[serde(rename = "TH")]
    Tutorial,
    /// Clinical hour
    #[serde(rename = "CH")]
    Clinical,
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionType::Lecture => write!(f, "LH"),
            SessionType::Practical => write!(f, "PH"),
            SessionType::Tutorial => write!(f, "TH"),
            SessionType::Clinical => write!(f, "CH"),
        }
    }
}

/// Study programme slot. Events of different program types never conflict.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramType {
    #[default]
    Day,
    Evening,
}

impl fmt::Display for ProgramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramType::Day => write!(f, "day"),
            ProgramType::Evening => write!(f, "evening"),
        }
    }
}

/// A validated lecture on the timetable.
///
/// Construct one from an [`EventDraft`] with `ScheduleEvent::try_from`
/// or [`crate::core::validator::validate_draft`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "EventDraft", into = "EventDraft")]
pub struct ScheduleEvent {
    pub id: String,
    pub course_id: String,
    pub lecturer_id: String,
    pub room_id: String,

    /// Denormalised department of the students attending
    pub department: String,

    pub occurrence: Occurrence,
    pub time: TimeRange,

    /// Shared across several programmes or departments
    pub is_cross_cutting: bool,

    pub session_type: SessionType,
    pub program_type: ProgramType,
}

impl ScheduleEvent {
    pub fn is_recurring(&self) -> bool {
        self.occurrence.is_recurring()
    }
}

impl fmt::Display for ScheduleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {} {} in {} with {}",
            self.course_id,
            self.session_type,
            self.occurrence,
            self.time,
            self.room_id,
            self.lecturer_id
        )
    }
}

/// The loosely-typed event record.
///
/// This is the shape events take on disk and when entered by a user:
/// every field is optional and times and dates are plain strings.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub course_id: Option<String>,
    pub lecturer_id: Option<String>,
    pub room_id: Option<String>,
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_recurring: bool,
    pub is_cross_cutting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_type: Option<SessionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_type: Option<ProgramType>,
}

impl From<ScheduleEvent> for EventDraft {
    fn from(event: ScheduleEvent) -> Self {
        Self {
            id: Some(event.id),
            course_id: Some(event.course_id),
            lecturer_id: Some(event.lecturer_id),
            room_id: Some(event.room_id),
            department: Some(event.department),
            day_of_week: event.occurrence.day_of_week().map(DayOfWeek::number),
            event_date: event
                .occurrence
                .event_date()
                .map(|date| date.format("%Y-%m-%d").to_string()),
            start_time: Some(event.time.start().to_string()),
            end_time: Some(event.time.end().to_string()),
            is_recurring: event.occurrence.is_recurring(),
            is_cross_cutting: event.is_cross_cutting,
            session_type: Some(event.session_type),
            program_type: Some(event.program_type),
        }
    }
}

/// A course unit that can be allocated to timetable slots.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub department: String,
    #[serde(default)]
    pub is_cross_cutting: bool,
    #[serde(default)]
    pub program_type: ProgramType,
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)?;
        if let Some(title) = &self.title {
            write!(f, " {}", title)?;
        }
        write!(f, " [{}]", self.department)
    }
}

/// Inclusive date range of the teaching semester.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Semester {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Semester {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvalidSemester { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start.format("%Y-%m-%d"), self.end.format("%Y-%m-%d"))
    }
}
