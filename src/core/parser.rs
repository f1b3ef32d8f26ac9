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

//! src/core/parser.rs
//!
//! Parsers for the textual fields of an event record
//!
//! Handles:
//! - Clock times in strict `HH:MM` 24-hour form
//! - Time ranges written as `HH:MM-HH:MM`
//! - ISO calendar dates (`YYYY-MM-DD`)
//! - Weekdays given as a number (1-7) or an English name
//!
//! Time parsing uses nom combinators; a parse only succeeds when the whole
//! input is consumed, so `9:00` or `09:00am` are rejected rather than
//! partially read.

use chrono::NaiveDate;
use nom::{
    bytes::complete::take_while_m_n,
    character::complete::{char, space0},
    combinator::{all_consuming, map_opt, map_res},
    IResult, Parser,
};
use thiserror::Error;

use crate::core::types::{ClockTime, DayOfWeek};

/// Parse errors carrying the offending input
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Invalid time '{0}': expected HH:MM (00:00-23:59)")]
    InvalidTime(String),

    #[error("Invalid time range '{0}': expected HH:MM-HH:MM")]
    InvalidTimeRange(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid day '{0}': expected 1-7 or a weekday name")]
    InvalidDay(String),
}

/// Parses exactly two ASCII digits.
fn two_digits(input: &str) -> IResult<&str, u16> {
    map_res(
        take_while_m_n(2, 2, |c: char| c.is_ascii_digit()),
        |digits: &str| digits.parse::<u16>(),
    )
    .parse(input)
}

/// Parses an `HH:MM` clock time, leaving any trailing input.
pub fn parse_clock_time(input: &str) -> IResult<&str, ClockTime> {
    map_opt((two_digits, char(':'), two_digits), |(hours, _, minutes)| {
        ClockTime::from_hm(hours, minutes)
    })
    .parse(input)
}

/// Parses `HH:MM-HH:MM`, allowing spaces around the dash.
pub fn parse_time_range(input: &str) -> IResult<&str, (ClockTime, ClockTime)> {
    let (input, (start, _, _, _, end)) =
        (parse_clock_time, space0, char('-'), space0, parse_clock_time).parse(input)?;
    Ok((input, (start, end)))
}

/// Parses a complete clock time string.
///
/// # Example
/// ```
/// use timetable_manager::core::parser::clock_time;
///
/// let time = clock_time("09:30").unwrap();
/// assert_eq!(time.minutes_since_midnight(), 570);
/// assert!(clock_time("9:30").is_err());
/// ```
pub fn clock_time(input: &str) -> Result<ClockTime, ParseError> {
    all_consuming(parse_clock_time)
        .parse(input.trim())
        .map(|(_, time)| time)
        .map_err(|_| ParseError::InvalidTime(input.to_string()))
}

/// Parses a complete `HH:MM-HH:MM` string.
///
/// Ordering of the two times is not checked here; `TimeRange::new` does that.
pub fn time_range(input: &str) -> Result<(ClockTime, ClockTime), ParseError> {
    all_consuming(parse_time_range)
        .parse(input.trim())
        .map(|(_, range)| range)
        .map_err(|_| ParseError::InvalidTimeRange(input.to_string()))
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn date(input: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| ParseError::InvalidDate(input.to_string()))
}

/// Parses a weekday given as `1`-`7` or a (possibly abbreviated) name.
pub fn day_of_week(input: &str) -> Result<DayOfWeek, ParseError> {
    let normalised = input.trim().to_lowercase();

    if let Ok(number) = normalised.parse::<u8>() {
        return DayOfWeek::new(number).ok_or_else(|| ParseError::InvalidDay(input.to_string()));
    }

    let day = match normalised.as_str() {
        "mon" | "monday" => DayOfWeek::MONDAY,
        "tue" | "tues" | "tuesday" => DayOfWeek::TUESDAY,
        "wed" | "wednesday" => DayOfWeek::WEDNESDAY,
        "thu" | "thurs" | "thursday" => DayOfWeek::THURSDAY,
        "fri" | "friday" => DayOfWeek::FRIDAY,
        "sat" | "saturday" => DayOfWeek::SATURDAY,
        "sun" | "sunday" => DayOfWeek::SUNDAY,
        _ => return Err(ParseError::InvalidDay(input.to_string())),
    };

    Ok(day)
}
