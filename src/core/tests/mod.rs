//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Conflict detection tests
//! - Validation tests
//! - Parser tests
//! - Type tests (DayOfWeek, TimeRange, Occurrence, etc.)

#[cfg(test)]
mod types_tests;
