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

//! src/core/mod.rs
//!
//! Core business logic module
//!
//! This module contains the fundamental data structures and algorithms
//! for timetable management, including:
//! - Type definitions for events, occurrences and time ranges
//! - Pairwise conflict detection (lecturer, room, department)
//! - Fail-fast validation of loosely-typed event records
//! - Strict time and date parsing
//!
//! All business logic is isolated from storage and presentation concerns
//! and operates on snapshots passed in by the caller.

pub mod conflict;
pub mod parser;
pub mod types;
pub mod validator;

pub use conflict::{
    detect_conflicts, sweep_conflicts, temporally_comparable, Conflict, ConflictDetector,
    ConflictSummary, ConflictType,
};
pub use types::*;
pub use validator::{validate_draft, validate_within_semester, ValidationError};

#[cfg(test)]
mod tests;
