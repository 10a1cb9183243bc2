//! Data models for the bug tracker.
//!
//! This module contains the record vocabulary:
//! - `BugId` and filename slugs
//! - `Status`, `Severity`, `Resolution`
//! - `SectionName` (fixed body headings)
//! - `Attempt` (entries under Attempted Fixes)
//! - `BugSummary` (query rows)

pub mod bug;

pub use bug::{
    slugify, Attempt, BugId, BugSummary, Resolution, SectionName, Severity, Status,
    ATTEMPT_MARKER, ID_PREFIX, SLUG_MAX_LEN,
};
