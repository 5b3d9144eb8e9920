//! Course record domain model.
//!
//! # Responsibility
//! - Define the canonical course record and its caller-supplied draft.
//! - Keep grade-point derivation attached to the draft, never to caller input.
//!
//! # Invariants
//! - Every persisted course is identified by a storage-assigned `CourseId`.
//! - `gpa` is always `grade_point(final_score)`.

pub mod course;
