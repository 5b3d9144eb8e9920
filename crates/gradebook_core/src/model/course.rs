//! Course domain model.
//!
//! # Responsibility
//! - Define the persisted course record and the draft callers submit.
//! - Validate caller input before it reaches persistence.
//!
//! # Invariants
//! - `id` and `created_at` are assigned by storage and never mutated.
//! - `gpa` is derived from `final_score`; a draft carries no `gpa` field.
//! - `exam_scores` is opaque text and is never parsed.

use crate::grading::grade_point;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned course identifier.
pub type CourseId = i64;

/// Upper bound on `name` length, in characters.
pub const NAME_MAX_CHARS: usize = 100;
/// Upper bound on `exam_scores` length, in characters.
pub const EXAM_SCORES_MAX_CHARS: usize = 200;

/// Persisted course record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    /// Caller-serialized exam breakdown, stored verbatim.
    pub exam_scores: String,
    pub regular_score: f64,
    pub final_score: f64,
    pub gpa: f64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Caller-supplied course fields for create and full-replace update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDraft {
    pub name: String,
    pub exam_scores: String,
    pub regular_score: f64,
    pub final_score: f64,
}

/// Validation failures for course input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseValidationError {
    /// A required field was absent or null.
    MissingField(&'static str),
    /// `name` is empty after trimming.
    EmptyName,
    /// A text field exceeds its character limit.
    TooLong { field: &'static str, max_chars: usize },
    /// A score is NaN or infinite.
    NonFiniteScore(&'static str),
}

impl Display for CourseValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::EmptyName => write!(f, "course name cannot be empty"),
            Self::TooLong { field, max_chars } => {
                write!(f, "`{field}` exceeds {max_chars} characters")
            }
            Self::NonFiniteScore(field) => write!(f, "`{field}` must be a finite number"),
        }
    }
}

impl Error for CourseValidationError {}

impl CourseDraft {
    pub fn new(
        name: impl Into<String>,
        exam_scores: impl Into<String>,
        regular_score: f64,
        final_score: f64,
    ) -> Self {
        Self {
            name: name.into(),
            exam_scores: exam_scores.into(),
            regular_score,
            final_score,
        }
    }

    /// Grade point derived from `final_score`.
    pub fn gpa(&self) -> f64 {
        grade_point(self.final_score)
    }

    /// Validates draft invariants.
    ///
    /// # Errors
    /// - `EmptyName` when `name` is blank.
    /// - `TooLong` when `name` or `exam_scores` exceed their limits.
    /// - `NonFiniteScore` when either score is NaN or infinite.
    pub fn validate(&self) -> Result<(), CourseValidationError> {
        if self.name.trim().is_empty() {
            return Err(CourseValidationError::EmptyName);
        }
        if self.name.chars().count() > NAME_MAX_CHARS {
            return Err(CourseValidationError::TooLong {
                field: "name",
                max_chars: NAME_MAX_CHARS,
            });
        }
        if self.exam_scores.chars().count() > EXAM_SCORES_MAX_CHARS {
            return Err(CourseValidationError::TooLong {
                field: "exam_scores",
                max_chars: EXAM_SCORES_MAX_CHARS,
            });
        }
        if !self.regular_score.is_finite() {
            return Err(CourseValidationError::NonFiniteScore("regular_score"));
        }
        if !self.final_score.is_finite() {
            return Err(CourseValidationError::NonFiniteScore("final_score"));
        }
        Ok(())
    }
}

impl Course {
    /// Whether the stored `gpa` still agrees with `final_score`.
    pub fn gpa_is_consistent(&self) -> bool {
        self.gpa == grade_point(self.final_score)
    }
}
