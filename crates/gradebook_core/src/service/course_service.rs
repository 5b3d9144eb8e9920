//! Course record use-case service.
//!
//! # Responsibility
//! - Provide list/create/update/delete/average entry points for callers.
//! - Translate repository failures into validation/not-found/storage errors.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Updates replace all four caller-supplied fields; `gpa` follows.
//! - `average_gpa` of an empty collection is `0.0`, never NaN.

use crate::model::course::{Course, CourseDraft, CourseId, CourseValidationError};
use crate::repo::course_repo::{CourseRepository, RepoError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for course use-cases.
#[derive(Debug)]
pub enum CourseServiceError {
    /// Caller input failed validation.
    Invalid(CourseValidationError),
    /// Target course does not exist.
    NotFound(CourseId),
    /// Persistence-layer failure.
    Storage(RepoError),
}

impl Display for CourseServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "course not found: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CourseServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<RepoError> for CourseServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Invalid(err),
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Storage(other),
        }
    }
}

impl From<CourseValidationError> for CourseServiceError {
    fn from(value: CourseValidationError) -> Self {
        Self::Invalid(value)
    }
}

pub type CourseServiceResult<T> = Result<T, CourseServiceError>;

/// Course service facade over repository implementations.
pub struct CourseService<R: CourseRepository> {
    repo: R,
}

impl<R: CourseRepository> CourseService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists every course, highest `final_score` first.
    pub fn list_courses(&self) -> CourseServiceResult<Vec<Course>> {
        let courses = self
            .repo
            .list_courses()
            .map_err(|err| log_failure("course_list", err))?;
        info!(
            "event=course_list module=service status=ok count={}",
            courses.len()
        );
        Ok(courses)
    }

    /// Gets one course by id.
    pub fn get_course(&self, id: CourseId) -> CourseServiceResult<Course> {
        self.repo
            .get_course(id)
            .map_err(|err| log_failure("course_get", err))?
            .ok_or(CourseServiceError::NotFound(id))
    }

    /// Persists a new course and returns its id.
    ///
    /// `gpa` is derived from `draft.final_score`.
    pub fn create_course(&self, draft: &CourseDraft) -> CourseServiceResult<CourseId> {
        let id = self
            .repo
            .create_course(draft)
            .map_err(|err| log_failure("course_create", err))?;
        info!(
            "event=course_create module=service status=ok course_id={id} gpa={}",
            draft.gpa()
        );
        Ok(id)
    }

    /// Replaces all mutable fields of course `id` and recomputes `gpa`.
    pub fn update_course(&self, id: CourseId, draft: &CourseDraft) -> CourseServiceResult<()> {
        self.repo
            .update_course(id, draft)
            .map_err(|err| log_failure("course_update", err))?;
        info!(
            "event=course_update module=service status=ok course_id={id} gpa={}",
            draft.gpa()
        );
        Ok(())
    }

    /// Deletes course `id`.
    pub fn delete_course(&self, id: CourseId) -> CourseServiceResult<()> {
        self.repo
            .delete_course(id)
            .map_err(|err| log_failure("course_delete", err))?;
        info!("event=course_delete module=service status=ok course_id={id}");
        Ok(())
    }

    /// Mean `gpa` across all courses, rounded half-to-even to two decimals.
    ///
    /// Returns `0.0` for an empty collection.
    pub fn average_gpa(&self) -> CourseServiceResult<f64> {
        let courses = self
            .repo
            .list_courses()
            .map_err(|err| log_failure("gpa_average", err))?;
        let average = mean_gpa(&courses);
        info!(
            "event=gpa_average module=service status=ok count={} average={average}",
            courses.len()
        );
        Ok(average)
    }
}

fn mean_gpa(courses: &[Course]) -> f64 {
    if courses.is_empty() {
        return 0.0;
    }
    let total: f64 = courses.iter().map(|course| course.gpa).sum();
    round_to_hundredths(total / courses.len() as f64)
}

/// Rounds half to even, so a mean of exactly 2.125 becomes 2.12.
fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn log_failure(event: &str, err: RepoError) -> CourseServiceError {
    let err = CourseServiceError::from(err);
    match &err {
        CourseServiceError::Storage(inner) => {
            error!("event={event} module=service status=error error_code=storage error={inner}")
        }
        other => warn!("event={event} module=service status=rejected reason={other}"),
    }
    err
}

#[cfg(test)]
mod tests {
    use super::{mean_gpa, round_to_hundredths};
    use crate::model::course::Course;

    fn course_with_gpa(id: i64, gpa: f64) -> Course {
        Course {
            id,
            name: format!("course-{id}"),
            exam_scores: String::new(),
            regular_score: 0.0,
            final_score: 0.0,
            gpa,
            created_at: 0,
        }
    }

    #[test]
    fn mean_of_empty_collection_is_zero() {
        let average = mean_gpa(&[]);
        assert_eq!(average, 0.0);
        assert!(!average.is_nan());
    }

    #[test]
    fn mean_rounds_to_two_decimals() {
        let courses = [
            course_with_gpa(1, 4.0),
            course_with_gpa(2, 3.7),
            course_with_gpa(3, 3.3),
        ];
        assert_eq!(mean_gpa(&courses), 3.67);
    }

    #[test]
    fn mean_ties_round_to_even() {
        let courses: Vec<Course> = [4.0, 4.0, 4.0, 4.0, 1.0, 0.0, 0.0, 0.0]
            .into_iter()
            .enumerate()
            .map(|(index, gpa)| course_with_gpa(index as i64, gpa))
            .collect();
        assert_eq!(mean_gpa(&courses), 2.12);
        assert_eq!(round_to_hundredths(0.375), 0.38);
    }

    #[test]
    fn rounding_keeps_exact_values() {
        assert_eq!(round_to_hundredths(3.5), 3.5);
        assert_eq!(round_to_hundredths(2.0), 2.0);
    }
}
