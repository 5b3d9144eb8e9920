//! Core domain logic for the course gradebook.
//! This crate is the single source of truth for grading rules and
//! course record invariants.

pub mod db;
pub mod grading;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use grading::{grade_point, GRADE_POINTS};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::course::{Course, CourseDraft, CourseId, CourseValidationError};
pub use repo::course_repo::{CourseRepository, RepoError, RepoResult, SqliteCourseRepository};
pub use service::course_service::{CourseService, CourseServiceError, CourseServiceResult};

/// Minimal health-check API for liveness probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
