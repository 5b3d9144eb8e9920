//! Course repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over canonical `courses` storage.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - Write paths call `CourseDraft::validate()` before SQL mutations.
//! - Write paths persist `gpa` derived from `final_score`, never caller input.
//! - Read paths reject rows whose `gpa` drifted from `final_score`.

use crate::db::DbError;
use crate::model::course::{Course, CourseDraft, CourseId, CourseValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const COURSE_SELECT_SQL: &str = "SELECT
    id,
    name,
    exam_scores,
    regular_score,
    final_score,
    gpa,
    created_at
FROM courses";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for course persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(CourseValidationError),
    Db(DbError),
    NotFound(CourseId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "course not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted course data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<CourseValidationError> for RepoError {
    fn from(value: CourseValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for course CRUD operations.
pub trait CourseRepository {
    /// Inserts a new course and returns its storage-assigned id.
    fn create_course(&self, draft: &CourseDraft) -> RepoResult<CourseId>;
    /// Gets one course by id, `None` when absent.
    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>>;
    /// Lists all courses ordered by `final_score DESC, id ASC`.
    fn list_courses(&self) -> RepoResult<Vec<Course>>;
    /// Replaces every mutable field of an existing course.
    fn update_course(&self, id: CourseId, draft: &CourseDraft) -> RepoResult<()>;
    /// Removes one course.
    fn delete_course(&self, id: CourseId) -> RepoResult<()>;
}

/// SQLite-backed course repository.
pub struct SqliteCourseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCourseRepository<'conn> {
    /// Wraps a migrated connection (see `db::open_db`).
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CourseRepository for SqliteCourseRepository<'_> {
    fn create_course(&self, draft: &CourseDraft) -> RepoResult<CourseId> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO courses (
                name,
                exam_scores,
                regular_score,
                final_score,
                gpa
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                draft.name.as_str(),
                draft.exam_scores.as_str(),
                draft.regular_score,
                draft.final_score,
                draft.gpa(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COURSE_SELECT_SQL} WHERE id = ?1;"))?;

        let course = stmt.query_row([id], read_course_row).optional()?;
        course.map(ensure_consistent).transpose()
    }

    fn list_courses(&self) -> RepoResult<Vec<Course>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COURSE_SELECT_SQL} ORDER BY final_score DESC, id ASC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut courses = Vec::new();
        while let Some(row) = rows.next()? {
            courses.push(ensure_consistent(read_course_row(row)?)?);
        }

        Ok(courses)
    }

    fn update_course(&self, id: CourseId, draft: &CourseDraft) -> RepoResult<()> {
        draft.validate()?;

        let changed = self.conn.execute(
            "UPDATE courses
             SET
                name = ?1,
                exam_scores = ?2,
                regular_score = ?3,
                final_score = ?4,
                gpa = ?5
             WHERE id = ?6;",
            params![
                draft.name.as_str(),
                draft.exam_scores.as_str(),
                draft.regular_score,
                draft.final_score,
                draft.gpa(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_course(&self, id: CourseId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM courses WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn read_course_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get("id")?,
        name: row.get("name")?,
        exam_scores: row.get("exam_scores")?,
        regular_score: row.get("regular_score")?,
        final_score: row.get("final_score")?,
        gpa: row.get("gpa")?,
        created_at: row.get("created_at")?,
    })
}

fn ensure_consistent(course: Course) -> RepoResult<Course> {
    if !course.gpa_is_consistent() {
        return Err(RepoError::InvalidData(format!(
            "courses.gpa `{}` does not match final_score `{}` for id {}",
            course.gpa, course.final_score, course.id
        )));
    }
    Ok(course)
}
