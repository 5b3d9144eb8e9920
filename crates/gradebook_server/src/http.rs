//! HTTP transport for the course record service.
//!
//! # Responsibility
//! - Map `/api` routes onto `CourseService` operations.
//! - Translate service errors into status codes with `{"error": ...}` bodies.
//! - Allow cross-origin access from any origin.
//!
//! # Invariants
//! - Store access runs on the blocking pool; handlers never hold the store
//!   lock across an `.await`.
//! - `gpa` is never read from request bodies.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{routing, Json, Router};
use gradebook_core::{
    Course, CourseDraft, CourseId, CourseService, CourseServiceError, CourseServiceResult,
    CourseValidationError, SqliteCourseRepository,
};
use log::{error, info, warn};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

/// Shared handler state: the process-wide course store.
#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Takes ownership of a migrated connection for the process lifetime.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    async fn run<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&CourseService<SqliteCourseRepository<'c>>) -> CourseServiceResult<T>
            + Send
            + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| ApiError::Internal("course store lock poisoned".to_string()))?;
            let service = CourseService::new(SqliteCourseRepository::new(&guard));
            op(&service).map_err(ApiError::from)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("course store task failed: {err}")))?
    }
}

/// Builds the API router with CORS and request logging.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/courses", routing::get(list_courses).post(create_course))
        .route(
            "/api/courses/{id}",
            routing::get(get_course)
                .put(update_course)
                .delete(delete_course),
        )
        .route("/api/gpa/average", routing::get(average_gpa))
        .route("/api/health", routing::get(health))
        .layer(cors)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Course representation returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseView {
    pub id: CourseId,
    pub name: String,
    pub exam_scores: String,
    pub regular_score: f64,
    pub final_score: f64,
    pub gpa: f64,
}

impl From<Course> for CourseView {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            name: course.name,
            exam_scores: course.exam_scores,
            regular_score: course.regular_score,
            final_score: course.final_score,
            gpa: course.gpa,
        }
    }
}

/// Create/update request body. Every field is required; `null` counts as
/// missing.
#[derive(Debug, Default, Deserialize)]
pub struct CourseInput {
    pub name: Option<String>,
    pub exam_scores: Option<String>,
    pub regular_score: Option<f64>,
    pub final_score: Option<f64>,
}

impl CourseInput {
    pub fn into_draft(self) -> Result<CourseDraft, CourseValidationError> {
        let draft = CourseDraft {
            name: self.name.ok_or(CourseValidationError::MissingField("name"))?,
            exam_scores: self
                .exam_scores
                .ok_or(CourseValidationError::MissingField("exam_scores"))?,
            regular_score: self
                .regular_score
                .ok_or(CourseValidationError::MissingField("regular_score"))?,
            final_score: self
                .final_score
                .ok_or(CourseValidationError::MissingField("final_score"))?,
        };
        draft.validate()?;
        Ok(draft)
    }
}

#[derive(Debug, Serialize)]
struct MessageBody {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct AverageGpaBody {
    average_gpa: f64,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    ping: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Transport-level error mapped onto an HTTP status.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound(CourseId),
    Internal(String),
}

impl From<CourseServiceError> for ApiError {
    fn from(value: CourseServiceError) -> Self {
        match value {
            CourseServiceError::Invalid(err) => Self::Validation(err.to_string()),
            CourseServiceError::NotFound(id) => Self::NotFound(id),
            CourseServiceError::Storage(err) => Self::Internal(err.to_string()),
        }
    }
}

impl From<CourseValidationError> for ApiError {
    fn from(value: CourseValidationError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::Validation(value.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self::Validation(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(message) => (StatusCode::BAD_REQUEST, message),
            Self::NotFound(id) => (StatusCode::NOT_FOUND, format!("course not found: {id}")),
            Self::Internal(message) => {
                error!("event=http_error module=http status=error error={message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal storage error".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<CourseView>>, ApiError> {
    let courses = state.run(|service| service.list_courses()).await?;
    Ok(Json(courses.into_iter().map(CourseView::from).collect()))
}

async fn get_course(
    State(state): State<AppState>,
    id: Result<Path<CourseId>, PathRejection>,
) -> Result<Json<CourseView>, ApiError> {
    let Path(id) = id?;
    let course = state.run(move |service| service.get_course(id)).await?;
    Ok(Json(course.into()))
}

async fn create_course(
    State(state): State<AppState>,
    payload: Result<Json<CourseInput>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Json(input) = payload?;
    let draft = input.into_draft()?;
    state
        .run(move |service| service.create_course(&draft))
        .await?;
    Ok(Json(MessageBody {
        message: "Course added successfully",
    }))
}

async fn update_course(
    State(state): State<AppState>,
    id: Result<Path<CourseId>, PathRejection>,
    payload: Result<Json<CourseInput>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Path(id) = id?;
    let draft = match payload
        .map_err(ApiError::from)
        .and_then(|Json(input)| input.into_draft().map_err(ApiError::from))
    {
        Ok(draft) => draft,
        Err(rejected) => {
            // An unknown id reports 404 even when the body is also invalid.
            state.run(move |service| service.get_course(id)).await?;
            return Err(rejected);
        }
    };
    state
        .run(move |service| service.update_course(id, &draft))
        .await?;
    Ok(Json(MessageBody {
        message: "Course updated successfully",
    }))
}

async fn delete_course(
    State(state): State<AppState>,
    id: Result<Path<CourseId>, PathRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Path(id) = id?;
    state.run(move |service| service.delete_course(id)).await?;
    Ok(Json(MessageBody {
        message: "Course deleted successfully",
    }))
}

async fn average_gpa(State(state): State<AppState>) -> Result<Json<AverageGpaBody>, ApiError> {
    let average_gpa = state.run(|service| service.average_gpa()).await?;
    Ok(Json(AverageGpaBody { average_gpa }))
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        ping: gradebook_core::ping(),
        version: gradebook_core::core_version(),
    })
}

async fn log_request(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = started_at.elapsed().as_millis();
    if status.is_server_error() {
        warn!(
            "event=http_request module=http method={method} path={path} status={} duration_ms={duration_ms}",
            status.as_u16()
        );
    } else {
        info!(
            "event=http_request module=http method={method} path={path} status={} duration_ms={duration_ms}",
            status.as_u16()
        );
    }
    response
}
