use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use gradebook_core::db::open_db_in_memory;
use gradebook_server::http::{router, AppState, CourseView};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    router(AppState::new(open_db_in_memory().unwrap()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn course_body(name: &str, final_score: f64) -> Value {
    json!({
        "name": name,
        "exam_scores": "[90, 80]",
        "regular_score": 88,
        "final_score": final_score,
    })
}

async fn list(app: &Router) -> Vec<CourseView> {
    let (status, body) = send(app, Method::GET, "/api/courses", None).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_value(body).unwrap()
}

#[tokio::test]
async fn create_then_list_returns_derived_gpa() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/courses",
        Some(course_body("Operating Systems", 82.0)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Course added successfully"}));

    let courses = list(&app).await;
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].name, "Operating Systems");
    assert_eq!(courses[0].exam_scores, "[90, 80]");
    assert_eq!(courses[0].gpa, 3.3);
}

#[tokio::test]
async fn list_shape_has_exactly_the_public_fields() {
    let app = app();
    send(&app, Method::POST, "/api/courses", Some(course_body("Shape", 70.0))).await;

    let (_, body) = send(&app, Method::GET, "/api/courses", None).await;
    let object = body[0].as_object().unwrap();
    let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["exam_scores", "final_score", "gpa", "id", "name", "regular_score"]
    );
}

#[tokio::test]
async fn list_is_ordered_by_final_score_descending() {
    let app = app();
    for (name, score) in [("c", 60.0), ("a", 90.0), ("b", 75.0)] {
        send(&app, Method::POST, "/api/courses", Some(course_body(name, score))).await;
    }

    let scores: Vec<f64> = list(&app).await.iter().map(|c| c.final_score).collect();
    assert_eq!(scores, vec![90.0, 75.0, 60.0]);
}

#[tokio::test]
async fn caller_supplied_gpa_is_ignored() {
    let app = app();
    let mut body = course_body("Sneaky", 50.0);
    body["gpa"] = json!(4.0);
    send(&app, Method::POST, "/api/courses", Some(body)).await;

    assert_eq!(list(&app).await[0].gpa, 0.0);
}

#[tokio::test]
async fn create_rejects_missing_fields() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/courses",
        Some(json!({"name": "Incomplete", "exam_scores": "[]", "regular_score": 80})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("final_score"));
    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn create_rejects_malformed_json() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/courses")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_recomputes_gpa() {
    let app = app();
    send(&app, Method::POST, "/api/courses", Some(course_body("Networks", 72.0))).await;
    let before = list(&app).await.remove(0);
    assert_eq!(before.gpa, 2.3);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/courses/{}", before.id),
        Some(course_body("Networks", 95.0)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Course updated successfully"}));

    let after = list(&app).await.remove(0);
    assert_eq!(after.id, before.id);
    assert_eq!(after.gpa, 4.0);
    assert_eq!(after.name, before.name);
    assert_eq!(after.exam_scores, before.exam_scores);
    assert_eq!(after.regular_score, before.regular_score);
}

#[tokio::test]
async fn update_and_delete_of_unknown_id_are_not_found() {
    let app = app();

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/courses/999",
        Some(course_body("ghost", 80.0)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::DELETE, "/api/courses/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn update_reports_unknown_id_before_invalid_body() {
    let app = app();
    let incomplete = json!({"name": "ghost", "exam_scores": "[]"});

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/courses/999",
        Some(incomplete.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(&app, Method::POST, "/api/courses", Some(course_body("Real", 80.0))).await;
    let id = list(&app).await[0].id;
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/courses/{id}"),
        Some(incomplete),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("regular_score"));
    assert_eq!(list(&app).await[0].final_score, 80.0);
}

#[tokio::test]
async fn delete_removes_course() {
    let app = app();
    send(&app, Method::POST, "/api/courses", Some(course_body("Temp", 65.0))).await;
    let id = list(&app).await[0].id;

    let (status, body) = send(&app, Method::DELETE, &format!("/api/courses/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Course deleted successfully"}));
    assert!(list(&app).await.is_empty());

    let (status, _) = send(&app, Method::GET, &format!("/api/courses/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_id_is_rejected() {
    let app = app();
    let (status, _) = send(&app, Method::DELETE, "/api/courses/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn average_gpa_handles_empty_and_populated_store() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/gpa/average", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average_gpa"].as_f64(), Some(0.0));

    send(&app, Method::POST, "/api/courses", Some(course_body("A", 90.0))).await;
    send(&app, Method::POST, "/api/courses", Some(course_body("B", 78.0))).await;

    let (_, body) = send(&app, Method::GET, "/api/gpa/average", None).await;
    assert_eq!(body["average_gpa"].as_f64(), Some(3.5));
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/courses")
        .header(header::ORIGIN, "http://frontend.example")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn health_reports_version() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], gradebook_core::core_version());
}
