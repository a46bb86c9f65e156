//! Integration tests for the Gradebook HTTP API.
//!
//! Uses axum-test to exercise the router without binding a real socket.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use gradebook::api::{
    AppState, AverageResponse, ErrorResponse, GradeJson, HealthResponse, StatusResponse,
    StudentJson, StudentRecordResponse, StudentSummaryJson, create_router,
};
use gradebook::config::GradebookConfig;
use gradebook_core::{Gradebook, SubjectPolicy};
use serde_json::json;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn test_config() -> GradebookConfig {
    GradebookConfig {
        rate_limit: 0,
        ..GradebookConfig::default()
    }
}

/// Test server over a fresh in-memory gradebook, rate limiting off.
fn create_test_server() -> TestServer {
    server_with(Gradebook::new(), &test_config())
}

fn server_with(book: Gradebook, config: &GradebookConfig) -> TestServer {
    TestServer::new(create_router(AppState::new(book), config)).unwrap()
}

async fn add_student(server: &TestServer, name: &str, roll: &str) {
    server
        .post("/students")
        .json(&json!({ "name": name, "roll_number": roll }))
        .await
        .assert_status(StatusCode::CREATED);
}

async fn add_grade(server: &TestServer, roll: &str, subject: &str, score: serde_json::Value) {
    server
        .post(&format!("/students/{}/grades", roll))
        .json(&json!({ "subject": subject, "score": score }))
        .await
        .assert_status(StatusCode::CREATED);
}

// =============================================================================
// HEALTH / STATUS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_status_counts() {
    let server = create_test_server();
    add_student(&server, "Ada", "R1").await;
    add_grade(&server, "R1", "Math", json!(90)).await;

    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.student_count, 1);
    assert_eq!(status.grade_count, 1);
    assert!(!status.persistent);
    assert_eq!(status.subject_policy, "append");
}

// =============================================================================
// STUDENT DIRECTORY
// =============================================================================

#[tokio::test]
async fn test_add_student_returns_created() {
    let server = create_test_server();

    let response = server
        .post("/students")
        .json(&json!({ "name": "  Ada Lovelace ", "roll_number": "R1" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let student: StudentJson = response.json();
    assert_eq!(student.name, "Ada Lovelace");
    assert_eq!(student.roll_number, "R1");
}

#[tokio::test]
async fn test_duplicate_roll_number_conflict() {
    let server = create_test_server();
    add_student(&server, "Ada", "R1").await;

    let response = server
        .post("/students")
        .json(&json!({ "name": "Eve", "roll_number": "R1" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let error: ErrorResponse = response.json();
    assert_eq!(error.kind, "duplicate_roll_number");

    let record: StudentRecordResponse = server.get("/students/R1").await.json();
    assert_eq!(record.student.name, "Ada");
}

#[tokio::test]
async fn test_empty_name_bad_request() {
    let server = create_test_server();

    let response = server
        .post("/students")
        .json(&json!({ "name": "   ", "roll_number": "R1" }))
        .await;

    response.assert_status_bad_request();
    let error: ErrorResponse = response.json();
    assert_eq!(error.kind, "invalid_input");
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let server = create_test_server();

    let response = server
        .post("/students")
        .json(&json!({ "name": "Ada" }))
        .await;

    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let server = create_test_server();

    let response = server
        .post("/students")
        .bytes(bytes::Bytes::from("{ name: Ada"))
        .content_type("application/json")
        .await;

    assert!(response.status_code().is_client_error());
    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.student_count, 0);
}

#[tokio::test]
async fn test_unknown_student_not_found() {
    let server = create_test_server();

    let response = server.get("/students/nobody").await;

    response.assert_status_not_found();
    let error: ErrorResponse = response.json();
    assert_eq!(error.kind, "not_found");
}

#[tokio::test]
async fn test_list_students_filter_and_sort() {
    let server = create_test_server();
    add_student(&server, "Charlie", "R3").await;
    add_student(&server, "alice", "R1").await;
    add_student(&server, "Bob", "R2").await;
    add_grade(&server, "R2", "Math", json!(95)).await;
    add_grade(&server, "R3", "Math", json!(60)).await;

    let by_name: Vec<StudentSummaryJson> = server.get("/students").await.json();
    let names: Vec<_> = by_name.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["alice", "Bob", "Charlie"]);

    let by_avg: Vec<StudentSummaryJson> = server
        .get("/students")
        .add_query_param("sort", "avg")
        .await
        .json();
    let rolls: Vec<_> = by_avg.iter().map(|s| s.roll_number.as_str()).collect();
    assert_eq!(rolls, vec!["R2", "R3", "R1"]);
    assert!(by_avg[2].average.is_none());

    let found: Vec<StudentSummaryJson> = server
        .get("/students")
        .add_query_param("q", "AL")
        .await
        .json();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].roll_number, "R1");
}

#[tokio::test]
async fn test_list_unknown_sort_rejected() {
    let server = create_test_server();

    let response = server
        .get("/students")
        .add_query_param("sort", "height")
        .await;

    assert!(response.status_code().is_client_error());
}

// =============================================================================
// GRADE LEDGER
// =============================================================================

#[tokio::test]
async fn test_average_of_three_grades() {
    let server = create_test_server();
    add_student(&server, "Ada", "R1").await;
    add_grade(&server, "R1", "Math", json!(80)).await;
    add_grade(&server, "R1", "Art", json!("90")).await;
    add_grade(&server, "R1", "Bio", json!(70)).await;

    let response = server.get("/students/R1/average").await;

    response.assert_status_ok();
    let average: AverageResponse = response.json();
    assert_eq!(average.roll_number, "R1");
    assert_eq!(average.average.value, "80");
    assert_eq!(average.average.hundredths, 8000);
    assert_eq!(average.average.grade_count, 3);
}

#[tokio::test]
async fn test_average_without_grades() {
    let server = create_test_server();
    add_student(&server, "Ada", "R1").await;

    let response = server.get("/students/R1/average").await;

    response.assert_status_not_found();
    let error: ErrorResponse = response.json();
    assert_eq!(error.kind, "no_grades");
}

#[tokio::test]
async fn test_grade_out_of_range() {
    let server = create_test_server();
    add_student(&server, "Ada", "R1").await;

    for score in [json!(100.5), json!(-1), json!("101")] {
        let response = server
            .post("/students/R1/grades")
            .json(&json!({ "subject": "Math", "score": score }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let error: ErrorResponse = response.json();
        assert_eq!(error.kind, "out_of_range");
    }

    let grades: Vec<GradeJson> = server.get("/students/R1/grades").await.json();
    assert!(grades.is_empty());
}

#[tokio::test]
async fn test_grade_not_a_number() {
    let server = create_test_server();
    add_student(&server, "Ada", "R1").await;

    let response = server
        .post("/students/R1/grades")
        .json(&json!({ "subject": "Math", "score": "ninety" }))
        .await;

    response.assert_status_bad_request();
    let error: ErrorResponse = response.json();
    assert_eq!(error.kind, "invalid_score");
}

#[tokio::test]
async fn test_grade_for_unknown_student() {
    let server = create_test_server();

    let response = server
        .post("/students/ghost/grades")
        .json(&json!({ "subject": "Math", "score": 50 }))
        .await;

    response.assert_status_not_found();
    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.grade_count, 0);
}

#[tokio::test]
async fn test_grades_in_insertion_order() {
    let server = create_test_server();
    add_student(&server, "Ada", "R1").await;
    add_grade(&server, "R1", "Zoology", json!(70)).await;
    add_grade(&server, "R1", "Art", json!(85.5)).await;

    let grades: Vec<GradeJson> = server.get("/students/R1/grades").await.json();
    let subjects: Vec<_> = grades.iter().map(|g| g.subject.as_str()).collect();
    assert_eq!(subjects, vec!["Zoology", "Art"]);
    assert_eq!(grades[1].score, "85.5");
    assert_eq!(grades[1].score_hundredths, 8550);
    assert!(grades[0].id < grades[1].id);
}

#[tokio::test]
async fn test_student_record() {
    let server = create_test_server();
    add_student(&server, "Ada", "R1").await;
    add_grade(&server, "R1", "Math", json!(80)).await;
    add_grade(&server, "R1", "Art", json!(85)).await;

    let record: StudentRecordResponse = server.get("/students/R1").await.json();
    assert_eq!(record.student.roll_number, "R1");
    assert_eq!(record.grades.len(), 2);
    assert_eq!(record.average.map(|a| a.value), Some("82.5".to_string()));
}

#[tokio::test]
async fn test_remove_grade() {
    let server = create_test_server();
    add_student(&server, "Ada", "R1").await;
    add_grade(&server, "R1", "Math", json!(80)).await;
    let grades: Vec<GradeJson> = server.get("/students/R1/grades").await.json();
    let id = grades[0].id;

    let response = server.delete(&format!("/grades/{}", id)).await;
    response.assert_status_ok();
    let removed: GradeJson = response.json();
    assert_eq!(removed.subject, "Math");

    let again = server.delete(&format!("/grades/{}", id)).await;
    again.assert_status_not_found();
    let error: ErrorResponse = again.json();
    assert_eq!(error.kind, "grade_not_found");
}

#[tokio::test]
async fn test_replace_policy_over_http() {
    let server = server_with(
        Gradebook::new().with_policy(SubjectPolicy::Replace),
        &test_config(),
    );
    add_student(&server, "Ada", "R1").await;
    add_grade(&server, "R1", "Math", json!(40)).await;
    add_grade(&server, "R1", "Math", json!(60)).await;

    let grades: Vec<GradeJson> = server.get("/students/R1/grades").await.json();
    assert_eq!(grades.len(), 1);
    assert_eq!(grades[0].score, "60");
}

// =============================================================================
// REPORTS
// =============================================================================

#[tokio::test]
async fn test_class_stats() {
    let server = create_test_server();
    add_student(&server, "Bob", "R2").await;
    add_student(&server, "Ada", "R1").await;
    add_grade(&server, "R1", "Math", json!(80)).await;
    add_grade(&server, "R1", "Art", json!(92.5)).await;

    let response = server.get("/class-stats").await;
    response.assert_status_ok();
    let stats: serde_json::Value = response.json();
    assert_eq!(
        stats,
        json!([
            { "name": "Ada", "roll_number": "R1", "average_hundredths": 8625 },
            { "name": "Bob", "roll_number": "R2", "average_hundredths": 0 },
        ])
    );
}

#[tokio::test]
async fn test_export_csv() {
    let server = create_test_server();
    add_student(&server, "Ada", "R1").await;
    add_grade(&server, "R1", "Math", json!(85.5)).await;

    let response = server.get("/export/csv").await;

    response.assert_status_ok();
    let content_type = response.header(header::CONTENT_TYPE);
    assert!(content_type.to_str().unwrap().starts_with("text/csv"));
    let body = response.text();
    assert_eq!(body, "Name,Roll,Subject,Score\r\nAda,R1,Math,85.5\r\n");
}

// =============================================================================
// MIDDLEWARE
// =============================================================================

#[tokio::test]
async fn test_cors_allows_localhost() {
    let server = create_test_server();

    let response = server
        .get("/health")
        .add_header(header::ORIGIN, HeaderValue::from_static("http://localhost:3000"))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        "http://localhost:3000"
    );
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let server = create_test_server();
    let huge = "x".repeat(100 * 1024);

    let response = server
        .post("/students")
        .json(&json!({ "name": huge, "roll_number": "R1" }))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_rate_limit_exceeded() {
    let config = GradebookConfig {
        rate_limit: 1,
        ..GradebookConfig::default()
    };
    let server = server_with(Gradebook::new(), &config);

    server.get("/health").await.assert_status_ok();
    server
        .get("/health")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_404_on_unknown_endpoint() {
    let server = create_test_server();
    server.get("/teachers").await.assert_status_not_found();
}
