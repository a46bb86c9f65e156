//! # API Endpoint Handlers
//!
//! Each handler validates its input into core types, takes the gradebook
//! lock (shared for reads, exclusive for writes) and maps the result.

use super::{
    AppState,
    error::ApiError,
    types::{
        AddGradeRequest, AddStudentRequest, AverageJson, AverageResponse, GradeJson,
        HealthResponse, ListQuery, StatusResponse, StudentJson, StudentRecordResponse,
        StudentSummaryJson,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use gradebook_core::{ClassStat, GradeId, RollNumber};

// =============================================================================
// HEALTH / STATUS
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Student and grade counts.
pub async fn status_handler(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, ApiError> {
    let book = state.gradebook.read().await;
    Ok(Json(StatusResponse {
        student_count: book.student_count()?,
        grade_count: book.grade_count()?,
        persistent: book.is_persistent(),
        subject_policy: book.policy().to_string(),
    }))
}

// =============================================================================
// STUDENT DIRECTORY
// =============================================================================

/// List students, optionally filtered and sorted.
pub async fn list_students_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<StudentSummaryJson>>, ApiError> {
    let book = state.gradebook.read().await;
    let summaries = book.list_students(&query.to_filter())?;
    Ok(Json(summaries.iter().map(StudentSummaryJson::from).collect()))
}

/// Create a student.
pub async fn add_student_handler(
    State(state): State<AppState>,
    Json(request): Json<AddStudentRequest>,
) -> Result<(StatusCode, Json<StudentJson>), ApiError> {
    let (name, roll_number) = request.validate()?;

    let mut book = state.gradebook.write().await;
    let student = book.add_student(name, roll_number)?;
    tracing::info!(roll_number = %student.roll_number, "Student added");

    Ok((StatusCode::CREATED, Json(StudentJson::from(&student))))
}

/// Full record of one student: details, grades and average.
pub async fn student_record_handler(
    State(state): State<AppState>,
    Path(roll): Path<String>,
) -> Result<Json<StudentRecordResponse>, ApiError> {
    let roll_number = RollNumber::parse(&roll)?;
    let book = state.gradebook.read().await;
    let record = book.student_record(&roll_number)?;
    Ok(Json(StudentRecordResponse::from(&record)))
}

// =============================================================================
// GRADE LEDGER
// =============================================================================

/// Grades of one student in insertion order.
pub async fn get_grades_handler(
    State(state): State<AppState>,
    Path(roll): Path<String>,
) -> Result<Json<Vec<GradeJson>>, ApiError> {
    let roll_number = RollNumber::parse(&roll)?;
    let book = state.gradebook.read().await;
    let grades = book.get_grades(&roll_number)?;
    Ok(Json(grades.iter().map(GradeJson::from).collect()))
}

/// Record a grade for one student.
pub async fn add_grade_handler(
    State(state): State<AppState>,
    Path(roll): Path<String>,
    Json(request): Json<AddGradeRequest>,
) -> Result<(StatusCode, Json<GradeJson>), ApiError> {
    let roll_number = RollNumber::parse(&roll)?;
    let (subject, score) = request.validate()?;

    let mut book = state.gradebook.write().await;
    let grade = book.add_grade(&roll_number, subject, score)?;
    tracing::info!(
        grade_id = grade.id.0,
        roll_number = %grade.owner,
        subject = %grade.subject,
        score = %grade.score,
        "Grade added"
    );

    Ok((StatusCode::CREATED, Json(GradeJson::from(&grade))))
}

/// Average of one student's grades.
pub async fn average_handler(
    State(state): State<AppState>,
    Path(roll): Path<String>,
) -> Result<Json<AverageResponse>, ApiError> {
    let roll_number = RollNumber::parse(&roll)?;
    let book = state.gradebook.read().await;
    let average = book.average(&roll_number)?;
    Ok(Json(AverageResponse {
        roll_number: roll_number.to_string(),
        average: AverageJson::from(&average),
    }))
}

/// Delete one grade by id.
pub async fn remove_grade_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<GradeJson>, ApiError> {
    let mut book = state.gradebook.write().await;
    let grade = book.remove_grade(GradeId(id))?;
    tracing::info!(grade_id = id, roll_number = %grade.owner, "Grade removed");
    Ok(Json(GradeJson::from(&grade)))
}

// =============================================================================
// REPORTS
// =============================================================================

/// Per-student averages for the class chart.
pub async fn class_stats_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClassStat>>, ApiError> {
    let book = state.gradebook.read().await;
    Ok(Json(book.class_stats()?))
}

/// Every grade as a CSV attachment.
pub async fn export_csv_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let book = state.gradebook.read().await;
    let csv = book.export_csv()?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"grades.csv\"",
            ),
        ],
        csv,
    ))
}
