//! # API Request/Response Types
//!
//! JSON structures for the HTTP API. Requests carry raw text and are
//! validated into core newtypes here, before any handler touches the store.

use gradebook_core::{
    Average, Grade, GradebookError, RollNumber, Score, SortOrder, Student, StudentFilter,
    StudentName, StudentRecord, StudentSummary, Subject,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH / STATUS
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Gradebook status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub student_count: usize,
    pub grade_count: usize,
    pub persistent: bool,
    pub subject_policy: String,
}

// =============================================================================
// STUDENTS
// =============================================================================

/// Request body of `POST /students`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddStudentRequest {
    pub name: String,
    pub roll_number: String,
}

impl AddStudentRequest {
    /// Validate into core types.
    pub fn validate(&self) -> Result<(StudentName, RollNumber), GradebookError> {
        Ok((
            StudentName::parse(&self.name)?,
            RollNumber::parse(&self.roll_number)?,
        ))
    }
}

/// A student as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentJson {
    pub name: String,
    pub roll_number: String,
}

impl From<&Student> for StudentJson {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.to_string(),
            roll_number: student.roll_number.to_string(),
        }
    }
}

/// Query string of `GET /students`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive substring of name or roll number.
    pub q: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl ListQuery {
    #[must_use]
    pub fn to_filter(&self) -> StudentFilter {
        let query = self
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        StudentFilter::new(query, self.sort)
    }
}

/// One row of a student listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSummaryJson {
    pub name: String,
    pub roll_number: String,
    pub grade_count: usize,
    /// `None` when the student has no grades.
    pub average: Option<AverageJson>,
}

impl From<&StudentSummary> for StudentSummaryJson {
    fn from(summary: &StudentSummary) -> Self {
        Self {
            name: summary.student.name.to_string(),
            roll_number: summary.student.roll_number.to_string(),
            grade_count: summary.grade_count,
            average: summary.average.as_ref().map(AverageJson::from),
        }
    }
}

// =============================================================================
// GRADES
// =============================================================================

/// A score as submitted: a JSON number (`85`, `85.5`) or a string (`"85.5"`).
///
/// Numbers are kept as their JSON text (`arbitrary_precision` is off, so
/// serde_json has already normalised them) and parsed with `Score::parse`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreInput {
    Number(serde_json::Number),
    Text(String),
}

impl ScoreInput {
    pub fn to_score(&self) -> Result<Score, GradebookError> {
        match self {
            Self::Number(n) => Score::parse(&n.to_string()),
            Self::Text(s) => Score::parse(s),
        }
    }
}

/// Request body of `POST /students/{roll}/grades`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddGradeRequest {
    pub subject: String,
    pub score: ScoreInput,
}

impl AddGradeRequest {
    /// Validate into core types. A bad subject is reported before a bad score.
    pub fn validate(&self) -> Result<(Subject, Score), GradebookError> {
        Ok((Subject::parse(&self.subject)?, self.score.to_score()?))
    }
}

/// A grade as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeJson {
    pub id: u64,
    pub roll_number: String,
    pub subject: String,
    /// Decimal rendering, e.g. `"85.5"`.
    pub score: String,
    pub score_hundredths: u32,
}

impl From<&Grade> for GradeJson {
    fn from(grade: &Grade) -> Self {
        Self {
            id: grade.id.0,
            roll_number: grade.owner.to_string(),
            subject: grade.subject.to_string(),
            score: grade.score.to_string(),
            score_hundredths: grade.score.hundredths(),
        }
    }
}

/// An average as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AverageJson {
    /// Full-precision decimal, e.g. `"86.666667"`.
    pub value: String,
    /// Rounded half-up to two fractional digits.
    pub hundredths: u64,
    pub grade_count: u64,
}

impl From<&Average> for AverageJson {
    fn from(average: &Average) -> Self {
        Self {
            value: average.to_string(),
            hundredths: average.hundredths(),
            grade_count: average.count(),
        }
    }
}

/// Response of `GET /students/{roll}/average`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AverageResponse {
    pub roll_number: String,
    pub average: AverageJson,
}

/// Response of `GET /students/{roll}`: the full record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRecordResponse {
    pub student: StudentJson,
    pub grades: Vec<GradeJson>,
    pub average: Option<AverageJson>,
}

impl From<&StudentRecord> for StudentRecordResponse {
    fn from(record: &StudentRecord) -> Self {
        Self {
            student: StudentJson::from(&record.student),
            grades: record.grades.iter().map(GradeJson::from).collect(),
            average: record.average.as_ref().map(AverageJson::from),
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error body shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

impl From<&GradebookError> for ErrorResponse {
    fn from(err: &GradebookError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind().to_string(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
