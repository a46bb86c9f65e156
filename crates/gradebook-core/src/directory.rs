//! # Student Directory
//!
//! Creation, lookup and listing of student records.
//!
//! - Roll numbers are unique; a duplicate is rejected without touching the
//!   stored student
//! - Students are never renamed or deleted
//! - The store is passed in by the caller for every operation

use crate::primitives::MAX_QUERY_LENGTH;
use crate::store::GradebookStore;
use crate::{Average, GradebookError, RollNumber, Student, StudentName};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

// =============================================================================
// LISTING OPTIONS
// =============================================================================

/// Order of a student listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Case-insensitive by name, ties by roll number.
    #[default]
    #[serde(rename = "name")]
    Name,
    /// Highest average first; students without grades last.
    #[serde(rename = "avg", alias = "average")]
    Average,
}

impl FromStr for SortOrder {
    type Err = GradebookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "avg" | "average" => Ok(Self::Average),
            other => Err(GradebookError::InvalidInput(format!(
                "Unknown sort order '{}' (expected 'name' or 'avg')",
                other
            ))),
        }
    }
}

/// Search and sort options for `StudentDirectory::list_students`.
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    /// Case-insensitive substring of the name or roll number.
    pub query: Option<String>,
    pub sort: SortOrder,
}

impl StudentFilter {
    #[must_use]
    pub fn new(query: Option<String>, sort: SortOrder) -> Self {
        Self { query, sort }
    }
}

/// A student with its grade count and average, as shown in a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentSummary {
    pub student: Student,
    pub grade_count: usize,
    /// `None` when the student has no grades.
    pub average: Option<Average>,
}

/// Case-insensitive name order, ties broken by roll number.
pub(crate) fn by_name(a: &Student, b: &Student) -> Ordering {
    a.name
        .as_str()
        .to_lowercase()
        .cmp(&b.name.as_str().to_lowercase())
        .then_with(|| a.roll_number.cmp(&b.roll_number))
}

// =============================================================================
// DIRECTORY
// =============================================================================

/// Operations on student records.
pub struct StudentDirectory;

impl StudentDirectory {
    /// Create a student.
    ///
    /// Fails with `DuplicateRollNumber` if the roll number is taken; the
    /// existing student is left as it was.
    pub fn add_student<S: GradebookStore + ?Sized>(
        store: &mut S,
        name: StudentName,
        roll_number: RollNumber,
    ) -> Result<Student, GradebookError> {
        let student = Student::new(name, roll_number);
        if !store.insert_student(&student)? {
            return Err(GradebookError::DuplicateRollNumber(student.roll_number));
        }
        Ok(student)
    }

    /// Look up a student. Fails with `NotFound` for an unknown roll number.
    pub fn get_student<S: GradebookStore + ?Sized>(
        store: &S,
        roll_number: &RollNumber,
    ) -> Result<Student, GradebookError> {
        store
            .get_student(roll_number)?
            .ok_or_else(|| GradebookError::NotFound(roll_number.clone()))
    }

    /// List students matching `filter`, with their averages.
    pub fn list_students<S: GradebookStore + ?Sized>(
        store: &S,
        filter: &StudentFilter,
    ) -> Result<Vec<StudentSummary>, GradebookError> {
        let needle = match filter.query.as_deref().map(str::trim) {
            Some(q) if q.len() > MAX_QUERY_LENGTH => {
                return Err(GradebookError::InvalidInput(format!(
                    "Query length {} exceeds maximum {} bytes",
                    q.len(),
                    MAX_QUERY_LENGTH
                )));
            }
            Some(q) if !q.is_empty() => Some(q.to_lowercase()),
            _ => None,
        };

        let mut summaries = Vec::new();
        for student in store.students()? {
            if let Some(needle) = &needle {
                let hit = student.name.as_str().to_lowercase().contains(needle)
                    || student.roll_number.as_str().to_lowercase().contains(needle);
                if !hit {
                    continue;
                }
            }

            let grades = store.grades_for(&student.roll_number)?;
            summaries.push(StudentSummary {
                grade_count: grades.len(),
                average: Average::of(grades.iter().map(|g| g.score)),
                student,
            });
        }

        match filter.sort {
            SortOrder::Name => summaries.sort_by(|a, b| by_name(&a.student, &b.student)),
            SortOrder::Average => summaries.sort_by(|a, b| match (&a.average, &b.average) {
                (Some(x), Some(y)) => y.cmp(x).then_with(|| by_name(&a.student, &b.student)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => by_name(&a.student, &b.student),
            }),
        }

        Ok(summaries)
    }
}

// =============================================================================
// TESTS
// =============================================================================
