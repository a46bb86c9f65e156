//! # Grade Ledger
//!
//! Subject grades attached to students, and their averages.
//!
//! - Scores arrive already validated as `Score` (range [0, 100])
//! - A grade is only accepted for an existing student
//! - Grades come back in insertion order
//! - Averages are exact; rounding happens only when rendering

use crate::store::GradebookStore;
use crate::{
    Average, Grade, GradeId, GradebookError, RollNumber, Score, Student, StudentDirectory,
    Subject, SubjectPolicy,
};

/// A student together with all of its grades and their average.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    pub student: Student,
    pub grades: Vec<Grade>,
    /// `None` when the student has no grades.
    pub average: Option<Average>,
}

/// Operations on grades.
pub struct GradeLedger;

impl GradeLedger {
    /// Record a grade for the student with `roll_number`.
    ///
    /// Under `SubjectPolicy::Replace`, the student's earlier grades for the
    /// same subject are dropped in the same write.
    ///
    /// Fails with `NotFound` for an unknown roll number; nothing is stored.
    pub fn add_grade<S: GradebookStore + ?Sized>(
        store: &mut S,
        roll_number: &RollNumber,
        subject: Subject,
        score: Score,
        policy: SubjectPolicy,
    ) -> Result<Grade, GradebookError> {
        match policy {
            SubjectPolicy::Append => store.append_grade(roll_number, subject, score),
            SubjectPolicy::Replace => store.replace_subject_grade(roll_number, subject, score),
        }
    }

    /// All grades of a student, in insertion order.
    pub fn get_grades<S: GradebookStore + ?Sized>(
        store: &S,
        roll_number: &RollNumber,
    ) -> Result<Vec<Grade>, GradebookError> {
        StudentDirectory::get_student(store, roll_number)?;
        store.grades_for(roll_number)
    }

    /// Arithmetic mean of a student's scores.
    ///
    /// Fails with `NoGrades` when the student exists but has no grades.
    pub fn average<S: GradebookStore + ?Sized>(
        store: &S,
        roll_number: &RollNumber,
    ) -> Result<Average, GradebookError> {
        let grades = Self::get_grades(store, roll_number)?;
        Average::of(grades.iter().map(|g| g.score))
            .ok_or_else(|| GradebookError::NoGrades(roll_number.clone()))
    }

    /// Delete one grade. Fails with `GradeNotFound` for an unknown id.
    pub fn remove_grade<S: GradebookStore + ?Sized>(
        store: &mut S,
        id: GradeId,
    ) -> Result<Grade, GradebookError> {
        store
            .remove_grade(id)?
            .ok_or(GradebookError::GradeNotFound(id))
    }

    /// The full record of a student: details, grades and average.
    pub fn student_record<S: GradebookStore + ?Sized>(
        store: &S,
        roll_number: &RollNumber,
    ) -> Result<StudentRecord, GradebookError> {
        let student = StudentDirectory::get_student(store, roll_number)?;
        let grades = store.grades_for(roll_number)?;
        let average = Average::of(grades.iter().map(|g| g.score));
        Ok(StudentRecord {
            student,
            grades,
            average,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
