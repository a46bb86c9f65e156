//! # Store
//!
//! The storage interface the Student Directory and Grade Ledger run on,
//! and its in-memory implementation.
//!
//! All data structures use `BTreeMap` for deterministic ordering.

use crate::{Grade, GradeId, GradebookError, RollNumber, Score, Student, Subject};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// GRADEBOOKSTORE TRAIT
// =============================================================================

/// Durable storage for students and their grades.
///
/// Each method is atomic: it either fully applies or leaves the store
/// unchanged. Implementations enforce the storage-level invariants
/// (unique roll numbers, no orphan grades); content validation happens
/// before a value reaches the store.
pub trait GradebookStore {
    /// Insert a student unless the roll number is taken.
    ///
    /// Returns `false`, writing nothing, when the roll number already exists.
    fn insert_student(&mut self, student: &Student) -> Result<bool, GradebookError>;

    /// Look up a student by roll number.
    fn get_student(&self, roll_number: &RollNumber) -> Result<Option<Student>, GradebookError>;

    /// All students, ordered by roll number.
    fn students(&self) -> Result<Vec<Student>, GradebookError>;

    /// Append a grade for an existing student, assigning the next `GradeId`.
    ///
    /// Fails with `NotFound` if no student owns `owner`.
    fn append_grade(
        &mut self,
        owner: &RollNumber,
        subject: Subject,
        score: Score,
    ) -> Result<Grade, GradebookError>;

    /// Remove the student's grades for `subject`, then append the new grade.
    ///
    /// Both steps happen in one atomic write. Fails with `NotFound` if no
    /// student owns `owner`.
    fn replace_subject_grade(
        &mut self,
        owner: &RollNumber,
        subject: Subject,
        score: Score,
    ) -> Result<Grade, GradebookError>;

    /// Grades owned by `owner`, in insertion order.
    ///
    /// Returns an empty list for an unknown roll number.
    fn grades_for(&self, owner: &RollNumber) -> Result<Vec<Grade>, GradebookError>;

    /// Remove a grade by id, returning it if it existed.
    fn remove_grade(&mut self, id: GradeId) -> Result<Option<Grade>, GradebookError>;

    /// Total number of students.
    fn student_count(&self) -> Result<usize, GradebookError>;

    /// Total number of grades.
    fn grade_count(&self) -> Result<usize, GradebookError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Volatile in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Students keyed by roll number.
    students: BTreeMap<RollNumber, Student>,

    /// Grade storage: GradeId -> Grade
    grades: BTreeMap<GradeId, Grade>,

    /// Per-student grade ids. Ids only grow, so set order is insertion order.
    grade_index: BTreeMap<RollNumber, BTreeSet<GradeId>>,

    /// Next available GradeId
    next_grade_id: u64,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push_grade(&mut self, owner: &RollNumber, subject: Subject, score: Score) -> Grade {
        let id = GradeId(self.next_grade_id);
        self.next_grade_id = self.next_grade_id.saturating_add(1);

        let grade = Grade {
            id,
            owner: owner.clone(),
            subject,
            score,
        };
        self.grades.insert(id, grade.clone());
        self.grade_index.entry(owner.clone()).or_default().insert(id);
        grade
    }
}

impl GradebookStore for MemoryStore {
    fn insert_student(&mut self, student: &Student) -> Result<bool, GradebookError> {
        if self.students.contains_key(&student.roll_number) {
            return Ok(false);
        }
        self.students
            .insert(student.roll_number.clone(), student.clone());
        Ok(true)
    }

    fn get_student(&self, roll_number: &RollNumber) -> Result<Option<Student>, GradebookError> {
        Ok(self.students.get(roll_number).cloned())
    }

    fn students(&self) -> Result<Vec<Student>, GradebookError> {
        Ok(self.students.values().cloned().collect())
    }

    fn append_grade(
        &mut self,
        owner: &RollNumber,
        subject: Subject,
        score: Score,
    ) -> Result<Grade, GradebookError> {
        if !self.students.contains_key(owner) {
            return Err(GradebookError::NotFound(owner.clone()));
        }
        Ok(self.push_grade(owner, subject, score))
    }

    fn replace_subject_grade(
        &mut self,
        owner: &RollNumber,
        subject: Subject,
        score: Score,
    ) -> Result<Grade, GradebookError> {
        if !self.students.contains_key(owner) {
            return Err(GradebookError::NotFound(owner.clone()));
        }

        if let Some(ids) = self.grade_index.get_mut(owner) {
            let grades = &mut self.grades;
            ids.retain(|id| {
                let same_subject = grades.get(id).is_some_and(|g| g.subject == subject);
                if same_subject {
                    grades.remove(id);
                }
                !same_subject
            });
        }
        Ok(self.push_grade(owner, subject, score))
    }

    fn grades_for(&self, owner: &RollNumber) -> Result<Vec<Grade>, GradebookError> {
        Ok(self
            .grade_index
            .get(owner)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.grades.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn remove_grade(&mut self, id: GradeId) -> Result<Option<Grade>, GradebookError> {
        let Some(grade) = self.grades.remove(&id) else {
            return Ok(None);
        };
        if let Some(ids) = self.grade_index.get_mut(&grade.owner) {
            ids.remove(&id);
        }
        Ok(Some(grade))
    }

    fn student_count(&self) -> Result<usize, GradebookError> {
        Ok(self.students.len())
    }

    fn grade_count(&self) -> Result<usize, GradebookError> {
        Ok(self.grades.len())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StudentName;

    fn student(roll: &str, name: &str) -> Student {
        Student::new(
            StudentName::parse(name).expect("name"),
            RollNumber::parse(roll).expect("roll"),
        )
    }

    fn subject(s: &str) -> Subject {
        Subject::parse(s).expect("subject")
    }

    fn score(points: u32) -> Score {
        Score::from_points(points).expect("score")
    }

    #[test]
    fn insert_student_if_absent() {
        let mut store = MemoryStore::new();
        assert!(store.insert_student(&student("1", "Ada")).expect("insert"));
        assert!(!store.insert_student(&student("1", "Grace")).expect("insert"));

        let stored = store
            .get_student(&RollNumber::parse("1").expect("roll"))
            .expect("get")
            .expect("present");
        assert_eq!(stored.name.as_str(), "Ada");
        assert_eq!(store.student_count().expect("count"), 1);
    }

    #[test]
    fn append_requires_owner() {
        let mut store = MemoryStore::new();
        let roll = RollNumber::parse("404").expect("roll");
        let result = store.append_grade(&roll, subject("Math"), score(90));
        assert!(matches!(result, Err(GradebookError::NotFound(_))));
        assert_eq!(store.grade_count().expect("count"), 0);
    }

    #[test]
    fn grades_keep_insertion_order() {
        let mut store = MemoryStore::new();
        let s = student("1", "Ada");
        store.insert_student(&s).expect("insert");

        for (name, points) in [("Math", 80), ("Art", 90), ("Bio", 70)] {
            store
                .append_grade(&s.roll_number, subject(name), score(points))
                .expect("append");
        }

        let subjects: Vec<_> = store
            .grades_for(&s.roll_number)
            .expect("grades")
            .into_iter()
            .map(|g| g.subject.as_str().to_string())
            .collect();
        assert_eq!(subjects, vec!["Math", "Art", "Bio"]);
    }

    #[test]
    fn replace_drops_same_subject_only() {
        let mut store = MemoryStore::new();
        let s = student("1", "Ada");
        store.insert_student(&s).expect("insert");
        store
            .append_grade(&s.roll_number, subject("Math"), score(50))
            .expect("append");
        store
            .append_grade(&s.roll_number, subject("Art"), score(60))
            .expect("append");

        let new = store
            .replace_subject_grade(&s.roll_number, subject("Math"), score(95))
            .expect("replace");

        let grades = store.grades_for(&s.roll_number).expect("grades");
        assert_eq!(grades.len(), 2);
        assert_eq!(grades[0].subject.as_str(), "Art");
        assert_eq!(grades[1], new);
        assert_eq!(store.grade_count().expect("count"), 2);
    }

    #[test]
    fn remove_grade_unknown_id() {
        let mut store = MemoryStore::new();
        assert!(store.remove_grade(GradeId(7)).expect("remove").is_none());
    }

    #[test]
    fn grade_ids_not_reused_after_remove() {
        let mut store = MemoryStore::new();
        let s = student("1", "Ada");
        store.insert_student(&s).expect("insert");
        let first = store
            .append_grade(&s.roll_number, subject("Math"), score(1))
            .expect("append");
        store.remove_grade(first.id).expect("remove");
        let second = store
            .append_grade(&s.roll_number, subject("Math"), score(2))
            .expect("append");
        assert!(second.id > first.id);
    }
}
