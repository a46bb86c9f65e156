//! # Gradebook
//!
//! The context object the outer layers hold: one storage backend plus the
//! duplicate-subject policy, forwarding to the Student Directory and the
//! Grade Ledger.
//!
//! ## Storage Backends
//!
//! - `InMemory`: Uses `MemoryStore` (fast, volatile)
//! - `Persistent`: Uses `RedbStore` for disk-backed ACID storage

use crate::directory::{StudentDirectory, StudentFilter, StudentSummary};
use crate::ledger::{GradeLedger, StudentRecord};
use crate::report::{self, ClassStat};
use crate::storage::RedbStore;
use crate::store::{GradebookStore, MemoryStore};
use crate::{
    Average, Grade, GradeId, GradebookError, RollNumber, Score, Student, StudentName, Subject,
    SubjectPolicy,
};
use std::path::Path;

/// Storage backend for a Gradebook.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory store (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed store using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

/// A gradebook: a store and the policy applied to new grades.
///
/// Inputs are the validated newtypes from `types`; raw strings are parsed
/// by the caller.
#[derive(Debug, Default)]
pub struct Gradebook {
    backend: StorageBackend,
    policy: SubjectPolicy,
}

impl Gradebook {
    /// Create an empty in-memory gradebook.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open or create a persistent gradebook at `path`.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, GradebookError> {
        Ok(Self::with_backend(StorageBackend::Persistent(
            RedbStore::open(path)?,
        )))
    }

    #[must_use]
    pub fn with_backend(backend: StorageBackend) -> Self {
        Self {
            backend,
            policy: SubjectPolicy::default(),
        }
    }

    /// Set the duplicate-subject policy.
    #[must_use]
    pub fn with_policy(mut self, policy: SubjectPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> SubjectPolicy {
        self.policy
    }

    /// Check if using persistent storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    fn store(&self) -> &dyn GradebookStore {
        match &self.backend {
            StorageBackend::InMemory(s) => s,
            StorageBackend::Persistent(s) => s,
        }
    }

    fn store_mut(&mut self) -> &mut dyn GradebookStore {
        match &mut self.backend {
            StorageBackend::InMemory(s) => s,
            StorageBackend::Persistent(s) => s,
        }
    }

    // =========================================================================
    // STUDENT DIRECTORY
    // =========================================================================

    pub fn add_student(
        &mut self,
        name: StudentName,
        roll_number: RollNumber,
    ) -> Result<Student, GradebookError> {
        StudentDirectory::add_student(self.store_mut(), name, roll_number)
    }

    pub fn get_student(&self, roll_number: &RollNumber) -> Result<Student, GradebookError> {
        StudentDirectory::get_student(self.store(), roll_number)
    }

    pub fn list_students(
        &self,
        filter: &StudentFilter,
    ) -> Result<Vec<StudentSummary>, GradebookError> {
        StudentDirectory::list_students(self.store(), filter)
    }

    // =========================================================================
    // GRADE LEDGER
    // =========================================================================

    /// Record a grade under the configured `SubjectPolicy`.
    pub fn add_grade(
        &mut self,
        roll_number: &RollNumber,
        subject: Subject,
        score: Score,
    ) -> Result<Grade, GradebookError> {
        let policy = self.policy;
        GradeLedger::add_grade(self.store_mut(), roll_number, subject, score, policy)
    }

    pub fn get_grades(&self, roll_number: &RollNumber) -> Result<Vec<Grade>, GradebookError> {
        GradeLedger::get_grades(self.store(), roll_number)
    }

    pub fn average(&self, roll_number: &RollNumber) -> Result<Average, GradebookError> {
        GradeLedger::average(self.store(), roll_number)
    }

    pub fn remove_grade(&mut self, id: GradeId) -> Result<Grade, GradebookError> {
        GradeLedger::remove_grade(self.store_mut(), id)
    }

    pub fn student_record(
        &self,
        roll_number: &RollNumber,
    ) -> Result<StudentRecord, GradebookError> {
        GradeLedger::student_record(self.store(), roll_number)
    }

    // =========================================================================
    // REPORTS & METRICS
    // =========================================================================

    pub fn class_stats(&self) -> Result<Vec<ClassStat>, GradebookError> {
        report::class_stats(self.store())
    }

    pub fn export_csv(&self) -> Result<String, GradebookError> {
        report::export_csv(self.store())
    }

    pub fn student_count(&self) -> Result<usize, GradebookError> {
        self.store().student_count()
    }

    pub fn grade_count(&self) -> Result<usize, GradebookError> {
        self.store().grade_count()
    }
}

// =============================================================================
// TESTS
// =============================================================================
