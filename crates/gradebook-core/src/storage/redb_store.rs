//! # redb-backed Gradebook Storage
//!
//! A disk-backed store using the redb embedded database.
//!
//! redb provides:
//! - ACID transactions
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//! - Zero configuration
//!
//! Every `GradebookStore` method runs in exactly one redb transaction, so an
//! operation either commits completely or leaves the file untouched.
//!
//! ## Layout
//!
//! | Table          | Key                     | Value                  |
//! |----------------|-------------------------|------------------------|
//! | `students`     | roll number             | postcard `Student`     |
//! | `grades`       | (roll number, grade id) | postcard `Grade`       |
//! | `grade_owners` | grade id                | roll number            |
//! | `metadata`     | name                    | u64                    |
//!
//! Keying grades by (owner, id) makes "grades of one student in insertion
//! order" a single range scan.

use crate::store::GradebookStore;
use crate::{Grade, GradeId, GradebookError, RollNumber, Score, Student, Subject};
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Table for students: roll number -> serialized Student bytes
const STUDENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("students");

/// Table for grades: (owner roll number, grade id) -> serialized Grade bytes
const GRADES: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("grades");

/// Reverse index for deletion by id: grade id -> owner roll number
const GRADE_OWNERS: TableDefinition<u64, &str> = TableDefinition::new("grade_owners");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_GRADE_ID: &str = "next_grade_id";

fn io_err(e: impl std::fmt::Display) -> GradebookError {
    GradebookError::IoError(e.to_string())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, GradebookError> {
    postcard::to_allocvec(value).map_err(|e| GradebookError::SerializationError(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, GradebookError> {
    postcard::from_bytes(bytes).map_err(|e| GradebookError::SerializationError(e.to_string()))
}

/// A disk-backed gradebook store using redb.
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
    /// Next available grade id, mirrored from the metadata table.
    next_grade_id: u64,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("next_grade_id", &self.next_grade_id)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a gradebook database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GradebookError> {
        let db = Database::create(path.as_ref()).map_err(io_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(io_err)?;
            write_txn.open_table(STUDENTS).map_err(io_err)?;
            write_txn.open_table(GRADES).map_err(io_err)?;
            write_txn.open_table(GRADE_OWNERS).map_err(io_err)?;
            write_txn.open_table(METADATA).map_err(io_err)?;
            write_txn.commit().map_err(io_err)?;
        }

        let next_grade_id = {
            let read_txn = db.begin_read().map_err(io_err)?;
            let table = read_txn.open_table(METADATA).map_err(io_err)?;
            table
                .get(NEXT_GRADE_ID)
                .map_err(io_err)?
                .map(|v| v.value())
                .unwrap_or(0)
        };

        Ok(Self { db, next_grade_id })
    }

    /// Append a grade inside an open write transaction.
    ///
    /// Checks the owner, writes the grade and its reverse index entry, and
    /// advances the id counter. The caller commits.
    fn append_in(
        txn: &WriteTransaction,
        id: u64,
        owner: &RollNumber,
        subject: Subject,
        score: Score,
    ) -> Result<Grade, GradebookError> {
        {
            let students = txn.open_table(STUDENTS).map_err(io_err)?;
            if students.get(owner.as_str()).map_err(io_err)?.is_none() {
                return Err(GradebookError::NotFound(owner.clone()));
            }
        }

        let grade = Grade {
            id: GradeId(id),
            owner: owner.clone(),
            subject,
            score,
        };
        let bytes = encode(&grade)?;

        {
            let mut grades = txn.open_table(GRADES).map_err(io_err)?;
            grades
                .insert((owner.as_str(), id), bytes.as_slice())
                .map_err(io_err)?;
        }
        {
            let mut owners = txn.open_table(GRADE_OWNERS).map_err(io_err)?;
            owners.insert(id, owner.as_str()).map_err(io_err)?;
        }
        {
            let mut meta = txn.open_table(METADATA).map_err(io_err)?;
            meta.insert(NEXT_GRADE_ID, id.saturating_add(1))
                .map_err(io_err)?;
        }

        Ok(grade)
    }

    fn commit_append(&mut self, txn: WriteTransaction, grade: &Grade) -> Result<(), GradebookError> {
        txn.commit().map_err(io_err)?;
        // Update in-memory state only after successful commit.
        self.next_grade_id = grade.id.0.saturating_add(1);
        Ok(())
    }
}

// =============================================================================
// GRADEBOOKSTORE TRAIT IMPLEMENTATION
// =============================================================================

impl GradebookStore for RedbStore {
    fn insert_student(&mut self, student: &Student) -> Result<bool, GradebookError> {
        let bytes = encode(student)?;
        let key = student.roll_number.as_str();

        let write_txn = self.db.begin_write().map_err(io_err)?;
        let inserted = {
            let mut table = write_txn.open_table(STUDENTS).map_err(io_err)?;
            let taken = table.get(key).map_err(io_err)?.is_some();
            if !taken {
                table.insert(key, bytes.as_slice()).map_err(io_err)?;
            }
            !taken
        };

        if inserted {
            write_txn.commit().map_err(io_err)?;
        } else {
            write_txn.abort().map_err(io_err)?;
        }
        Ok(inserted)
    }

    fn get_student(&self, roll_number: &RollNumber) -> Result<Option<Student>, GradebookError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(STUDENTS).map_err(io_err)?;

        match table.get(roll_number.as_str()).map_err(io_err)? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    fn students(&self) -> Result<Vec<Student>, GradebookError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(STUDENTS).map_err(io_err)?;

        let mut students = Vec::new();
        for entry in table.iter().map_err(io_err)? {
            let (_, value) = entry.map_err(io_err)?;
            students.push(decode(value.value())?);
        }
        Ok(students)
    }

    fn append_grade(
        &mut self,
        owner: &RollNumber,
        subject: Subject,
        score: Score,
    ) -> Result<Grade, GradebookError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let grade = Self::append_in(&write_txn, self.next_grade_id, owner, subject, score)?;
        self.commit_append(write_txn, &grade)?;
        Ok(grade)
    }

    fn replace_subject_grade(
        &mut self,
        owner: &RollNumber,
        subject: Subject,
        score: Score,
    ) -> Result<Grade, GradebookError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let key = owner.as_str();

        {
            let mut grades = write_txn.open_table(GRADES).map_err(io_err)?;
            let mut owners = write_txn.open_table(GRADE_OWNERS).map_err(io_err)?;

            let mut stale = Vec::new();
            for entry in grades
                .range((key, 0u64)..=(key, u64::MAX))
                .map_err(io_err)?
            {
                let (k, value) = entry.map_err(io_err)?;
                let grade: Grade = decode(value.value())?;
                if grade.subject == subject {
                    stale.push(k.value().1);
                }
            }

            for id in stale {
                grades.remove((key, id)).map_err(io_err)?;
                owners.remove(id).map_err(io_err)?;
            }
        }

        // A missing owner fails here and the dropped transaction discards
        // the (empty) removals above.
        let grade = Self::append_in(&write_txn, self.next_grade_id, owner, subject, score)?;
        self.commit_append(write_txn, &grade)?;
        Ok(grade)
    }

    fn grades_for(&self, owner: &RollNumber) -> Result<Vec<Grade>, GradebookError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(GRADES).map_err(io_err)?;
        let key = owner.as_str();

        let mut grades = Vec::new();
        for entry in table
            .range((key, 0u64)..=(key, u64::MAX))
            .map_err(io_err)?
        {
            let (_, value) = entry.map_err(io_err)?;
            grades.push(decode(value.value())?);
        }
        Ok(grades)
    }

    fn remove_grade(&mut self, id: GradeId) -> Result<Option<Grade>, GradebookError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;

        let removed = {
            let mut owners = write_txn.open_table(GRADE_OWNERS).map_err(io_err)?;
            let owner = owners
                .remove(id.0)
                .map_err(io_err)?
                .map(|guard| guard.value().to_string());

            match owner {
                Some(owner) => {
                    let mut grades = write_txn.open_table(GRADES).map_err(io_err)?;
                    let bytes = grades
                        .remove((owner.as_str(), id.0))
                        .map_err(io_err)?
                        .map(|guard| guard.value().to_vec());
                    bytes.map(|b| decode::<Grade>(&b)).transpose()?
                }
                None => None,
            }
        };

        if removed.is_some() {
            write_txn.commit().map_err(io_err)?;
        } else {
            write_txn.abort().map_err(io_err)?;
        }
        Ok(removed)
    }

    fn student_count(&self) -> Result<usize, GradebookError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(STUDENTS).map_err(io_err)?;
        Ok(table.len().map_err(io_err)? as usize)
    }

    fn grade_count(&self) -> Result<usize, GradebookError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(GRADE_OWNERS).map_err(io_err)?;
        Ok(table.len().map_err(io_err)? as usize)
    }
}

// =============================================================================
// TESTS
// =============================================================================
