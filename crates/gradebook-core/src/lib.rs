//! # gradebook-core
//!
//! The Student Directory and Grade Ledger of the gradebook - THE LOGIC.
//!
//! Teachers record students, enter per-subject grades and read back
//! averages. This crate holds the rules that make that data trustworthy:
//! - Roll numbers are unique across all students
//! - Every score lies in [0, 100]
//! - Every grade belongs to an existing student
//! - Averages are exact ratios, never floating-point approximations
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies (pure Rust)
//! - Storage is a `GradebookStore` passed explicitly into each operation;
//!   there is no global database handle
//! - Raw input is validated into newtypes before it reaches an operation

// =============================================================================
// MODULES
// =============================================================================

pub mod directory;
pub mod gradebook;
pub mod ledger;
pub mod primitives;
pub mod report;
pub mod storage;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Average, Grade, GradeId, GradebookError, RollNumber, Score, Student, StudentName, Subject,
    SubjectPolicy,
};

// =============================================================================
// RE-EXPORTS: Operations
// =============================================================================

pub use directory::{SortOrder, StudentDirectory, StudentFilter, StudentSummary};
pub use gradebook::{Gradebook, StorageBackend};
pub use ledger::{GradeLedger, StudentRecord};
pub use report::{ClassStat, class_stats, export_csv};
pub use storage::RedbStore;
pub use store::{GradebookStore, MemoryStore};
