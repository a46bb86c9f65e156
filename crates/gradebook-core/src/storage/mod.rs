//! # Storage Module
//!
//! Persistent storage backends for the gradebook.

mod redb_store;

pub use redb_store::RedbStore;
