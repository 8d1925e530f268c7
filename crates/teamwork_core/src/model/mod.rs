//! Domain model for the three team collections.
//!
//! # Responsibility
//! - Define the persisted shapes of tasks, documents and members.
//! - Provide the shared `Record<T>` envelope carrying id and timestamps.
//!
//! # Invariants
//! - Every record is identified by a stable `RecordId` that is never reused.
//! - Deletion is a hard delete; there are no tombstones.
//! - Member names are the join key across collections and are not enforced
//!   referentially.

pub mod document;
pub mod member;
pub mod record;
pub mod task;
pub mod validation;
