//! Persistence layer: key-value backend and typed collection store.
//!
//! # Responsibility
//! - Define the key-value contract the collections are persisted through.
//! - Isolate SQLite and JSON encoding details from the services.
//!
//! # Invariants
//! - Store writes enforce `Entity::validate()` before persistence.
//! - A failed write leaves the previously persisted snapshot untouched.

pub mod kv_store;
pub mod record_store;
