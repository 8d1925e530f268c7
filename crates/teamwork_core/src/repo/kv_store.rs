//! Key-value persistence contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide string-keyed, string-valued storage with a total byte quota.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - A write that would exceed the quota writes nothing.
//! - `set_item` replaces the whole value for a key in one statement.

use crate::config::StoreConfig;
use crate::db::DbError;
use crate::model::validation::ValidationError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence-layer error for key-value and collection operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Write rejected because the store would grow past its byte budget.
    QuotaExceeded {
        key: String,
        required_bytes: u64,
        quota_bytes: u64,
    },
    Validation(ValidationError),
    Serialization(serde_json::Error),
    InvalidData(String),
}

impl StoreError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::QuotaExceeded {
                key,
                required_bytes,
                quota_bytes,
            } => write!(
                f,
                "storage quota exceeded writing `{key}`: {required_bytes} bytes needed, {quota_bytes} allowed"
            ),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::QuotaExceeded { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// String key-value storage, the local analogue of browser storage.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;
    /// Removes every key.
    fn clear(&self) -> StoreResult<()>;
    /// Bytes currently held, counting both keys and values.
    fn used_bytes(&self) -> StoreResult<u64>;
}

/// SQLite-backed key-value store over the `kv_store` table.
pub struct SqliteKeyValueStore<'conn> {
    conn: &'conn Connection,
    config: StoreConfig,
}

impl<'conn> SqliteKeyValueStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_config(conn, StoreConfig::default())
    }

    pub fn with_config(conn: &'conn Connection, config: StoreConfig) -> Self {
        Self { conn, config }
    }

    pub fn quota_bytes(&self) -> u64 {
        self.config.quota_bytes
    }
}

impl KeyValueStore for SqliteKeyValueStore<'_> {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        let used_by_others: i64 = tx.query_row(
            "SELECT COALESCE(SUM(length(CAST(key AS BLOB)) + length(CAST(value AS BLOB))), 0)
             FROM kv_store
             WHERE key <> ?1;",
            [key],
            |row| row.get(0),
        )?;
        let required_bytes =
            u64::try_from(used_by_others).unwrap_or(0) + (key.len() + value.len()) as u64;

        if required_bytes > self.config.quota_bytes {
            // Dropping `tx` rolls back; nothing was written.
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                required_bytes,
                quota_bytes: self.config.quota_bytes,
            });
        }

        tx.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        self.conn.execute("DELETE FROM kv_store;", [])?;
        Ok(())
    }

    fn used_bytes(&self) -> StoreResult<u64> {
        let used: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(length(CAST(key AS BLOB)) + length(CAST(value AS BLOB))), 0)
             FROM kv_store;",
            [],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(used).unwrap_or(0))
    }
}
