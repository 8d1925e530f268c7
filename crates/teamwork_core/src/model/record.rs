//! Shared record envelope.
//!
//! # Responsibility
//! - Carry the identity and timestamps every collection entry has.
//! - Bind each entity type to the collection it is persisted in.
//!
//! # Invariants
//! - `id` is assigned once at creation and never changes.
//! - `updated_at` is `None` until the first update, then strictly increases.

use super::validation::ValidationError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for every record in every collection.
pub type RecordId = Uuid;

/// Named collection; the storage key doubles as the persistence key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Tasks,
    Documents,
    Members,
}

impl Collection {
    /// All collections, in initialization order.
    pub const ALL: [Collection; 3] = [Self::Tasks, Self::Documents, Self::Members];

    /// Key under which the collection is persisted.
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Tasks => "teamwork_tasks",
            Self::Documents => "teamwork_docs",
            Self::Members => "teamwork_members",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.storage_key())
    }
}

/// Entity payload that lives in exactly one collection.
pub trait Entity: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;

    /// Checks payload invariants; called on every store write.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// One persisted entity with its identity and timestamps.
///
/// Entity fields are flattened, so the stored JSON object is
/// `{ "id": .., "createdAt": .., "title": .., ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    pub id: RecordId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds of the last update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(flatten)]
    pub fields: T,
}

impl<T> Record<T> {
    /// Latest timestamp known for this record.
    pub fn last_touched_at(&self) -> i64 {
        self.updated_at.unwrap_or(self.created_at)
    }
}

impl<T> std::ops::Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.fields
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Returns a timestamp that is strictly newer than `previous`.
///
/// Two mutations inside the same millisecond still produce ordered stamps.
pub fn next_stamp_after(previous: i64) -> i64 {
    now_epoch_ms().max(previous.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::{next_stamp_after, Collection};

    #[test]
    fn storage_keys_are_distinct() {
        let keys: Vec<_> = Collection::ALL.iter().map(|c| c.storage_key()).collect();
        assert_eq!(keys, ["teamwork_tasks", "teamwork_docs", "teamwork_members"]);
    }

    #[test]
    fn next_stamp_is_strictly_newer_even_for_future_previous() {
        let far_future = i64::MAX / 2;
        assert_eq!(next_stamp_after(far_future), far_future + 1);
    }
}
