//! Typed collection store over a key-value backend.
//!
//! # Responsibility
//! - Provide get/add/update/delete/clear over the three named collections.
//! - Stamp identity and timestamps; validate payloads before every write.
//!
//! # Invariants
//! - Every write replaces the whole collection snapshot or nothing.
//! - Reads always re-fetch the full collection; nothing is cached.
//! - Update and delete on a missing id are silent no-ops.

use super::kv_store::{KeyValueStore, StoreError, StoreResult};
use crate::model::record::{next_stamp_after, now_epoch_ms, Collection, Entity, Record, RecordId};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

const EMPTY_COLLECTION: &str = "[]";
const PROTECTED_KEYS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// Persisted collection store shared by every service.
pub struct RecordStore<K: KeyValueStore> {
    backend: K,
}

impl<K: KeyValueStore> RecordStore<K> {
    pub fn new(backend: K) -> Self {
        Self { backend }
    }

    /// Creates the store and makes sure every collection key exists.
    pub fn open(backend: K) -> StoreResult<Self> {
        let store = Self::new(backend);
        store.init()?;
        Ok(store)
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }

    /// Writes an empty collection for every key that is not present yet.
    pub fn init(&self) -> StoreResult<()> {
        for collection in Collection::ALL {
            if self.backend.get_item(collection.storage_key())?.is_none() {
                self.backend
                    .set_item(collection.storage_key(), EMPTY_COLLECTION)?;
            }
        }
        Ok(())
    }

    /// Returns every record of `T`'s collection in insertion order.
    pub fn get<T: Entity>(&self) -> StoreResult<Vec<Record<T>>> {
        self.load_raw(T::COLLECTION)?
            .into_iter()
            .map(|value| decode_record(T::COLLECTION, value))
            .collect()
    }

    /// Appends a new record with a fresh id and creation stamp.
    pub fn add<T: Entity>(&self, fields: T) -> StoreResult<Record<T>> {
        fields.validate()?;

        let mut raw = self.load_raw(T::COLLECTION)?;
        let record = Record {
            id: fresh_id(&raw),
            created_at: now_epoch_ms(),
            updated_at: None,
            fields,
        };
        raw.push(serde_json::to_value(&record)?);
        self.persist_raw(T::COLLECTION, &raw)?;

        info!(
            "event=record_add module=store status=ok collection={} id={}",
            T::COLLECTION,
            record.id
        );
        Ok(record)
    }

    /// Merges `patch` over the stored record and restamps `updatedAt`.
    ///
    /// Returns `None` without writing when no record has this id. Patch keys
    /// `id`, `createdAt` and `updatedAt` are ignored.
    pub fn update<T: Entity, P: Serialize>(
        &self,
        id: RecordId,
        patch: &P,
    ) -> StoreResult<Option<Record<T>>> {
        let mut raw = self.load_raw(T::COLLECTION)?;
        let Some(index) = raw.iter().position(|value| raw_id(value) == Some(id)) else {
            debug!(
                "event=record_update module=store status=not_found collection={} id={}",
                T::COLLECTION,
                id
            );
            return Ok(None);
        };

        let Value::Object(patch_fields) = serde_json::to_value(patch)? else {
            return Err(StoreError::InvalidData(
                "update patch must serialize to an object".to_string(),
            ));
        };
        let Value::Object(mut merged) = raw[index].take() else {
            return Err(StoreError::InvalidData(format!(
                "non-object entry in collection `{}`",
                T::COLLECTION
            )));
        };
        let current: Record<T> = decode_record(T::COLLECTION, Value::Object(merged.clone()))?;

        for (key, value) in patch_fields {
            if PROTECTED_KEYS.contains(&key.as_str()) {
                continue;
            }
            merged.insert(key, value);
        }
        merged.insert(
            "updatedAt".to_string(),
            Value::from(next_stamp_after(current.last_touched_at())),
        );

        let record: Record<T> = decode_record(T::COLLECTION, Value::Object(merged))?;
        record.fields.validate()?;
        raw[index] = serde_json::to_value(&record)?;
        self.persist_raw(T::COLLECTION, &raw)?;

        info!(
            "event=record_update module=store status=ok collection={} id={}",
            T::COLLECTION,
            id
        );
        Ok(Some(record))
    }

    /// Hard-deletes the record with `id`. Returns whether one was removed.
    pub fn delete<T: Entity>(&self, id: RecordId) -> StoreResult<bool> {
        let mut raw = self.load_raw(T::COLLECTION)?;
        let before = raw.len();
        raw.retain(|value| raw_id(value) != Some(id));

        if raw.len() == before {
            debug!(
                "event=record_delete module=store status=not_found collection={} id={}",
                T::COLLECTION,
                id
            );
            return Ok(false);
        }

        self.persist_raw(T::COLLECTION, &raw)?;
        info!(
            "event=record_delete module=store status=ok collection={} id={}",
            T::COLLECTION,
            id
        );
        Ok(true)
    }

    /// Wipes every collection and reinitializes them empty. Irreversible.
    pub fn clear_all(&self) -> StoreResult<()> {
        self.backend.clear()?;
        self.init()?;
        warn!("event=store_clear module=store status=ok");
        Ok(())
    }

    fn load_raw(&self, collection: Collection) -> StoreResult<Vec<Value>> {
        let Some(text) = self.backend.get_item(collection.storage_key())? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&text).map_err(|err| {
            StoreError::InvalidData(format!("collection `{collection}` is not a JSON array: {err}"))
        })
    }

    fn persist_raw(&self, collection: Collection, records: &[Value]) -> StoreResult<()> {
        let text = serde_json::to_string(records)?;
        match self.backend.set_item(collection.storage_key(), &text) {
            Ok(()) => {
                debug!(
                    "event=store_write module=store status=ok collection={} records={} bytes={}",
                    collection,
                    records.len(),
                    text.len()
                );
                Ok(())
            }
            Err(err) => {
                if err.is_quota_exceeded() {
                    warn!(
                        "event=store_write module=store status=rejected collection={} error_code=quota_exceeded error={}",
                        collection, err
                    );
                } else {
                    warn!(
                        "event=store_write module=store status=error collection={} error={}",
                        collection, err
                    );
                }
                Err(err)
            }
        }
    }
}

fn decode_record<T: Entity>(collection: Collection, value: Value) -> StoreResult<Record<T>> {
    if !value.is_object() {
        return Err(StoreError::InvalidData(format!(
            "non-object entry in collection `{collection}`"
        )));
    }
    serde_json::from_value(value).map_err(|err| {
        StoreError::InvalidData(format!("malformed record in collection `{collection}`: {err}"))
    })
}

fn raw_id(value: &Value) -> Option<RecordId> {
    value
        .get("id")
        .and_then(Value::as_str)
        .and_then(|text| Uuid::parse_str(text).ok())
}

/// Generates a v4 id that is not already used in `existing`.
fn fresh_id(existing: &[Value]) -> RecordId {
    loop {
        let id = Uuid::new_v4();
        if !existing.iter().any(|value| raw_id(value) == Some(id)) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RecordStore;
    use crate::db::open_db_in_memory;
    use crate::model::member::Member;
    use crate::model::record::Collection;
    use crate::repo::kv_store::{KeyValueStore, SqliteKeyValueStore};

    #[test]
    fn open_initializes_every_collection_as_empty_array() {
        let conn = open_db_in_memory().unwrap();
        let store = RecordStore::open(SqliteKeyValueStore::new(&conn)).unwrap();

        for collection in Collection::ALL {
            let stored = store.backend().get_item(collection.storage_key()).unwrap();
            assert_eq!(stored.as_deref(), Some("[]"));
        }
    }

    #[test]
    fn records_are_stored_as_camel_case_json() {
        let conn = open_db_in_memory().unwrap();
        let store = RecordStore::open(SqliteKeyValueStore::new(&conn)).unwrap();

        let record = store
            .add(Member {
                name: "Alice".to_string(),
                role: "lead".to_string(),
            })
            .unwrap();

        let text = store
            .backend()
            .get_item(Collection::Members.storage_key())
            .unwrap()
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["id"], record.id.to_string());
        assert_eq!(parsed[0]["name"], "Alice");
        assert!(parsed[0]["createdAt"].is_i64());
        assert!(parsed[0].get("updatedAt").is_none());
    }

    #[test]
    fn malformed_collection_is_reported_not_masked() {
        let conn = open_db_in_memory().unwrap();
        let store = RecordStore::open(SqliteKeyValueStore::new(&conn)).unwrap();
        store
            .backend()
            .set_item(Collection::Members.storage_key(), "{not json")
            .unwrap();

        let err = store.get::<Member>().unwrap_err();
        assert!(err.to_string().contains("teamwork_members"));
    }
}
