//! Member roster service.
//!
//! # Invariants
//! - Member names are unique by exact, case-sensitive match.
//! - The roster is append-only; there is no update or delete.
//! - Successful creation emits `RosterChanged`, not `DataChanged`.

use super::{ServiceError, ServiceResult};
use crate::events::{ChangeEvent, ChangeNotifier};
use crate::model::member::Member;
use crate::model::record::Record;
use crate::repo::kv_store::KeyValueStore;
use crate::repo::record_store::RecordStore;
use log::{info, warn};

pub struct MemberService<'a, K: KeyValueStore> {
    store: &'a RecordStore<K>,
    notifier: &'a ChangeNotifier,
}

impl<'a, K: KeyValueStore> MemberService<'a, K> {
    pub fn new(store: &'a RecordStore<K>, notifier: &'a ChangeNotifier) -> Self {
        Self { store, notifier }
    }

    /// Lists members in insertion order.
    pub fn list(&self) -> ServiceResult<Vec<Record<Member>>> {
        Ok(self.store.get::<Member>()?)
    }

    /// Member names in insertion order, as offered by assignee filters.
    pub fn names(&self) -> ServiceResult<Vec<String>> {
        Ok(self
            .list()?
            .into_iter()
            .map(|record| record.fields.name)
            .collect())
    }

    /// Adds a member from raw form input.
    ///
    /// # Errors
    /// - `Validation` when the trimmed name is empty.
    /// - `DuplicateName` when a member with the same trimmed name exists.
    pub fn create(&self, name: &str, role: &str) -> ServiceResult<Record<Member>> {
        let member = Member::from_input(name, role)?;

        if self
            .list()?
            .iter()
            .any(|existing| existing.name == member.name)
        {
            warn!("event=member_create module=service status=rejected error_code=duplicate_name");
            return Err(ServiceError::DuplicateName(member.name));
        }

        let record = self.store.add(member)?;
        info!(
            "event=member_create module=service status=ok id={}",
            record.id
        );
        self.notifier.notify(ChangeEvent::RosterChanged);
        Ok(record)
    }
}
