//! Composition root tying one store and one notifier to every service.
//!
//! # Responsibility
//! - Hand out services that share the same store handle and notifier.
//! - Own the confirmation-guarded full reset.

use super::contribution::ContributionService;
use super::document_service::DocumentService;
use super::member_service::MemberService;
use super::task_service::TaskService;
use super::ServiceResult;
use crate::collaborator::Confirmation;
use crate::config::UploadPolicy;
use crate::events::{ChangeEvent, ChangeNotifier};
use crate::repo::kv_store::KeyValueStore;
use crate::repo::record_store::RecordStore;
use log::info;

const RESET_PROMPT: &str =
    "All files, tasks and members will be deleted. This cannot be undone. Continue?";

/// Borrowed view over the session's store and notifier.
pub struct Workspace<'a, K: KeyValueStore> {
    store: &'a RecordStore<K>,
    notifier: &'a ChangeNotifier,
    upload_policy: UploadPolicy,
}

impl<'a, K: KeyValueStore> Workspace<'a, K> {
    pub fn new(store: &'a RecordStore<K>, notifier: &'a ChangeNotifier) -> Self {
        Self {
            store,
            notifier,
            upload_policy: UploadPolicy::default(),
        }
    }

    pub fn with_upload_policy(mut self, upload_policy: UploadPolicy) -> Self {
        self.upload_policy = upload_policy;
        self
    }

    pub fn store(&self) -> &'a RecordStore<K> {
        self.store
    }

    pub fn notifier(&self) -> &'a ChangeNotifier {
        self.notifier
    }

    pub fn tasks(&self) -> TaskService<'a, K> {
        TaskService::new(self.store, self.notifier)
    }

    pub fn documents(&self) -> DocumentService<'a, K> {
        DocumentService::with_policy(self.store, self.notifier, self.upload_policy)
    }

    pub fn members(&self) -> MemberService<'a, K> {
        MemberService::new(self.store, self.notifier)
    }

    pub fn contribution(&self) -> ContributionService<'a, K> {
        ContributionService::new(self.store)
    }

    /// Wipes every collection after confirmation.
    ///
    /// Returns whether the reset happened.
    pub fn reset_all(&self, confirmation: &dyn Confirmation) -> ServiceResult<bool> {
        if !confirmation.confirm(RESET_PROMPT) {
            info!("event=workspace_reset module=service status=cancelled");
            return Ok(false);
        }

        self.store.clear_all()?;
        info!("event=workspace_reset module=service status=ok");
        self.notifier.notify(ChangeEvent::Reset);
        Ok(true)
    }
}
