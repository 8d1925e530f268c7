//! Document use-case service.
//!
//! # Responsibility
//! - Accept uploads under the size cap and persist encoded payloads.
//! - Run batch uploads where one bad file never blocks the rest.
//! - Search and remove documents.
//!
//! # Invariants
//! - Files larger than the cap are never encoded nor written.
//! - One `DataChanged` is emitted per successful upload or removal.
//! - Search results are most-recently-added first.

use super::{RemoveOutcome, ServiceError, ServiceResult};
use crate::collaborator::{Confirmation, MemberSelector, PayloadEncoder, UploadSource};
use crate::config::UploadPolicy;
use crate::events::{ChangeEvent, ChangeNotifier};
use crate::model::document::{Document, UploadFile};
use crate::model::member::Member;
use crate::model::record::{Record, RecordId};
use crate::repo::kv_store::KeyValueStore;
use crate::repo::record_store::RecordStore;
use log::{info, warn};

const UPLOADER_PROMPT: &str = "Choose the member uploading these files";
const REMOVE_PROMPT: &str = "Delete this document?";

/// One file that could not be uploaded in a batch.
#[derive(Debug)]
pub struct UploadFailure {
    pub file_name: String,
    pub error: ServiceError,
}

/// Per-file results of a batch upload.
#[derive(Debug, Default)]
pub struct BatchUploadReport {
    pub uploaded: Vec<Record<Document>>,
    pub failed: Vec<UploadFailure>,
}

impl BatchUploadReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Document service over a shared store and notifier.
pub struct DocumentService<'a, K: KeyValueStore> {
    store: &'a RecordStore<K>,
    notifier: &'a ChangeNotifier,
    policy: UploadPolicy,
}

impl<'a, K: KeyValueStore> DocumentService<'a, K> {
    pub fn new(store: &'a RecordStore<K>, notifier: &'a ChangeNotifier) -> Self {
        Self::with_policy(store, notifier, UploadPolicy::default())
    }

    pub fn with_policy(
        store: &'a RecordStore<K>,
        notifier: &'a ChangeNotifier,
        policy: UploadPolicy,
    ) -> Self {
        Self {
            store,
            notifier,
            policy,
        }
    }

    /// Lists documents in insertion order.
    pub fn list(&self) -> ServiceResult<Vec<Record<Document>>> {
        Ok(self.store.get::<Document>()?)
    }

    /// Uploads one file on behalf of `uploader`.
    pub fn upload(
        &self,
        file: &UploadFile,
        uploader: &str,
        encoder: &dyn PayloadEncoder,
    ) -> ServiceResult<Record<Document>> {
        let size = file.size();
        self.check_size(&file.file_name, size)?;

        let data = encoder
            .encode(file)
            .map_err(ServiceError::ExternalFetchFailed)?;
        let record = self.store.add(Document {
            title: file.file_name.clone(),
            file_name: file.file_name.clone(),
            file_type: file.file_type.clone(),
            size,
            uploaded_by: uploader.to_string(),
            data,
        })?;

        info!(
            "event=document_upload module=service status=ok id={} size={}",
            record.id, size
        );
        self.notifier.notify(ChangeEvent::DataChanged);
        Ok(record)
    }

    /// Uploads `sources` sequentially for one uploader chosen by `selector`.
    ///
    /// Returns `Ok(None)` without touching any source when the roster is
    /// empty or no uploader is chosen. Each source is sized before it is
    /// loaded, so oversized payloads are never read. Per-file failures are
    /// collected in the report and do not stop later files.
    pub fn upload_batch<S: UploadSource>(
        &self,
        sources: &[S],
        selector: &dyn MemberSelector,
        encoder: &dyn PayloadEncoder,
    ) -> ServiceResult<Option<BatchUploadReport>> {
        if sources.is_empty() {
            return Ok(Some(BatchUploadReport::default()));
        }

        let roster = self.store.get::<Member>()?;
        if roster.is_empty() {
            warn!("event=document_batch module=service status=aborted reason=empty_roster");
            return Ok(None);
        }
        let Some(uploader) = selector.select_member(UPLOADER_PROMPT, &roster) else {
            info!("event=document_batch module=service status=aborted reason=no_uploader");
            return Ok(None);
        };

        let mut report = BatchUploadReport::default();
        for source in sources {
            match self.upload_source(source, &uploader, encoder) {
                Ok(record) => report.uploaded.push(record),
                Err(error) => {
                    warn!(
                        "event=document_batch module=service status=item_failed error={}",
                        error
                    );
                    report.failed.push(UploadFailure {
                        file_name: source.file_name().to_string(),
                        error,
                    });
                }
            }
        }

        info!(
            "event=document_batch module=service status=ok uploaded={} failed={}",
            report.uploaded.len(),
            report.failed.len()
        );
        Ok(Some(report))
    }

    /// Returns documents whose title contains `term`, newest first.
    pub fn search(&self, term: &str) -> ServiceResult<Vec<Record<Document>>> {
        Ok(search_documents(self.list()?, term))
    }

    /// Deletes a document after confirmation.
    pub fn remove(
        &self,
        id: RecordId,
        confirmation: &dyn Confirmation,
    ) -> ServiceResult<RemoveOutcome> {
        if !self.list()?.iter().any(|record| record.id == id) {
            return Ok(RemoveOutcome::NotFound);
        }
        if !confirmation.confirm(REMOVE_PROMPT) {
            return Ok(RemoveOutcome::Cancelled);
        }
        if !self.store.delete::<Document>(id)? {
            return Ok(RemoveOutcome::NotFound);
        }

        self.notifier.notify(ChangeEvent::DataChanged);
        Ok(RemoveOutcome::Removed)
    }

    fn upload_source<S: UploadSource>(
        &self,
        source: &S,
        uploader: &str,
        encoder: &dyn PayloadEncoder,
    ) -> ServiceResult<Record<Document>> {
        let size = source.size().map_err(ServiceError::ExternalFetchFailed)?;
        self.check_size(source.file_name(), size)?;
        let file = source.load().map_err(ServiceError::ExternalFetchFailed)?;
        self.upload(&file, uploader, encoder)
    }

    fn check_size(&self, file_name: &str, size: u64) -> ServiceResult<()> {
        if self.policy.accepts(size) {
            return Ok(());
        }
        warn!(
            "event=document_upload module=service status=rejected error_code=file_too_large size={} max={}",
            size, self.policy.max_file_bytes
        );
        Err(ServiceError::FileTooLarge {
            file_name: file_name.to_string(),
            size,
            max_bytes: self.policy.max_file_bytes,
        })
    }
}

/// Case-insensitive title search over `documents`, newest first.
pub fn search_documents(documents: Vec<Record<Document>>, term: &str) -> Vec<Record<Document>> {
    let needle = term.to_lowercase();
    documents
        .into_iter()
        .rev()
        .filter(|record| record.title.to_lowercase().contains(&needle))
        .collect()
}
