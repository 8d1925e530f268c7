//! Core domain logic for the team workspace: tasks, shared documents,
//! the member roster and contribution statistics.
//! This crate is the single source of truth for business invariants.

pub mod collaborator;
pub mod config;
pub mod db;
pub mod events;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use collaborator::{
    AutoConfirm, Confirmation, DataUrlEncoder, ExternalError, FixedSelection, MemberSelector,
    PayloadEncoder, Quote, QuoteProvider, UploadSource,
};
pub use config::{StoreConfig, UploadPolicy};
pub use events::{ChangeEvent, ChangeNotifier, SubscriptionId};
pub use logging::{init_logging, logging_status, LogLevel};
pub use model::document::{format_size, Document, DocumentKind, UploadFile};
pub use model::member::Member;
pub use model::record::{Collection, Entity, Record, RecordId};
pub use model::task::{NewTask, Task, TaskPatch, TaskPriority, TaskStatus};
pub use model::validation::ValidationError;
pub use repo::kv_store::{KeyValueStore, SqliteKeyValueStore, StoreError, StoreResult};
pub use repo::record_store::RecordStore;
pub use service::contribution::{
    aggregate_contributions, ContributionRow, ContributionService, ContributionSummary,
};
pub use service::document_service::{
    search_documents, BatchUploadReport, DocumentService, UploadFailure,
};
pub use service::member_service::MemberService;
pub use service::quote_service::{fallback_quotes, quote_or_fallback};
pub use service::task_filter::{StatusFilter, TaskBoard, TaskFilter};
pub use service::task_service::TaskService;
pub use service::workspace::Workspace;
pub use service::{RemoveOutcome, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
