//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls and collaborators into use-case level APIs.
//! - Emit change notifications after successful mutations.
//! - Keep CLI/UI layers decoupled from storage details.
//!
//! # Invariants
//! - A service never notifies for a mutation that was not persisted.
//! - Missing ids are reported through `Option`/`RemoveOutcome`, never as
//!   errors.

use crate::collaborator::ExternalError;
use crate::model::record::RecordId;
use crate::model::task::TaskStatus;
use crate::model::validation::ValidationError;
use crate::repo::kv_store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod contribution;
pub mod document_service;
pub mod member_service;
pub mod quote_service;
pub mod task_filter;
pub mod task_service;
pub mod workspace;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for all use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input violates a model rule.
    Validation(ValidationError),
    /// A member with exactly this name already exists.
    DuplicateName(String),
    /// Upload larger than the configured cap.
    FileTooLarge {
        file_name: String,
        size: u64,
        max_bytes: u64,
    },
    /// Requested status change is not allowed by the task state machine.
    InvalidTransition {
        id: RecordId,
        from: TaskStatus,
        to: TaskStatus,
    },
    /// An external collaborator (encoder, quote source) failed.
    ExternalFetchFailed(ExternalError),
    /// Persistence-layer failure, including quota exhaustion.
    Store(StoreError),
}

impl ServiceError {
    /// Whether the failure came from the storage quota.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::Store(err) if err.is_quota_exceeded())
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateName(name) => write!(f, "member `{name}` already exists"),
            Self::FileTooLarge {
                file_name,
                size,
                max_bytes,
            } => write!(
                f,
                "{file_name}: {size} bytes exceeds the {} KB upload limit",
                max_bytes / 1024
            ),
            Self::InvalidTransition { id, from, to } => {
                write!(f, "task {id} cannot move from {from} to {to}")
            }
            Self::ExternalFetchFailed(err) => write!(f, "external call failed: {err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::ExternalFetchFailed(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(err) => Self::Validation(err),
            other => Self::Store(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Result of a confirmation-guarded delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// The confirmation prompt was declined; nothing changed.
    Cancelled,
    /// No record has this id; nothing changed.
    NotFound,
}
