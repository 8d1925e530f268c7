//! Model-level validation errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Violation of a model invariant detected before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Task title is empty after trimming.
    EmptyTitle,
    /// Member name is empty after trimming.
    EmptyMemberName,
    /// Due date is not a `YYYY-MM-DD` string.
    InvalidDueDate(String),
    /// `completed_at` must be present exactly when the task is completed.
    CompletionMismatch,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::EmptyMemberName => write!(f, "member name must not be empty"),
            Self::InvalidDueDate(value) => {
                write!(f, "due date `{value}` is not in YYYY-MM-DD form")
            }
            Self::CompletionMismatch => write!(
                f,
                "completed_at must be set if and only if status is completed"
            ),
        }
    }
}

impl Error for ValidationError {}
