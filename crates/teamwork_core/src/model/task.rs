//! Task domain model.
//!
//! # Responsibility
//! - Define the task payload, priority and status enums.
//! - Own the status state machine rules.
//!
//! # Invariants
//! - New tasks start as `todo`.
//! - `completed_at` is present iff `status == Completed`.
//! - Nothing transitions out of `Completed`.

use super::record::{Collection, Entity};
use super::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static DUE_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid due date regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Display for TaskPriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("invalid task priority `{other}`")),
        }
    }
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Created but not started.
    #[default]
    Todo,
    /// Work is in progress.
    InProgress,
    /// Terminal; stamped with `completed_at`.
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    /// Whether an explicit action may move a task from `self` to `next`.
    ///
    /// Re-applying `in-progress` is accepted as a no-op transition.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (Self::Todo, Self::InProgress)
                | (Self::InProgress, Self::InProgress)
                | (Self::Todo | Self::InProgress, Self::Completed)
        )
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "todo" => Ok(Self::Todo),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(format!("invalid task status `{other}`")),
        }
    }
}

/// Persisted task payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    pub assigned_to: String,
    #[serde(default)]
    pub status: TaskStatus,
    /// Unix epoch milliseconds; set only on completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

impl Entity for Task {
    const COLLECTION: Collection = Collection::Tasks;

    fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if let Some(due_date) = &self.due_date {
            if !DUE_DATE_RE.is_match(due_date) {
                return Err(ValidationError::InvalidDueDate(due_date.clone()));
            }
        }
        if self.is_completed() != self.completed_at.is_some() {
            return Err(ValidationError::CompletionMismatch);
        }
        Ok(())
    }
}

/// User-entered fields for a new task; the assignee is chosen separately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: TaskPriority,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Builds the persisted payload with status `todo`.
    ///
    /// Blank description and due date inputs are stored as absent.
    pub fn into_task(self, assigned_to: impl Into<String>) -> Task {
        Task {
            title: self.title.trim().to_string(),
            description: non_blank(self.description),
            due_date: non_blank(self.due_date),
            priority: self.priority,
            assigned_to: assigned_to.into(),
            status: TaskStatus::Todo,
            completed_at: None,
        }
    }
}

/// Partial update applied over a stored task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
