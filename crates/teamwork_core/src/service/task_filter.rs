//! Task list filtering.
//!
//! # Responsibility
//! - Apply search/status/priority/assignee filters to a task list.
//! - Split a filtered list into active and completed boards.
//!
//! # Invariants
//! - Filtering is pure and order-preserving.
//! - The default filter passes every task through.

use crate::model::record::Record;
use crate::model::task::{Task, TaskPriority, TaskStatus};
use std::str::FromStr;

/// Status selector; `Pending` is the list alias for stored `todo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    InProgress,
    Completed,
}

impl StatusFilter {
    pub fn matches(self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status == TaskStatus::Todo,
            Self::InProgress => status == TaskStatus::InProgress,
            Self::Completed => status == TaskStatus::Completed,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "" | "all" => Ok(Self::All),
            "pending" | "todo" => Ok(Self::Pending),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(format!("invalid status filter `{other}`")),
        }
    }
}

/// Combined task filter. Every criterion must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring of title or description; empty matches all.
    pub search: String,
    pub status: StatusFilter,
    /// `None` means all priorities.
    pub priority: Option<TaskPriority>,
    /// Exact assignee name; `None` means all assignees.
    pub assignee: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_search(task)
            && self.status.matches(task.status)
            && self.priority.map_or(true, |priority| task.priority == priority)
            && self
                .assignee
                .as_deref()
                .map_or(true, |assignee| task.assigned_to == assignee)
    }

    fn matches_search(&self, task: &Task) -> bool {
        let needle = self.search.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        task.title.to_lowercase().contains(&needle)
            || task
                .description
                .as_deref()
                .is_some_and(|description| description.to_lowercase().contains(&needle))
    }

    /// Returns matching tasks in their original order.
    pub fn apply(&self, tasks: &[Record<Task>]) -> Vec<Record<Task>> {
        tasks
            .iter()
            .filter(|record| self.matches(&record.fields))
            .cloned()
            .collect()
    }
}

/// Filtered tasks split by completion, as shown side by side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskBoard {
    pub active: Vec<Record<Task>>,
    pub completed: Vec<Record<Task>>,
}

impl TaskBoard {
    pub fn split(tasks: Vec<Record<Task>>) -> Self {
        let (completed, active): (Vec<_>, Vec<_>) =
            tasks.into_iter().partition(|record| record.is_completed());
        Self { active, completed }
    }
}
