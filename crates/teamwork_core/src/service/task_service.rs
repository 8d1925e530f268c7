//! Task use-case service.
//!
//! # Responsibility
//! - Create tasks once an assignee has been chosen.
//! - Drive the status state machine (`todo → in-progress → completed`).
//! - Remove tasks behind a confirmation prompt.
//!
//! # Invariants
//! - New tasks start as `todo`.
//! - `completed_at` is stamped exactly when a task becomes `completed`.
//! - `DataChanged` is emitted only after a successful write.

use super::task_filter::{TaskBoard, TaskFilter};
use super::{RemoveOutcome, ServiceError, ServiceResult};
use crate::collaborator::{Confirmation, MemberSelector};
use crate::events::{ChangeEvent, ChangeNotifier};
use crate::model::member::Member;
use crate::model::record::{now_epoch_ms, Entity, Record, RecordId};
use crate::model::task::{NewTask, Task, TaskPatch, TaskStatus};
use crate::repo::kv_store::KeyValueStore;
use crate::repo::record_store::RecordStore;
use log::{info, warn};

const ASSIGNEE_PROMPT: &str = "Choose the member responsible for this task";
const REMOVE_PROMPT: &str = "Delete this task?";

/// Task service over a shared store and notifier.
pub struct TaskService<'a, K: KeyValueStore> {
    store: &'a RecordStore<K>,
    notifier: &'a ChangeNotifier,
}

impl<'a, K: KeyValueStore> TaskService<'a, K> {
    pub fn new(store: &'a RecordStore<K>, notifier: &'a ChangeNotifier) -> Self {
        Self { store, notifier }
    }

    /// Lists all tasks in insertion order.
    pub fn list(&self) -> ServiceResult<Vec<Record<Task>>> {
        Ok(self.store.get::<Task>()?)
    }

    /// Gets one task by id.
    pub fn get(&self, id: RecordId) -> ServiceResult<Option<Record<Task>>> {
        Ok(self.list()?.into_iter().find(|record| record.id == id))
    }

    /// Lists tasks matching `filter`.
    pub fn filter(&self, filter: &TaskFilter) -> ServiceResult<Vec<Record<Task>>> {
        Ok(filter.apply(&self.list()?))
    }

    /// Filters and splits tasks into active and completed lists.
    pub fn board(&self, filter: &TaskFilter) -> ServiceResult<TaskBoard> {
        Ok(TaskBoard::split(self.filter(filter)?))
    }

    /// Creates a task assigned to the member picked by `selector`.
    ///
    /// # Contract
    /// - Input is validated before the selector is consulted.
    /// - Returns `Ok(None)` with no side effect when the roster is empty or no
    ///   member is chosen.
    pub fn create(
        &self,
        new_task: NewTask,
        selector: &dyn MemberSelector,
    ) -> ServiceResult<Option<Record<Task>>> {
        let draft = new_task.into_task(String::new());
        draft.validate()?;

        let roster = self.store.get::<Member>()?;
        if roster.is_empty() {
            warn!("event=task_create module=service status=aborted reason=empty_roster");
            return Ok(None);
        }
        let Some(assignee) = selector.select_member(ASSIGNEE_PROMPT, &roster) else {
            info!("event=task_create module=service status=aborted reason=no_assignee");
            return Ok(None);
        };

        let record = self.store.add(Task {
            assigned_to: assignee,
            ..draft
        })?;
        self.notifier.notify(ChangeEvent::DataChanged);
        Ok(Some(record))
    }

    /// Moves a task to `status`.
    ///
    /// `Completed` is routed through [`TaskService::complete`] so the
    /// completion stamp is never skipped. Returns `Ok(None)` for a missing id.
    pub fn set_status(
        &self,
        id: RecordId,
        status: TaskStatus,
    ) -> ServiceResult<Option<Record<Task>>> {
        if status == TaskStatus::Completed {
            return self.complete(id);
        }

        self.transition(
            id,
            status,
            TaskPatch {
                status: Some(status),
                completed_at: None,
            },
        )
    }

    /// Marks a task completed and stamps `completed_at`.
    pub fn complete(&self, id: RecordId) -> ServiceResult<Option<Record<Task>>> {
        self.transition(
            id,
            TaskStatus::Completed,
            TaskPatch {
                status: Some(TaskStatus::Completed),
                completed_at: Some(now_epoch_ms()),
            },
        )
    }

    /// Deletes a task after confirmation.
    pub fn remove(
        &self,
        id: RecordId,
        confirmation: &dyn Confirmation,
    ) -> ServiceResult<RemoveOutcome> {
        if self.get(id)?.is_none() {
            return Ok(RemoveOutcome::NotFound);
        }
        if !confirmation.confirm(REMOVE_PROMPT) {
            return Ok(RemoveOutcome::Cancelled);
        }
        if !self.store.delete::<Task>(id)? {
            return Ok(RemoveOutcome::NotFound);
        }

        self.notifier.notify(ChangeEvent::DataChanged);
        Ok(RemoveOutcome::Removed)
    }

    fn transition(
        &self,
        id: RecordId,
        to: TaskStatus,
        patch: TaskPatch,
    ) -> ServiceResult<Option<Record<Task>>> {
        let Some(current) = self.get(id)? else {
            return Ok(None);
        };
        if !current.status.can_transition_to(to) {
            warn!(
                "event=task_transition module=service status=rejected id={} from={} to={}",
                id, current.status, to
            );
            return Err(ServiceError::InvalidTransition {
                id,
                from: current.status,
                to,
            });
        }

        let Some(updated) = self.store.update::<Task, _>(id, &patch)? else {
            return Ok(None);
        };
        info!(
            "event=task_transition module=service status=ok id={} from={} to={}",
            id, current.status, to
        );
        self.notifier.notify(ChangeEvent::DataChanged);
        Ok(Some(updated))
    }
}
