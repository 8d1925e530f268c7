//! Contribution aggregation.
//!
//! # Responsibility
//! - Derive per-member activity counts and percentages from the member,
//!   task and document collections.
//!
//! # Invariants
//! - Aggregation is read-only and holds no state of its own; it can be
//!   recomputed at any time from current collection contents.
//! - Rows follow member insertion order.
//! - All percentages are 0 when there is no activity at all.
//! - Activity by names missing from the roster still counts in the totals.

use super::ServiceResult;
use crate::model::document::Document;
use crate::model::member::Member;
use crate::model::record::Record;
use crate::model::task::Task;
use crate::repo::kv_store::KeyValueStore;
use crate::repo::record_store::RecordStore;

/// One member's share of the team's activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionRow {
    pub name: String,
    pub role: String,
    pub doc_count: u64,
    pub completed_task_count: u64,
    /// Whole-number percentage of all activity, rounded half up.
    pub percentage: u64,
}

impl ContributionRow {
    pub fn total(&self) -> u64 {
        self.doc_count + self.completed_task_count
    }
}

/// Aggregated contribution table plus team-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributionSummary {
    pub total_documents: u64,
    pub total_completed_tasks: u64,
    pub rows: Vec<ContributionRow>,
}

impl ContributionSummary {
    pub fn grand_total(&self) -> u64 {
        self.total_documents + self.total_completed_tasks
    }
}

/// Computes the contribution table.
pub fn aggregate_contributions(
    members: &[Record<Member>],
    tasks: &[Record<Task>],
    documents: &[Record<Document>],
) -> ContributionSummary {
    let total_documents = documents.len() as u64;
    let total_completed_tasks = tasks.iter().filter(|task| task.is_completed()).count() as u64;
    let grand_total = total_documents + total_completed_tasks;

    let rows = members
        .iter()
        .map(|member| {
            let doc_count = documents
                .iter()
                .filter(|document| document.uploaded_by == member.name)
                .count() as u64;
            let completed_task_count = tasks
                .iter()
                .filter(|task| task.is_completed() && task.assigned_to == member.name)
                .count() as u64;

            ContributionRow {
                name: member.name.clone(),
                role: member.role.clone(),
                doc_count,
                completed_task_count,
                percentage: percentage_of(doc_count + completed_task_count, grand_total),
            }
        })
        .collect();

    ContributionSummary {
        total_documents,
        total_completed_tasks,
        rows,
    }
}

/// `round(part / whole * 100)` with halves rounded up; 0 when `whole == 0`.
fn percentage_of(part: u64, whole: u64) -> u64 {
    if whole == 0 {
        return 0;
    }
    (part * 200 + whole) / (whole * 2)
}

/// Reads the three collections and aggregates them.
pub struct ContributionService<'a, K: KeyValueStore> {
    store: &'a RecordStore<K>,
}

impl<'a, K: KeyValueStore> ContributionService<'a, K> {
    pub fn new(store: &'a RecordStore<K>) -> Self {
        Self { store }
    }

    pub fn summary(&self) -> ServiceResult<ContributionSummary> {
        let members = self.store.get::<Member>()?;
        let tasks = self.store.get::<Task>()?;
        let documents = self.store.get::<Document>()?;
        Ok(aggregate_contributions(&members, &tasks, &documents))
    }
}

#[cfg(test)]
mod tests {
    use super::{aggregate_contributions, percentage_of};
    use crate::model::document::Document;
    use crate::model::member::Member;
    use crate::model::record::Record;
    use crate::model::task::{NewTask, Task, TaskStatus};
    use uuid::Uuid;

    fn wrap<T>(fields: T) -> Record<T> {
        Record {
            id: Uuid::new_v4(),
            created_at: 0,
            updated_at: None,
            fields,
        }
    }

    fn member(name: &str) -> Record<Member> {
        wrap(Member {
            name: name.to_string(),
            role: "dev".to_string(),
        })
    }

    fn doc_by(name: &str) -> Record<Document> {
        wrap(Document {
            title: "f".to_string(),
            file_name: "f".to_string(),
            file_type: String::new(),
            size: 1,
            uploaded_by: name.to_string(),
            data: String::new(),
        })
    }

    fn task_for(name: &str, status: TaskStatus) -> Record<Task> {
        let mut task = NewTask::new("t").into_task(name);
        task.status = status;
        if status == TaskStatus::Completed {
            task.completed_at = Some(1);
        }
        wrap(task)
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage_of(1, 3), 33);
        assert_eq!(percentage_of(2, 3), 67);
        assert_eq!(percentage_of(1, 8), 13);
        assert_eq!(percentage_of(0, 0), 0);
    }

    #[test]
    fn single_member_owns_all_activity() {
        let summary = aggregate_contributions(
            &[member("Alice")],
            &[task_for("Alice", TaskStatus::Completed)],
            &[doc_by("Alice"), doc_by("Alice")],
        );

        let alice = &summary.rows[0];
        assert_eq!(alice.doc_count, 2);
        assert_eq!(alice.completed_task_count, 1);
        assert_eq!(alice.percentage, 100);
        assert_eq!(summary.total_documents, 2);
        assert_eq!(summary.total_completed_tasks, 1);
    }

    #[test]
    fn open_tasks_do_not_count() {
        let summary = aggregate_contributions(
            &[member("Alice"), member("Bob")],
            &[
                task_for("Alice", TaskStatus::Todo),
                task_for("Bob", TaskStatus::InProgress),
            ],
            &[],
        );
        assert_eq!(summary.grand_total(), 0);
        assert!(summary.rows.iter().all(|row| row.percentage == 0));
    }

    #[test]
    fn percentages_sum_to_about_one_hundred() {
        let summary = aggregate_contributions(
            &[member("A"), member("B"), member("C")],
            &[task_for("A", TaskStatus::Completed)],
            &[doc_by("B"), doc_by("C")],
        );
        let sum: u64 = summary.rows.iter().map(|row| row.percentage).sum();
        assert!((99..=101).contains(&sum), "sum was {sum}");
        assert_eq!(summary.rows[0].name, "A");
    }

    #[test]
    fn activity_by_unknown_names_dilutes_roster_share() {
        let summary =
            aggregate_contributions(&[member("Alice")], &[], &[doc_by("Alice"), doc_by("Ghost")]);
        assert_eq!(summary.rows[0].percentage, 50);
    }
}
