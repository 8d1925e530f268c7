use crate::disk_file::DiskFile;
use crate::error::{CliError, CliResult};
use crate::interactive::{StdinConfirmation, StdinSelector};
use crate::quote_client::{AdviceApiClient, Offline, ADVICE_API_URL};
use log::info;
use std::path::PathBuf;
use teamwork_core::{
    format_size, quote_or_fallback, AutoConfirm, Confirmation, DataUrlEncoder, FixedSelection,
    KeyValueStore, MemberSelector, NewTask, Record, RecordId, RemoveOutcome, StatusFilter, Task,
    TaskFilter, TaskPriority, TaskStatus, Workspace,
};

pub fn member_add<K: KeyValueStore>(
    workspace: &Workspace<'_, K>,
    name: &str,
    role: &str,
) -> CliResult<()> {
    let member = workspace.members().create(name, role)?;
    println!("Added member {}", member.name);
    Ok(())
}

pub fn member_list<K: KeyValueStore>(workspace: &Workspace<'_, K>) -> CliResult<()> {
    let members = workspace.members().list()?;
    if members.is_empty() {
        println!("No members yet. Add one with `teamwork member add <name>`.");
        return Ok(());
    }
    for member in members {
        println!("{}\t{}", member.name, member.role);
    }
    Ok(())
}

pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub due: Option<String>,
    pub priority: String,
    pub assignee: Option<String>,
}

pub fn task_add<K: KeyValueStore>(
    workspace: &Workspace<'_, K>,
    draft: TaskDraft,
) -> CliResult<()> {
    let priority = draft
        .priority
        .parse::<TaskPriority>()
        .map_err(CliError::Usage)?;
    let new_task = NewTask {
        title: draft.title,
        description: draft.description,
        due_date: draft.due,
        priority,
    };

    let fixed = draft.assignee.map(FixedSelection::member);
    let selector: &dyn MemberSelector = match &fixed {
        Some(selection) => selection,
        None => &StdinSelector,
    };

    match workspace.tasks().create(new_task, selector)? {
        Some(task) => println!(
            "Created task {} for {}: {}",
            short_id(task.id),
            task.assigned_to,
            task.title
        ),
        None => println!("No task created: the assignee must be a roster member."),
    }
    Ok(())
}

pub fn task_list<K: KeyValueStore>(
    workspace: &Workspace<'_, K>,
    filter: TaskFilter,
) -> CliResult<()> {
    let board = workspace.tasks().board(&filter)?;

    println!("Active ({})", board.active.len());
    for task in &board.active {
        println!("  {}", describe_task(task));
    }
    println!("Completed ({})", board.completed.len());
    for task in &board.completed {
        println!("  {}", describe_task(task));
    }
    Ok(())
}

/// Builds a filter from raw flag values.
pub fn task_filter(
    search: String,
    status: &str,
    priority: Option<&str>,
    assignee: Option<String>,
) -> CliResult<TaskFilter> {
    let status = status.parse::<StatusFilter>().map_err(CliError::Usage)?;
    let priority = priority
        .map(str::parse::<TaskPriority>)
        .transpose()
        .map_err(CliError::Usage)?;
    Ok(TaskFilter {
        search,
        status,
        priority,
        assignee,
    })
}

pub fn task_set_status<K: KeyValueStore>(
    workspace: &Workspace<'_, K>,
    raw_id: &str,
    status: TaskStatus,
) -> CliResult<()> {
    let tasks = workspace.tasks();
    let id = resolve_id(&tasks.list()?, raw_id)?;
    match tasks.set_status(id, status)? {
        Some(task) => println!("{}", describe_task(&task)),
        None => println!("Task {raw_id} no longer exists."),
    }
    Ok(())
}

pub fn task_remove<K: KeyValueStore>(
    workspace: &Workspace<'_, K>,
    raw_id: &str,
    yes: bool,
) -> CliResult<()> {
    let tasks = workspace.tasks();
    let id = resolve_id(&tasks.list()?, raw_id)?;
    report_removal("task", raw_id, tasks.remove(id, confirmation(yes))?);
    Ok(())
}

pub fn doc_upload<K: KeyValueStore>(
    workspace: &Workspace<'_, K>,
    paths: &[PathBuf],
    file_type: Option<&str>,
    uploader: Option<String>,
) -> CliResult<()> {
    let files: Vec<DiskFile> = paths
        .iter()
        .map(|path| DiskFile::new(path, file_type))
        .collect();

    let fixed = uploader.map(FixedSelection::member);
    let selector: &dyn MemberSelector = match &fixed {
        Some(selection) => selection,
        None => &StdinSelector,
    };

    let Some(report) = workspace
        .documents()
        .upload_batch(&files, selector, &DataUrlEncoder)?
    else {
        println!("Nothing uploaded: the uploader must be a roster member.");
        return Ok(());
    };

    for document in &report.uploaded {
        println!(
            "Uploaded {} ({})",
            document.file_name,
            format_size(document.size)
        );
    }
    for failure in &report.failed {
        eprintln!("Failed {}: {}", failure.file_name, failure.error);
    }
    if report.is_clean() {
        Ok(())
    } else {
        Err(CliError::Usage(format!(
            "{} of {} files failed to upload",
            report.failed.len(),
            files.len()
        )))
    }
}

pub fn doc_list<K: KeyValueStore>(workspace: &Workspace<'_, K>, search: &str) -> CliResult<()> {
    let documents = workspace.documents().search(search)?;
    if documents.is_empty() {
        println!("No documents.");
        return Ok(());
    }
    for document in documents {
        println!(
            "{}\t{:?}\t{}\t{}\t{}",
            short_id(document.id),
            document.kind(),
            format_size(document.size),
            document.uploaded_by,
            document.title
        );
    }
    Ok(())
}

pub fn doc_remove<K: KeyValueStore>(
    workspace: &Workspace<'_, K>,
    raw_id: &str,
    yes: bool,
) -> CliResult<()> {
    let documents = workspace.documents();
    let id = resolve_id(&documents.list()?, raw_id)?;
    report_removal("document", raw_id, documents.remove(id, confirmation(yes))?);
    Ok(())
}

pub fn stats<K: KeyValueStore>(workspace: &Workspace<'_, K>) -> CliResult<()> {
    let summary = workspace.contribution().summary()?;
    let members = summary.rows.len();

    println!("Members: {members}");
    println!("Documents: {}", summary.total_documents);
    println!("Completed tasks: {}", summary.total_completed_tasks);
    for row in &summary.rows {
        println!(
            "  {:<16} {:<12} docs={:<3} done={:<3} {:>3}%",
            row.name, row.role, row.doc_count, row.completed_task_count, row.percentage
        );
    }
    Ok(())
}

pub fn quote(offline: bool) -> CliResult<()> {
    let quote = if offline {
        quote_or_fallback(&Offline)
    } else {
        match AdviceApiClient::new(ADVICE_API_URL) {
            Ok(client) => quote_or_fallback(&client),
            Err(err) => {
                info!("event=quote_client module=cli status=fallback error={}", err);
                quote_or_fallback(&Offline)
            }
        }
    };
    println!("\"{}\" - {}", quote.message, quote.author);
    Ok(())
}

pub fn reset<K: KeyValueStore>(workspace: &Workspace<'_, K>, yes: bool) -> CliResult<()> {
    if workspace.reset_all(confirmation(yes))? {
        println!("Workspace cleared.");
    } else {
        println!("Cancelled.");
    }
    Ok(())
}

static ASSUME_YES: AutoConfirm = AutoConfirm(true);

fn confirmation(yes: bool) -> &'static dyn Confirmation {
    if yes {
        &ASSUME_YES
    } else {
        &StdinConfirmation
    }
}

fn report_removal(kind: &str, raw_id: &str, outcome: RemoveOutcome) {
    match outcome {
        RemoveOutcome::Removed => println!("Removed {kind} {raw_id}."),
        RemoveOutcome::Cancelled => println!("Cancelled."),
        RemoveOutcome::NotFound => println!("No {kind} matches {raw_id}."),
    }
}

fn describe_task(task: &Record<Task>) -> String {
    let mut line = format!(
        "{} [{}] ({}) {} -> {}",
        short_id(task.id),
        task.status,
        task.priority,
        task.title,
        task.assigned_to
    );
    if let Some(due) = &task.due_date {
        line.push_str(&format!(" due {due}"));
    }
    line
}

fn short_id(id: RecordId) -> String {
    id.to_string()[..8].to_string()
}

/// Accepts a full id or a prefix matching exactly one record.
fn resolve_id<T>(records: &[Record<T>], raw: &str) -> CliResult<RecordId> {
    let needle = raw.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return Err(CliError::Usage("id cannot be empty".to_string()));
    }

    let mut matches = records
        .iter()
        .filter(|record| record.id.to_string().starts_with(&needle));
    match (matches.next(), matches.next()) {
        (Some(record), None) => Ok(record.id),
        (None, _) => Err(CliError::Usage(format!("no record matches id `{raw}`"))),
        (Some(_), Some(_)) => Err(CliError::Usage(format!(
            "id prefix `{raw}` is ambiguous; use more characters"
        ))),
    }
}
