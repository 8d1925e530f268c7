use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;
use teamwork_core::db::open_db_in_memory;
use teamwork_core::{
    AutoConfirm, ChangeEvent, ChangeNotifier, DataUrlEncoder, ExternalError, FixedSelection,
    NewTask, PayloadEncoder, RecordStore, RemoveOutcome, ServiceError, SqliteKeyValueStore,
    StatusFilter, StoreConfig, TaskFilter, TaskPriority, TaskStatus, UploadFile, UploadSource,
    Workspace,
};
use uuid::Uuid;

type Store<'conn> = RecordStore<SqliteKeyValueStore<'conn>>;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn open_store(conn: &Connection) -> Store<'_> {
    RecordStore::open(SqliteKeyValueStore::new(conn)).unwrap()
}

fn record_events(notifier: &ChangeNotifier) -> Rc<RefCell<Vec<ChangeEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    notifier.subscribe(move |event| sink.borrow_mut().push(event));
    seen
}

fn with_alice<'a, 'conn>(
    store: &'a Store<'conn>,
    notifier: &'a ChangeNotifier,
) -> Workspace<'a, SqliteKeyValueStore<'conn>> {
    let workspace = Workspace::new(store, notifier);
    workspace.members().create("Alice", "dev").unwrap();
    workspace
}

#[test]
fn task_walks_todo_in_progress_completed() {
    let conn = setup();
    let store = open_store(&conn);
    let notifier = ChangeNotifier::new();
    let workspace = with_alice(&store, &notifier);
    let tasks = workspace.tasks();

    let created = tasks
        .create(NewTask::new("Draft slides"), &FixedSelection::member("Alice"))
        .unwrap()
        .unwrap();
    assert_eq!(created.status, TaskStatus::Todo);
    assert_eq!(created.assigned_to, "Alice");
    assert_eq!(created.priority, TaskPriority::Medium);

    let started = tasks
        .set_status(created.id, TaskStatus::InProgress)
        .unwrap()
        .unwrap();
    assert_eq!(started.status, TaskStatus::InProgress);
    assert!(started.completed_at.is_none());

    let done = tasks.complete(created.id).unwrap().unwrap();
    assert_eq!(done.status, TaskStatus::Completed);
    assert!(done.completed_at.is_some());
}

#[test]
fn todo_task_can_be_completed_directly() {
    let conn = setup();
    let store = open_store(&conn);
    let notifier = ChangeNotifier::new();
    let workspace = with_alice(&store, &notifier);
    let tasks = workspace.tasks();
    let created = tasks
        .create(NewTask::new("Quick fix"), &FixedSelection::member("Alice"))
        .unwrap()
        .unwrap();

    let done = tasks
        .set_status(created.id, TaskStatus::Completed)
        .unwrap()
        .unwrap();
    assert!(done.completed_at.is_some());
}

#[test]
fn completed_task_cannot_be_reopened() {
    let conn = setup();
    let store = open_store(&conn);
    let notifier = ChangeNotifier::new();
    let workspace = with_alice(&store, &notifier);
    let tasks = workspace.tasks();
    let created = tasks
        .create(NewTask::new("Ship"), &FixedSelection::member("Alice"))
        .unwrap()
        .unwrap();
    tasks.complete(created.id).unwrap();
    let events = record_events(&notifier);

    let err = tasks
        .set_status(created.id, TaskStatus::InProgress)
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::InvalidTransition {
            from: TaskStatus::Completed,
            to: TaskStatus::InProgress,
            ..
        }
    ));
    assert!(matches!(
        tasks.complete(created.id).unwrap_err(),
        ServiceError::InvalidTransition { .. }
    ));
    assert!(events.borrow().is_empty());
    assert_eq!(
        tasks.get(created.id).unwrap().unwrap().status,
        TaskStatus::Completed
    );
}

#[test]
fn status_change_on_missing_task_is_a_noop() {
    let conn = setup();
    let store = open_store(&conn);
    let notifier = ChangeNotifier::new();
    let workspace = with_alice(&store, &notifier);

    assert!(workspace
        .tasks()
        .set_status(Uuid::new_v4(), TaskStatus::InProgress)
        .unwrap()
        .is_none());
}

#[test]
fn create_task_aborts_without_roster_or_selection() {
    let conn = setup();
    let store = open_store(&conn);
    let notifier = ChangeNotifier::new();
    let workspace = Workspace::new(&store, &notifier);
    let events = record_events(&notifier);

    let empty_roster = workspace
        .tasks()
        .create(NewTask::new("Orphan"), &FixedSelection::member("Alice"))
        .unwrap();
    assert!(empty_roster.is_none());

    workspace.members().create("Alice", "dev").unwrap();
    let nobody = workspace
        .tasks()
        .create(NewTask::new("Orphan"), &FixedSelection::none())
        .unwrap();
    assert!(nobody.is_none());

    assert!(workspace.tasks().list().unwrap().is_empty());
    assert_eq!(*events.borrow(), vec![ChangeEvent::RosterChanged]);
}

#[test]
fn create_task_ignores_names_outside_roster() {
    let conn = setup();
    let store = open_store(&conn);
    let notifier = ChangeNotifier::new();
    let workspace = with_alice(&store, &notifier);

    let created = workspace
        .tasks()
        .create(NewTask::new("Haunt"), &FixedSelection::member("Ghost"))
        .unwrap();

    assert!(created.is_none());
    assert!(workspace.tasks().list().unwrap().is_empty());
}

#[test]
fn create_task_rejects_bad_input_before_selection() {
    let conn = setup();
    let store = open_store(&conn);
    let notifier = ChangeNotifier::new();
    let workspace = with_alice(&store, &notifier);

    let mut draft = NewTask::new("Plan");
    draft.due_date = Some("next week".to_string());
    let err = workspace
        .tasks()
        .create(draft, &FixedSelection::member("Alice"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn remove_task_respects_confirmation() {
    let conn = setup();
    let store = open_store(&conn);
    let notifier = ChangeNotifier::new();
    let workspace = with_alice(&store, &notifier);
    let tasks = workspace.tasks();
    let created = tasks
        .create(NewTask::new("Temp"), &FixedSelection::member("Alice"))
        .unwrap()
        .unwrap();

    assert_eq!(
        tasks.remove(created.id, &AutoConfirm(false)).unwrap(),
        RemoveOutcome::Cancelled
    );
    assert_eq!(tasks.list().unwrap().len(), 1);
    assert_eq!(
        tasks.remove(created.id, &AutoConfirm(true)).unwrap(),
        RemoveOutcome::Removed
    );
    assert_eq!(
        tasks.remove(created.id, &AutoConfirm(true)).unwrap(),
        RemoveOutcome::NotFound
    );
}

#[test]
fn board_splits_filtered_tasks() {
    let conn = setup();
    let store = open_store(&conn);
    let notifier = ChangeNotifier::new();
    let workspace = with_alice(&store, &notifier);
    workspace.members().create("Bob", "design").unwrap();
    let tasks = workspace.tasks();

    let mut urgent = NewTask::new("Fix login bug");
    urgent.priority = TaskPriority::High;
    let fix = tasks
        .create(urgent, &FixedSelection::member("Alice"))
        .unwrap()
        .unwrap();
    tasks
        .create(NewTask::new("Logo sketch"), &FixedSelection::member("Bob"))
        .unwrap();
    tasks.complete(fix.id).unwrap();

    let board = tasks.board(&TaskFilter::default()).unwrap();
    assert_eq!(board.active.len(), 1);
    assert_eq!(board.completed.len(), 1);

    let bob_pending = TaskFilter {
        status: StatusFilter::Pending,
        assignee: Some("Bob".to_string()),
        ..TaskFilter::default()
    };
    let matched = tasks.filter(&bob_pending).unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].title, "Logo sketch");

    let search = TaskFilter {
        search: "LOGIN".to_string(),
        ..TaskFilter::default()
    };
    assert_eq!(tasks.filter(&search).unwrap()[0].id, fix.id);
}

#[test]
fn oversized_file_fails_alone_in_batch() {
    let conn = setup();
    let store = open_store(&conn);
    let notifier = ChangeNotifier::new();
    let workspace = with_alice(&store, &notifier);
    let files = vec![
        UploadFile::new("notes.txt", "text/plain", b"hello".to_vec()),
        UploadFile::new("huge.bin", "application/octet-stream", vec![0u8; 400 * 1024]),
        UploadFile::new("logo.png", "image/png", vec![1u8; 1024]),
    ];

    let report = workspace
        .documents()
        .upload_batch(&files, &FixedSelection::member("Alice"), &DataUrlEncoder)
        .unwrap()
        .unwrap();

    assert!(!report.is_clean());
    assert_eq!(report.uploaded.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].file_name, "huge.bin");
    assert!(matches!(
        report.failed[0].error,
        ServiceError::FileTooLarge { size, .. } if size == 400 * 1024
    ));

    let stored = workspace.documents().list().unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|doc| doc.uploaded_by == "Alice"));
    assert_eq!(stored[0].data, "data:text/plain;base64,aGVsbG8=");
}

#[test]
fn batch_upload_without_uploader_touches_nothing() {
    let conn = setup();
    let store = open_store(&conn);
    let notifier = ChangeNotifier::new();
    let workspace = with_alice(&store, &notifier);
    let files = vec![UploadFile::new("a.txt", "text/plain", b"a".to_vec())];

    let outcome = workspace
        .documents()
        .upload_batch(&files, &FixedSelection::none(), &DataUrlEncoder)
        .unwrap();

    assert!(outcome.is_none());
    assert!(workspace.documents().list().unwrap().is_empty());
}

/// Fails for one file name and delegates the rest to the data-URL encoder.
struct RejectingEncoder(&'static str);

impl PayloadEncoder for RejectingEncoder {
    fn encode(&self, file: &UploadFile) -> Result<String, ExternalError> {
        if file.file_name == self.0 {
            return Err(ExternalError::new("reader aborted"));
        }
        DataUrlEncoder.encode(file)
    }
}

#[test]
fn encoder_failure_fails_only_that_file() {
    let conn = setup();
    let store = open_store(&conn);
    let notifier = ChangeNotifier::new();
    let workspace = with_alice(&store, &notifier);
    let files = vec![
        UploadFile::new("a.txt", "text/plain", b"a".to_vec()),
        UploadFile::new("broken.txt", "text/plain", b"b".to_vec()),
        UploadFile::new("c.txt", "text/plain", b"c".to_vec()),
    ];

    let report = workspace
        .documents()
        .upload_batch(
            &files,
            &FixedSelection::member("Alice"),
            &RejectingEncoder("broken.txt"),
        )
        .unwrap()
        .unwrap();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].file_name, "broken.txt");
    assert!(matches!(
        report.failed[0].error,
        ServiceError::ExternalFetchFailed(_)
    ));
    let titles: Vec<_> = workspace
        .documents()
        .list()
        .unwrap()
        .into_iter()
        .map(|doc| doc.fields.title)
        .collect();
    assert_eq!(titles, vec!["a.txt", "c.txt"]);
}

/// Source with a declared size whose payload may be unreadable.
struct LazySource {
    name: &'static str,
    size: u64,
    readable: bool,
}

impl UploadSource for LazySource {
    fn file_name(&self) -> &str {
        self.name
    }

    fn size(&self) -> Result<u64, ExternalError> {
        Ok(self.size)
    }

    fn load(&self) -> Result<UploadFile, ExternalError> {
        if !self.readable {
            return Err(ExternalError::new("unreadable"));
        }
        Ok(UploadFile::new(
            self.name,
            "text/plain",
            vec![b'x'; self.size as usize],
        ))
    }
}

#[test]
fn batch_sizes_sources_before_loading_them() {
    let conn = setup();
    let store = open_store(&conn);
    let notifier = ChangeNotifier::new();
    let workspace = with_alice(&store, &notifier);
    let sources = [
        LazySource {
            name: "missing.txt",
            size: 3,
            readable: false,
        },
        LazySource {
            name: "huge.bin",
            size: 400 * 1024,
            readable: false,
        },
        LazySource {
            name: "good.txt",
            size: 4,
            readable: true,
        },
    ];

    let report = workspace
        .documents()
        .upload_batch(&sources, &FixedSelection::member("Alice"), &DataUrlEncoder)
        .unwrap()
        .unwrap();

    assert_eq!(report.uploaded.len(), 1);
    assert_eq!(report.uploaded[0].file_name, "good.txt");
    assert!(matches!(
        report.failed[0].error,
        ServiceError::ExternalFetchFailed(_)
    ));
    assert!(matches!(
        report.failed[1].error,
        ServiceError::FileTooLarge { .. }
    ));
}

#[test]
fn batch_upload_with_unknown_uploader_touches_nothing() {
    let conn = setup();
    let store = open_store(&conn);
    let notifier = ChangeNotifier::new();
    let workspace = with_alice(&store, &notifier);
    let files = vec![UploadFile::new("a.txt", "text/plain", b"a".to_vec())];

    let outcome = workspace
        .documents()
        .upload_batch(&files, &FixedSelection::member("Ghost"), &DataUrlEncoder)
        .unwrap();

    assert!(outcome.is_none());
    assert!(workspace.documents().list().unwrap().is_empty());
}

#[test]
fn remove_document_respects_confirmation() {
    let conn = setup();
    let store = open_store(&conn);
    let notifier = ChangeNotifier::new();
    let workspace = with_alice(&store, &notifier);
    let documents = workspace.documents();
    let uploaded = documents
        .upload(
            &UploadFile::new("plan.pdf", "application/pdf", b"x".to_vec()),
            "Alice",
            &DataUrlEncoder,
        )
        .unwrap();
    let events = record_events(&notifier);

    assert_eq!(
        documents.remove(uploaded.id, &AutoConfirm(false)).unwrap(),
        RemoveOutcome::Cancelled
    );
    assert_eq!(documents.list().unwrap().len(), 1);
    assert!(events.borrow().is_empty());

    assert_eq!(
        documents.remove(uploaded.id, &AutoConfirm(true)).unwrap(),
        RemoveOutcome::Removed
    );
    assert!(documents.list().unwrap().is_empty());
    assert_eq!(*events.borrow(), vec![ChangeEvent::DataChanged]);

    assert_eq!(
        documents.remove(uploaded.id, &AutoConfirm(true)).unwrap(),
        RemoveOutcome::NotFound
    );
    assert_eq!(
        documents.remove(Uuid::new_v4(), &AutoConfirm(true)).unwrap(),
        RemoveOutcome::NotFound
    );
    assert_eq!(events.borrow().len(), 1);
}

#[test]
fn document_search_returns_newest_first() {
    let conn = setup();
    let store = open_store(&conn);
    let notifier = ChangeNotifier::new();
    let workspace = with_alice(&store, &notifier);
    let documents = workspace.documents();
    for name in ["Report-v1.pdf", "photo.png", "report-final.pdf"] {
        documents
            .upload(
                &UploadFile::new(name, "application/pdf", b"x".to_vec()),
                "Alice",
                &DataUrlEncoder,
            )
            .unwrap();
    }

    let titles: Vec<_> = documents
        .search("report")
        .unwrap()
        .into_iter()
        .map(|doc| doc.fields.title)
        .collect();
    assert_eq!(titles, vec!["report-final.pdf", "Report-v1.pdf"]);
    assert_eq!(documents.search("").unwrap().len(), 3);
}

#[test]
fn duplicate_member_name_is_rejected() {
    let conn = setup();
    let store = open_store(&conn);
    let notifier = ChangeNotifier::new();
    let workspace = with_alice(&store, &notifier);
    let events = record_events(&notifier);

    let err = workspace.members().create(" Alice ", "qa").unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateName(ref name) if name == "Alice"));
    assert!(workspace.members().create("alice", "qa").is_ok());

    assert_eq!(workspace.members().names().unwrap(), vec!["Alice", "alice"]);
    assert_eq!(*events.borrow(), vec![ChangeEvent::RosterChanged]);
}

#[test]
fn contribution_reflects_documents_and_completed_tasks() {
    let conn = setup();
    let store = open_store(&conn);
    let notifier = ChangeNotifier::new();
    let workspace = with_alice(&store, &notifier);
    let alice = FixedSelection::member("Alice");

    for name in ["a.txt", "b.txt"] {
        workspace
            .documents()
            .upload(
                &UploadFile::new(name, "text/plain", b"x".to_vec()),
                "Alice",
                &DataUrlEncoder,
            )
            .unwrap();
    }
    let task = workspace
        .tasks()
        .create(NewTask::new("Review"), &alice)
        .unwrap()
        .unwrap();
    workspace.tasks().complete(task.id).unwrap();
    workspace
        .tasks()
        .create(NewTask::new("Still open"), &alice)
        .unwrap();

    let summary = workspace.contribution().summary().unwrap();
    assert_eq!(summary.total_documents, 2);
    assert_eq!(summary.total_completed_tasks, 1);
    let row = &summary.rows[0];
    assert_eq!(row.name, "Alice");
    assert_eq!(row.doc_count, 2);
    assert_eq!(row.completed_task_count, 1);
    assert_eq!(row.percentage, 100);
}

#[test]
fn failed_write_emits_no_event() {
    let conn = setup();
    let kv = SqliteKeyValueStore::with_config(&conn, StoreConfig { quota_bytes: 300 });
    let store = RecordStore::open(kv).unwrap();
    let notifier = ChangeNotifier::new();
    let workspace = Workspace::new(&store, &notifier);
    let events = record_events(&notifier);

    let err = workspace
        .members()
        .create("Alice", &"x".repeat(1_000))
        .unwrap_err();

    assert!(err.is_quota_exceeded());
    assert!(events.borrow().is_empty());
    assert!(workspace.members().list().unwrap().is_empty());
}

#[test]
fn reset_all_requires_confirmation_and_wipes_everything() {
    let conn = setup();
    let store = open_store(&conn);
    let notifier = ChangeNotifier::new();
    let workspace = with_alice(&store, &notifier);
    workspace
        .tasks()
        .create(NewTask::new("t"), &FixedSelection::member("Alice"))
        .unwrap();
    let events = record_events(&notifier);

    assert!(!workspace.reset_all(&AutoConfirm(false)).unwrap());
    assert_eq!(workspace.members().list().unwrap().len(), 1);

    assert!(workspace.reset_all(&AutoConfirm(true)).unwrap());
    assert!(workspace.members().list().unwrap().is_empty());
    assert!(workspace.tasks().list().unwrap().is_empty());
    assert_eq!(*events.borrow(), vec![ChangeEvent::Reset]);
}
