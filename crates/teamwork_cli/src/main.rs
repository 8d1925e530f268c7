//! `teamwork` command-line entry point.
//!
//! # Responsibility
//! - Map flags and `TEAMWORK_*` env vars onto core configuration.
//! - Open one database connection and dispatch a single subcommand.

mod commands;
mod disk_file;
mod error;
mod handlers;
mod interactive;
mod quote_client;

use clap::Parser;
use commands::{Cli, Commands, DocAction, MemberAction, TaskAction};
use error::{CliError, CliResult};
use handlers::TaskDraft;
use log::debug;
use std::path::PathBuf;
use teamwork_core::db::open_db;
use teamwork_core::{
    init_logging, ChangeNotifier, LogLevel, RecordStore, SqliteKeyValueStore, StoreConfig,
    TaskStatus, UploadPolicy, Workspace,
};

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| LogLevel::build_default().as_str().to_string());
        init_logging(&level, log_dir).map_err(CliError::Logging)?;
    }

    let settings = StoreSettings {
        db: cli.db,
        quota_bytes: cli.quota_bytes,
        max_file_bytes: cli.max_file_bytes,
    };

    match cli.command {
        Commands::Quote { offline } => handlers::quote(offline),
        Commands::Member(member) => settings.with_workspace(|workspace| match member.action {
            MemberAction::Add { name, role } => handlers::member_add(workspace, &name, &role),
            MemberAction::List => handlers::member_list(workspace),
        }),
        Commands::Task(task) => settings.with_workspace(|workspace| match task.action {
            TaskAction::Add {
                title,
                description,
                due,
                priority,
                assignee,
            } => handlers::task_add(
                workspace,
                TaskDraft {
                    title,
                    description,
                    due,
                    priority,
                    assignee,
                },
            ),
            TaskAction::List {
                search,
                status,
                priority,
                assignee,
            } => {
                let filter =
                    handlers::task_filter(search, &status, priority.as_deref(), assignee)?;
                handlers::task_list(workspace, filter)
            }
            TaskAction::Start { id } => {
                handlers::task_set_status(workspace, &id, TaskStatus::InProgress)
            }
            TaskAction::Complete { id } => {
                handlers::task_set_status(workspace, &id, TaskStatus::Completed)
            }
            TaskAction::Remove { id, yes } => handlers::task_remove(workspace, &id, yes),
        }),
        Commands::Doc(doc) => settings.with_workspace(|workspace| match doc.action {
            DocAction::Upload {
                files,
                file_type,
                uploader,
            } => handlers::doc_upload(workspace, &files, file_type.as_deref(), uploader),
            DocAction::List { search } => handlers::doc_list(workspace, &search),
            DocAction::Remove { id, yes } => handlers::doc_remove(workspace, &id, yes),
        }),
        Commands::Stats => settings.with_workspace(|workspace| handlers::stats(workspace)),
        Commands::Reset { yes } => {
            settings.with_workspace(|workspace| handlers::reset(workspace, yes))
        }
    }
}

/// Where and how the workspace is opened for commands that need storage.
struct StoreSettings {
    db: PathBuf,
    quota_bytes: u64,
    max_file_bytes: u64,
}

impl StoreSettings {
    fn with_workspace<F>(&self, command: F) -> CliResult<()>
    where
        F: FnOnce(&Workspace<'_, SqliteKeyValueStore<'_>>) -> CliResult<()>,
    {
        let conn = open_db(&self.db)?;
        let store = RecordStore::open(SqliteKeyValueStore::with_config(
            &conn,
            StoreConfig {
                quota_bytes: self.quota_bytes,
            },
        ))?;
        let notifier = ChangeNotifier::new();
        notifier.subscribe(|event| debug!("event=change_notified module=cli kind={}", event));
        let workspace = Workspace::new(&store, &notifier).with_upload_policy(UploadPolicy {
            max_file_bytes: self.max_file_bytes,
        });
        command(&workspace)
    }
}

#[cfg(test)]
mod tests {
    use super::commands::{Cli, Commands, TaskAction};
    use super::run;
    use clap::{CommandFactory, Parser};
    use std::ffi::OsString;

    #[test]
    fn offline_quote_never_opens_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let unreachable_db = dir.path().join("missing-dir").join("teamwork.db");
        let args: Vec<OsString> = vec![
            "teamwork".into(),
            "--db".into(),
            unreachable_db.clone().into_os_string(),
            "quote".into(),
            "--offline".into(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        run(cli).unwrap();
        assert!(!unreachable_db.exists());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn task_add_parses_flags() {
        let cli = Cli::try_parse_from([
            "teamwork", "--db", "/tmp/t.db", "task", "add", "Write docs", "--priority", "high",
            "-a", "Alice",
        ])
        .unwrap();
        match cli.command {
            Commands::Task(task) => match task.action {
                TaskAction::Add {
                    title,
                    priority,
                    assignee,
                    ..
                } => {
                    assert_eq!(title, "Write docs");
                    assert_eq!(priority, "high");
                    assert_eq!(assignee.as_deref(), Some("Alice"));
                }
                other => panic!("unexpected action: {other:?}"),
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
