use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use teamwork_core::config::{DEFAULT_MAX_FILE_BYTES, DEFAULT_QUOTA_BYTES};

#[derive(Parser, Debug)]
#[command(name = "teamwork")]
#[command(version, about = "Shared tasks, documents and contribution stats for small teams")]
#[command(propagate_version = true)]
pub struct Cli {
    /// SQLite database file holding the workspace
    #[arg(long, env = "TEAMWORK_DB", default_value = "teamwork.db", global = true)]
    pub db: PathBuf,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "TEAMWORK_LOG_DIR", global = true)]
    pub log_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TEAMWORK_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Total storage budget in bytes
    #[arg(long, env = "TEAMWORK_QUOTA_BYTES", default_value_t = DEFAULT_QUOTA_BYTES, global = true)]
    pub quota_bytes: u64,

    /// Largest accepted upload in bytes
    #[arg(long, env = "TEAMWORK_MAX_FILE_BYTES", default_value_t = DEFAULT_MAX_FILE_BYTES, global = true)]
    pub max_file_bytes: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the member roster
    Member(MemberCommand),

    /// Manage tasks
    Task(TaskCommand),

    /// Manage shared documents
    Doc(DocCommand),

    /// Show team totals and per-member contribution
    Stats,

    /// Print a motivational quote
    Quote {
        /// Skip the network and use the built-in list
        #[arg(long)]
        offline: bool,
    },

    /// Delete every member, task and document
    Reset {
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct MemberCommand {
    #[command(subcommand)]
    pub action: MemberAction,
}

#[derive(Subcommand, Debug)]
pub enum MemberAction {
    /// Add a member
    Add {
        name: String,

        /// Role shown in the contribution table
        #[arg(long, default_value = "")]
        role: String,
    },

    /// List members
    List,
}

#[derive(Args, Debug)]
pub struct TaskCommand {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand, Debug)]
pub enum TaskAction {
    /// Create a task and assign it to a member
    Add {
        title: String,

        #[arg(long, short = 'd')]
        description: Option<String>,

        /// Due date as YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,

        /// Priority (low, medium, high)
        #[arg(long, default_value = "medium")]
        priority: String,

        /// Assignee name; prompts from the roster when omitted
        #[arg(long, short = 'a')]
        assignee: Option<String>,
    },

    /// List tasks split into active and completed
    List {
        /// Substring of title or description
        #[arg(long, short = 's', default_value = "")]
        search: String,

        /// Status (all, pending, in-progress, completed)
        #[arg(long, default_value = "all")]
        status: String,

        /// Priority (low, medium, high)
        #[arg(long)]
        priority: Option<String>,

        #[arg(long, short = 'a')]
        assignee: Option<String>,
    },

    /// Move a task to in-progress
    Start {
        /// Task id or unique id prefix
        id: String,
    },

    /// Mark a task completed
    Complete {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete a task
    Remove {
        /// Task id or unique id prefix
        id: String,

        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct DocCommand {
    #[command(subcommand)]
    pub action: DocAction,
}

#[derive(Subcommand, Debug)]
pub enum DocAction {
    /// Upload one or more files for one member
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// MIME type applied to every file; guessed from the extension when omitted
        #[arg(long = "type")]
        file_type: Option<String>,

        /// Uploader name; prompts from the roster when omitted
        #[arg(long, short = 'u')]
        uploader: Option<String>,
    },

    /// List documents, newest first
    List {
        /// Substring of the title
        #[arg(long, short = 's', default_value = "")]
        search: String,
    },

    /// Delete a document
    Remove {
        /// Document id or unique id prefix
        id: String,

        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
}
