//! CLI entry point for taskdeck.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use taskdeck_app::{ProjectConfig, TaskService, TaskStore, ViewState};
use taskdeck_core::{Priority, RecurrencePeriod, SortKey, TaskFilter};
use taskdeck_store::FileBlobStore;

mod commands;

/// Personal tasks with filtered views and a weekly calendar.
#[derive(Parser, Debug)]
#[command(name = "taskdeck", version, about = "taskdeck: personal tasks in a single JSON file")]
struct Cli {
    /// Data file (defaults to the configured or platform data location).
    #[arg(long, global = true, env = "TASKDECK_DATA")]
    data: Option<PathBuf>,

    /// Configuration file.
    #[arg(long, global = true, env = "TASKDECK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a task.
    Add(AddArgs),

    /// Change fields of an existing task.
    Edit(EditArgs),

    /// Toggle a task between done and open.
    Done {
        /// Position shown by `ls`, or an id prefix (`id:<prefix>` when it is all digits).
        task: String,
    },

    /// Delete a task.
    Rm {
        /// Position shown by `ls`, or an id prefix (`id:<prefix>` when it is all digits).
        task: String,
    },

    /// Manage subtasks.
    Subtask {
        #[command(subcommand)]
        cmd: SubtaskCommand,
    },

    /// Move a task to another position (1-based, as shown by `ls`).
    Move { from: usize, to: usize },

    /// List tasks through a filtered, sorted view.
    Ls(LsArgs),

    /// List every tag in use.
    Tags,

    /// Show tasks due in a calendar week.
    Week {
        /// Any day of the week to show (`YYYY-MM-DD`); defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// Show one task in full.
    Show {
        /// Position shown by `ls`, or an id prefix (`id:<prefix>` when it is all digits).
        task: String,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Default)]
struct AddArgs {
    title: String,
    #[arg(short, long)]
    description: Option<String>,
    #[arg(short, long)]
    priority: Option<Priority>,
    /// Due date: `YYYY-MM-DD`, `YYYY-MM-DD HH:MM`, RFC 3339, `today` or `tomorrow`.
    #[arg(long)]
    due: Option<String>,
    #[arg(short = 't', long = "tag")]
    tags: Vec<String>,
    #[arg(short = 's', long = "subtask")]
    subtasks: Vec<String>,
    #[arg(long)]
    repeat: Option<RecurrencePeriod>,
    #[arg(long)]
    remind: Option<String>,
}

#[derive(Args, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
struct EditArgs {
    /// Position shown by `ls`, or an id prefix (`id:<prefix>` when it is all digits).
    task: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(short, long)]
    description: Option<String>,
    #[arg(short, long)]
    priority: Option<Priority>,
    #[arg(long, conflicts_with = "clear_due")]
    due: Option<String>,
    #[arg(long)]
    clear_due: bool,
    /// Replace all tags.
    #[arg(short = 't', long = "tag", conflicts_with = "clear_tags")]
    tags: Vec<String>,
    #[arg(long)]
    clear_tags: bool,
    #[arg(long, conflicts_with = "no_repeat")]
    repeat: Option<RecurrencePeriod>,
    #[arg(long)]
    no_repeat: bool,
    #[arg(long, conflicts_with = "clear_remind")]
    remind: Option<String>,
    #[arg(long)]
    clear_remind: bool,
}

#[derive(Args, Debug, Default)]
struct LsArgs {
    #[arg(short, long)]
    filter: Option<TaskFilter>,
    #[arg(short, long)]
    search: Option<String>,
    #[arg(long)]
    sort: Option<SortKey>,
    #[arg(long)]
    desc: bool,
    /// Only tasks carrying any of these tags.
    #[arg(short = 't', long = "tag")]
    tags: Vec<String>,
    /// Print per-filter totals after the list.
    #[arg(long)]
    counts: bool,
}

#[derive(Subcommand, Debug)]
enum SubtaskCommand {
    /// Append a subtask.
    Add { task: String, title: String },
    /// Toggle a subtask by its 1-based position or id prefix.
    Toggle { task: String, subtask: String },
    /// Delete a subtask.
    Rm { task: String, subtask: String },
}

fn main() -> Result<()> {
    let Cli { data, config, cmd } = Cli::parse();
    install_tracing();

    let project = ProjectConfig::load(config.as_deref())?;
    let data_path = data.map_or_else(|| project.data_path(), Ok)?;
    debug!(path = %data_path.display(), "opening task data");

    let store = TaskStore::open(FileBlobStore::new(data_path));
    let mut service = TaskService::with_view(store, ViewState::from_config(project.view.into()));
    commands::run(cmd, &mut service)
}

fn install_tracing() {
    // RUST_LOG overrides; warnings only by default so output stays scriptable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_add_command() {
        let cli = Cli::parse_from([
            "taskdeck",
            "add",
            "Buy milk",
            "--priority",
            "high",
            "--tag",
            "shopping",
            "-t",
            "errands",
            "--subtask",
            "oat",
            "--repeat",
            "weekly",
        ]);

        match cli.cmd {
            Command::Add(AddArgs {
                title,
                priority,
                tags,
                subtasks,
                repeat,
                ..
            }) => {
                assert_eq!(title, "Buy milk");
                assert_eq!(priority, Some(Priority::High));
                assert_eq!(tags, vec!["shopping", "errands"]);
                assert_eq!(subtasks, vec!["oat"]);
                assert_eq!(repeat, Some(RecurrencePeriod::Weekly));
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn parse_ls_command() {
        let cli = Cli::parse_from([
            "taskdeck",
            "--data",
            "/tmp/tasks.json",
            "ls",
            "--filter",
            "overdue",
            "--sort",
            "due-date",
            "--desc",
        ]);

        assert_eq!(cli.data, Some(PathBuf::from("/tmp/tasks.json")));
        match cli.cmd {
            Command::Ls(LsArgs {
                filter, sort, desc, ..
            }) => {
                assert_eq!(filter, Some(TaskFilter::Overdue));
                assert_eq!(sort, Some(SortKey::DueDate));
                assert!(desc);
            }
            _ => panic!("expected ls command"),
        }
    }

    #[test]
    fn parse_subtask_toggle() {
        let cli = Cli::parse_from(["taskdeck", "subtask", "toggle", "2", "1"]);
        match cli.cmd {
            Command::Subtask {
                cmd: SubtaskCommand::Toggle { task, subtask },
            } => {
                assert_eq!(task, "2");
                assert_eq!(subtask, "1");
            }
            _ => panic!("expected subtask toggle"),
        }
    }

    #[test]
    fn edit_rejects_conflicting_due_flags() {
        let result = Cli::try_parse_from([
            "taskdeck",
            "edit",
            "1",
            "--due",
            "2025-06-10",
            "--clear-due",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_filter_is_rejected() {
        let result = Cli::try_parse_from(["taskdeck", "ls", "--filter", "someday"]);
        assert!(result.is_err());
    }
}
