//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{config_cmd, task};
use crate::domain::{Clock, DateValue, FixedClock, Priority, SystemClock, TaskPath};
use crate::storage::{Config, Workspace};

#[derive(Parser)]
#[command(name = "taskmaster")]
#[command(author, version, about = "Plain-text task list with subtasks and recurring tasks")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured one)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Todo file to use instead of the configured one
    #[arg(long, global = true, env = "TODO_FILE")]
    pub file: Option<PathBuf>,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, env = "TASKMASTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long, global = true, hide = true)]
    pub today: Option<DateValue>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List open tasks (the default command)
    List {
        /// Include completed tasks
        #[arg(long, short)]
        all: bool,
    },

    /// Add a task
    ///
    /// Examples:
    ///   taskmaster add "(A) call mom @phone"
    ///   taskmaster add "plan trip && book flight && pack bag"
    ///   taskmaster add --parent 2 "buy adapter"
    Add {
        /// Task text in todo.txt format, subtasks included
        text: String,

        /// Add as a subtask of this task
        #[arg(long, short)]
        parent: Option<TaskPath>,
    },

    /// Show task details
    Show {
        /// Task path, e.g. 2 or 2.1
        path: TaskPath,
    },

    /// Mark a task and its subtasks as done
    Done {
        /// Task path
        path: TaskPath,
    },

    /// Mark a task and its subtasks as open again
    Undo {
        /// Task path
        path: TaskPath,
    },

    /// Complete a recurring task and add its next occurrence
    Next {
        /// Task path of a root task
        path: TaskPath,
    },

    /// Set or clear a task's priority
    Pri {
        /// Task path
        path: TaskPath,

        /// Priority letter A-Z; omit to clear
        priority: Option<Priority>,
    },

    /// Remove a task and its subtasks
    Rm {
        /// Task path
        path: TaskPath,
    },

    /// Inspect configuration
    #[command(subcommand)]
    Config(config_cmd::ConfigCommands),
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let output = Output::new(cli.format.unwrap_or(config.default_format), cli.verbose);

    output.verbose("taskmaster starting");

    let clock: Box<dyn Clock> = match cli.today {
        Some(day) => {
            output.verbose_ctx("clock", &format!("Using fixed date {}", day));
            Box::new(FixedClock(day))
        }
        None => Box::new(SystemClock),
    };

    let workspace = Workspace::open(config, cli.file.as_deref(), clock.as_ref());
    output.verbose_ctx(
        "workspace",
        &format!("Todo file: {}", workspace.path().display()),
    );

    match cli.command.unwrap_or(Commands::List { all: false }) {
        Commands::List { all } => task::list(&output, &workspace, all)?,
        Commands::Add { text, parent } => task::add(&output, &workspace, &text, parent.as_ref())?,
        Commands::Show { path } => task::show(&output, &workspace, &path)?,
        Commands::Done { path } => task::set_done(&output, &workspace, &path, true)?,
        Commands::Undo { path } => task::set_done(&output, &workspace, &path, false)?,
        Commands::Next { path } => task::next(&output, &workspace, &path)?,
        Commands::Pri { path, priority } => task::set_priority(&output, &workspace, &path, priority)?,
        Commands::Rm { path } => task::remove(&output, &workspace, &path)?,
        Commands::Config(cmd) => config_cmd::run(cmd, &output, &workspace, cli.config.as_deref())?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
