//! Command-line interface for taskpad
//!
//! This module defines the CLI structure using clap derive macros.
//! Command implementations live in `task`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;

mod task;

/// taskpad - personal task tracking
///
/// Tasks carry a priority, a due date and a category. Lists are sorted
/// pending first, then by priority, then by due date.
#[derive(Parser, Debug)]
#[command(name = "taskpad")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding tasks.json and categories.json
    #[arg(long, global = true, env = "TASKPAD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true, env = "TASKPAD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a task
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,

        /// Due date: YYYY-MM-DD (end of day, UTC) or RFC 3339 (default: now)
        #[arg(long)]
        due: Option<String>,

        /// Priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,

        /// Category id (see `taskpad categories`)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List tasks, filtered and sorted
    #[command(alias = "ls")]
    List {
        /// Case-insensitive text to find in title or description
        #[arg(short, long)]
        search: Option<String>,

        /// Status filter: all, pending, completed, overdue
        #[arg(long, default_value = "all")]
        status: String,

        /// Maximum number of tasks to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show one task
    Show {
        /// Task id or unique id prefix
        id: String,
    },

    /// Change fields of a task
    Edit {
        /// Task id or unique id prefix
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description (empty string clears it)
        #[arg(short, long)]
        description: Option<String>,

        /// New due date
        #[arg(long)]
        due: Option<String>,

        /// New priority
        #[arg(short, long)]
        priority: Option<String>,

        /// New category id
        #[arg(short, long)]
        category: Option<String>,

        /// Set completion explicitly (true/false)
        #[arg(long)]
        completed: Option<bool>,
    },

    /// Flip a task between pending and completed
    Toggle {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete a task
    #[command(alias = "delete")]
    Rm {
        /// Task id or unique id prefix
        id: String,
    },

    /// Completion, priority and category statistics
    Stats,

    /// List categories
    Categories,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let global = task::GlobalOptions {
            data_dir: self.data_dir,
            config: self.config,
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Add {
                title,
                description,
                due,
                priority,
                category,
            } => task::run_add(task::AddOptions {
                title,
                description,
                due,
                priority,
                category,
                global,
            }),
            Commands::List {
                search,
                status,
                limit,
            } => task::run_list(task::ListOptions {
                search,
                status,
                limit,
                global,
            }),
            Commands::Show { id } => task::run_show(task::ShowOptions { id, global }),
            Commands::Edit {
                id,
                title,
                description,
                due,
                priority,
                category,
                completed,
            } => task::run_edit(task::EditOptions {
                id,
                title,
                description,
                due,
                priority,
                category,
                completed,
                global,
            }),
            Commands::Toggle { id } => task::run_toggle(task::ToggleOptions { id, global }),
            Commands::Rm { id } => task::run_delete(task::DeleteOptions { id, global }),
            Commands::Stats => task::run_stats(task::StatsOptions { global }),
            Commands::Categories => task::run_categories(task::CategoriesOptions { global }),
        }
    }
}
