//! taskpad - personal task tracking library
//!
//! This library provides the core functionality for the taskpad CLI.
//!
//! # Core Concepts
//!
//! - **Tasks**: titled work items with a priority, due date, category and
//!   completion flag
//! - **Categories**: named, colored labels; five are seeded on first use
//! - **Views**: search and status filters plus a stable pending/priority/due
//!   ordering
//! - **Statistics**: completion rates, overdue counts, per-priority and
//!   per-category breakdowns
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `config.toml`
//! - `error`: Error types and result aliases
//! - `lock`: Writer lock and atomic file replacement
//! - `output`: Human and JSON output for commands
//! - `query`: Filtering and sorting
//! - `service`: In-memory snapshot coordinated with storage
//! - `stats`: Aggregate statistics
//! - `storage`: Record stores and typed task/category collections
//! - `task`: Task and category records

pub mod cli;
pub mod config;
pub mod error;
pub mod lock;
pub mod output;
pub mod query;
pub mod service;
pub mod stats;
pub mod storage;
pub mod task;

pub use error::{Error, Result};
pub use service::TaskService;
pub use storage::{FileStore, MemoryStore, RecordStore, Storage};
