//! # sprint - local sprint tracker with a burndown chart
//!
//! Tasks form a forest of unbounded depth. Only leaf tasks carry work: an
//! estimate, a due day and, once finished, a completion day. From the leaves
//! the tracker projects a burndown over a configurable range of days, with
//! three lines:
//!
//! - **ideal**: the total burned evenly across the range
//! - **actual**: what is left given the completion days
//! - **due**: what would be left if every task finished on its due day
//!
//! ## Module Organisation
//!
//! - `task`: the task record, its nested tree shape and patches
//! - `tree`: the arena-backed forest and its operations
//! - `burndown`: the date axis and the series projection
//! - `store`: the single owner of the forest, with change observers
//! - `db`: the JSON snapshot on disk
//! - `config`: database path and axis resolution
//! - `cli` / `cmd`: the command line
//! - `tui`: the terminal interface
//!
//! ## Quick Start
//!
//! ```bash
//! sprint add "Sprint 12" --estimate 1 --due eow
//! sprint add "Login form" --estimate 3 --due tomorrow --parent "Sprint 12"
//! sprint complete "Login form"
//! sprint burndown --days 10
//! sprint ui
//! ```

pub mod burndown;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod fields;
pub mod store;
pub mod task;
pub mod tree;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod run;
    pub mod utils;
}

pub use error::{Error, Result};
