use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Sprint tracker with hierarchical tasks and a burndown chart.
/// Storage defaults to ~/.sprint/tasks.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "sprint", version, about = "Sprint tracker with a burndown chart")]
pub struct Cli {
    /// Path to the JSON database file.
    #[arg(long, global = true, env = "SPRINT_DB")]
    pub db: Option<PathBuf>,

    /// First day of the burndown range (YYYY-MM-DD, "today", "in 2d", ...).
    #[arg(long, global = true)]
    pub start: Option<String>,

    /// Length of the burndown range in days.
    #[arg(long, global = true)]
    pub days: Option<i64>,

    #[command(subcommand)]
    pub command: Commands,
}
