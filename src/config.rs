//! Settings resolution for the command line and the terminal UI.
//!
//! The database path comes from `--db`, the `SPRINT_DB` environment variable,
//! or `~/.sprint/tasks.json`. The burndown axis comes from `--start` and
//! `--days` when given, then from the axis saved in the database, then from
//! the defaults (today, [`DateAxis::DEFAULT_DAYS`] days).

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::burndown::DateAxis;
use crate::dates::parse_day_input;
use crate::db::Database;
use crate::error::Result;
use crate::store::TaskStore;

/// Environment variable naming the database file.
pub const DB_ENV: &str = "SPRINT_DB";

/// File name of the database inside the data directory.
pub const DB_FILE: &str = "tasks.json";

/// Resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub axis_start: Option<NaiveDate>,
    pub axis_days: Option<i64>,
    pub today: NaiveDate,
}

impl Settings {
    /// Resolve settings from command line values. `start` accepts the same
    /// forms as any other date input.
    pub fn resolve(
        db: Option<PathBuf>,
        start: Option<&str>,
        days: Option<i64>,
        today: NaiveDate,
    ) -> Result<Self> {
        let axis_start = start.map(|s| parse_day_input(s, today)).transpose()?;
        if let Some(d) = days {
            DateAxis::new(today, d)?;
        }
        Ok(Settings {
            db_path: db.unwrap_or_else(|| default_data_dir().join(DB_FILE)),
            axis_start,
            axis_days: days,
            today,
        })
    }

    /// The axis to use given the one saved in the database.
    pub fn axis(&self, stored: Option<DateAxis>) -> Result<DateAxis> {
        let start = self
            .axis_start
            .or(stored.map(|a| a.start))
            .unwrap_or(self.today);
        let days = self
            .axis_days
            .or(stored.map(|a| a.days as i64))
            .unwrap_or(DateAxis::DEFAULT_DAYS as i64);
        DateAxis::new(start, days)
    }

    /// Load the database and build the store for this invocation.
    pub fn open_store(&self) -> Result<TaskStore> {
        let (forest, stored) = Database::load(&self.db_path);
        Ok(TaskStore::new(forest, self.axis(stored)?))
    }
}

/// `~/.sprint`, or `./.sprint` when no home directory is known.
pub fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".sprint")
}
