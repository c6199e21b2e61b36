//! Enumerations shared by the command line and the terminal UI.

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Which leaves an agenda panel shows, relative to today.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RangeMode {
    /// Due exactly today, done or not.
    Today,
    /// Overdue and still open, plus anything due today.
    UntilToday,
    /// Upcoming and still open, plus anything due today.
    FromToday,
}

impl RangeMode {
    pub const ALL: [RangeMode; 3] = [RangeMode::Today, RangeMode::UntilToday, RangeMode::FromToday];

    /// Whether `task` belongs to this range. Tasks without a due date never do.
    pub fn includes(self, task: &Task, today: NaiveDate) -> bool {
        let Some(due) = task.due_on_day else {
            return false;
        };
        let open = !task.is_complete();
        match self {
            RangeMode::Today => due == today,
            RangeMode::UntilToday => (due <= today && open) || due == today,
            RangeMode::FromToday => (due >= today && open) || due == today,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RangeMode::Today => "Today",
            RangeMode::UntilToday => "Until today",
            RangeMode::FromToday => "From today",
        }
    }

    /// The next mode in display order, wrapping around.
    pub fn next(self) -> RangeMode {
        match self {
            RangeMode::Today => RangeMode::UntilToday,
            RangeMode::UntilToday => RangeMode::FromToday,
            RangeMode::FromToday => RangeMode::Today,
        }
    }
}

/// Output format for commands that can emit machine-readable data.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
