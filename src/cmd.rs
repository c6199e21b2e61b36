//! Command implementations for the CLI interface.
//!
//! Each handler works on an open [`TaskStore`]; [`run`] saves the database
//! afterwards when the store reports a change. Rendering helpers return
//! strings so the layouts can be checked without a terminal.

use std::fmt::Write as _;
use std::io;

use chrono::NaiveDate;
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use tracing::{debug, info};

use crate::burndown::{summarize, BurndownPoint};
use crate::cli::Cli;
use crate::config::Settings;
use crate::dates::{format_day, format_due_relative, parse_day_input};
use crate::db::{to_json_pretty, Database};
use crate::error::{Error, Result};
use crate::fields::{OutputFormat, RangeMode};
use crate::store::TaskStore;
use crate::task::{self, Task, TaskId};
use crate::tree::Forest;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive terminal interface.
    Ui,

    /// Add a new leaf task.
    Add {
        /// Task name.
        name: String,
        /// Estimate in story points (or any unit), must be positive.
        #[arg(long, short)]
        estimate: f64,
        /// Due day: YYYY-MM-DD, "today", "tomorrow", "fri", "in Nd". Required.
        #[arg(long)]
        due: Option<String>,
        /// Parent task ID or name.
        #[arg(long)]
        parent: Option<String>,
    },

    /// Show the task tree.
    List {
        /// Show only leaf tasks, flat.
        #[arg(long)]
        leaves: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// View a single task by ID or name.
    View {
        /// Task ID or name to view
        id: String,
    },

    /// Rename a task.
    Rename {
        /// Task ID or name to rename
        id: String,
        /// New name.
        name: String,
    },

    /// Change a task's estimate.
    Estimate {
        /// Task ID or name
        id: String,
        /// New estimate, must be positive.
        estimate: f64,
    },

    /// Set or clear a task's due day.
    Due {
        /// Task ID or name
        id: String,
        /// New due day.
        #[arg(required_unless_present = "clear")]
        date: Option<String>,
        /// Clear the due day.
        #[arg(long, conflicts_with = "date")]
        clear: bool,
    },

    /// Mark a task completed.
    Complete {
        /// Task ID or name
        id: String,
        /// Completion day (default: today).
        #[arg(long)]
        on: Option<String>,
    },

    /// Clear a task's completion day.
    Reopen {
        /// Task ID or name
        id: String,
    },

    /// Delete a task and everything under it.
    Delete {
        /// Task ID or name to delete
        id: String,
    },

    /// List leaf tasks due around today.
    Agenda {
        #[arg(long, value_enum, default_value_t = RangeMode::UntilToday)]
        mode: RangeMode,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Print the burndown series for the current range.
    Burndown {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show the burndown range, saving --start/--days when given.
    Axis,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let today = task::today();
    let settings = Settings::resolve(cli.db, cli.start.as_deref(), cli.days, today)?;
    debug!(db = %settings.db_path.display(), "settings resolved");

    match cli.command {
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
        Commands::Ui => run_tui(&settings),
        Commands::Axis => cmd_axis(&settings),
        command => {
            let mut store = settings.open_store()?;
            let version = store.version();
            let out = dispatch(&mut store, command, today)?;
            if store.version() != version {
                Database::snapshot(store.forest(), store.axis()).save(&settings.db_path)?;
            }
            print!("{out}");
            Ok(())
        }
    }
}

/// Run a store command and return what it prints.
pub fn dispatch(store: &mut TaskStore, command: Commands, today: NaiveDate) -> Result<String> {
    match command {
        Commands::Add { name, estimate, due, parent } => {
            cmd_add(store, &name, estimate, due.as_deref(), parent.as_deref(), today)
        }
        Commands::List { leaves, format } => cmd_list(store.forest(), leaves, format, today),
        Commands::View { id } => cmd_view(store.forest(), &id, today),
        Commands::Rename { id, name } => {
            let id = resolve_task_identifier(&id, store.forest())?;
            store.rename(id, &name)?;
            Ok(format!("Renamed task {id}\n"))
        }
        Commands::Estimate { id, estimate } => {
            let id = resolve_task_identifier(&id, store.forest())?;
            store.update_estimate(id, estimate)?;
            Ok(format!("{}Estimate of task {id} set to {estimate}\n", container_note(store.forest(), id)))
        }
        Commands::Due { id, date, clear } => {
            let id = resolve_task_identifier(&id, store.forest())?;
            let due = match (date, clear) {
                (_, true) => None,
                (Some(d), false) => Some(parse_day_input(&d, today)?),
                (None, false) => return Err(Error::InvalidDate(String::new())),
            };
            store.update_due_on_day(id, due);
            Ok(format!("{}Due day of task {id} set to {}\n", container_note(store.forest(), id), format_day(due)))
        }
        Commands::Complete { id, on } => {
            let id = resolve_task_identifier(&id, store.forest())?;
            let day = on.as_deref().map(|d| parse_day_input(d, today)).transpose()?.unwrap_or(today);
            store.update_completed_on_day(id, Some(day));
            Ok(format!("{}Completed task {id} on {day}\n", container_note(store.forest(), id)))
        }
        Commands::Reopen { id } => {
            let id = resolve_task_identifier(&id, store.forest())?;
            store.update_completed_on_day(id, None);
            Ok(format!("Reopened task {id}\n"))
        }
        Commands::Delete { id } => {
            let id = resolve_task_identifier(&id, store.forest())?;
            let removed = store.delete_task(id);
            info!(task_id = id, removed, "deleted");
            Ok(format!("Deleted {removed} task(s)\n"))
        }
        Commands::Agenda { mode, format } => cmd_agenda(store, mode, format, today),
        Commands::Burndown { format } => cmd_burndown(store, format, today),
        Commands::Ui | Commands::Axis | Commands::Completions { .. } => Ok(String::new()),
    }
}

// Edits to containers are kept but do not count towards the burndown.
fn container_note(forest: &Forest, id: TaskId) -> &'static str {
    if forest.is_leaf(id) {
        ""
    } else {
        "Note: task has subtasks, this value is ignored by the burndown.\n"
    }
}

/// Add a new leaf task.
pub fn cmd_add(
    store: &mut TaskStore,
    name: &str,
    estimate: f64,
    due: Option<&str>,
    parent: Option<&str>,
    today: NaiveDate,
) -> Result<String> {
    let parent_id = parent
        .map(|p| resolve_task_identifier(p, store.forest()))
        .transpose()?;
    let due = due.map(|d| parse_day_input(d, today)).transpose()?;
    match store.add_leaf(name, estimate, parent_id, due)? {
        Some(id) => Ok(format!("Added task {id}\n")),
        None => Err(Error::TaskResolution("Parent task not found".into())),
    }
}

/// Print the forest as an indented table, or the leaves only.
pub fn cmd_list(forest: &Forest, leaves: bool, format: OutputFormat, today: NaiveDate) -> Result<String> {
    match (format, leaves) {
        (OutputFormat::Json, false) => Ok(to_json_pretty(&forest.to_nodes())? + "\n"),
        (OutputFormat::Json, true) => Ok(serde_json::to_string_pretty(&forest.collect_leaves())? + "\n"),
        (OutputFormat::Table, false) => Ok(render_tree(forest, today)),
        (OutputFormat::Table, true) => Ok(render_leaves(forest, &forest.collect_leaves(), today)),
    }
}

/// View detailed information about a specific task.
pub fn cmd_view(forest: &Forest, id: &str, today: NaiveDate) -> Result<String> {
    let id = resolve_task_identifier(id, forest)?;
    let Some(task) = forest.find_by_id(id) else {
        return Err(Error::TaskResolution(format!("Task with ID {id} not found")));
    };
    let leaf = forest.is_leaf(id);
    let path = forest.ancestor_chain(id);

    let mut out = String::new();
    let _ = writeln!(out, "ID:         {}", task.id);
    let _ = writeln!(out, "Name:       {}", task.name);
    let _ = writeln!(out, "Path:       {}", if path.is_empty() { "-".into() } else { path.join(" > ") });
    if leaf {
        let _ = writeln!(out, "Estimate:   {}", task.estimate);
        let _ = writeln!(
            out,
            "Due:        {}",
            match task.due_on_day {
                Some(d) => format!("{d} ({})", format_due_relative(Some(d), today)),
                None => "-".into(),
            }
        );
        let _ = writeln!(out, "Completed:  {}", format_day(task.completed_on_day));
    } else {
        let _ = writeln!(out, "Estimate:   {} (sum of subtasks)", forest.subtree_estimate(id));
        let _ = writeln!(out, "Subtasks:");
        for (depth, t) in walk_subtree(forest, id) {
            let _ = writeln!(out, "{}- {} (#{}){}", "  ".repeat(depth), t.name, t.id, leaf_marker(forest, t));
        }
    }
    Ok(out)
}

/// Leaves selected by `mode`, with their breadcrumbs.
pub fn cmd_agenda(store: &TaskStore, mode: RangeMode, format: OutputFormat, today: NaiveDate) -> Result<String> {
    let tasks = store.tasks_in_range(mode, today);
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&tasks)? + "\n"),
        OutputFormat::Table => {
            let mut out = format!("{} ({today})\n", mode.label());
            out.push_str(&render_leaves(store.forest(), &tasks, today));
            Ok(out)
        }
    }
}

/// Burndown series for the store's axis.
pub fn cmd_burndown(store: &TaskStore, format: OutputFormat, today: NaiveDate) -> Result<String> {
    let points = store.burndown();
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&points)? + "\n"),
        OutputFormat::Table => Ok(render_burndown(&points, today)),
    }
}

/// Show the axis and persist any --start/--days given with it.
pub fn cmd_axis(settings: &Settings) -> Result<()> {
    let (forest, stored) = Database::load(&settings.db_path);
    let axis = settings.axis(stored)?;
    if settings.axis_start.is_some() || settings.axis_days.is_some() {
        Database::snapshot(&forest, &axis).save(&settings.db_path)?;
        println!("Saved range.");
    }
    println!("Range: {} .. {} ({} days)", axis.start, axis.end(), axis.days);
    Ok(())
}

/// Generate shell completions on stdout.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "sprint", &mut io::stdout());
}

/// Resolve a task identifier (either ID or name) to a task ID.
/// Returns an error if the name has multiple matches and suggests using ID instead.
pub fn resolve_task_identifier(identifier: &str, forest: &Forest) -> Result<TaskId> {
    if let Ok(id) = identifier.trim().parse::<TaskId>() {
        return if forest.contains(id) {
            Ok(id)
        } else {
            Err(Error::TaskResolution(format!("Task with ID {id} not found")))
        };
    }

    let matches = forest.find_by_name(identifier);
    match matches.as_slice() {
        [] => Err(Error::TaskResolution(format!("No task found with name '{identifier}'"))),
        [only] => Ok(only.id),
        many => {
            let mut msg = format!("Multiple tasks found with name '{identifier}':\n");
            for t in many {
                let path = forest.ancestor_chain(t.id);
                let _ = write!(msg, "  ID {}: {}", t.id, t.name);
                if !path.is_empty() {
                    let _ = write!(msg, " [in {}]", path.join(" > "));
                }
                msg.push('\n');
            }
            msg.push_str("Please use the specific ID instead.");
            Err(Error::TaskResolution(msg))
        }
    }
}

fn leaf_marker(forest: &Forest, task: &Task) -> &'static str {
    match (forest.is_leaf(task.id), task.is_complete()) {
        (false, _) => "",
        (true, true) => " [done]",
        (true, false) => " [open]",
    }
}

fn walk_subtree(forest: &Forest, id: TaskId) -> Vec<(usize, &Task)> {
    let mut out = Vec::new();
    let mut stack: Vec<(usize, TaskId)> = forest.children_of(id).iter().rev().map(|&c| (1, c)).collect();
    while let Some((depth, current)) = stack.pop() {
        if let Some(t) = forest.find_by_id(current) {
            out.push((depth, t));
            stack.extend(forest.children_of(current).iter().rev().map(|&c| (depth + 1, c)));
        }
    }
    out
}

/// Render the forest as an indented table.
pub fn render_tree(forest: &Forest, today: NaiveDate) -> String {
    let mut out = format!("{:<5} {:>7} {:<10} {:<10} {}\n", "ID", "Est", "Due", "Done", "Name");
    for (depth, t) in forest.walk() {
        let (est, due, done) = if forest.is_leaf(t.id) {
            (
                format_estimate(t.estimate),
                format_due_relative(t.due_on_day, today),
                format_day(t.completed_on_day),
            )
        } else {
            (format!("({})", format_estimate(forest.subtree_estimate(t.id))), String::new(), String::new())
        };
        let _ = writeln!(out, "{:<5} {:>7} {:<10} {:<10} {}{}", t.id, est, due, done, "  ".repeat(depth), t.name);
    }
    out
}

/// Render leaves flat with their breadcrumbs.
pub fn render_leaves(forest: &Forest, tasks: &[&Task], today: NaiveDate) -> String {
    let mut out = format!("{:<5} {:>7} {:<10} {:<6} {}\n", "ID", "Est", "Due", "State", "Task");
    for t in tasks {
        let path = forest.ancestor_chain(t.id);
        let label = if path.is_empty() {
            t.name.clone()
        } else {
            format!("{} > {}", path.join(" > "), t.name)
        };
        let _ = writeln!(
            out,
            "{:<5} {:>7} {:<10} {:<6} {}",
            t.id,
            format_estimate(t.estimate),
            format_due_relative(t.due_on_day, today),
            if t.is_complete() { "done" } else { "open" },
            truncate(&label, 60)
        );
    }
    out
}

/// Render the series as a table followed by a one-line summary.
pub fn render_burndown(points: &[BurndownPoint], today: NaiveDate) -> String {
    let mut out = format!("{:<10} {:>8} {:>8} {:>8}\n", "Date", "Ideal", "Actual", "Due");
    for p in points {
        let marker = if p.date == today { " <" } else { "" };
        let _ = writeln!(
            out,
            "{:<10} {:>8.2} {:>8.2} {:>8.2}{marker}",
            p.date, p.ideal_remaining, p.actual_remaining, p.due_remaining
        );
    }
    if let Some(s) = summarize(points, today) {
        let standing = if s.variance > 0.0 {
            format!("{:.2} behind", s.variance)
        } else if s.variance < 0.0 {
            format!("{:.2} ahead", -s.variance)
        } else {
            "on track".into()
        };
        let _ = writeln!(
            out,
            "As of {}: {:.2} of {:.2} remaining ({standing})",
            s.as_of, s.remaining, s.total
        );
    }
    out
}

fn format_estimate(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
