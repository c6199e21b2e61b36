//! Task data structures and related functionality.
//!
//! Two shapes of the same work item live here. [`Task`] is the flat record
//! stored in the forest arena; it knows its parent but not its children.
//! [`TaskNode`] is the nested, serialisable tree shape used for the persisted
//! snapshot and for handing whole subtrees to views.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier of a task, unique across the whole forest.
pub type TaskId = u64;

/// A single work item as stored in the forest arena.
///
/// `estimate`, `due_on_day` and `completed_on_day` only carry meaning while the
/// task is a leaf. A task that gains children keeps these values, but every
/// aggregate ignores them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub estimate: f64,
    pub parent_id: Option<TaskId>,
    #[serde(default, with = "day_serde")]
    pub due_on_day: Option<NaiveDate>,
    #[serde(default, with = "day_serde")]
    pub completed_on_day: Option<NaiveDate>,
}

impl Task {
    /// Create a root-level task with no dates set.
    pub fn new(id: TaskId, name: impl Into<String>, estimate: f64) -> Self {
        Task {
            id,
            name: name.into(),
            estimate,
            parent_id: None,
            due_on_day: None,
            completed_on_day: None,
        }
    }

    pub fn with_due(mut self, due: NaiveDate) -> Self {
        self.due_on_day = Some(due);
        self
    }

    pub fn with_completed(mut self, completed: NaiveDate) -> Self {
        self.completed_on_day = Some(completed);
        self
    }

    pub fn is_complete(&self) -> bool {
        self.completed_on_day.is_some()
    }

    /// True when the task was completed on or before `day`.
    pub fn completed_by(&self, day: NaiveDate) -> bool {
        self.completed_on_day.is_some_and(|c| c <= day)
    }

    /// True when the task is planned to be finished on or before `day`.
    pub fn due_by(&self, day: NaiveDate) -> bool {
        self.due_on_day.is_some_and(|d| d <= day)
    }

    /// Apply every field present in `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(estimate) = patch.estimate {
            self.estimate = estimate;
        }
        if let Some(due) = patch.due_on_day {
            self.due_on_day = due;
        }
        if let Some(completed) = patch.completed_on_day {
            self.completed_on_day = completed;
        }
    }
}

/// A partial update to a [`Task`].
///
/// Date fields are doubly optional: `None` leaves the field alone while
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub estimate: Option<f64>,
    pub due_on_day: Option<Option<NaiveDate>>,
    pub completed_on_day: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    pub fn name(name: impl Into<String>) -> Self {
        TaskPatch { name: Some(name.into()), ..Default::default() }
    }

    pub fn estimate(estimate: f64) -> Self {
        TaskPatch { estimate: Some(estimate), ..Default::default() }
    }

    pub fn due_on_day(due: Option<NaiveDate>) -> Self {
        TaskPatch { due_on_day: Some(due), ..Default::default() }
    }

    pub fn completed_on_day(completed: Option<NaiveDate>) -> Self {
        TaskPatch { completed_on_day: Some(completed), ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.estimate.is_none()
            && self.due_on_day.is_none()
            && self.completed_on_day.is_none()
    }
}

/// Nested tree shape of a task, as persisted and as rendered.
///
/// `children` are owned by the node. `parent_id` is kept as a back-reference
/// for display and is rebuilt from the nesting on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNode {
    pub id: TaskId,
    pub name: String,
    pub estimate: f64,
    #[serde(default)]
    pub parent_id: Option<TaskId>,
    #[serde(default)]
    pub children: Vec<TaskNode>,
    #[serde(default, with = "day_serde")]
    pub due_on_day: Option<NaiveDate>,
    #[serde(default, with = "day_serde")]
    pub completed_on_day: Option<NaiveDate>,
}

impl TaskNode {
    /// Split the node into its flat record and its children.
    pub fn into_parts(mut self) -> (Task, Vec<TaskNode>) {
        let task = Task {
            id: self.id,
            name: std::mem::take(&mut self.name),
            estimate: self.estimate,
            parent_id: self.parent_id,
            due_on_day: self.due_on_day,
            completed_on_day: self.completed_on_day,
        };
        (task, std::mem::take(&mut self.children))
    }

    pub fn from_parts(task: &Task, children: Vec<TaskNode>) -> Self {
        TaskNode {
            id: task.id,
            name: task.name.clone(),
            estimate: task.estimate,
            parent_id: task.parent_id,
            children,
            due_on_day: task.due_on_day,
            completed_on_day: task.completed_on_day,
        }
    }
}

// Nested children are released from a flat list, so dropping a deep chain
// uses constant stack.
impl Drop for TaskNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Reject empty (or whitespace-only) task names. Returns the trimmed name.
pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Reject estimates that are not strictly positive finite numbers.
pub fn validate_estimate(estimate: f64) -> Result<f64> {
    if estimate.is_finite() && estimate > 0.0 {
        Ok(estimate)
    } else {
        Err(Error::InvalidEstimate(estimate))
    }
}

/// Calendar day of a timestamp in its own time zone.
///
/// Takes the timestamp by reference and returns a fresh value, so stored
/// dates are never truncated in place.
pub fn day_of<Tz: TimeZone>(at: &DateTime<Tz>) -> NaiveDate {
    at.date_naive()
}

/// The current local calendar day.
pub fn today() -> NaiveDate {
    day_of(&Local::now())
}

/// Parse a persisted date. Accepts plain `YYYY-MM-DD` as well as full
/// RFC 3339 timestamps, which are reduced to their local calendar day.
pub fn parse_stored_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(day);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|at| day_of(&at.with_timezone(&Local)))
}

/// Serde adapter for optional day-granularity dates stored as ISO strings.
mod day_serde {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(day: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match day {
            Some(d) => s.serialize_some(&d.format("%Y-%m-%d").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => super::parse_stored_day(&s)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid date '{s}'"))),
        }
    }
}
