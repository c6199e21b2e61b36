//! The task store: owner of the current forest and burndown axis.
//!
//! All edits go through the store's commands. Each command either changes
//! state completely or not at all; after every effective change the version
//! counter is bumped and subscribed observers are called synchronously with
//! the new state. Commands that hit an unknown id change nothing and publish
//! nothing.

use chrono::NaiveDate;
use tracing::debug;

use crate::burndown::{BurndownPoint, DateAxis};
use crate::error::{Error, Result};
use crate::fields::RangeMode;
use crate::task::{validate_estimate, validate_name, Task, TaskId, TaskPatch};
use crate::tree::Forest;

/// Handle returned by [`TaskStore::subscribe`].
pub type SubscriptionId = usize;

/// State published to observers after a change.
#[derive(Debug, Clone, Copy)]
pub struct Change<'a> {
    pub version: u64,
    pub forest: &'a Forest,
    pub axis: &'a DateAxis,
}

type Observer = Box<dyn FnMut(&Change<'_>)>;

/// Single-writer container for the task forest.
pub struct TaskStore {
    forest: Forest,
    axis: DateAxis,
    version: u64,
    // None once the id space is used up.
    next_id: Option<TaskId>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: SubscriptionId,
}

impl TaskStore {
    pub fn new(forest: Forest, axis: DateAxis) -> Self {
        let next_id = forest.max_id().map_or(Some(1), |m| m.checked_add(1));
        TaskStore {
            forest,
            axis,
            version: 0,
            next_id,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn axis(&self) -> &DateAxis {
        &self.axis
    }

    /// Number of effective changes since construction.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Register an observer called after every effective change.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&Change<'_>) + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    fn publish(&mut self) {
        self.version += 1;
        debug_assert!(self.forest.is_consistent());
        let change = Change {
            version: self.version,
            forest: &self.forest,
            axis: &self.axis,
        };
        for (_, observer) in self.observers.iter_mut() {
            observer(&change);
        }
    }

    /// Create a new leaf under `parent_id` (or as a root).
    ///
    /// Rejects empty names, missing due dates and non-positive estimates
    /// without touching the forest. Returns `Ok(None)` when `parent_id` names
    /// no task, in which case nothing is inserted. Fails with
    /// [`Error::IdsExhausted`] once every id has been handed out.
    pub fn add_leaf(
        &mut self,
        name: &str,
        estimate: f64,
        parent_id: Option<TaskId>,
        due_on_day: Option<NaiveDate>,
    ) -> Result<Option<TaskId>> {
        let name = validate_name(name)?;
        let due = due_on_day.ok_or(Error::MissingDueDate)?;
        let estimate = validate_estimate(estimate)?;

        let id = self.next_id.ok_or(Error::IdsExhausted)?;
        let task = Task::new(id, name, estimate).with_due(due);
        if !self.forest.insert_child(parent_id, task) {
            debug!(task_id = id, ?parent_id, "parent not found, add ignored");
            return Ok(None);
        }
        self.next_id = id.checked_add(1);
        debug!(task_id = id, ?parent_id, estimate, %due, "task added");
        self.publish();
        Ok(Some(id))
    }

    /// Apply an arbitrary patch. Returns false if `id` is unknown.
    ///
    /// A patch that leaves the task as it was publishes nothing.
    pub fn apply(&mut self, id: TaskId, patch: &TaskPatch) -> bool {
        let Some(before) = self.forest.find_by_id(id).cloned() else {
            return false;
        };
        let mut after = before.clone();
        after.apply(patch);
        if after == before {
            return true;
        }
        self.forest.update_by_id(id, patch);
        debug!(task_id = id, ?patch, "task updated");
        self.publish();
        true
    }

    pub fn rename(&mut self, id: TaskId, name: &str) -> Result<bool> {
        let name = validate_name(name)?;
        Ok(self.apply(id, &TaskPatch::name(name)))
    }

    pub fn update_estimate(&mut self, id: TaskId, estimate: f64) -> Result<bool> {
        let estimate = validate_estimate(estimate)?;
        Ok(self.apply(id, &TaskPatch::estimate(estimate)))
    }

    pub fn update_due_on_day(&mut self, id: TaskId, due: Option<NaiveDate>) -> bool {
        self.apply(id, &TaskPatch::due_on_day(due))
    }

    pub fn update_completed_on_day(&mut self, id: TaskId, completed: Option<NaiveDate>) -> bool {
        self.apply(id, &TaskPatch::completed_on_day(completed))
    }

    /// Delete a task and its subtree. Returns the number of tasks removed.
    pub fn delete_task(&mut self, id: TaskId) -> usize {
        let removed = self.forest.delete_by_id(id);
        if removed > 0 {
            debug!(task_id = id, removed, "task deleted");
            self.publish();
        }
        removed
    }

    /// Leaves due on `today`.
    pub fn today_tasks(&self, today: NaiveDate) -> Vec<&Task> {
        self.tasks_in_range(RangeMode::Today, today)
    }

    /// Leaves selected by `mode` relative to `today`, in display order.
    pub fn tasks_in_range(&self, mode: RangeMode, today: NaiveDate) -> Vec<&Task> {
        self.forest
            .collect_leaves()
            .into_iter()
            .filter(|t| mode.includes(t, today))
            .collect()
    }

    pub fn set_axis(&mut self, axis: DateAxis) {
        if axis == self.axis {
            return;
        }
        debug!(start = %axis.start, days = axis.days, "axis changed");
        self.axis = axis;
        self.publish();
    }

    pub fn set_axis_start(&mut self, start: NaiveDate) -> Result<()> {
        let axis = DateAxis::new(start, i64::from(self.axis.days))?;
        self.set_axis(axis);
        Ok(())
    }

    /// Change the axis length; rejects lengths below one day.
    pub fn set_axis_days(&mut self, days: i64) -> Result<()> {
        let axis = DateAxis::new(self.axis.start, days)?;
        self.set_axis(axis);
        Ok(())
    }

    /// Burndown series for the current forest and axis.
    pub fn burndown(&self) -> Vec<BurndownPoint> {
        self.forest.burndown(&self.axis)
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        TaskStore::new(Forest::new(), DateAxis::default())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    fn store() -> TaskStore {
        TaskStore::new(Forest::new(), DateAxis::new(day(2), 5).unwrap())
    }

    #[test]
    fn add_leaf_assigns_fresh_ids() {
        let mut s = store();
        let a = s.add_leaf("Epic", 1.0, None, Some(day(3))).unwrap().unwrap();
        let b = s.add_leaf("Story", 2.0, Some(a), Some(day(4))).unwrap().unwrap();
        assert_ne!(a, b);
        assert_eq!(s.forest().find_by_id(b).unwrap().parent_id, Some(a));
        assert_eq!(s.version(), 2);
    }

    #[test]
    fn add_leaf_fails_once_ids_run_out() {
        let mut forest = Forest::new();
        assert!(forest.insert_child(None, Task::new(u64::MAX, "Last", 1.0).with_due(day(3))));
        let mut s = TaskStore::new(forest, DateAxis::new(day(2), 5).unwrap());
        let before = s.forest().clone();

        let err = s.add_leaf("One more", 1.0, None, Some(day(4))).unwrap_err();
        assert!(matches!(err, Error::IdsExhausted));
        assert_eq!(s.forest(), &before);
        assert_eq!(s.version(), 0);

        let mut s = TaskStore::new(Forest::new(), DateAxis::new(day(2), 5).unwrap());
        s.next_id = Some(u64::MAX);
        assert_eq!(s.add_leaf("Final", 1.0, None, Some(day(4))).unwrap(), Some(u64::MAX));
        assert!(matches!(
            s.add_leaf("Beyond", 1.0, None, Some(day(4))),
            Err(Error::IdsExhausted)
        ));
    }

    #[test]
    fn add_with_empty_name_is_rejected_without_change() {
        let mut s = store();
        let parent = s.add_leaf("Parent", 1.0, None, Some(day(3))).unwrap().unwrap();
        let before = s.forest().clone();
        let version = s.version();

        let result = s.add_leaf("  ", 3.0, Some(parent), Some(day(4)));
        assert!(matches!(result, Err(Error::EmptyName)));
        assert_eq!(s.forest(), &before);
        assert_eq!(s.version(), version);
    }

    #[test]
    fn add_without_due_date_is_rejected() {
        let mut s = store();
        assert!(matches!(s.add_leaf("x", 1.0, None, None), Err(Error::MissingDueDate)));
        assert!(matches!(
            s.add_leaf("x", 0.0, None, Some(day(3))),
            Err(Error::InvalidEstimate(_))
        ));
        assert!(s.forest().is_empty());
    }

    #[test]
    fn add_under_unknown_parent_is_silent() {
        let mut s = store();
        assert_eq!(s.add_leaf("x", 1.0, Some(404), Some(day(3))).unwrap(), None);
        assert!(s.forest().is_empty());
        assert_eq!(s.version(), 0);
        // The id was not consumed.
        assert_eq!(s.add_leaf("y", 1.0, None, Some(day(3))).unwrap(), Some(1));
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut s = store();
        let a = s.add_leaf("a", 1.0, None, Some(day(3))).unwrap().unwrap();
        s.delete_task(a);
        let b = s.add_leaf("b", 1.0, None, Some(day(3))).unwrap().unwrap();
        assert!(b > a);
    }

    #[test]
    fn delete_mid_tree_node_drops_descendants() {
        let mut s = store();
        let root = s.add_leaf("root", 1.0, None, Some(day(3))).unwrap().unwrap();
        let mid = s.add_leaf("mid", 1.0, Some(root), Some(day(3))).unwrap().unwrap();
        let c1 = s.add_leaf("c1", 1.0, Some(mid), Some(day(3))).unwrap().unwrap();
        let c2 = s.add_leaf("c2", 1.0, Some(mid), Some(day(3))).unwrap().unwrap();

        assert_eq!(s.delete_task(mid), 3);
        let leaves: Vec<TaskId> = s.forest().collect_leaves().iter().map(|t| t.id).collect();
        assert_eq!(leaves, vec![root]);
        assert!(s.forest().find_by_id(mid).is_none());
        assert!(s.forest().find_by_id(c1).is_none());
        assert!(s.forest().find_by_id(c2).is_none());
    }

    #[test]
    fn updates_on_unknown_ids_publish_nothing() {
        let mut s = store();
        let seen = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&seen);
        s.subscribe(move |_| *counter.borrow_mut() += 1);

        assert!(!s.update_due_on_day(9, Some(day(3))));
        assert!(!s.update_completed_on_day(9, None));
        assert!(!s.update_estimate(9, 2.0).unwrap());
        assert_eq!(s.delete_task(9), 0);
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    fn update_estimate_validates() {
        let mut s = store();
        let id = s.add_leaf("a", 1.0, None, Some(day(3))).unwrap().unwrap();
        assert!(s.update_estimate(id, -1.0).is_err());
        assert!(s.update_estimate(id, 4.5).unwrap());
        assert_eq!(s.forest().find_by_id(id).unwrap().estimate, 4.5);
        assert!(s.rename(id, "").is_err());
        assert!(s.rename(id, "renamed").unwrap());
    }

    #[test]
    fn unchanged_values_publish_nothing() {
        let mut s = store();
        let id = s.add_leaf("a", 1.0, None, Some(day(3))).unwrap().unwrap();
        let version = s.version();
        assert!(s.update_due_on_day(id, Some(day(3))));
        assert!(s.rename(id, " a ").unwrap());
        assert!(s.update_estimate(id, 1.0).unwrap());
        assert_eq!(s.version(), version);
    }

    #[test]
    fn observers_see_every_change_with_new_state() {
        let mut s = store();
        let log: Rc<RefCell<Vec<(u64, usize, u32)>>> = Rc::default();
        let sink = Rc::clone(&log);
        let sub = s.subscribe(move |c| sink.borrow_mut().push((c.version, c.forest.len(), c.axis.days)));

        let id = s.add_leaf("a", 1.0, None, Some(day(3))).unwrap().unwrap();
        s.update_completed_on_day(id, Some(day(3)));
        s.set_axis_days(7).unwrap();
        s.set_axis_days(7).unwrap();
        assert!(s.set_axis_days(0).is_err());
        s.delete_task(id);

        assert_eq!(*log.borrow(), vec![(1, 1, 5), (2, 1, 5), (3, 1, 7), (4, 0, 7)]);
        assert!(s.unsubscribe(sub));
        assert!(!s.unsubscribe(sub));
        s.set_axis_start(day(1)).unwrap();
        assert_eq!(log.borrow().len(), 4);
    }

    #[test]
    fn range_queries_use_leaves_only() {
        let mut s = store();
        let today = day(5);
        let late = s.add_leaf("late", 1.0, None, Some(day(4))).unwrap().unwrap();
        let now = s.add_leaf("now", 1.0, None, Some(today)).unwrap().unwrap();
        let soon = s.add_leaf("soon", 1.0, None, Some(day(6))).unwrap().unwrap();
        // `now` becomes a container once it has a child and drops out.
        let child = s.add_leaf("child", 1.0, Some(now), Some(today)).unwrap().unwrap();

        let ids = |v: Vec<&Task>| v.iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(ids(s.today_tasks(today)), vec![child]);
        assert_eq!(ids(s.tasks_in_range(RangeMode::UntilToday, today)), vec![late, child]);
        assert_eq!(ids(s.tasks_in_range(RangeMode::FromToday, today)), vec![child, soon]);

        s.update_completed_on_day(late, Some(today));
        assert_eq!(ids(s.tasks_in_range(RangeMode::UntilToday, today)), vec![child]);
    }

    #[test]
    fn burndown_follows_axis_changes() {
        let mut s = store();
        s.add_leaf("a", 10.0, None, Some(day(4))).unwrap();
        assert_eq!(s.burndown().len(), 5);
        s.set_axis_days(2).unwrap();
        let points = s.burndown();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].ideal_remaining, 0.0);
    }
}
