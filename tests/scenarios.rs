use std::cell::RefCell;
use std::rc::Rc;

use chrono::{Days, NaiveDate};
use sprint_burndown::burndown::DateAxis;
use sprint_burndown::db::{autosave, Database};
use sprint_burndown::fields::RangeMode;
use sprint_burndown::store::TaskStore;
use sprint_burndown::tree::Forest;
use sprint_burndown::Error;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 16).unwrap()
}

fn plus(d: NaiveDate, n: u64) -> NaiveDate {
    d + Days::new(n)
}

#[test]
fn single_open_leaf_over_five_days() {
    let axis = DateAxis::new(today(), 5).unwrap();
    let mut store = TaskStore::new(Forest::new(), axis);
    store
        .add_leaf("Ship it", 10.0, None, Some(plus(today(), 2)))
        .unwrap()
        .unwrap();

    let points = store.burndown();
    assert_eq!(points.len(), 5);
    let actual: Vec<f64> = points.iter().map(|p| p.actual_remaining).collect();
    let due: Vec<f64> = points.iter().map(|p| p.due_remaining).collect();
    let ideal: Vec<f64> = points.iter().map(|p| p.ideal_remaining).collect();
    assert_eq!(actual, vec![10.0; 5]);
    assert_eq!(due, vec![10.0, 10.0, 0.0, 0.0, 0.0]);
    assert_eq!(ideal, vec![10.0, 7.5, 5.0, 2.5, 0.0]);
    assert_eq!(points[4].date, plus(today(), 4));
}

#[test]
fn empty_name_is_rejected_without_change() {
    let mut store = TaskStore::new(Forest::new(), DateAxis::new(today(), 3).unwrap());
    let parent = store.add_leaf("Parent", 1.0, None, Some(today())).unwrap().unwrap();
    let before = store.forest().clone();
    let version = store.version();

    let result = store.add_leaf("", 2.0, Some(parent), Some(today()));
    assert!(matches!(result, Err(Error::EmptyName)));
    assert_eq!(store.forest(), &before);
    assert_eq!(store.version(), version);
}

#[test]
fn deleting_a_mid_tree_node_drops_its_descendants() {
    let mut store = TaskStore::new(Forest::new(), DateAxis::new(today(), 3).unwrap());
    let root = store.add_leaf("Release", 1.0, None, Some(today())).unwrap().unwrap();
    let mid = store.add_leaf("Backend", 1.0, Some(root), Some(today())).unwrap().unwrap();
    let a = store.add_leaf("API", 2.0, Some(mid), Some(today())).unwrap().unwrap();
    let b = store.add_leaf("DB", 3.0, Some(mid), Some(today())).unwrap().unwrap();
    let docs = store.add_leaf("Docs", 1.0, Some(root), Some(today())).unwrap().unwrap();

    assert_eq!(store.delete_task(mid), 3);
    let leaves: Vec<u64> = store.forest().collect_leaves().iter().map(|t| t.id).collect();
    assert_eq!(leaves, vec![docs]);
    assert!(store.forest().find_by_id(mid).is_none());
    assert!(store.forest().find_by_id(a).is_none());
    assert!(store.forest().find_by_id(b).is_none());
}

#[test]
fn until_today_keeps_open_overdue_and_everything_due_today() {
    let yesterday = today().pred_opt().unwrap();
    let mut store = TaskStore::new(Forest::new(), DateAxis::new(yesterday, 3).unwrap());
    let late = store.add_leaf("Late", 1.0, None, Some(yesterday)).unwrap().unwrap();
    let now = store.add_leaf("Now", 1.0, None, Some(today())).unwrap().unwrap();

    let ids = |s: &TaskStore| -> Vec<u64> {
        s.tasks_in_range(RangeMode::UntilToday, today()).iter().map(|t| t.id).collect()
    };
    assert_eq!(ids(&store), vec![late, now]);

    store.update_completed_on_day(late, Some(today()));
    store.update_completed_on_day(now, Some(today()));
    assert_eq!(ids(&store), vec![now]);
}

#[test]
fn observers_see_every_change_and_files_follow() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tasks.json");
    let mut store = TaskStore::new(Forest::new(), DateAxis::new(today(), 4).unwrap());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    store.subscribe(move |change| sink.borrow_mut().push(change.forest.burndown(change.axis)));
    store.subscribe(autosave(path.clone()));

    let id = store.add_leaf("Write", 4.0, None, Some(plus(today(), 1))).unwrap().unwrap();
    store.update_completed_on_day(id, Some(plus(today(), 1)));
    // No-op edits publish nothing.
    store.update_completed_on_day(id, Some(plus(today(), 1)));
    store.delete_task(999);

    let series = seen.borrow();
    assert_eq!(series.len(), 2);
    assert_eq!(series[1][1].actual_remaining, 0.0);

    let (forest, axis) = Database::try_load(&path).unwrap();
    assert_eq!(&forest, store.forest());
    assert_eq!(axis, Some(*store.axis()));

    let reopened = TaskStore::new(forest, axis.unwrap());
    assert_eq!(reopened.burndown(), store.burndown());
}
