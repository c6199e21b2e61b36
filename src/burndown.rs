//! Burndown projection.
//!
//! Turns a date axis and a set of leaf tasks into three aligned series of
//! remaining work per day: the ideal linear burn, the actual burn from
//! completion dates, and the burn the due dates promise.

use chrono::{Days, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::task::{self, Task};
use crate::tree::Forest;

/// Consecutive calendar days a burndown is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateAxis {
    pub start: NaiveDate,
    pub days: u32,
}

impl DateAxis {
    pub const DEFAULT_DAYS: u32 = 14;

    /// Axis of `days` days starting at `start`. Rejects lengths below one
    /// and lengths whose last day falls outside the calendar.
    pub fn new(start: NaiveDate, days: i64) -> Result<Self> {
        let Ok(len) = u32::try_from(days) else {
            return Err(Error::InvalidAxisLength(days));
        };
        if len == 0 || start.checked_add_days(Days::new(u64::from(len) - 1)).is_none() {
            return Err(Error::InvalidAxisLength(days));
        }
        Ok(DateAxis { start, days: len })
    }

    /// Re-check an axis built elsewhere, such as one read from disk.
    pub fn validated(self) -> Result<Self> {
        DateAxis::new(self.start, i64::from(self.days))
    }

    /// Default axis: starts today, two weeks long.
    pub fn starting_today() -> Self {
        DateAxis {
            start: task::today(),
            days: Self::DEFAULT_DAYS,
        }
    }

    /// The ordered days of the axis.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.start.iter_days().take(self.days as usize).collect()
    }

    pub fn end(&self) -> NaiveDate {
        self.start
            .checked_add_days(Days::new(u64::from(self.days.saturating_sub(1))))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Same length, start moved by `offset` days.
    pub fn shifted(&self, offset: i64) -> Result<Self> {
        let start = Duration::try_days(offset)
            .and_then(|d| self.start.checked_add_signed(d))
            .ok_or_else(|| Error::InvalidDate(format!("{} {offset:+} days", self.start)))?;
        DateAxis::new(start, i64::from(self.days))
    }
}

impl Default for DateAxis {
    fn default() -> Self {
        Self::starting_today()
    }
}

/// Remaining work on one day of the axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurndownPoint {
    pub date: NaiveDate,
    pub ideal_remaining: f64,
    pub actual_remaining: f64,
    pub due_remaining: f64,
}

/// Project the three remaining-work series over `axis`.
///
/// `leaves` must be leaf tasks; the caller decides the population (see
/// [`Forest::burndown`]). Every value is clamped at zero and rounded to two
/// decimals, half away from zero. The ideal line burns `total / (n - 1)` per
/// day so it reaches zero on the last day; a single-day axis keeps the full
/// total.
pub fn project(axis: &[NaiveDate], leaves: &[&Task]) -> Vec<BurndownPoint> {
    let total: f64 = leaves.iter().map(|t| t.estimate).sum();
    let ideal_per_bucket = if axis.len() > 1 {
        total / (axis.len() - 1) as f64
    } else {
        0.0
    };

    axis.iter()
        .enumerate()
        .map(|(d, &day)| {
            let completed: f64 = leaves
                .iter()
                .filter(|t| t.completed_by(day))
                .map(|t| t.estimate)
                .sum();
            let due: f64 = leaves
                .iter()
                .filter(|t| t.due_by(day))
                .map(|t| t.estimate)
                .sum();
            BurndownPoint {
                date: day,
                ideal_remaining: remaining(total, ideal_per_bucket * d as f64),
                actual_remaining: remaining(total, completed),
                due_remaining: remaining(total, due),
            }
        })
        .collect()
}

fn remaining(total: f64, burned: f64) -> f64 {
    let left = total - burned;
    if left > 0.0 {
        round2(left)
    } else {
        0.0
    }
}

/// Round to two decimals, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Forest {
    /// Burndown over the current leaves of the forest.
    pub fn burndown(&self, axis: &DateAxis) -> Vec<BurndownPoint> {
        project(&axis.dates(), &self.collect_leaves())
    }
}

/// Headline numbers of a series as of a given day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BurndownSummary {
    pub as_of: NaiveDate,
    pub total: f64,
    pub remaining: f64,
    pub completed: f64,
    pub ideal: f64,
    /// Actual minus ideal; positive means behind plan.
    pub variance: f64,
}

/// Summarise `points` at the last axis day not after `today`, or at the
/// first day when the axis lies entirely in the future.
pub fn summarize(points: &[BurndownPoint], today: NaiveDate) -> Option<BurndownSummary> {
    let first = points.first()?;
    let at = points
        .iter()
        .rev()
        .find(|p| p.date <= today)
        .unwrap_or(first);
    let total = first.ideal_remaining;
    Some(BurndownSummary {
        as_of: at.date,
        total,
        remaining: at.actual_remaining,
        completed: round2(total - at.actual_remaining),
        ideal: at.ideal_remaining,
        variance: round2(at.actual_remaining - at.ideal_remaining),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn axis5() -> Vec<NaiveDate> {
        DateAxis::new(day(2024, 6, 3), 5).unwrap().dates()
    }

    #[test]
    fn axis_rejects_zero_length() {
        assert!(matches!(
            DateAxis::new(day(2024, 1, 1), 0),
            Err(Error::InvalidAxisLength(0))
        ));
        let axis = DateAxis::new(day(2024, 1, 30), 3).unwrap();
        assert_eq!(axis.dates(), vec![day(2024, 1, 30), day(2024, 1, 31), day(2024, 2, 1)]);
        assert_eq!(axis.end(), day(2024, 2, 1));
        assert_eq!(axis.shifted(-1).unwrap().start, day(2024, 1, 29));
    }

    #[test]
    fn axis_rejects_ends_past_the_calendar() {
        assert!(matches!(
            DateAxis::new(day(2024, 1, 1), 4_000_000_000),
            Err(Error::InvalidAxisLength(4_000_000_000))
        ));
        assert!(DateAxis::new(day(2024, 1, 1), -3).is_err());
        assert!(DateAxis::new(NaiveDate::MAX, 2).is_err());
        let last = DateAxis::new(NaiveDate::MAX, 1).unwrap();
        assert_eq!(last.end(), NaiveDate::MAX);
        assert!(last.shifted(1).is_err());
        assert!(last.shifted(i64::MAX).is_err());

        let stored = DateAxis { start: day(2024, 1, 1), days: 0 };
        assert!(stored.validated().is_err());
    }

    #[test]
    fn single_incomplete_task() {
        let axis = axis5();
        let task = Task::new(1, "Only", 10.0).with_due(axis[2]);
        let points = project(&axis, &[&task]);

        let actual: Vec<f64> = points.iter().map(|p| p.actual_remaining).collect();
        let due: Vec<f64> = points.iter().map(|p| p.due_remaining).collect();
        let ideal: Vec<f64> = points.iter().map(|p| p.ideal_remaining).collect();
        assert_eq!(actual, vec![10.0; 5]);
        assert_eq!(due, vec![10.0, 10.0, 0.0, 0.0, 0.0]);
        assert_eq!(ideal, vec![10.0, 7.5, 5.0, 2.5, 0.0]);
        assert_eq!(points[3].date, axis[3]);
    }

    #[test]
    fn completion_burns_actual_line() {
        let axis = axis5();
        let a = Task::new(1, "a", 2.0).with_due(axis[1]).with_completed(axis[1]);
        let b = Task::new(2, "b", 3.0).with_due(axis[4]).with_completed(axis[3]);
        let points = project(&axis, &[&a, &b]);
        let actual: Vec<f64> = points.iter().map(|p| p.actual_remaining).collect();
        assert_eq!(actual, vec![5.0, 3.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn work_completed_before_the_axis_counts_from_day_zero() {
        let axis = axis5();
        let done = Task::new(1, "early", 4.0).with_completed(day(2024, 5, 1));
        let open = Task::new(2, "open", 1.0);
        let points = project(&axis, &[&done, &open]);
        assert!(points.iter().all(|p| p.actual_remaining == 1.0));
        assert!(points.iter().all(|p| p.due_remaining == 5.0));
    }

    #[test]
    fn single_day_axis_keeps_total() {
        let axis = vec![day(2024, 6, 3)];
        let task = Task::new(1, "a", 6.0);
        let points = project(&axis, &[&task]);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].ideal_remaining, 6.0);
        assert!(points[0].ideal_remaining.is_finite());
    }

    #[test]
    fn empty_inputs() {
        assert!(project(&[], &[]).is_empty());
        let points = project(&axis5(), &[]);
        assert_eq!(points.len(), 5);
        assert!(points
            .iter()
            .all(|p| p.ideal_remaining == 0.0 && p.actual_remaining == 0.0 && p.due_remaining == 0.0));
    }

    #[test]
    fn values_are_rounded_to_cents() {
        let axis = DateAxis::new(day(2024, 6, 3), 4).unwrap().dates();
        let task = Task::new(1, "a", 10.0);
        let ideal: Vec<f64> = project(&axis, &[&task]).iter().map(|p| p.ideal_remaining).collect();
        assert_eq!(ideal, vec![10.0, 6.67, 3.33, 0.0]);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(2.675_000_1), 2.68);
    }

    #[test]
    fn projection_is_idempotent() {
        let axis = axis5();
        let a = Task::new(1, "a", 1.5).with_due(axis[0]).with_completed(axis[2]);
        let b = Task::new(2, "b", 2.25).with_due(axis[3]);
        assert_eq!(project(&axis, &[&a, &b]), project(&axis, &[&a, &b]));
    }

    #[test]
    fn forest_burndown_ignores_container_fields() {
        let axis = DateAxis::new(day(2024, 6, 3), 5).unwrap();
        let mut forest = Forest::new();
        forest.insert_child(
            None,
            Task::new(1, "Epic", 100.0)
                .with_due(day(2024, 6, 3))
                .with_completed(day(2024, 6, 3)),
        );
        forest.insert_child(Some(1), Task::new(2, "Leaf", 4.0).with_due(day(2024, 6, 5)));
        let points = forest.burndown(&axis);
        assert_eq!(points[0].ideal_remaining, 4.0);
        assert!(points.iter().all(|p| p.actual_remaining == 4.0));
        assert_eq!(points[2].due_remaining, 0.0);
    }

    #[test]
    fn summary_uses_last_day_not_after_today() {
        let axis = axis5();
        let a = Task::new(1, "a", 4.0).with_completed(axis[1]);
        let b = Task::new(2, "b", 4.0);
        let points = project(&axis, &[&a, &b]);

        let s = summarize(&points, axis[2]).unwrap();
        assert_eq!(s.as_of, axis[2]);
        assert_eq!(s.total, 8.0);
        assert_eq!(s.remaining, 4.0);
        assert_eq!(s.completed, 4.0);
        assert_eq!(s.ideal, 4.0);
        assert_eq!(s.variance, 0.0);

        let early = summarize(&points, day(2024, 1, 1)).unwrap();
        assert_eq!(early.as_of, axis[0]);
        assert!(summarize(&[], axis[0]).is_none());
    }
}
