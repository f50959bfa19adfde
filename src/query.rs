//! Search, status filtering and ordering over an in-memory task list.
//!
//! Everything here is a pure function of its inputs. "Now" is always passed
//! in so overdue checks are reproducible.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::task::Task;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
    Overdue,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Pending => "pending",
            StatusFilter::Completed => "completed",
            StatusFilter::Overdue => "overdue",
        }
    }

    pub fn matches(&self, task: &Task, now: DateTime<Utc>) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => !task.completed,
            StatusFilter::Completed => task.completed,
            StatusFilter::Overdue => task.is_overdue(now),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "pending" => Ok(StatusFilter::Pending),
            "completed" => Ok(StatusFilter::Completed),
            "overdue" => Ok(StatusFilter::Overdue),
            _ => Err(Error::InvalidArgument(format!(
                "invalid status '{s}' (expected all|pending|completed|overdue)"
            ))),
        }
    }
}

/// Case-insensitive substring match on title or description.
///
/// A blank query matches every task.
pub fn matches_search(task: &Task, query: &str) -> bool {
    if query.trim().is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    task.title.to_lowercase().contains(&needle) || task.description.to_lowercase().contains(&needle)
}

/// Apply search, then the status filter. Input order is preserved.
pub fn filter_tasks(
    tasks: &[Task],
    query: &str,
    status: StatusFilter,
    now: DateTime<Utc>,
) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| matches_search(task, query))
        .filter(|task| status.matches(task, now))
        .cloned()
        .collect()
}

/// Stable sort: pending before completed, then higher priority, then earlier due date.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(compare_tasks);
}

pub fn compare_tasks(left: &Task, right: &Task) -> Ordering {
    left.completed
        .cmp(&right.completed)
        .then_with(|| right.priority.cmp(&left.priority))
        .then_with(|| left.due_date.cmp(&right.due_date))
}

/// Filter then sort, as shown in a task list.
pub fn filter_and_sort(
    tasks: &[Task],
    query: &str,
    status: StatusFilter,
    now: DateTime<Utc>,
) -> Vec<Task> {
    let mut filtered = filter_tasks(tasks, query, status, now);
    sort_tasks(&mut filtered);
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{NewTask, Priority};
    use chrono::{Duration, TimeZone};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 9, 0, 0).unwrap()
    }

    fn task(id: &str, completed: bool, priority: Priority, due: DateTime<Utc>) -> Task {
        let mut fields = NewTask::new(format!("task {id}"), due);
        fields.priority = priority;
        fields.completed = completed;
        Task::new(id, fields, day(1))
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.id.as_str()).collect()
    }

    fn sample() -> Vec<Task> {
        let mut report = task("1", false, Priority::Low, day(5));
        report.title = "Quarterly Report".to_string();
        let mut groceries = task("2", true, Priority::High, day(2));
        groceries.title = "Groceries".to_string();
        groceries.description = "milk, eggs, REPORT paper".to_string();
        let gym = task("3", false, Priority::Medium, day(20));
        vec![report, groceries, gym]
    }

    #[test]
    fn all_with_empty_search_is_identity() {
        let tasks = sample();
        let out = filter_tasks(&tasks, "", StatusFilter::All, day(10));
        assert_eq!(out, tasks);

        let out = filter_tasks(&tasks, "   ", StatusFilter::All, day(10));
        assert_eq!(out, tasks);
    }

    #[test]
    fn search_matches_title_or_description_ignoring_case() {
        let tasks = sample();
        let out = filter_tasks(&tasks, "report", StatusFilter::All, day(10));
        assert_eq!(ids(&out), vec!["1", "2"]);

        let out = filter_tasks(&tasks, "MILK", StatusFilter::All, day(10));
        assert_eq!(ids(&out), vec!["2"]);

        let out = filter_tasks(&tasks, "nothing here", StatusFilter::All, day(10));
        assert!(out.is_empty());
    }

    #[test]
    fn status_filters_partition_by_completion() {
        let tasks = sample();
        let now = day(10);
        assert_eq!(
            ids(&filter_tasks(&tasks, "", StatusFilter::Pending, now)),
            vec!["1", "3"]
        );
        assert_eq!(
            ids(&filter_tasks(&tasks, "", StatusFilter::Completed, now)),
            vec!["2"]
        );
        assert_eq!(
            ids(&filter_tasks(&tasks, "", StatusFilter::Overdue, now)),
            vec!["1"]
        );
    }

    #[test]
    fn overdue_never_includes_completed_tasks() {
        let tasks = vec![
            task("a", true, Priority::High, day(1)),
            task("b", true, Priority::Low, day(2)),
            task("c", false, Priority::Low, day(2)),
        ];
        let out = filter_tasks(&tasks, "", StatusFilter::Overdue, day(28));
        assert!(out.iter().all(|task| !task.completed));
        assert_eq!(ids(&out), vec!["c"]);
    }

    #[test]
    fn search_and_status_compose() {
        let tasks = sample();
        let out = filter_tasks(&tasks, "report", StatusFilter::Completed, day(10));
        assert_eq!(ids(&out), vec!["2"]);
    }

    #[test]
    fn sort_applies_three_level_tie_break() {
        let a = task("A", false, Priority::High, day(10));
        let b = task("B", false, Priority::Medium, day(1));
        let c = task("C", true, Priority::High, day(1));

        let mut tasks = vec![c.clone(), b.clone(), a.clone()];
        sort_tasks(&mut tasks);
        assert_eq!(ids(&tasks), vec!["A", "B", "C"]);
    }

    #[test]
    fn sort_orders_equal_priority_by_due_date() {
        let mut tasks = vec![
            task("late", false, Priority::Medium, day(9)),
            task("soon", false, Priority::Medium, day(3)),
        ];
        sort_tasks(&mut tasks);
        assert_eq!(ids(&tasks), vec!["soon", "late"]);
    }

    #[test]
    fn sort_is_stable_on_full_ties() {
        let mut tasks = vec![
            task("first", false, Priority::Low, day(4)),
            task("second", false, Priority::Low, day(4)),
            task("third", false, Priority::Low, day(4)),
        ];
        sort_tasks(&mut tasks);
        assert_eq!(ids(&tasks), vec!["first", "second", "third"]);
    }

    #[test]
    fn sort_is_idempotent() {
        let mut tasks = sample();
        tasks.push(task("4", false, Priority::High, day(12)));
        tasks.push(task("5", true, Priority::Low, day(1)));
        sort_tasks(&mut tasks);
        let once = tasks.clone();
        sort_tasks(&mut tasks);
        assert_eq!(tasks, once);
    }

    #[test]
    fn overdue_scenario_clears_after_completion() {
        let now = Utc::now();
        let mut tasks = vec![task("1", false, Priority::Low, now - Duration::days(1))];
        let out = filter_and_sort(&tasks, "", StatusFilter::Overdue, now);
        assert_eq!(ids(&out), vec!["1"]);

        tasks[0].completed = true;
        let out = filter_and_sort(&tasks, "", StatusFilter::Overdue, now);
        assert!(out.is_empty());
    }

    #[test]
    fn status_filter_parses() {
        assert_eq!("Overdue".parse::<StatusFilter>().unwrap(), StatusFilter::Overdue);
        assert!("done".parse::<StatusFilter>().is_err());
        assert_eq!(StatusFilter::default(), StatusFilter::All);
    }
}
