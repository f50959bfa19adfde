//! Aggregate statistics over a task collection.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::task::{find_category, Category, Priority, Task};

/// Trailing window used for `this_week`.
pub const WEEK_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PriorityCounts {
    pub fn get(&self, priority: Priority) -> usize {
        match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }

    fn bump(&mut self, priority: Priority) {
        match priority {
            Priority::High => self.high += 1,
            Priority::Medium => self.medium += 1,
            Priority::Low => self.low += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub id: String,
    pub name: String,
    pub color: String,
    pub count: usize,
    pub completed: usize,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskStats {
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    pub completion_rate: f64,
    pub by_priority: PriorityCounts,
    pub by_category: Vec<CategoryStats>,
    pub uncategorized: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_active_category: Option<CategoryStats>,
    pub this_week: usize,
}

pub fn compute_statistics(
    tasks: &[Task],
    categories: &[Category],
    now: DateTime<Utc>,
) -> TaskStats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.completed).count();
    let overdue = tasks.iter().filter(|task| task.is_overdue(now)).count();

    let mut by_priority = PriorityCounts::default();
    for task in tasks {
        by_priority.bump(task.priority);
    }

    let by_category: Vec<CategoryStats> = categories
        .iter()
        .map(|category| {
            let (count, done) = tasks
                .iter()
                .filter(|task| task.category == category.id)
                .fold((0, 0), |(count, done), task| {
                    (count + 1, done + usize::from(task.completed))
                });
            CategoryStats {
                id: category.id.clone(),
                name: category.name.clone(),
                color: category.color.clone(),
                count,
                completed: done,
                completion_rate: percent(done, count),
            }
        })
        .collect();

    let uncategorized = tasks
        .iter()
        .filter(|task| find_category(categories, &task.category).is_none())
        .count();

    let week_start = now - Duration::days(WEEK_WINDOW_DAYS);
    let this_week = tasks
        .iter()
        .filter(|task| task.created_at >= week_start)
        .count();

    TaskStats {
        generated_at: now,
        total,
        completed,
        pending: total - completed,
        overdue,
        completion_rate: percent(completed, total),
        most_active_category: most_active(&by_category).cloned(),
        by_priority,
        by_category,
        uncategorized,
        this_week,
    }
}

/// Category with the most tasks; ties go to the earliest entry.
///
/// Absent when no category has any task.
pub fn most_active(by_category: &[CategoryStats]) -> Option<&CategoryStats> {
    let mut best: Option<&CategoryStats> = None;
    for entry in by_category {
        if entry.count == 0 {
            continue;
        }
        if best.is_none_or(|current| entry.count > current.count) {
            best = Some(entry);
        }
    }
    best
}

/// `part / whole * 100`, or `0` for an empty whole.
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
