//! Task and category records.
//!
//! Both collections are persisted as whole JSON arrays (see `storage`), so the
//! serialized field names here are the on-disk layout.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Category id assigned to new tasks when none is given.
pub const DEFAULT_CATEGORY_ID: &str = "1";

/// Label used when a task points at a category that no longer exists.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Task priority. Ordering is `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(Error::InvalidArgument(format!(
                "invalid priority '{s}' (expected low|medium|high)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
    pub category: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build a fresh task. `created_at` and `updated_at` share `now`.
    pub fn new(id: impl Into<String>, fields: NewTask, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: fields.title,
            description: fields.description,
            due_date: fields.due_date,
            priority: fields.priority,
            category: fields.category,
            completed: fields.completed,
            created_at: now,
            updated_at: now,
        }
    }

    /// Incomplete and past its due date.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date < now
    }

    /// Apply a partial update and refresh `updated_at`.
    ///
    /// `updated_at` never moves behind `created_at`, even if the clock did.
    pub fn apply(&mut self, patch: TaskPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        self.updated_at = now.max(self.created_at);
    }
}

/// Caller-supplied fields for a new task; the service assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_category_id")]
    pub category: String,
    #[serde(default)]
    pub completed: bool,
}

impl NewTask {
    pub fn new(title: impl Into<String>, due_date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            due_date,
            priority: Priority::default(),
            category: default_category_id(),
            completed: false,
        }
    }
}

fn default_category_id() -> String {
    DEFAULT_CATEGORY_ID.to_string()
}

/// Partial task update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.completed.is_none()
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
}

impl Category {
    pub fn new(id: &str, name: &str, color: &str, icon: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// Categories seeded on first run.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("1", "Work", "#3B82F6", "briefcase"),
        Category::new("2", "Personal", "#10B981", "user"),
        Category::new("3", "Study", "#8B5CF6", "book-open"),
        Category::new("4", "Health", "#EF4444", "heart"),
        Category::new("5", "Shopping", "#F59E0B", "shopping-cart"),
    ]
}

/// Find a category by id.
pub fn find_category<'a>(categories: &'a [Category], id: &str) -> Option<&'a Category> {
    categories.iter().find(|category| category.id == id)
}

/// Display name for a category id, falling back to [`UNCATEGORIZED`].
pub fn category_label<'a>(categories: &'a [Category], id: &str) -> &'a str {
    find_category(categories, id)
        .map(|category| category.name.as_str())
        .unwrap_or(UNCATEGORIZED)
}
