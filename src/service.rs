//! In-memory task snapshot coordinated with a [`Storage`].
//!
//! Every mutation re-reads the stored collection, applies the change, writes
//! the whole collection back, and only replaces the snapshot once the write
//! has succeeded. Mutations take `&mut self`, so one service value is one
//! writer.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::query::{self, StatusFilter};
use crate::stats::{self, TaskStats};
use crate::storage::{RecordStore, Storage};
use crate::task::{find_category, Category, NewTask, Task, TaskPatch};

#[derive(Debug)]
pub struct TaskService<S> {
    storage: Storage<S>,
    tasks: Vec<Task>,
    categories: Vec<Category>,
}

impl<S: RecordStore> TaskService<S> {
    /// Load both collections into memory.
    pub async fn open(storage: Storage<S>) -> Self {
        let tasks = storage.load_tasks().await;
        let categories = storage.load_categories().await;
        tracing::debug!(
            tasks = tasks.len(),
            categories = categories.len(),
            "task service ready"
        );
        Self {
            storage,
            tasks,
            categories,
        }
    }

    /// Reload the snapshot from storage.
    pub async fn refresh(&mut self) {
        self.tasks = self.storage.load_tasks().await;
        self.categories = self.storage.load_categories().await;
    }

    pub fn storage(&self) -> &Storage<S> {
        &self.storage
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        find_category(&self.categories, id)
    }

    pub async fn create_task(&mut self, fields: NewTask) -> Result<Task> {
        let now = Utc::now();
        let mut tasks = self.storage.load_tasks().await;
        let task = Task::new(unique_task_id(&tasks), fields, now);
        tasks.push(task.clone());

        self.storage.save_tasks(&tasks).await?;
        self.tasks = tasks;
        tracing::debug!(id = %task.id, "created task");
        Ok(task)
    }

    /// Apply `patch` to the task with `id`. `Ok(None)` when no such task exists.
    pub async fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<Option<Task>> {
        let mut tasks = self.storage.load_tasks().await;
        let Some(task) = tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(None);
        };
        task.apply(patch, Utc::now());
        let updated = task.clone();

        self.storage.save_tasks(&tasks).await?;
        self.tasks = tasks;
        tracing::debug!(id = %updated.id, "updated task");
        Ok(Some(updated))
    }

    /// Remove the task with `id`. `Ok(false)` when it did not exist.
    pub async fn delete_task(&mut self, id: &str) -> Result<bool> {
        let mut tasks = self.storage.load_tasks().await;
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        if tasks.len() == before {
            return Ok(false);
        }

        self.storage.save_tasks(&tasks).await?;
        self.tasks = tasks;
        tracing::debug!(id, "deleted task");
        Ok(true)
    }

    /// Flip `completed` on the stored task.
    pub async fn toggle_complete(&mut self, id: &str) -> Result<Option<Task>> {
        let current = self
            .storage
            .load_tasks()
            .await
            .into_iter()
            .find(|task| task.id == id);
        match current {
            Some(task) => {
                self.update_task(id, TaskPatch::completed(!task.completed))
                    .await
            }
            None => Ok(None),
        }
    }

    pub fn filter_and_sort(&self, query: &str, status: StatusFilter) -> Vec<Task> {
        self.filter_and_sort_at(query, status, Utc::now())
    }

    pub fn filter_and_sort_at(
        &self,
        query: &str,
        status: StatusFilter,
        now: DateTime<Utc>,
    ) -> Vec<Task> {
        query::filter_and_sort(&self.tasks, query, status, now)
    }

    pub fn statistics(&self) -> TaskStats {
        self.statistics_at(Utc::now())
    }

    pub fn statistics_at(&self, now: DateTime<Utc>) -> TaskStats {
        stats::compute_statistics(&self.tasks, &self.categories, now)
    }
}

fn unique_task_id(existing: &[Task]) -> String {
    loop {
        let candidate = Uuid::new_v4().to_string();
        if !existing.iter().any(|task| task.id == candidate) {
            return candidate;
        }
    }
}
