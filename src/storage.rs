//! Storage layer for taskpad
//!
//! Tasks and categories are kept as two independent named records, each a
//! whole JSON array that is rewritten on every save.
//!
//! # Directory Structure (`FileStore`)
//!
//! ```text
//! <data_dir>/
//!   taskpad.lock        # Writer lock, held while a store is open
//!   tasks.json          # Full task collection
//!   categories.json     # Full category collection (seeded on first read)
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};
use crate::lock::{self, WriterLock};
use crate::task::{default_categories, Category, Task};

/// Record holding the task collection
pub const TASKS_RECORD: &str = "tasks";

/// Record holding the category collection
pub const CATEGORIES_RECORD: &str = "categories";

/// A durable key-value medium for whole records.
pub trait RecordStore: Send + Sync {
    /// Raw record contents, `None` when the record has never been written.
    fn read(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Replace the record. Either the whole value lands or the old one stays.
    fn write(&self, key: &str, value: String) -> impl Future<Output = Result<()>> + Send;
}

// =============================================================================
// File-backed records
// =============================================================================

/// One JSON file per record inside a locked data directory.
#[derive(Debug)]
pub struct FileStore {
    data_dir: PathBuf,
    _lock: WriterLock,
}

impl FileStore {
    /// Create the data directory if needed and take the writer lock.
    pub fn open(data_dir: impl Into<PathBuf>, lock_timeout_ms: u64) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        let lock = WriterLock::for_data_dir(&data_dir, lock_timeout_ms)?;
        Ok(Self {
            data_dir,
            _lock: lock,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the JSON file backing `key`
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }
}

impl RecordStore for FileStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.record_path(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn write(&self, key: &str, value: String) -> Result<()> {
        let path = self.record_path(key);
        tokio::task::spawn_blocking(move || lock::write_atomic(&path, value.as_bytes()))
            .await
            .map_err(|err| Error::OperationFailed(format!("write task panicked: {err}")))?
    }
}

// =============================================================================
// In-memory records
// =============================================================================

/// Process-local records. Writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seed a record with raw contents, bypassing serialization.
    pub fn insert_raw(&self, key: &str, value: impl Into<String>) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.into());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }
}

impl RecordStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.raw(key))
    }

    async fn write(&self, key: &str, value: String) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Io(io::Error::other("memory store is read-only")));
        }
        self.insert_raw(key, value);
        Ok(())
    }
}

// =============================================================================
// Typed collections
// =============================================================================

/// Task and category collections over a [`RecordStore`].
///
/// Loads never fail: unreadable data is logged and replaced with an empty
/// task list or the default categories. Saves surface `StorageWrite`.
#[derive(Debug)]
pub struct Storage<S> {
    backend: S,
}

impl<S: RecordStore> Storage<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub async fn load_tasks(&self) -> Vec<Task> {
        match self.read_record::<Vec<Task>>(TASKS_RECORD).await {
            Ok(Some(tasks)) => {
                tracing::debug!(count = tasks.len(), "loaded tasks");
                tasks
            }
            Ok(None) => Vec::new(),
            Err(error) => {
                tracing::warn!(record = TASKS_RECORD, error = %error, "unreadable task record; starting empty");
                Vec::new()
            }
        }
    }

    pub async fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        self.write_record(TASKS_RECORD, tasks).await?;
        tracing::debug!(count = tasks.len(), "saved tasks");
        Ok(())
    }

    /// Persisted categories, seeding the defaults when none were ever saved.
    pub async fn load_categories(&self) -> Vec<Category> {
        match self.read_record::<Vec<Category>>(CATEGORIES_RECORD).await {
            Ok(Some(categories)) => categories,
            Ok(None) => {
                let defaults = default_categories();
                if let Err(error) = self.save_categories(&defaults).await {
                    tracing::warn!(error = %error, "could not persist default categories");
                }
                defaults
            }
            Err(error) => {
                tracing::warn!(record = CATEGORIES_RECORD, error = %error, "unreadable category record; using defaults");
                default_categories()
            }
        }
    }

    pub async fn save_categories(&self, categories: &[Category]) -> Result<()> {
        self.write_record(CATEGORIES_RECORD, categories).await
    }

    async fn read_record<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.backend.read(key).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn write_record<T: Serialize + ?Sized>(&self, key: &str, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|err| Error::storage_write(key, err.into()))?;
        self.backend
            .write(key, json)
            .await
            .map_err(|err| Error::storage_write(key, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{NewTask, Priority};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn sample_tasks() -> Vec<Task> {
        let due = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 15).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let created = Utc::now();
        let mut fields = NewTask::new("Renew passport", due);
        fields.description = "bring photos".to_string();
        fields.priority = Priority::High;
        fields.category = "2".to_string();
        vec![
            Task::new("a", fields, created),
            Task::new("b", NewTask::new("Stretch", due), created),
        ]
    }

    #[tokio::test]
    async fn missing_tasks_load_as_empty() {
        let storage = Storage::new(MemoryStore::new());
        assert!(storage.load_tasks().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_tasks_load_as_empty() {
        let store = MemoryStore::new();
        store.insert_raw(TASKS_RECORD, "{not json");
        let storage = Storage::new(store);
        assert!(storage.load_tasks().await.is_empty());
    }

    #[tokio::test]
    async fn tasks_round_trip_with_full_precision() {
        let storage = Storage::new(MemoryStore::new());
        let tasks = sample_tasks();
        storage.save_tasks(&tasks).await.unwrap();

        let loaded = storage.load_tasks().await;
        assert_eq!(loaded, tasks);

        storage.save_tasks(&loaded).await.unwrap();
        assert_eq!(storage.load_tasks().await, tasks);
    }

    #[tokio::test]
    async fn categories_seeded_and_persisted_on_first_read() {
        let storage = Storage::new(MemoryStore::new());
        let categories = storage.load_categories().await;
        assert_eq!(categories, default_categories());
        assert!(storage.backend().raw(CATEGORIES_RECORD).is_some());
    }

    #[tokio::test]
    async fn corrupt_categories_fall_back_without_overwriting() {
        let store = MemoryStore::new();
        store.insert_raw(CATEGORIES_RECORD, "oops");
        let storage = Storage::new(store);

        assert_eq!(storage.load_categories().await, default_categories());
        assert_eq!(
            storage.backend().raw(CATEGORIES_RECORD).as_deref(),
            Some("oops")
        );
    }

    #[tokio::test]
    async fn empty_category_list_is_respected() {
        let store = MemoryStore::new();
        store.insert_raw(CATEGORIES_RECORD, "[]");
        let storage = Storage::new(store);
        assert!(storage.load_categories().await.is_empty());
    }

    #[tokio::test]
    async fn failed_write_surfaces_storage_error() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let storage = Storage::new(store);

        let err = storage.save_tasks(&sample_tasks()).await.expect_err("write fails");
        match err {
            Error::StorageWrite { record, .. } => assert_eq!(record, TASKS_RECORD),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(storage.backend().raw(TASKS_RECORD).is_none());
    }

    #[tokio::test]
    async fn file_store_round_trips_across_reopen() {
        let temp = TempDir::new().unwrap();
        let tasks = sample_tasks();

        {
            let storage = Storage::new(FileStore::open(temp.path(), 1000).unwrap());
            storage.save_tasks(&tasks).await.unwrap();
            storage.load_categories().await;
        }

        let storage = Storage::new(FileStore::open(temp.path(), 1000).unwrap());
        assert_eq!(storage.load_tasks().await, tasks);
        assert_eq!(storage.load_categories().await, default_categories());
        assert!(temp.path().join("tasks.json").exists());
        assert!(temp.path().join("categories.json").exists());
    }

    #[test]
    fn file_store_refuses_second_writer() {
        let temp = TempDir::new().unwrap();
        let _first = FileStore::open(temp.path(), 1000).unwrap();

        let dir = temp.path().to_path_buf();
        let second = std::thread::spawn(move || FileStore::open(dir, 50).map(|_| ()))
            .join()
            .unwrap();
        assert!(matches!(second, Err(Error::LockFailed(_))));
    }

    #[tokio::test]
    async fn persisted_layout_uses_camel_case() {
        let storage = Storage::new(MemoryStore::new());
        storage.save_tasks(&sample_tasks()).await.unwrap();
        let raw = storage.backend().raw(TASKS_RECORD).unwrap();
        assert!(raw.contains("\"dueDate\""));
        assert!(raw.contains("\"createdAt\""));
        assert!(raw.contains("\"updatedAt\""));
    }
}
