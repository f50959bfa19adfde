//! Configuration loading and management
//!
//! Handles parsing of `config.toml` (by default under the platform config
//! directory, e.g. `~/.config/taskpad/config.toml`).

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::task::{Category, Priority, DEFAULT_CATEGORY_ID};

/// Config file name inside the taskpad config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Where and how records are stored
    #[serde(default)]
    pub storage: StorageConfig,

    /// Defaults applied to new tasks
    #[serde(default)]
    pub tasks: TasksConfig,
}

/// Storage-related configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Data directory; the platform data directory when unset
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// How long to wait for another writer to release the data directory
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Tasks configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TasksConfig {
    /// Priority for `taskpad add` without `--priority`
    #[serde(default = "default_priority")]
    pub default_priority: String,

    /// Category id for `taskpad add` without `--category`; the first stored
    /// category when unset
    #[serde(default)]
    pub default_category: Option<String>,
}

fn default_priority() -> String {
    Priority::default().to_string()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_priority: default_priority(),
            default_category: None,
        }
    }
}

impl TasksConfig {
    /// Parsed `default_priority`
    pub fn priority(&self) -> Result<Priority> {
        self.default_priority.parse().map_err(|_| {
            Error::InvalidConfig(format!(
                "tasks.default_priority: invalid priority '{}' (expected low|medium|high)",
                self.default_priority
            ))
        })
    }

    /// Category for a new task: the configured id, else the first of
    /// `categories`, else `"1"`.
    pub fn category(&self, categories: &[Category]) -> String {
        self.default_category
            .clone()
            .or_else(|| categories.first().map(|category| category.id.clone()))
            .unwrap_or_else(|| DEFAULT_CATEGORY_ID.to_string())
    }

    fn validate(&self) -> Result<()> {
        self.priority()?;
        if self
            .default_category
            .as_deref()
            .is_some_and(|id| id.trim().is_empty())
        {
            return Err(Error::InvalidConfig(
                "tasks.default_category cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|err| {
            Error::InvalidConfig(format!("{}: {}", path.display(), err.message()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or return defaults when it is missing
    /// or unusable
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring unusable config");
                Self::default()
            }
        }
    }

    /// Resolve the config for a run: an explicit path must load cleanly,
    /// the platform default falls back to defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Ok(Self::default_path()
                .map(|path| Self::load_or_default(&path))
                .unwrap_or_default()),
        }
    }

    /// `<config dir>/taskpad/config.toml`, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Data directory: `flag`, then `storage.data_dir`, then the platform
    /// data directory.
    pub fn resolve_data_dir(&self, flag: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = flag {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(Error::DataDirUnavailable)
    }

    fn validate(&self) -> Result<()> {
        if self.storage.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        self.tasks.validate()?;
        Ok(())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "taskpad")
}
