#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// An isolated data directory plus config file for driving the binary.
pub struct TestData {
    dir: TempDir,
}

impl TestData {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join("data"))?;
        fs::write(dir.path().join("config.toml"), "")?;
        Ok(Self { dir })
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<()> {
        fs::write(self.config_path(), contents)
    }

    pub fn record_path(&self, record: &str) -> PathBuf {
        self.data_dir().join(format!("{record}.json"))
    }

    pub fn write_record(&self, record: &str, contents: &str) -> std::io::Result<()> {
        fs::write(self.record_path(record), contents)
    }

    pub fn read_record(&self, record: &str) -> Result<Value, Box<dyn std::error::Error>> {
        let raw = fs::read_to_string(self.record_path(record))?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = taskpad_cmd();
        cmd.arg("--data-dir")
            .arg(self.data_dir())
            .arg("--config")
            .arg(self.config_path());
        cmd
    }

    /// Run with `--json` and return the `data` payload of a successful call.
    pub fn json(&self, args: &[&str]) -> Result<Value, Box<dyn std::error::Error>> {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let value: Value = serde_json::from_slice(&output)?;
        assert_eq!(value["schema_version"], "taskpad.v1");
        assert_eq!(value["status"], "success");
        Ok(value["data"].clone())
    }

    /// `taskpad add` and return the new task id.
    pub fn add(&self, args: &[&str]) -> Result<String, Box<dyn std::error::Error>> {
        let mut full = vec!["add"];
        full.extend_from_slice(args);
        let data = self.json(&full)?;
        Ok(data["id"].as_str().ok_or("missing id")?.to_string())
    }
}

pub fn taskpad_cmd() -> Command {
    let mut cmd = Command::cargo_bin("taskpad").expect("binary");
    cmd.env_remove("TASKPAD_DATA_DIR")
        .env_remove("TASKPAD_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

pub fn ids(list: &Value) -> Vec<String> {
    list["tasks"]
        .as_array()
        .map(|tasks| {
            tasks
                .iter()
                .filter_map(|task| task["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub fn titles(list: &Value) -> Vec<String> {
    list["tasks"]
        .as_array()
        .map(|tasks| {
            tasks
                .iter()
                .filter_map(|task| task["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
