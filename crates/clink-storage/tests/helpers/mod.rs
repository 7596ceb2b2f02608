//! Test helpers shared by the clink-storage integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use clink_storage::clink_core::clink::{c_link_to_path, path_to_c_link};
use clink_storage::{Storage, StorageResult, StorageType, UrlOption};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Backend that stores nothing and records every call it receives.
pub struct RecordingStorage {
    key: String,
    calls: Mutex<Vec<String>>,
}

impl RecordingStorage {
    pub fn new(key: &str) -> Arc<Self> {
        Arc::new(Self {
            key: key.to_string(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn store(&self, _file_path: &Path, path: &str) -> StorageResult<String> {
        self.record(format!("store {}", path));
        Ok(path_to_c_link(&self.key, path))
    }

    async fn store_by_c_link(&self, _file_path: &Path, c_link: &str) -> StorageResult<()> {
        self.record(format!("store_by_c_link {}", c_link));
        Ok(())
    }

    fn get_c_link(&self, path: &str) -> String {
        path_to_c_link(&self.key, path)
    }

    async fn get_url(&self, c_link: &str, _options: &[UrlOption]) -> String {
        self.record(format!("get_url {}", c_link));
        format!("mock://{}/{}", self.key, c_link_to_path(&self.key, c_link))
    }

    async fn remove(&self, c_link: &str) -> StorageResult<()> {
        self.record(format!("remove {}", c_link));
        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        StorageType::S3
    }
}

/// Temporary directory holding a local storage root and source files.
pub struct TestStorage {
    pub temp_dir: TempDir,
    pub root: String,
    pub endpoint: String,
}

impl TestStorage {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let root = format!("{}/data/", temp_dir.path().display());
        Self {
            temp_dir,
            root,
            endpoint: "http://host/files".to_string(),
        }
    }

    /// Write a source file outside the storage root
    pub fn source_file(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write source file");
        path
    }

    /// Filesystem location of a logical path inside the storage root
    pub fn stored_path(&self, path: &str) -> PathBuf {
        PathBuf::from(format!("{}{}", self.root, path))
    }
}

impl Default for TestStorage {
    fn default() -> Self {
        Self::new()
    }
}
