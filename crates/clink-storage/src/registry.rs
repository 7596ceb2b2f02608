//! Storage registry
//!
//! Maps storage keys to backends and routes every cLink-addressed operation
//! to the backend named by the link's scheme.
//!
//! Configure the registry (`add_storage`, `set_default_storage`) before
//! sharing it. Once shared behind an `Arc` or installed globally it is only
//! read, so concurrent callers need no locking.

use crate::traits::{Storage, StorageError, StorageResult};
use clink_core::clink::{c_link_scheme, is_valid_scheme, KEY_SEPARATOR};
use clink_core::UrlOption;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct StorageRegistry {
    storages: HashMap<String, Arc<dyn Storage>>,
    default_key: Option<String>,
}

/// Keys are matched case-insensitively, the way URI schemes are.
fn normalize_key(key: &str) -> String {
    key.to_lowercase()
}

impl StorageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `storage` under `key`, replacing any previous registration.
    pub fn add_storage(&mut self, key: &str, storage: Arc<dyn Storage>) -> StorageResult<()> {
        if key.is_empty() {
            return Err(StorageError::KeyEmpty);
        }
        if !is_valid_scheme(key) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        let normalized = normalize_key(key);
        if self.storages.insert(normalized, storage).is_some() {
            tracing::debug!(key = %key, "Replaced existing storage registration");
        }

        Ok(())
    }

    pub fn get_storage(&self, key: &str) -> StorageResult<Arc<dyn Storage>> {
        self.storage(key).cloned()
    }

    fn storage(&self, key: &str) -> StorageResult<&Arc<dyn Storage>> {
        self.storages
            .get(&normalize_key(key))
            .ok_or_else(|| StorageError::StorageNotFound(key.to_string()))
    }

    fn storage_by_c_link(&self, c_link: &str) -> StorageResult<&Arc<dyn Storage>> {
        let scheme =
            c_link_scheme(c_link).ok_or_else(|| StorageError::CLinkParse(c_link.to_string()))?;
        self.storage(scheme)
    }

    fn default_storage_key(&self) -> StorageResult<&str> {
        self.default_key
            .as_deref()
            .ok_or(StorageError::NoDefaultStorage)
    }

    pub fn set_default_storage(&mut self, key: &str) -> StorageResult<()> {
        let normalized = normalize_key(key);
        if !self.storages.contains_key(&normalized) {
            return Err(StorageError::StorageNotFound(key.to_string()));
        }

        self.default_key = Some(normalized);
        Ok(())
    }

    pub fn default_key(&self) -> Option<&str> {
        self.default_key.as_deref()
    }

    /// Registered keys (normalized), sorted
    pub fn storage_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.storages.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Store a file in the storage registered under `key`
    pub async fn create_c_link_in_storage(
        &self,
        file_path: &Path,
        path: &str,
        key: &str,
    ) -> StorageResult<String> {
        self.storage(key)?.store(file_path, path).await
    }

    /// Store a file in the default storage
    pub async fn create_c_link(&self, file_path: &Path, path: &str) -> StorageResult<String> {
        let key = self.default_storage_key()?;
        self.create_c_link_in_storage(file_path, path, key).await
    }

    /// Predict the cLink of a file before it is stored
    pub fn prepare_c_link_in_storage(&self, path: &str, key: &str) -> StorageResult<String> {
        Ok(self.storage(key)?.get_c_link(path))
    }

    pub fn prepare_c_link(&self, path: &str) -> StorageResult<String> {
        let key = self.default_storage_key()?;
        self.prepare_c_link_in_storage(path, key)
    }

    /// Retrieval URL for `c_link`.
    ///
    /// An empty string means no URL is available. A link whose storage cannot
    /// be resolved gives an empty string rather than an error; callers must
    /// check for it.
    pub async fn get_url(&self, c_link: &str, options: &[UrlOption]) -> String {
        match self.storage_by_c_link(c_link) {
            Ok(storage) => storage.get_url(c_link, options).await,
            Err(e) => {
                tracing::warn!(c_link = %c_link, error = %e, "No storage for cLink");
                String::new()
            }
        }
    }

    /// Delete the object `c_link` addresses. Lookup failures are returned.
    pub async fn delete(&self, c_link: &str) -> StorageResult<()> {
        self.storage_by_c_link(c_link)?.remove(c_link).await
    }

    /// Replace the content behind an existing (or prepared) cLink
    pub async fn upload_by_c_link(&self, file_path: &Path, c_link: &str) -> StorageResult<()> {
        let storage = self
            .storage_by_c_link(c_link)
            .map_err(|e| StorageError::Lookup {
                c_link: c_link.to_string(),
                source: Box::new(e),
            })?;

        storage.store_by_c_link(file_path, c_link).await
    }

    /// Backend path of a cLink (everything after the scheme separator)
    pub fn path_by_c_link(c_link: &str) -> &str {
        c_link
            .split_once(KEY_SEPARATOR)
            .map_or(c_link, |(_, path)| path)
    }
}

impl fmt::Debug for StorageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageRegistry")
            .field("storages", &self.storage_keys())
            .field("default_key", &self.default_key)
            .finish()
    }
}
