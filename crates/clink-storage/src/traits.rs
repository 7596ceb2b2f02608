//! Storage abstraction trait
//!
//! This module defines the capability set every storage backend implements
//! and the error type shared by backends and the registry.

use async_trait::async_trait;
use clink_core::{StorageType, UrlOption};
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage key is empty")]
    KeyEmpty,

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage not found: {0}")]
    StorageNotFound(String),

    #[error("Default storage not specified")]
    NoDefaultStorage,

    #[error("Invalid cLink: {0:?}")]
    CLinkParse(String),

    #[error("Storage key did not match: expected '{expected}' in {c_link:?}")]
    StorageKeyNotMatch { expected: String, c_link: String },

    #[error("Method is not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to get storage by cLink {c_link:?}: {source}")]
    Lookup {
        c_link: String,
        #[source]
        source: Box<StorageError>,
    },
}

impl StorageError {
    pub(crate) fn key_not_match(expected: &str, c_link: &str) -> Self {
        StorageError::StorageKeyNotMatch {
            expected: expected.to_string(),
            c_link: c_link.to_string(),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (local filesystem, S3, CloudFront, Yandex Object
/// Storage, the external-URL pass-through) implement this trait. The registry
/// routes content links to backends through it without knowing which medium
/// holds the file.
///
/// **cLink format:** `<storage-key>:<backend-path>`. A backend must only accept
/// links whose leading scheme is its own storage key.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Copy the local file at `file_path` into the storage under the logical
    /// `path` and return its cLink.
    async fn store(&self, file_path: &Path, path: &str) -> StorageResult<String>;

    /// Copy the local file at `file_path` to the location `c_link` addresses.
    ///
    /// The location must be the one [`Storage::store`] would have used for the
    /// equivalent logical path, so a later [`Storage::get_url`] with the same
    /// link resolves to the new content.
    async fn store_by_c_link(&self, file_path: &Path, c_link: &str) -> StorageResult<()>;

    /// The cLink a file stored under `path` would get. Never touches the medium.
    fn get_c_link(&self, path: &str) -> String;

    /// Retrieval URL for `c_link`.
    ///
    /// Returns an empty string when no usable URL can be produced: wrong
    /// storage key, malformed link, missing expiration for a signing backend,
    /// signing failure. Options a backend does not understand are ignored.
    async fn get_url(&self, c_link: &str, options: &[UrlOption]) -> String;

    /// Delete the object `c_link` addresses
    async fn remove(&self, c_link: &str) -> StorageResult<()>;

    /// Get the storage backend type
    fn storage_type(&self) -> StorageType;
}
