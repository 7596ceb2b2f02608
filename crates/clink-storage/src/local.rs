use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use clink_core::clink::{
    c_link_to_path, check_storage_key, internal_path_to_path, path_to_c_link,
    path_to_internal_path,
};
use clink_core::{StorageType, UrlOption};
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufReader};
use url::Url;

pub const DEFAULT_STORAGE_KEY: &str = "file";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/";
pub const DEFAULT_BUFFER_SIZE: usize = 16 * 1024;

/// Local filesystem storage configuration
#[derive(Debug, Clone)]
pub struct LocalConfig {
    pub storage_key: String,
    /// Base URL the root directory is served under (e.g. "http://localhost:8080/files")
    pub endpoint: String,
    /// Directory every path is stored under (e.g. "data/"); empty means the working directory
    pub root: String,
    /// Copy buffer size in bytes
    pub buffer_size: usize,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            root: String::new(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Local filesystem storage implementation
#[derive(Debug, Clone)]
pub struct LocalStorage {
    config: LocalConfig,
    endpoint: Url,
}

impl LocalStorage {
    /// Create a new LocalStorage instance, creating the root directory if needed
    pub async fn new(mut config: LocalConfig) -> StorageResult<Self> {
        if config.storage_key.is_empty() {
            return Err(StorageError::KeyEmpty);
        }

        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            StorageError::ConfigError(format!("Invalid endpoint {}: {}", config.endpoint, e))
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(StorageError::ConfigError(format!(
                "Endpoint {} cannot serve paths",
                config.endpoint
            )));
        }

        if !config.root.is_empty() {
            fs::create_dir_all(&config.root).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    config.root, e
                ))
            })?;
        }

        if config.buffer_size == 0 {
            config.buffer_size = DEFAULT_BUFFER_SIZE;
        }

        Ok(LocalStorage { config, endpoint })
    }

    /// Convert a logical path to a filesystem path under the root
    ///
    /// Rejects `..` segments so a path cannot escape the root directory.
    fn internal_path(&self, path: &str) -> StorageResult<String> {
        if path.split('/').any(|segment| segment == "..") {
            return Err(StorageError::InvalidPath(path.to_string()));
        }

        Ok(path_to_internal_path(&self.config.root, path))
    }

    fn internal_path_by_c_link(&self, c_link: &str) -> StorageResult<String> {
        let key = &self.config.storage_key;
        if !check_storage_key(c_link, key) {
            return Err(StorageError::key_not_match(key, c_link));
        }

        self.internal_path(&c_link_to_path(key, c_link))
    }

    /// Public URL for a logical path, percent-encoded segment by segment
    fn generate_url(&self, path: &str) -> Option<String> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(path.split('/'));
        Some(url.to_string())
    }

    async fn store_by_internal_path(&self, file_path: &Path, internal_path: &str) -> StorageResult<u64> {
        copy_file(file_path, Path::new(internal_path), self.config.buffer_size).await
    }
}

/// Copy a regular file, replacing the destination and creating its parent directories
async fn copy_file(src: &Path, dst: &Path, buffer_size: usize) -> StorageResult<u64> {
    let metadata = fs::metadata(src).await.map_err(|e| {
        StorageError::UploadFailed(format!("Failed to stat {}: {}", src.display(), e))
    })?;
    if !metadata.is_file() {
        return Err(StorageError::UploadFailed(format!(
            "{} is not a regular file",
            src.display()
        )));
    }

    let source = fs::File::open(src).await.map_err(|e| {
        StorageError::UploadFailed(format!("Failed to open {}: {}", src.display(), e))
    })?;

    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).await?;
    }

    // Unlink first so readers holding the old file keep their content
    fs::remove_file(dst).await.ok();

    let mut destination = fs::File::create(dst).await.map_err(|e| {
        StorageError::UploadFailed(format!("Failed to create file {}: {}", dst.display(), e))
    })?;

    let mut reader = BufReader::with_capacity(buffer_size, source);
    let bytes_copied = tokio::io::copy_buf(&mut reader, &mut destination)
        .await
        .map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to copy {} to {}: {}",
                src.display(),
                dst.display(),
                e
            ))
        })?;

    destination.flush().await?;
    destination.sync_all().await.map_err(|e| {
        StorageError::UploadFailed(format!("Failed to sync file {}: {}", dst.display(), e))
    })?;

    Ok(bytes_copied)
}

#[async_trait]
impl Storage for LocalStorage {
    async fn store(&self, file_path: &Path, path: &str) -> StorageResult<String> {
        let internal_path = self.internal_path(path)?;
        let start = std::time::Instant::now();

        let size = self
            .store_by_internal_path(file_path, &internal_path)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    path = %path,
                    internal_path = %internal_path,
                    "Local storage store failed"
                );
                e
            })?;

        let stored_path = internal_path_to_path(&self.config.root, &internal_path);
        let c_link = path_to_c_link(&self.config.storage_key, &stored_path);

        tracing::info!(
            c_link = %c_link,
            internal_path = %internal_path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage store successful"
        );

        Ok(c_link)
    }

    async fn store_by_c_link(&self, file_path: &Path, c_link: &str) -> StorageResult<()> {
        let internal_path = self.internal_path_by_c_link(c_link)?;
        let start = std::time::Instant::now();

        let size = self.store_by_internal_path(file_path, &internal_path).await?;

        tracing::info!(
            c_link = %c_link,
            internal_path = %internal_path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage store_by_c_link successful"
        );

        Ok(())
    }

    fn get_c_link(&self, path: &str) -> String {
        path_to_c_link(&self.config.storage_key, path)
    }

    async fn get_url(&self, c_link: &str, _options: &[UrlOption]) -> String {
        let key = &self.config.storage_key;
        if !check_storage_key(c_link, key) {
            tracing::warn!(c_link = %c_link, key = %key, "Failed check storage key");
            return String::new();
        }

        let path = c_link_to_path(key, c_link);
        if let Err(e) = self.internal_path(&path) {
            tracing::warn!(c_link = %c_link, error = %e, "Local get_url failed");
            return String::new();
        }

        self.generate_url(&path).unwrap_or_default()
    }

    async fn remove(&self, c_link: &str) -> StorageResult<()> {
        let internal_path = self.internal_path_by_c_link(c_link)?;
        let path = Path::new(&internal_path);
        let start = std::time::Instant::now();

        if !fs::try_exists(path).await.unwrap_or(false) {
            tracing::debug!(c_link = %c_link, "Local storage remove: nothing to delete");
            return Ok(());
        }

        fs::remove_file(path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            c_link = %c_link,
            internal_path = %internal_path,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage remove successful"
        );

        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Local
    }
}
