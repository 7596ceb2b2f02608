//! Process-wide registry
//!
//! Thin convenience layer for programs that want one registry shared by the
//! whole process. Build a [`StorageRegistry`], [`install`] it once at startup,
//! then call the free functions from anywhere. Code that can take a
//! registry as a parameter should do that instead.

use crate::registry::StorageRegistry;
use crate::traits::{StorageError, StorageResult};
use clink_core::UrlOption;
use std::path::Path;
use std::sync::OnceLock;

static REGISTRY: OnceLock<StorageRegistry> = OnceLock::new();

/// Install the process-wide registry. Only the first call succeeds.
pub fn install(registry: StorageRegistry) -> StorageResult<()> {
    REGISTRY.set(registry).map_err(|_| {
        StorageError::ConfigError("Global storage registry is already installed".to_string())
    })
}

pub fn is_installed() -> bool {
    REGISTRY.get().is_some()
}

pub fn registry() -> StorageResult<&'static StorageRegistry> {
    REGISTRY.get().ok_or_else(|| {
        StorageError::ConfigError("Global storage registry is not installed".to_string())
    })
}

pub async fn create_c_link(file_path: &Path, path: &str) -> StorageResult<String> {
    registry()?.create_c_link(file_path, path).await
}

pub async fn create_c_link_in_storage(
    file_path: &Path,
    path: &str,
    key: &str,
) -> StorageResult<String> {
    registry()?
        .create_c_link_in_storage(file_path, path, key)
        .await
}

pub fn prepare_c_link(path: &str) -> StorageResult<String> {
    registry()?.prepare_c_link(path)
}

pub fn prepare_c_link_in_storage(path: &str, key: &str) -> StorageResult<String> {
    registry()?.prepare_c_link_in_storage(path, key)
}

/// Empty when no registry is installed, like any other unresolvable link.
pub async fn get_url(c_link: &str, options: &[UrlOption]) -> String {
    match REGISTRY.get() {
        Some(registry) => registry.get_url(c_link, options).await,
        None => {
            tracing::warn!(c_link = %c_link, "Global storage registry is not installed");
            String::new()
        }
    }
}

pub async fn delete(c_link: &str) -> StorageResult<()> {
    registry()?.delete(c_link).await
}

pub async fn upload_by_c_link(file_path: &Path, c_link: &str) -> StorageResult<()> {
    registry()?.upload_by_c_link(file_path, c_link).await
}
