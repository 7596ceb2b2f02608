//! Pass-through storage for links that already are external URLs.
//!
//! Registered under `http` and `https` so an absolute URL can stand in for a
//! cLink: `get_url` hands it back unchanged, and nothing can be stored or
//! removed through it.

use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use clink_core::{StorageType, UrlOption};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct BypassStorage;

#[async_trait]
impl Storage for BypassStorage {
    async fn store(&self, _file_path: &Path, _path: &str) -> StorageResult<String> {
        Err(StorageError::NotImplemented("store"))
    }

    async fn store_by_c_link(&self, _file_path: &Path, _c_link: &str) -> StorageResult<()> {
        Err(StorageError::NotImplemented("store_by_c_link"))
    }

    fn get_c_link(&self, path: &str) -> String {
        path.to_string()
    }

    async fn get_url(&self, c_link: &str, _options: &[UrlOption]) -> String {
        c_link.to_string()
    }

    async fn remove(&self, _c_link: &str) -> StorageResult<()> {
        Err(StorageError::NotImplemented("remove"))
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Bypass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_get_url_passes_through() {
        let url = "http://example.com/x.png";
        assert_eq!(BypassStorage.get_url(url, &[]).await, url);
        assert_eq!(
            BypassStorage
                .get_url(url, &[UrlOption::expires_in(Duration::from_secs(60))])
                .await,
            url
        );
    }

    #[tokio::test]
    async fn test_mutations_not_implemented() {
        let file = Path::new("/tmp/x.png");
        assert!(matches!(
            BypassStorage.store(file, "x.png").await,
            Err(StorageError::NotImplemented(_))
        ));
        assert!(matches!(
            BypassStorage.store_by_c_link(file, "https://example.com/x.png").await,
            Err(StorageError::NotImplemented(_))
        ));
        assert!(matches!(
            BypassStorage.remove("https://example.com/x.png").await,
            Err(StorageError::NotImplemented(_))
        ));
    }
}
