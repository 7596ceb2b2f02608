use crate::s3::{S3Config, S3Storage};
use crate::traits::{Storage, StorageResult};
use async_trait::async_trait;
use chrono::Utc;
use clink_core::options::{find_expiration, find_intent};
use clink_core::{LinkIntent, StorageType, UrlOption};
use http::Method;
use object_store::path::Path as ObjectPath;
use std::path::Path;
use std::time::Duration;

pub const YOS_ENDPOINT: &str = "https://storage.yandexcloud.net";
pub const YOS_REGION: &str = "ru-central1";

/// Lifetime of a presigned upload URL
pub const UPLOAD_URL_LIFETIME: Duration = Duration::from_secs(30 * 60);
/// Lifetime of a presigned download URL
pub const DOWNLOAD_URL_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Yandex Object Storage
///
/// S3-compatible; differs from plain S3 only in how URLs are handed out:
/// private objects get presigned links chosen by [`LinkIntent`].
#[derive(Debug, Clone)]
pub struct YosStorage {
    s3: S3Storage,
}

impl YosStorage {
    pub fn new(mut config: S3Config) -> StorageResult<Self> {
        if config.endpoint.is_none() {
            config.endpoint = Some(YOS_ENDPOINT.to_string());
        }
        if config.region.is_empty() {
            config.region = YOS_REGION.to_string();
        }

        Ok(Self {
            s3: S3Storage::new(config)?,
        })
    }

    /// Presigned lifetime: the caller's expiration if given, else `default`.
    ///
    /// `None` when the requested expiration is already in the past.
    fn lifetime(options: &[UrlOption], url: &str, default: Duration) -> Option<Duration> {
        let Some(expiration) = find_expiration(options) else {
            return Some(default);
        };

        let millis = (expiration.access_expire_time(url) - Utc::now()).num_milliseconds();
        if millis <= 0 {
            return None;
        }
        // Round up so a lifetime of N seconds is not signed as N - 1
        Some(Duration::from_secs((millis as u64).div_ceil(1000)))
    }

    async fn presigned(&self, method: Method, location: &ObjectPath, lifetime: Duration) -> String {
        match self.s3.signed_url(method, location, lifetime).await {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(key = %location, error = %e, "YOS presign failed");
                String::new()
            }
        }
    }
}

#[async_trait]
impl Storage for YosStorage {
    async fn store(&self, file_path: &Path, path: &str) -> StorageResult<String> {
        self.s3.store(file_path, path).await
    }

    async fn store_by_c_link(&self, file_path: &Path, c_link: &str) -> StorageResult<()> {
        self.s3.store_by_c_link(file_path, c_link).await
    }

    fn get_c_link(&self, path: &str) -> String {
        self.s3.get_c_link(path)
    }

    async fn get_url(&self, c_link: &str, options: &[UrlOption]) -> String {
        let location = match self.s3.internal_path_by_c_link(c_link) {
            Ok(location) => location,
            Err(e) => {
                tracing::warn!(c_link = %c_link, error = %e, "YOS get_url failed");
                return String::new();
            }
        };

        let Some(public_url) = self.s3.compose_url(&location) else {
            return String::new();
        };

        let (method, default_lifetime) = match find_intent(options) {
            LinkIntent::Public => return public_url,
            LinkIntent::Upload => (Method::PUT, UPLOAD_URL_LIFETIME),
            LinkIntent::Download => (Method::GET, DOWNLOAD_URL_LIFETIME),
        };

        let Some(lifetime) = Self::lifetime(options, &public_url, default_lifetime) else {
            tracing::warn!(c_link = %c_link, "YOS get_url: expiration already passed");
            return String::new();
        };

        if method == Method::GET {
            match self.s3.exists(&location).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(c_link = %c_link, "YOS get_url: object does not exist");
                    return String::new();
                }
                Err(e) => {
                    tracing::error!(c_link = %c_link, error = %e, "YOS head failed");
                    return String::new();
                }
            }
        }

        self.presigned(method, &location, lifetime).await
    }

    async fn remove(&self, c_link: &str) -> StorageResult<()> {
        self.s3.remove(c_link).await
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Yos
    }
}

#[cfg(all(test, feature = "storage-yos"))]
mod tests {
    use super::*;
    use crate::traits::StorageError;

    fn test_storage() -> YosStorage {
        YosStorage::new(S3Config {
            storage_key: "yos".to_string(),
            access_key_id: "test-access-key".to_string(),
            secret_access_key: "test-secret-key".to_string(),
            bucket_name: "test-bucket".to_string(),
            prefix: "uploads".to_string(),
            ..S3Config::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_public_url() {
        let storage = test_storage();
        assert_eq!(
            storage
                .get_url("yos:a/file 1.jpg", &[LinkIntent::Public.into()])
                .await,
            "https://storage.yandexcloud.net/test-bucket/uploads/a/file%201.jpg"
        );
    }

    #[tokio::test]
    async fn test_upload_url_is_presigned_put() {
        let storage = test_storage();
        let url = storage
            .get_url("yos:a/file.jpg", &[LinkIntent::Upload.into()])
            .await;

        assert!(url.starts_with("https://storage.yandexcloud.net/test-bucket/uploads/a/file.jpg?"));
        assert!(url.contains("X-Amz-Expires=1800"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[tokio::test]
    async fn test_expiration_overrides_lifetime() {
        let storage = test_storage();
        let url = storage
            .get_url(
                "yos:a/file.jpg",
                &[
                    LinkIntent::Upload.into(),
                    UrlOption::expires_in(Duration::from_secs(600)),
                ],
            )
            .await;

        assert!(url.contains("X-Amz-Expires=600"), "{}", url);
    }

    #[tokio::test]
    async fn test_past_expiration_gives_empty_url() {
        let storage = test_storage();
        let past = Utc::now() - chrono::Duration::hours(1);
        let url = storage
            .get_url(
                "yos:a/file.jpg",
                &[LinkIntent::Upload.into(), UrlOption::expires_at(past)],
            )
            .await;

        assert_eq!(url, "");
    }

    #[tokio::test]
    async fn test_wrong_key() {
        let storage = test_storage();
        assert_eq!(
            storage.get_url("s3:a/file.jpg", &[LinkIntent::Public.into()]).await,
            ""
        );
        assert!(matches!(
            storage.remove("s3:a/file.jpg").await,
            Err(StorageError::StorageKeyNotMatch { .. })
        ));
    }

    #[test]
    fn test_storage_type_and_c_link() {
        let storage = test_storage();
        assert_eq!(storage.storage_type(), StorageType::Yos);
        assert_eq!(storage.get_c_link("/a/b.jpg"), "yos:a/b.jpg");
    }
}
