use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use clink_core::clink::{c_link_to_path, check_storage_key, path_to_c_link, path_to_internal_path};
use clink_core::{StorageType, UrlOption};
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Virtual-hosted AWS S3 host for a bucket
fn aws_host(bucket: &str) -> String {
    format!("{}.s3.amazonaws.com", bucket)
}

/// Object key for `path` under `prefix`
///
/// The object store escapes characters such as `#`, `%` and `?` in each
/// segment; the escaped key is what gets written, so URLs must be built from
/// it rather than from the raw path.
pub(crate) fn object_key(prefix: &str, path: &str) -> ObjectPath {
    ObjectPath::from(path_to_internal_path(prefix, path))
}

/// Append the segments of an object key to `base`
pub(crate) fn compose_object_url(base: &Url, location: &ObjectPath) -> Option<String> {
    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(location.as_ref().split('/'));
    Some(url.to_string())
}

/// S3 storage configuration
#[derive(Debug, Clone, Default)]
pub struct S3Config {
    pub storage_key: String,
    pub region: String,
    /// Static credentials; when empty the builder falls back to the environment
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket_name: String,
    /// Key prefix every object is stored under
    pub prefix: String,
    /// Custom endpoint for S3-compatible providers (e.g. "http://localhost:9000" for MinIO)
    pub endpoint: Option<String>,
    pub no_ssl: bool,
}

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    config: S3Config,
    base_url: Url,
}

impl std::fmt::Debug for S3Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Storage")
            .field("storage_key", &self.config.storage_key)
            .field("bucket", &self.config.bucket_name)
            .field("prefix", &self.config.prefix)
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// Only builds the client; no request is made until the first operation.
    pub fn new(config: S3Config) -> StorageResult<Self> {
        if config.storage_key.is_empty() {
            return Err(StorageError::KeyEmpty);
        }

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(config.bucket_name.clone());

        if !config.region.is_empty() {
            builder = builder.with_region(config.region.clone());
        }
        if !config.access_key_id.is_empty() {
            builder = builder
                .with_access_key_id(config.access_key_id.clone())
                .with_secret_access_key(config.secret_access_key.clone());
        }
        if let Some(ref endpoint) = config.endpoint {
            let allow_http = config.no_ssl || endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let base_url = Self::base_url(&config)?;

        Ok(S3Storage {
            store,
            config,
            base_url,
        })
    }

    /// Public base URL of the bucket
    ///
    /// AWS buckets are addressed virtual-hosted style; a custom endpoint is
    /// addressed path-style: `{endpoint}/{bucket}/`.
    fn base_url(config: &S3Config) -> StorageResult<Url> {
        let invalid = |e: url::ParseError| {
            StorageError::ConfigError(format!("Invalid S3 URL for {}: {}", config.bucket_name, e))
        };

        match config.endpoint {
            Some(ref endpoint) => {
                let mut url = Url::parse(endpoint).map_err(invalid)?;
                url.path_segments_mut()
                    .map_err(|_| {
                        StorageError::ConfigError(format!("Endpoint {} cannot serve paths", endpoint))
                    })?
                    .pop_if_empty()
                    .push(&config.bucket_name)
                    .push("");
                Ok(url)
            }
            None => {
                let scheme = if config.no_ssl { "http" } else { "https" };
                Url::parse(&format!("{}://{}/", scheme, aws_host(&config.bucket_name)))
                    .map_err(invalid)
            }
        }
    }

    /// Object key for a logical path
    pub(crate) fn internal_path(&self, path: &str) -> ObjectPath {
        object_key(&self.config.prefix, path)
    }

    /// Object key addressed by a cLink of this storage
    pub(crate) fn internal_path_by_c_link(&self, c_link: &str) -> StorageResult<ObjectPath> {
        let key = &self.config.storage_key;
        if !check_storage_key(c_link, key) {
            return Err(StorageError::key_not_match(key, c_link));
        }

        Ok(self.internal_path(&c_link_to_path(key, c_link)))
    }

    /// Public URL of an object key, percent-encoded segment by segment
    pub(crate) fn compose_url(&self, location: &ObjectPath) -> Option<String> {
        compose_object_url(&self.base_url, location)
    }

    /// Presigned URL for `method` on an object key
    pub(crate) async fn signed_url(
        &self,
        method: Method,
        location: &ObjectPath,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let url_result: ObjectResult<_> = self
            .store
            .signed_url(method, location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::BackendError(e.to_string()))?
            .to_string();

        Ok(url)
    }

    pub(crate) async fn exists(&self, location: &ObjectPath) -> StorageResult<bool> {
        match self.store.head(location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn put_file(&self, file_path: &Path, location: &ObjectPath) -> StorageResult<()> {
        let start = std::time::Instant::now();

        let data = tokio::fs::read(file_path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to read {} for {}: {}",
                file_path.display(),
                location,
                e
            ))
        })?;
        let size = data.len() as u64;

        let result: ObjectResult<_> = self
            .store
            .put(location, PutPayload::from(Bytes::from(data)))
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.config.bucket_name,
                key = %location,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(format!("Failed to store {}: {}", location, e))
        })?;

        tracing::info!(
            bucket = %self.config.bucket_name,
            key = %location,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn store(&self, file_path: &Path, path: &str) -> StorageResult<String> {
        let location = self.internal_path(path);
        self.put_file(file_path, &location).await?;
        Ok(path_to_c_link(&self.config.storage_key, path))
    }

    async fn store_by_c_link(&self, file_path: &Path, c_link: &str) -> StorageResult<()> {
        let location = self.internal_path_by_c_link(c_link)?;
        self.put_file(file_path, &location).await
    }

    fn get_c_link(&self, path: &str) -> String {
        path_to_c_link(&self.config.storage_key, path)
    }

    async fn get_url(&self, c_link: &str, _options: &[UrlOption]) -> String {
        match self.internal_path_by_c_link(c_link) {
            Ok(location) => self.compose_url(&location).unwrap_or_default(),
            Err(e) => {
                tracing::warn!(c_link = %c_link, error = %e, "S3 get_url failed");
                String::new()
            }
        }
    }

    async fn remove(&self, c_link: &str) -> StorageResult<()> {
        let location = self.internal_path_by_c_link(c_link)?;
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.config.bucket_name,
                key = %location,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 delete failed"
            );
            StorageError::DeleteFailed(format!("Failed to delete {}: {}", location, e))
        })?;

        tracing::info!(
            bucket = %self.config.bucket_name,
            key = %location,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        StorageType::S3
    }
}
