//! CloudFront distribution in front of an object storage backend.
//!
//! Writes and deletes go to the wrapped backend; URLs point at the
//! distribution domain and are optionally signed with a canned policy.

mod signer;

pub use signer::{canned_policy, cloudfront_base64, SignerError, UrlSigner};

use crate::s3::{compose_object_url, object_key};
use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use clink_core::clink::{c_link_to_path, check_storage_key};
use clink_core::options::find_expiration;
use clink_core::{StorageType, UrlOption};
use std::path::Path;
use std::sync::Arc;
use url::Url;

#[derive(Debug, Clone, Default)]
pub struct CloudFrontConfig {
    pub storage_key: String,
    /// Distribution domain (e.g. "d111111abcdef8.cloudfront.net")
    pub domain_name: String,
    /// Origin path of the distribution
    pub cf_prefix: String,
    pub no_ssl: bool,
    pub sign_urls: bool,
    pub private_key_id: String,
    /// PKCS#1 PEM, required when `sign_urls` is set
    pub private_key: String,
}

pub struct CloudFrontStorage {
    storage_key: String,
    cf_prefix: String,
    base_url: Url,
    signer: Option<UrlSigner>,
    storage_ctl: Arc<dyn Storage>,
}

impl CloudFrontStorage {
    /// Wrap `storage_ctl`, which must issue cLinks under the same storage key.
    ///
    /// The private key is decoded here, so a signing distribution with a bad
    /// key fails at construction rather than on every `get_url`.
    pub fn new(config: CloudFrontConfig, storage_ctl: Arc<dyn Storage>) -> StorageResult<Self> {
        if config.storage_key.is_empty() {
            return Err(StorageError::KeyEmpty);
        }

        let scheme = if config.no_ssl { "http" } else { "https" };
        let base_url = Url::parse(&format!("{}://{}/", scheme, config.domain_name))
            .map_err(|e| {
                StorageError::ConfigError(format!(
                    "Invalid CloudFront domain {:?}: {}",
                    config.domain_name, e
                ))
            })?;

        let signer = if config.sign_urls {
            let signer = UrlSigner::new(config.private_key_id, &config.private_key)
                .map_err(|e| StorageError::ConfigError(e.to_string()))?;
            Some(signer)
        } else {
            None
        };

        Ok(Self {
            storage_key: config.storage_key,
            cf_prefix: config.cf_prefix,
            base_url,
            signer,
            storage_ctl,
        })
    }

    /// Distribution URL of the object the wrapped storage writes for `path`
    fn compose_url(&self, path: &str) -> Option<String> {
        compose_object_url(&self.base_url, &object_key(&self.cf_prefix, path))
    }
}

impl std::fmt::Debug for CloudFrontStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudFrontStorage")
            .field("storage_key", &self.storage_key)
            .field("base_url", &self.base_url.as_str())
            .field("cf_prefix", &self.cf_prefix)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Storage for CloudFrontStorage {
    async fn store(&self, file_path: &Path, path: &str) -> StorageResult<String> {
        self.storage_ctl
            .store(file_path, path)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Failed to store {}: {}", path, e)))
    }

    async fn store_by_c_link(&self, file_path: &Path, c_link: &str) -> StorageResult<()> {
        self.storage_ctl.store_by_c_link(file_path, c_link).await
    }

    fn get_c_link(&self, path: &str) -> String {
        self.storage_ctl.get_c_link(path)
    }

    async fn get_url(&self, c_link: &str, options: &[UrlOption]) -> String {
        if !check_storage_key(c_link, &self.storage_key) {
            tracing::warn!(c_link = %c_link, key = %self.storage_key, "Failed check storage key");
            return String::new();
        }

        let Some(url) = self.compose_url(&c_link_to_path(&self.storage_key, c_link)) else {
            return String::new();
        };

        let Some(ref signer) = self.signer else {
            return url;
        };

        let Some(expiration) = find_expiration(options) else {
            tracing::warn!(c_link = %c_link, "Signed URL requested without an expiration");
            return String::new();
        };

        match signer.sign(&url, expiration.access_expire_time(&url)) {
            Ok(signed) => signed,
            Err(e) => {
                tracing::error!(c_link = %c_link, error = %e, "CloudFront URL signing failed");
                String::new()
            }
        }
    }

    async fn remove(&self, c_link: &str) -> StorageResult<()> {
        self.storage_ctl.remove(c_link).await
    }

    fn storage_type(&self) -> StorageType {
        if self.signer.is_some() {
            StorageType::CloudFrontSigned
        } else {
            StorageType::CloudFront
        }
    }
}
