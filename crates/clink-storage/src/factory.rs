#[cfg(feature = "storage-cloudfront")]
use crate::cloudfront::{CloudFrontConfig, CloudFrontStorage};
#[cfg(feature = "storage-local")]
use crate::local::{LocalConfig, LocalStorage};
#[cfg(feature = "storage-s3")]
use crate::s3::{S3Config, S3Storage};
#[cfg(feature = "storage-yos")]
use crate::yos::YosStorage;
use crate::{BypassStorage, Storage, StorageError, StorageRegistry, StorageResult};
use clink_core::{StorageInstanceConfig, StorageType, StoragesConfig};
use std::sync::Arc;

#[cfg(feature = "storage-s3")]
fn s3_config(instance: &StorageInstanceConfig, storage_key: &str) -> S3Config {
    S3Config {
        storage_key: storage_key.to_string(),
        region: instance.setting("region").to_string(),
        access_key_id: instance.setting("access_key_id").to_string(),
        secret_access_key: instance.setting("secret_access_key").to_string(),
        bucket_name: instance.setting("bucket_name").to_string(),
        prefix: instance.setting("prefix").to_string(),
        endpoint: instance.optional_setting("endpoint").map(String::from),
        no_ssl: instance.flag("no_ssl"),
    }
}

#[cfg(feature = "storage-cloudfront")]
fn cloudfront_storage(
    instance: &StorageInstanceConfig,
    storage_key: &str,
    sign_urls: bool,
) -> StorageResult<CloudFrontStorage> {
    let storage_ctl = S3Storage::new(s3_config(instance, storage_key))?;
    let config = CloudFrontConfig {
        storage_key: storage_key.to_string(),
        domain_name: instance.setting("domain_name").to_string(),
        cf_prefix: instance.setting("cf_prefix").to_string(),
        no_ssl: instance.flag("no_ssl"),
        sign_urls,
        private_key_id: instance.setting("private_key_id").to_string(),
        private_key: instance.setting("private_key").to_string(),
    };

    CloudFrontStorage::new(config, Arc::new(storage_ctl))
}

#[cfg_attr(
    all(
        feature = "storage-local",
        feature = "storage-s3",
        feature = "storage-cloudfront",
        feature = "storage-yos"
    ),
    allow(dead_code)
)]
fn unavailable(storage_type: StorageType, feature: &str) -> StorageError {
    StorageError::ConfigError(format!(
        "{} storage backend not available ({} feature not enabled)",
        storage_type, feature
    ))
}

/// Create a storage backend from one configured instance
///
/// The backend's storage key is the instance key lowercased, matching how the
/// registry normalizes keys.
pub async fn create_storage(instance: &StorageInstanceConfig) -> StorageResult<Arc<dyn Storage>> {
    let storage_type: StorageType = instance
        .storage_type
        .parse()
        .map_err(|e| StorageError::ConfigError(format!("{}", e)))?;
    let storage_key = instance.key.to_lowercase();

    match storage_type {
        StorageType::Bypass => Ok(Arc::new(BypassStorage)),

        #[cfg(feature = "storage-local")]
        StorageType::Local => {
            let defaults = LocalConfig::default();
            let buffer_size = match instance.optional_setting("buffer_size") {
                Some(value) => value.parse::<usize>().map_err(|e| {
                    StorageError::ConfigError(format!("Invalid buffer_size {:?}: {}", value, e))
                })?,
                None => defaults.buffer_size,
            };

            let config = LocalConfig {
                storage_key,
                endpoint: instance
                    .optional_setting("endpoint")
                    .map(String::from)
                    .unwrap_or(defaults.endpoint),
                root: instance.setting("root").to_string(),
                buffer_size,
            };

            let storage = LocalStorage::new(config).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageType::Local => Err(unavailable(storage_type, "storage-local")),

        #[cfg(feature = "storage-s3")]
        StorageType::S3 => {
            let storage = S3Storage::new(s3_config(instance, &storage_key))?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageType::S3 => Err(unavailable(storage_type, "storage-s3")),

        #[cfg(feature = "storage-cloudfront")]
        StorageType::CloudFront | StorageType::CloudFrontSigned => {
            let sign_urls = storage_type == StorageType::CloudFrontSigned;
            let storage = cloudfront_storage(instance, &storage_key, sign_urls)?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-cloudfront"))]
        StorageType::CloudFront | StorageType::CloudFrontSigned => {
            Err(unavailable(storage_type, "storage-cloudfront"))
        }

        #[cfg(feature = "storage-yos")]
        StorageType::Yos => {
            let storage = YosStorage::new(s3_config(instance, &storage_key))?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-yos"))]
        StorageType::Yos => Err(unavailable(storage_type, "storage-yos")),
    }
}

/// Build a registry from configuration
///
/// The bypass backend is always registered under `http` and `https`.
/// Instances that fail to build are logged and skipped, as is a default key
/// that names no registered storage.
pub async fn build_registry(config: &StoragesConfig) -> StorageRegistry {
    let mut registry = StorageRegistry::new();

    let bypass: Arc<dyn Storage> = Arc::new(BypassStorage);
    for scheme in ["http", "https"] {
        if let Err(e) = registry.add_storage(scheme, bypass.clone()) {
            tracing::error!(key = %scheme, error = %e, "Failed to register bypass storage");
        }
    }

    for instance in &config.instances {
        let storage = match create_storage(instance).await {
            Ok(storage) => storage,
            Err(e) => {
                tracing::warn!(
                    key = %instance.key,
                    storage_type = %instance.storage_type,
                    error = %e,
                    "Skipping storage"
                );
                continue;
            }
        };

        match registry.add_storage(&instance.key, storage) {
            Ok(()) => tracing::info!(
                key = %instance.key,
                storage_type = %instance.storage_type,
                "Storage registered"
            ),
            Err(e) => tracing::warn!(key = %instance.key, error = %e, "Skipping storage"),
        }
    }

    if !config.default.is_empty() {
        if let Err(e) = registry.set_default_storage(&config.default) {
            tracing::warn!(default = %config.default, error = %e, "Default storage not set");
        }
    }

    registry
}
