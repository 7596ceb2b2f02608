//! Configuration module
//!
//! Storage configuration: an ordered list of storage instances, each naming a
//! storage key, a backend type and a flat map of backend settings, plus an
//! optional default key.
//!
//! Loaded from `CLINK_STORAGES` (inline JSON) or `CLINK_STORAGES_FILE`
//! (path to a JSON file). A `.env` file is honored.

use std::collections::{HashMap, HashSet};
use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clink::is_valid_scheme;

const STORAGES_ENV: &str = "CLINK_STORAGES";
const STORAGES_FILE_ENV: &str = "CLINK_STORAGES_FILE";

/// All configured storages
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoragesConfig {
    /// Key of the default storage; empty means no default
    #[serde(default)]
    pub default: String,
    #[serde(default)]
    pub instances: Vec<StorageInstanceConfig>,
}

/// One configured storage
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageInstanceConfig {
    pub key: String,
    /// Backend type name; see [`crate::StorageType`]. Kept as a string so an
    /// unknown type only disables its own instance.
    #[serde(rename = "type")]
    pub storage_type: String,
    #[serde(default, rename = "config")]
    pub settings: HashMap<String, String>,
}

impl StorageInstanceConfig {
    pub fn new(key: impl Into<String>, storage_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            storage_type: storage_type.into(),
            settings: HashMap::new(),
        }
    }

    pub fn with_setting(mut self, name: &str, value: impl Into<String>) -> Self {
        self.settings.insert(name.to_string(), value.into());
        self
    }

    /// Setting value, or an empty string when unset
    pub fn setting(&self, name: &str) -> &str {
        self.settings.get(name).map(String::as_str).unwrap_or("")
    }

    /// Setting value when set and non-empty
    pub fn optional_setting(&self, name: &str) -> Option<&str> {
        self.settings
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Boolean setting; anything other than `true`/`1`/`yes` is false
    pub fn flag(&self, name: &str) -> bool {
        matches!(
            self.setting(name).trim().to_lowercase().as_str(),
            "true" | "1" | "yes"
        )
    }
}

impl StoragesConfig {
    /// Load from the environment (after reading `.env`).
    ///
    /// With neither variable set the configuration is empty, which still
    /// yields a registry with the built-in `http`/`https` pass-through.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let config = if let Ok(json) = env::var(STORAGES_ENV) {
            Self::from_json_str(&json)?
        } else if let Ok(path) = env::var(STORAGES_FILE_ENV) {
            Self::from_file(&path)?
        } else {
            tracing::debug!(
                "Neither {} nor {} set, using empty storage configuration",
                STORAGES_ENV,
                STORAGES_FILE_ENV
            );
            Self::default()
        };

        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self, anyhow::Error> {
        let config: StoragesConfig = serde_json::from_str(json)
            .map_err(|e| anyhow::anyhow!("Invalid storage configuration: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!(
                "Failed to read storage configuration {}: {}",
                path.display(),
                e
            )
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let mut seen = HashSet::new();

        for instance in &self.instances {
            if instance.key.is_empty() {
                return Err(anyhow::anyhow!("Storage key must not be empty"));
            }
            if !is_valid_scheme(&instance.key) {
                return Err(anyhow::anyhow!(
                    "Storage key '{}' must start with a letter and contain only letters, digits, '+', '-' or '.'",
                    instance.key
                ));
            }
            if !seen.insert(instance.key.to_lowercase()) {
                return Err(anyhow::anyhow!(
                    "Storage key '{}' is configured more than once",
                    instance.key
                ));
            }
        }

        if !self.default.is_empty() && !seen.contains(&self.default.to_lowercase()) {
            return Err(anyhow::anyhow!(
                "Default storage '{}' is not among the configured instances",
                self.default
            ));
        }

        Ok(())
    }

    pub fn instance(&self, key: &str) -> Option<&StorageInstanceConfig> {
        self.instances
            .iter()
            .find(|instance| instance.key.eq_ignore_ascii_case(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "default": "local",
        "instances": [
            {
                "key": "local",
                "type": "local",
                "config": { "endpoint": "http://localhost:8080/files", "root": "data/" }
            },
            {
                "key": "cdn",
                "type": "cfs",
                "config": { "domain_name": "d1.cloudfront.net", "no_ssl": "true" }
            },
            { "key": "legacy", "type": "ftp" }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let config = StoragesConfig::from_json_str(SAMPLE).unwrap();

        assert_eq!(config.default, "local");
        assert_eq!(config.instances.len(), 3);

        let local = config.instance("local").unwrap();
        assert_eq!(local.storage_type, "local");
        assert_eq!(local.setting("root"), "data/");
        assert_eq!(local.setting("missing"), "");
        assert_eq!(local.optional_setting("missing"), None);

        let cdn = config.instance("CDN").unwrap();
        assert!(cdn.flag("no_ssl"));
        assert!(!cdn.flag("sign_urls"));

        // Unknown types are kept; the factory decides what to do with them
        assert_eq!(config.instance("legacy").unwrap().settings.len(), 0);
    }

    #[test]
    fn test_validate_rejects_bad_keys() {
        let empty = StoragesConfig {
            default: String::new(),
            instances: vec![StorageInstanceConfig::new("", "local")],
        };
        assert!(empty.validate().is_err());

        let colon = StoragesConfig {
            default: String::new(),
            instances: vec![StorageInstanceConfig::new("a:b", "local")],
        };
        assert!(colon.validate().is_err());

        let duplicate = StoragesConfig {
            default: String::new(),
            instances: vec![
                StorageInstanceConfig::new("files", "local"),
                StorageInstanceConfig::new("Files", "s3"),
            ],
        };
        assert!(duplicate.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_default() {
        let config = StoragesConfig {
            default: "s3".to_string(),
            instances: vec![StorageInstanceConfig::new("local", "local")],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = StoragesConfig::from_file(file.path()).unwrap();
        assert_eq!(config.default, "local");
    }

    #[test]
    fn test_from_file_missing() {
        assert!(StoragesConfig::from_file("/nonexistent/clink.json").is_err());
    }

    #[test]
    fn test_empty_json_is_empty_config() {
        let config = StoragesConfig::from_json_str("{}").unwrap();
        assert_eq!(config, StoragesConfig::default());
    }
}
