//! Helpers shared by the `clink` binary.

use anyhow::Context;
use chrono::Utc;
use clink_core::{LinkIntent, StorageType, UrlOption};
use clink_storage::StorageRegistry;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Lifetime requested for demo URLs, so signing backends return a link too
const DEMO_URL_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

/// URL options from command-line flags
pub fn url_options(expires_in_secs: Option<u64>, public: bool, upload: bool) -> Vec<UrlOption> {
    let mut options = Vec::new();

    if let Some(secs) = expires_in_secs {
        options.push(UrlOption::expires_in(Duration::from_secs(secs)));
    }
    if public {
        options.push(LinkIntent::Public.into());
    }
    if upload {
        options.push(LinkIntent::Upload.into());
    }

    options
}

#[derive(Debug, Serialize)]
pub struct DemoEntry {
    pub key: String,
    pub c_link: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Store a generated file in every registered storage and resolve its URL.
///
/// Pass-through storages are skipped. A storage that fails to store the file
/// gets an entry with the error instead of aborting the run.
pub async fn run_demo(registry: &StorageRegistry, work_dir: &Path) -> anyhow::Result<Vec<DemoEntry>> {
    let file_name = format!("clink-demo-{}.txt", Utc::now().format("%Y%m%d%H%M%S%3f"));
    let source = work_dir.join(&file_name);
    tokio::fs::write(
        &source,
        format!("clink demo file created at {}\n", Utc::now().to_rfc3339()),
    )
    .await
    .with_context(|| format!("Write demo file {}", source.display()))?;

    let path = format!("clink-demo/{}", file_name);
    let options = [UrlOption::expires_in(DEMO_URL_LIFETIME)];
    let mut entries = Vec::new();

    for key in registry.storage_keys() {
        let storage = registry.get_storage(key)?;
        if storage.storage_type() == StorageType::Bypass {
            continue;
        }

        let entry = match registry.create_c_link_in_storage(&source, &path, key).await {
            Ok(c_link) => DemoEntry {
                key: key.to_string(),
                url: registry.get_url(&c_link, &options).await,
                c_link,
                error: None,
            },
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Demo store failed");
                DemoEntry {
                    key: key.to_string(),
                    c_link: String::new(),
                    url: String::new(),
                    error: Some(e.to_string()),
                }
            }
        };
        entries.push(entry);
    }

    tokio::fs::remove_file(&source).await.ok();

    Ok(entries)
}
