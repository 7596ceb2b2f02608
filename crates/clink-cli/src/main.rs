//! clink: store files and resolve content links from the command line.
//!
//! Storages come from CLINK_STORAGES (inline JSON) or CLINK_STORAGES_FILE.

use anyhow::Context;
use clap::{Parser, Subcommand};
use clink_cli::{init_tracing, print_json, run_demo, url_options};
use clink_core::StoragesConfig;
use clink_storage::{build_registry, StorageRegistry};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clink", about = "Content link storage CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a local file and print its cLink
    Store {
        /// Path to the file to store
        file: PathBuf,
        /// Logical path to store it under
        path: String,
        /// Storage key (defaults to the configured default storage)
        #[arg(long)]
        storage: Option<String>,
    },
    /// Print the cLink a path would get, without storing anything
    Prepare {
        /// Logical path
        path: String,
        /// Storage key (defaults to the configured default storage)
        #[arg(long)]
        storage: Option<String>,
    },
    /// Print the retrieval URL of a cLink
    Url {
        c_link: String,
        /// Lifetime of signed URLs, in seconds
        #[arg(long)]
        expires_in: Option<u64>,
        /// Ask for an unsigned public URL
        #[arg(long, conflicts_with = "upload")]
        public: bool,
        /// Ask for a URL the object can be uploaded to
        #[arg(long)]
        upload: bool,
    },
    /// Delete the object a cLink addresses
    Delete { c_link: String },
    /// Replace the content behind a cLink with a local file
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        c_link: String,
    },
    /// List configured storages
    Storages,
    /// Store a generated file in every configured storage and print cLinks and URLs
    Demo,
}

async fn load_registry() -> anyhow::Result<StorageRegistry> {
    let config = StoragesConfig::from_env()
        .context("Failed to load storage configuration. Set CLINK_STORAGES or CLINK_STORAGES_FILE")?;
    Ok(build_registry(&config).await)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let registry = load_registry().await?;

    match cli.command {
        Commands::Store {
            file,
            path,
            storage,
        } => {
            let c_link = match storage {
                Some(key) => registry.create_c_link_in_storage(&file, &path, &key).await,
                None => registry.create_c_link(&file, &path).await,
            }
            .with_context(|| format!("Failed to store {}", file.display()))?;
            print_json(&serde_json::json!({ "c_link": c_link }))?;
        }
        Commands::Prepare { path, storage } => {
            let c_link = match storage {
                Some(key) => registry.prepare_c_link_in_storage(&path, &key),
                None => registry.prepare_c_link(&path),
            }?;
            print_json(&serde_json::json!({ "c_link": c_link }))?;
        }
        Commands::Url {
            c_link,
            expires_in,
            public,
            upload,
        } => {
            let options = url_options(expires_in, public, upload);
            let url = registry.get_url(&c_link, &options).await;
            if url.is_empty() {
                anyhow::bail!("No URL available for {}", c_link);
            }
            print_json(&serde_json::json!({ "url": url }))?;
        }
        Commands::Delete { c_link } => {
            registry
                .delete(&c_link)
                .await
                .with_context(|| format!("Failed to delete {}", c_link))?;
            print_json(&serde_json::json!({ "success": true, "c_link": c_link }))?;
        }
        Commands::Upload { file, c_link } => {
            registry.upload_by_c_link(&file, &c_link).await?;
            print_json(&serde_json::json!({ "success": true, "c_link": c_link }))?;
        }
        Commands::Storages => {
            let storages = registry
                .storage_keys()
                .into_iter()
                .map(|key| {
                    let storage_type = registry
                        .get_storage(key)
                        .map(|storage| storage.storage_type().to_string())
                        .unwrap_or_default();
                    serde_json::json!({ "key": key, "type": storage_type })
                })
                .collect::<Vec<_>>();
            print_json(&serde_json::json!({
                "default": registry.default_key(),
                "storages": storages,
            }))?;
        }
        Commands::Demo => {
            let entries = run_demo(&registry, &std::env::temp_dir()).await?;
            print_json(&entries)?;
        }
    }

    Ok(())
}
