//! Clink Storage Library
//!
//! This crate provides the storage registry and the storage backends behind
//! content links: the `Storage` trait, a pass-through backend for external
//! URLs, and implementations for the local filesystem, S3, CloudFront and
//! Yandex Object Storage.
//!
//! # Routing
//!
//! A content link is `<storage-key>:<path>`. The registry picks the backend
//! registered under the link's leading scheme; the backend checks the key
//! again before touching the medium. A key appearing anywhere but at the
//! start of the link never matches.

pub mod bypass;
#[cfg(feature = "storage-cloudfront")]
pub mod cloudfront;
pub mod factory;
pub mod global;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod registry;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;
#[cfg(feature = "storage-yos")]
pub mod yos;

// Re-export commonly used types
pub use bypass::BypassStorage;
#[cfg(feature = "storage-cloudfront")]
pub use cloudfront::{CloudFrontConfig, CloudFrontStorage};
pub use factory::{build_registry, create_storage};
#[cfg(feature = "storage-local")]
pub use local::{LocalConfig, LocalStorage};
pub use registry::StorageRegistry;
#[cfg(feature = "storage-s3")]
pub use s3::{S3Config, S3Storage};
pub use traits::{Storage, StorageError, StorageResult};
#[cfg(feature = "storage-yos")]
pub use yos::YosStorage;

pub use clink_core;
pub use clink_core::{LinkIntent, StorageType, UrlOption};
