//! Clink Core Library
//!
//! This crate provides the pieces shared by every clink component: the
//! content-link codec, URL generation options, storage type identifiers and
//! the storage configuration model.
//!
//! # Content link format
//!
//! A content link (cLink) is `<storage-key>:<backend-path>`. The storage key
//! doubles as the link's scheme and is the only part the registry looks at;
//! everything after the first `:` belongs to the backend.

pub mod clink;
pub mod config;
pub mod options;
pub mod storage_types;

// Re-export commonly used types
pub use clink::{
    c_link_scheme, c_link_to_path, check_storage_key, internal_path_to_path, normalize_path,
    path_to_c_link, path_to_internal_path,
};
pub use config::{StorageInstanceConfig, StoragesConfig};
pub use options::{ExpirationProvider, ExpiresAt, ExpiresIn, LinkIntent, UrlOption};
pub use storage_types::StorageType;
