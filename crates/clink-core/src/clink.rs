//! Content-link codec
//!
//! Pure conversions between the three shapes a file name takes:
//!
//! - **path**: the name the caller wants the file saved under (`/folder/file.jpg`)
//! - **internal path**: the path inside a backend, prefixed with the backend's
//!   root directory or bucket prefix (`data/folder/file.jpg`)
//! - **cLink**: the storage key and the path joined by `:` (`local:folder/file.jpg`)
//!
//! Nothing here percent-encodes. Encoding happens only when a backend folds a
//! path into a retrieval URL.

/// Separator between the storage key and the backend path of a cLink.
pub const KEY_SEPARATOR: char = ':';

/// Trim leading and trailing slashes and collapse repeated ones.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// path -> internal path
///
/// The prefix always ends with exactly one `/` unless it is empty, in which
/// case the normalized path is returned as is.
pub fn path_to_internal_path(prefix: &str, path: &str) -> String {
    format!("{}{}", end_slash(prefix), normalize_path(path))
}

/// internal path -> path
///
/// Returns an empty string when `internal_path` does not start with the
/// normalized prefix.
pub fn internal_path_to_path(prefix: &str, internal_path: &str) -> String {
    internal_path
        .strip_prefix(end_slash(prefix).as_str())
        .map(str::to_string)
        .unwrap_or_default()
}

/// path -> cLink
pub fn path_to_c_link(storage_key: &str, path: &str) -> String {
    format!("{}{}{}", storage_key, KEY_SEPARATOR, normalize_path(path))
}

/// cLink -> path
///
/// Returns an empty string when the cLink does not belong to `storage_key`.
pub fn c_link_to_path(storage_key: &str, c_link: &str) -> String {
    if !check_storage_key(c_link, storage_key) {
        return String::new();
    }

    c_link[storage_key.len() + KEY_SEPARATOR.len_utf8()..].to_string()
}

/// Whether `storage_key` is the leading scheme component of `c_link`.
///
/// The key must match exactly at position 0 and be followed by `:`. A key
/// appearing later in the link (`other:dir/local:file`) does not count.
pub fn check_storage_key(c_link: &str, storage_key: &str) -> bool {
    if storage_key.is_empty() {
        return false;
    }

    c_link
        .strip_prefix(storage_key)
        .is_some_and(|rest| rest.starts_with(KEY_SEPARATOR))
}

/// Extract the scheme (storage key) of a cLink.
///
/// Follows URI scheme syntax: an ASCII letter followed by letters, digits,
/// `+`, `-` or `.`, terminated by `:`. Returns `None` when the link has no
/// such scheme or contains control characters.
pub fn c_link_scheme(c_link: &str) -> Option<&str> {
    if c_link.chars().any(|c| c.is_ascii_control()) {
        return None;
    }

    let (scheme, _) = c_link.split_once(KEY_SEPARATOR)?;
    if is_valid_scheme(scheme) {
        Some(scheme)
    } else {
        None
    }
}

/// Whether `key` can serve as a cLink scheme.
pub fn is_valid_scheme(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn end_slash(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}
