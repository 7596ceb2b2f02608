//! URL generation options
//!
//! Callers pass any number of [`UrlOption`]s when asking for a URL. Each
//! backend looks for the variants it understands and ignores the rest, so new
//! capabilities can be added without touching the storage trait.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Answers "when should access through this URL expire".
///
/// Used by signing backends. The URL passed in is the unsigned URL the
/// backend is about to sign, so implementations can vary the lifetime per
/// resource.
pub trait ExpirationProvider: Send + Sync {
    fn access_expire_time(&self, url: &str) -> DateTime<Utc>;
}

/// Fixed expiration instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiresAt(pub DateTime<Utc>);

impl ExpirationProvider for ExpiresAt {
    fn access_expire_time(&self, _url: &str) -> DateTime<Utc> {
        self.0
    }
}

/// Expiration relative to the moment the URL is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiresIn(pub Duration);

impl ExpirationProvider for ExpiresIn {
    fn access_expire_time(&self, _url: &str) -> DateTime<Utc> {
        let now = Utc::now();
        chrono::Duration::from_std(self.0)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// What the caller intends to do with the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkIntent {
    /// Fetch the object (the default when no intent is given)
    #[default]
    Download,
    /// Unsigned link that relies on the object being publicly readable
    Public,
    /// Link the client can PUT the object to
    Upload,
}

/// A modifier for URL generation.
#[derive(Clone)]
pub enum UrlOption {
    Expiration(Arc<dyn ExpirationProvider>),
    Intent(LinkIntent),
}

impl UrlOption {
    pub fn expires_at(at: DateTime<Utc>) -> Self {
        UrlOption::Expiration(Arc::new(ExpiresAt(at)))
    }

    pub fn expires_in(duration: Duration) -> Self {
        UrlOption::Expiration(Arc::new(ExpiresIn(duration)))
    }

    pub fn expiration(&self) -> Option<&dyn ExpirationProvider> {
        match self {
            UrlOption::Expiration(provider) => Some(provider.as_ref()),
            _ => None,
        }
    }

    pub fn intent(&self) -> Option<LinkIntent> {
        match self {
            UrlOption::Intent(intent) => Some(*intent),
            _ => None,
        }
    }
}

impl From<LinkIntent> for UrlOption {
    fn from(intent: LinkIntent) -> Self {
        UrlOption::Intent(intent)
    }
}

impl fmt::Debug for UrlOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlOption::Expiration(_) => f.write_str("Expiration(..)"),
            UrlOption::Intent(intent) => f.debug_tuple("Intent").field(intent).finish(),
        }
    }
}

/// First expiration provider among `options`.
pub fn find_expiration(options: &[UrlOption]) -> Option<&dyn ExpirationProvider> {
    options.iter().find_map(UrlOption::expiration)
}

/// First intent among `options` that asks for something other than a plain
/// download. Falls back to [`LinkIntent::Download`].
pub fn find_intent(options: &[UrlOption]) -> LinkIntent {
    options
        .iter()
        .filter_map(UrlOption::intent)
        .find(|intent| *intent != LinkIntent::Download)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_find_expiration_skips_other_options() {
        let at = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let options = vec![
            UrlOption::Intent(LinkIntent::Public),
            UrlOption::expires_at(at),
        ];

        let provider = find_expiration(&options).unwrap();
        assert_eq!(provider.access_expire_time("https://cdn/x.jpg"), at);
    }

    #[test]
    fn test_find_expiration_none() {
        assert!(find_expiration(&[]).is_none());
        assert!(find_expiration(&[LinkIntent::Upload.into()]).is_none());
    }

    #[test]
    fn test_expires_in_is_in_the_future() {
        let before = Utc::now();
        let expires = ExpiresIn(Duration::from_secs(3600)).access_expire_time("");
        assert!(expires >= before + chrono::Duration::seconds(3600));
    }

    #[test]
    fn test_expires_in_saturates() {
        let expires = ExpiresIn(Duration::MAX).access_expire_time("");
        assert_eq!(expires, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_find_intent() {
        assert_eq!(find_intent(&[]), LinkIntent::Download);
        assert_eq!(
            find_intent(&[
                LinkIntent::Download.into(),
                UrlOption::expires_in(Duration::from_secs(1)),
                LinkIntent::Upload.into(),
                LinkIntent::Public.into(),
            ]),
            LinkIntent::Upload
        );
    }
}
