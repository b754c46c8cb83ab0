//! Cookie record held by the store.
//!
//! This is the minimal cookie model the store needs: identity
//! (domain, path, key), payload, flags, expiry and a creation index used
//! only for ordering output. Attribute parsing and validation belong to
//! whatever cookie library produces these records.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

static NEXT_CREATION_INDEX: AtomicU64 = AtomicU64::new(1);

/// Returns the next process-wide creation index.
fn next_creation_index() -> u64 {
    NEXT_CREATION_INDEX.fetch_add(1, Ordering::Relaxed)
}

/// When a cookie stops being valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiry {
    /// The cookie never expires (written as `0` in a cookie file).
    #[default]
    Never,
    /// The cookie expires at the given instant.
    At(SystemTime),
}

impl Expiry {
    /// Builds an expiry from integer seconds since the Unix epoch.
    ///
    /// `0` and timestamps that cannot be represented map to [`Expiry::Never`].
    #[must_use]
    pub fn from_unix_seconds(seconds: i64) -> Self {
        if seconds == 0 {
            return Self::Never;
        }

        let magnitude = Duration::from_secs(seconds.unsigned_abs());
        let instant = if seconds > 0 {
            UNIX_EPOCH.checked_add(magnitude)
        } else {
            UNIX_EPOCH.checked_sub(magnitude)
        };
        instant.map_or(Self::Never, Self::At)
    }

    /// Returns the expiry as seconds since the Unix epoch, rounded to the
    /// nearest second. [`Expiry::Never`] is `0`.
    #[must_use]
    pub fn to_unix_seconds(&self) -> i64 {
        let Self::At(instant) = self else {
            return 0;
        };

        match instant.duration_since(UNIX_EPOCH) {
            Ok(after) => clamp_seconds(rounded_seconds(after)),
            Err(before) => -clamp_seconds(rounded_seconds(before.duration())),
        }
    }

    /// Returns true when the cookie never expires.
    #[must_use]
    pub fn is_never(&self) -> bool {
        matches!(self, Self::Never)
    }
}

fn rounded_seconds(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_millis() >= 500)
}

fn clamp_seconds(seconds: u64) -> i64 {
    i64::try_from(seconds).unwrap_or(i64::MAX)
}

/// A single cookie record.
///
/// The value is redacted in `Debug` output so records can be logged
/// without leaking session data.
#[derive(Clone, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie domain, without the leading dot used by domain cookies.
    pub domain: String,
    /// URL path scope.
    pub path: String,
    /// Cookie name.
    pub key: String,
    /// Cookie value. Never logged.
    value: String,
    /// Only send over secure transports.
    pub secure: bool,
    /// Hidden from non-HTTP APIs.
    pub http_only: bool,
    /// Applies to the exact host only, not subdomains.
    pub host_only: bool,
    /// Expiry instant or [`Expiry::Never`].
    pub expires: Expiry,
    /// Creation order; `None` sorts as `0`.
    pub creation_index: Option<u64>,
}

impl Cookie {
    /// Creates a host-only, non-expiring cookie and assigns it the next
    /// creation index.
    #[must_use]
    pub fn new(
        domain: impl Into<String>,
        path: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            path: path.into(),
            key: key.into(),
            value: value.into(),
            secure: false,
            http_only: false,
            host_only: true,
            expires: Expiry::Never,
            creation_index: Some(next_creation_index()),
        }
    }

    /// Returns the cookie value.
    ///
    /// Avoid logging the return value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the cookie value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Returns the canonical form of this cookie's domain, the key it is
    /// indexed under.
    #[must_use]
    pub fn canonicalized_domain(&self) -> String {
        crate::domain::canonical_domain(&self.domain)
    }
}

// Custom Debug impl that redacts the cookie value.
impl fmt::Debug for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cookie")
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("key", &self.key)
            .field("value", &"[REDACTED]")
            .field("secure", &self.secure)
            .field("http_only", &self.http_only)
            .field("host_only", &self.host_only)
            .field("expires", &self.expires)
            .field("creation_index", &self.creation_index)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_new_defaults() {
        let cookie = Cookie::new("example.com", "/", "id", "1");
        assert_eq!(cookie.domain, "example.com");
        assert_eq!(cookie.path, "/");
        assert_eq!(cookie.key, "id");
        assert_eq!(cookie.value(), "1");
        assert!(cookie.host_only);
        assert!(!cookie.secure);
        assert!(!cookie.http_only);
        assert!(cookie.expires.is_never());
    }

    #[test]
    fn test_creation_index_increases() {
        let first = Cookie::new("a.com", "/", "a", "1");
        let second = Cookie::new("a.com", "/", "b", "2");
        assert!(first.creation_index.unwrap() < second.creation_index.unwrap());
    }

    #[test]
    fn test_cookie_debug_redacts_value() {
        let cookie = Cookie::new("example.com", "/", "session", "super_secret_token");
        let debug_str = format!("{cookie:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(
            !debug_str.contains("super_secret_token"),
            "Debug output must NOT contain the actual value"
        );
    }

    #[test]
    fn test_expiry_zero_is_never() {
        assert_eq!(Expiry::from_unix_seconds(0), Expiry::Never);
        assert_eq!(Expiry::Never.to_unix_seconds(), 0);
    }

    #[test]
    fn test_expiry_seconds_round_trip() {
        let expiry = Expiry::from_unix_seconds(1_700_000_000);
        assert_eq!(
            expiry,
            Expiry::At(UNIX_EPOCH + Duration::from_secs(1_700_000_000))
        );
        assert_eq!(expiry.to_unix_seconds(), 1_700_000_000);
    }

    #[test]
    fn test_expiry_rounds_to_nearest_second() {
        let up = Expiry::At(UNIX_EPOCH + Duration::from_millis(10_600));
        let down = Expiry::At(UNIX_EPOCH + Duration::from_millis(10_400));
        assert_eq!(up.to_unix_seconds(), 11);
        assert_eq!(down.to_unix_seconds(), 10);
    }

    #[test]
    fn test_expiry_before_epoch() {
        let expiry = Expiry::from_unix_seconds(-60);
        assert_eq!(expiry.to_unix_seconds(), -60);
    }
}
