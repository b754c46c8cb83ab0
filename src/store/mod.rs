//! Cookie storage backends.
//!
//! # Architecture
//!
//! - [`CookieStore`] - Capability set every backend implements
//! - [`FileCookieStore`] - Netscape cookie file backend with advisory locking
//! - [`MemoryCookieStore`] - In-memory backend, also a ready export target
//!
//! # Example
//!
//! ```no_run
//! use cookie_file_store::{Cookie, CookieStore, FileCookieStore, StoreOptions};
//!
//! # fn example() -> Result<(), cookie_file_store::StoreError> {
//! let mut store = FileCookieStore::open("cookies.txt", StoreOptions::default())?;
//! store.put_cookie(Cookie::new("example.com", "/", "id", "1"))?;
//!
//! let found = store.find_cookies("www.example.com", None)?;
//! println!("{} cookies apply", found.len());
//! # Ok(())
//! # }
//! ```

mod file;
mod memory;

pub use file::FileCookieStore;
pub use memory::MemoryCookieStore;

use crate::cookie::Cookie;
use crate::error::StoreError;

/// Storage operations shared by every cookie backend.
///
/// Any backend implementing this trait can stand in for another behind the
/// same caller-facing contract, and can receive cookies from
/// [`FileCookieStore::export`]. Reads take `&mut self` because a backend may
/// refresh its state from storage before answering.
pub trait CookieStore {
    /// Finds the cookie stored under exactly this domain, path and name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend cannot be read.
    fn find_cookie(
        &mut self,
        domain: &str,
        path: &str,
        key: &str,
    ) -> Result<Option<Cookie>, StoreError>;

    /// Finds every cookie that applies to `domain` and `path`, matching
    /// parent domains and path prefixes. Results are unordered.
    ///
    /// With `path` omitted every path under a matching domain is included;
    /// `Some("/")` includes only cookies stored at the root path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend cannot be read.
    fn find_cookies(&mut self, domain: &str, path: Option<&str>)
    -> Result<Vec<Cookie>, StoreError>;

    /// Adds a cookie, replacing any cookie with the same domain, path and name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the change cannot be applied or persisted.
    fn put_cookie(&mut self, cookie: Cookie) -> Result<(), StoreError>;

    /// Replaces `old_cookie` with `new_cookie`. Equivalent to
    /// [`put_cookie`](Self::put_cookie) with the new cookie.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the change cannot be applied or persisted.
    fn update_cookie(&mut self, _old_cookie: &Cookie, new_cookie: Cookie) -> Result<(), StoreError> {
        self.put_cookie(new_cookie)
    }

    /// Removes a single cookie; a missing cookie is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the change cannot be applied or persisted.
    fn remove_cookie(&mut self, domain: &str, path: &str, key: &str) -> Result<(), StoreError>;

    /// Removes every cookie stored under `path` for `domain`, or every
    /// cookie for `domain` when `path` is omitted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the change cannot be applied or persisted.
    fn remove_cookies(&mut self, domain: &str, path: Option<&str>) -> Result<(), StoreError>;

    /// Returns every cookie ordered by creation index (missing counts as 0).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend cannot be read.
    fn get_all_cookies(&mut self) -> Result<Vec<Cookie>, StoreError>;
}

/// Stable sort by creation index, approximating insertion order.
pub(crate) fn sort_by_creation(cookies: &mut [Cookie]) {
    cookies.sort_by_key(|cookie| cookie.creation_index.unwrap_or(0));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_creation_missing_index_first() {
        let mut late = Cookie::new("a.com", "/", "late", "v");
        late.creation_index = Some(10);
        let mut early = Cookie::new("a.com", "/", "early", "v");
        early.creation_index = Some(2);
        let mut missing = Cookie::new("a.com", "/", "missing", "v");
        missing.creation_index = None;

        let mut cookies = vec![late, early, missing];
        sort_by_creation(&mut cookies);

        let keys = cookies.iter().map(|c| c.key.as_str()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["missing", "early", "late"]);
    }

    #[test]
    fn test_sort_by_creation_is_stable() {
        let mut first = Cookie::new("a.com", "/", "first", "v");
        first.creation_index = Some(5);
        let mut second = Cookie::new("a.com", "/", "second", "v");
        second.creation_index = Some(5);

        let mut cookies = vec![first, second];
        sort_by_creation(&mut cookies);

        assert_eq!(cookies[0].key, "first");
        assert_eq!(cookies[1].key, "second");
    }
}
