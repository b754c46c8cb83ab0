//! In-memory cookie store.

use crate::cookie::Cookie;
use crate::error::StoreError;
use crate::index::CookieIndex;

use super::{CookieStore, sort_by_creation};

/// A cookie store that keeps everything in memory.
///
/// Uses the same index and lookup rules as [`FileCookieStore`](super::FileCookieStore)
/// without any I/O, so operations never fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryCookieStore {
    index: CookieIndex,
}

impl MemoryCookieStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the underlying index.
    #[must_use]
    pub fn index(&self) -> &CookieIndex {
        &self.index
    }

    /// Returns the number of stored cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true when no cookies are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl CookieStore for MemoryCookieStore {
    fn find_cookie(
        &mut self,
        domain: &str,
        path: &str,
        key: &str,
    ) -> Result<Option<Cookie>, StoreError> {
        Ok(self.index.find_one(domain, path, key).cloned())
    }

    fn find_cookies(
        &mut self,
        domain: &str,
        path: Option<&str>,
    ) -> Result<Vec<Cookie>, StoreError> {
        Ok(self.index.find_many(domain, path))
    }

    fn put_cookie(&mut self, cookie: Cookie) -> Result<(), StoreError> {
        self.index.insert(cookie);
        Ok(())
    }

    fn remove_cookie(&mut self, domain: &str, path: &str, key: &str) -> Result<(), StoreError> {
        self.index.remove_one(domain, path, key);
        Ok(())
    }

    fn remove_cookies(&mut self, domain: &str, path: Option<&str>) -> Result<(), StoreError> {
        self.index.remove_many(domain, path);
        Ok(())
    }

    fn get_all_cookies(&mut self) -> Result<Vec<Cookie>, StoreError> {
        let mut cookies = self.index.iter().cloned().collect::<Vec<_>>();
        sort_by_creation(&mut cookies);
        Ok(cookies)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_find() {
        let mut store = MemoryCookieStore::new();
        store
            .put_cookie(Cookie::new("example.com", "/", "id", "1"))
            .unwrap();

        let found = store.find_cookie("example.com", "/", "id").unwrap().unwrap();
        assert_eq!(found.value(), "1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_cookie_replaces() {
        let mut store = MemoryCookieStore::new();
        let old = Cookie::new("example.com", "/", "id", "1");
        store.put_cookie(old.clone()).unwrap();
        store
            .update_cookie(&old, Cookie::new("example.com", "/", "id", "2"))
            .unwrap();

        let found = store.find_cookie("example.com", "/", "id").unwrap().unwrap();
        assert_eq!(found.value(), "2");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_cookies_by_domain() {
        let mut store = MemoryCookieStore::new();
        store
            .put_cookie(Cookie::new("example.com", "/", "a", "1"))
            .unwrap();
        store
            .put_cookie(Cookie::new("example.com", "/x", "b", "1"))
            .unwrap();
        store.remove_cookies("example.com", None).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_all_cookies_in_creation_order() {
        let mut store = MemoryCookieStore::new();
        store.put_cookie(Cookie::new("z.com", "/", "first", "1")).unwrap();
        store.put_cookie(Cookie::new("a.com", "/", "second", "1")).unwrap();

        let all = store.get_all_cookies().unwrap();
        let keys = all.iter().map(|c| c.key.as_str()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["first", "second"]);
    }
}
