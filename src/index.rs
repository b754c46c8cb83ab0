//! In-memory cookie index and the lookups over it.
//!
//! Cookies are keyed canonical domain → path → name. `BTreeMap` keeps every
//! level sorted, which is the iteration order used when the index is
//! encoded, so the same index always produces the same file.

use std::collections::BTreeMap;

use crate::cookie::Cookie;
use crate::domain::{canonical_domain, permute_domain, permute_path};

type PathIndex = BTreeMap<String, Cookie>;
type DomainIndex = BTreeMap<String, PathIndex>;

/// Three-level cookie index: domain → path → name → cookie.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieIndex {
    domains: BTreeMap<String, DomainIndex>,
}

impl CookieIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a cookie, replacing any cookie with the same domain, path and name.
    ///
    /// The stored record carries the canonical domain; a leading dot on the
    /// way in is dropped and only `host_only` decides the dot on the way out.
    pub fn insert(&mut self, mut cookie: Cookie) {
        cookie.domain = canonical_domain(&cookie.domain);
        self.domains
            .entry(cookie.domain.clone())
            .or_default()
            .entry(cookie.path.clone())
            .or_default()
            .insert(cookie.key.clone(), cookie);
    }

    /// Merges `other` into this index; cookies in `other` win on conflict.
    pub fn merge(&mut self, other: Self) {
        for (domain, paths) in other.domains {
            let domain_index = self.domains.entry(domain).or_default();
            for (path, keys) in paths {
                domain_index.entry(path).or_default().extend(keys);
            }
        }
    }

    /// Exact lookup of a single cookie.
    #[must_use]
    pub fn find_one(&self, domain: &str, path: &str, key: &str) -> Option<&Cookie> {
        self.domains
            .get(&canonical_domain(domain))?
            .get(path)?
            .get(key)
    }

    /// Finds every cookie that applies to `domain` and `path`.
    ///
    /// The domain is expanded to its parent domains down to the registrable
    /// domain. With `path` omitted every path under a matching domain is
    /// included. `Some("/")` includes only cookies stored at `/`; this is
    /// narrower than omitting the path and is kept for compatibility with
    /// existing callers. Any other path is expanded to its prefixes.
    #[must_use]
    pub fn find_many(&self, domain: &str, path: Option<&str>) -> Vec<Cookie> {
        if domain.is_empty() {
            return Vec::new();
        }

        let canonical = canonical_domain(domain);
        let domains = permute_domain(&canonical).unwrap_or_else(|| vec![canonical]);
        let paths = match path {
            None | Some("") => None,
            Some(path) => Some(permute_path(path)),
        };

        let mut results = Vec::new();
        for candidate in &domains {
            let Some(domain_index) = self.domains.get(candidate) else {
                continue;
            };
            match &paths {
                None => {
                    for keys in domain_index.values() {
                        results.extend(keys.values().cloned());
                    }
                }
                Some(paths) => {
                    for candidate_path in paths {
                        if let Some(keys) = domain_index.get(candidate_path) {
                            results.extend(keys.values().cloned());
                        }
                    }
                }
            }
        }
        results
    }

    /// Removes a single cookie if present.
    pub fn remove_one(&mut self, domain: &str, path: &str, key: &str) {
        let canonical = canonical_domain(domain);
        if let Some(keys) = self
            .domains
            .get_mut(&canonical)
            .and_then(|domain_index| domain_index.get_mut(path))
        {
            keys.remove(key);
        }
    }

    /// Removes a whole path bucket, or the whole domain when `path` is omitted.
    pub fn remove_many(&mut self, domain: &str, path: Option<&str>) {
        let canonical = canonical_domain(domain);
        match path {
            Some(path) if !path.is_empty() => {
                if let Some(domain_index) = self.domains.get_mut(&canonical) {
                    domain_index.remove(path);
                }
            }
            _ => {
                self.domains.remove(&canonical);
            }
        }
    }

    /// Iterates over every cookie in domain, path, name order.
    pub fn iter(&self) -> impl Iterator<Item = &Cookie> + '_ {
        self.domains
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
    }

    /// Returns the number of cookies in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns true when the index holds no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}
