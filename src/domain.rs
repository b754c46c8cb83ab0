//! Domain canonicalization and RFC 6265 permutation helpers.
//!
//! Lookups never match a request domain against stored domains directly.
//! Instead the request domain is expanded into every suffix that could
//! have set a cookie for it (down to the registrable domain, per Mozilla's
//! Public Suffix List via the `psl` crate), and the request path into every
//! path prefix. Each candidate is then an exact index lookup.

use psl::Psl;

/// Returns the canonical form of a domain: trimmed, without a leading dot,
/// IDNA-encoded and lowercased.
#[must_use]
pub fn canonical_domain(domain: &str) -> String {
    let trimmed = domain.trim();
    let trimmed = trimmed.strip_prefix('.').unwrap_or(trimmed);

    match url::Host::parse(trimmed) {
        Ok(url::Host::Domain(ascii)) => ascii,
        _ => trimmed.to_lowercase(),
    }
}

/// Get the registrable domain (eTLD+1) for a domain.
/// For "sub.example.com", returns "example.com".
/// For "com" (public suffix), returns None.
#[must_use]
pub fn registrable_domain(domain: &str) -> Option<String> {
    let domain_lower = domain.to_lowercase();
    psl::List
        .domain(domain_lower.as_bytes())
        .and_then(|d| std::str::from_utf8(d.as_bytes()).ok())
        .map(ToString::to_string)
}

/// Expands a domain into the candidate domains whose cookies apply to it,
/// longest first.
///
/// `"a.b.example.com"` yields `["a.b.example.com", "b.example.com",
/// "example.com"]`. Returns `None` when the domain has no registrable part
/// (it is itself a public suffix, or not a domain at all).
#[must_use]
pub fn permute_domain(domain: &str) -> Option<Vec<String>> {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    let registrable = registrable_domain(domain)?;
    if registrable == domain {
        return Some(vec![registrable]);
    }

    let prefix = domain
        .strip_suffix(registrable.as_str())?
        .strip_suffix('.')?;

    let mut permutations = vec![registrable.clone()];
    let mut current = registrable;
    for label in prefix.rsplit('.') {
        current = format!("{label}.{current}");
        permutations.push(current.clone());
    }
    permutations.reverse();
    Some(permutations)
}

/// Expands a request path into every cookie path that matches it, longest
/// first: `"/a/b"` yields `["/a/b", "/a", "/"]`.
#[must_use]
pub fn permute_path(path: &str) -> Vec<String> {
    if path == "/" {
        return vec!["/".to_string()];
    }

    let mut permutations = vec![path.to_string()];
    let mut current = path;
    while current.len() > 1 {
        match current.rfind('/') {
            Some(0) | None => break,
            Some(index) => {
                current = &current[..index];
                permutations.push(current.to_string());
            }
        }
    }
    permutations.push("/".to_string());
    permutations
}
