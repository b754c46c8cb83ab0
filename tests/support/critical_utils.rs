//! Shared utilities for critical tests (corrupted cookie files, held locks).
//!
//! Used by tests under `tests/critical/` to seed cookie files with broken
//! content and to build stores that give up on the lock quickly.

use std::path::{Path, PathBuf};

use cookie_file_store::{FileCookieStore, HEADER, StoreOptions};
use tempfile::TempDir;

/// A valid cookie file line for `example.com`.
pub const VALID_LINE: &str = "example.com\tFALSE\t/\tFALSE\t0\tsid\tabc";

/// Creates a cookie file with the given content.
///
/// Returns the `TempDir` (keep it alive while the path is used) and the
/// cookie file path.
pub fn cookie_file_with(content: &[u8]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("cookies.txt");
    std::fs::write(&path, content).expect("Failed to write cookie file");
    (temp_dir, path)
}

/// Creates a cookie file with the standard header followed by `lines`.
pub fn cookie_file_with_lines(lines: &[&str]) -> (TempDir, PathBuf) {
    let mut content = String::from(HEADER);
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    cookie_file_with(content.as_bytes())
}

/// Opens a store that makes only `retries` extra lock attempts.
pub fn impatient_store(path: &Path, retries: u32) -> FileCookieStore {
    FileCookieStore::open(
        path,
        StoreOptions {
            lockfile_retries: retries,
            ..StoreOptions::default()
        },
    )
    .expect("open store")
}
