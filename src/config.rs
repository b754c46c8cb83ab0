//! Store options.

use crate::codec::CodecOptions;

/// Default number of lock attempts before giving up.
pub const DEFAULT_LOCKFILE_RETRIES: u32 = 200;

/// Default permission bits for a newly created cookie file.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Behaviour switches for a [`FileCookieStore`](crate::FileCookieStore).
///
/// # Default Values
///
/// - `force_parse`: false
/// - `lockfile`: true
/// - `mode`: `0o644`
/// - `http_only_extension`: true
/// - `lockfile_retries`: 200
/// - `auto_sync`: true
/// - `no_file_error`: false
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Tolerate a missing header and malformed lines by skipping them.
    pub force_parse: bool,
    /// Guard read-modify-write cycles with an advisory lock on `<file>.lock`.
    pub lockfile: bool,
    /// Permission bits used when the cookie file is created (unix only).
    pub mode: u32,
    /// Read and write HttpOnly cookies with the `#HttpOnly_` prefix.
    pub http_only_extension: bool,
    /// Lock attempts before failing with a lock error.
    pub lockfile_retries: u32,
    /// Persist after every mutation. When disabled, changes live only in
    /// memory until [`save`](crate::FileCookieStore::save) is called, and
    /// concurrent writers in other processes are not coordinated.
    pub auto_sync: bool,
    /// Reserved; currently has no effect.
    pub no_file_error: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            force_parse: false,
            lockfile: true,
            mode: DEFAULT_FILE_MODE,
            http_only_extension: true,
            lockfile_retries: DEFAULT_LOCKFILE_RETRIES,
            auto_sync: true,
            no_file_error: false,
        }
    }
}

impl StoreOptions {
    /// Returns the codec switches derived from these options.
    #[must_use]
    pub fn codec(&self) -> CodecOptions {
        CodecOptions {
            force_parse: self.force_parse,
            http_only_extension: self.http_only_extension,
        }
    }
}
