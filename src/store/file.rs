//! Netscape cookie file backend.
//!
//! Every mutation runs as a short transaction: take the advisory lock,
//! reload the file so changes from other processes are merged in, apply
//! the mutation to the in-memory index, write the whole index back and
//! release the lock. Reads reload the file first but never wait for the
//! lock. The file is replaced through a temporary file and a rename, so a
//! concurrent reader sees either the old or the new contents.

use std::fs::{self, OpenOptions, Permissions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::codec::{self, HEADER};
use crate::config::StoreOptions;
use crate::cookie::Cookie;
use crate::error::StoreError;
use crate::index::CookieIndex;
use crate::lock::{FileLock, lock_path_for};

use super::{CookieStore, sort_by_creation};

/// A cookie store persisted to a Netscape cookie file.
///
/// The index is owned by this instance. Other processes sharing the file
/// are coordinated only through the `<file>.lock` advisory lock, with
/// last-write-wins for cookies both sides touch.
///
/// With `auto_sync` disabled, mutations stay in memory until
/// [`save`](Self::save). Reads still merge the file into the index, so an
/// unsaved change can be overwritten by a cookie with the same domain, path
/// and name written to disk by someone else in the meantime.
#[derive(Debug)]
pub struct FileCookieStore {
    path: PathBuf,
    lock_path: PathBuf,
    options: StoreOptions,
    index: CookieIndex,
}

impl FileCookieStore {
    /// Opens a store backed by `path`, creating an empty file when missing.
    ///
    /// The file is not read until the first operation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingPath`] for an empty path and
    /// [`StoreError::Io`] when a missing file cannot be created.
    #[instrument(skip(path, options), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(StoreError::MissingPath);
        }

        if !path.exists() {
            info!("creating empty cookie file");
            create_with_mode(path, options.mode)?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            lock_path: lock_path_for(path),
            options,
            index: CookieIndex::new(),
        })
    }

    /// Returns the cookie file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the options this store was opened with.
    #[must_use]
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Returns the in-memory index as of the last operation.
    #[must_use]
    pub fn index(&self) -> &CookieIndex {
        &self.index
    }

    /// Runs `mutation` against a freshly reloaded index.
    ///
    /// The lock is held from before the reload until after the write when
    /// both `lockfile` and `auto_sync` are set. When the reload fails the
    /// mutation is not called. The lock is released on every path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Lock`] when the lock cannot be taken, or the
    /// reload or persist error.
    pub fn update<F>(&mut self, mutation: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut CookieIndex),
    {
        let guard = self.acquire_lock(!self.options.auto_sync)?;

        self.reload(guard.is_some())?;
        mutation(&mut self.index);

        if self.options.auto_sync {
            self.persist()?;
        }
        Ok(())
    }

    /// Writes the whole index to disk, taking the lock when `lockfile` is set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Lock`] or [`StoreError::Io`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn save(&mut self) -> Result<(), StoreError> {
        let _guard = self.acquire_lock(false)?;
        self.persist()
    }

    /// Reloads the file and returns every cookie, copying each into
    /// `target` when one is given.
    ///
    /// Every cookie is offered to the target even after a failure.
    ///
    /// # Errors
    ///
    /// Returns the reload error, or the first error the target reported.
    #[instrument(skip(self, target), fields(path = %self.path.display()))]
    pub fn export(
        &mut self,
        target: Option<&mut dyn CookieStore>,
    ) -> Result<Vec<Cookie>, StoreError> {
        self.reload(false)?;
        let cookies = self.index.iter().cloned().collect::<Vec<_>>();

        let Some(target) = target else {
            return Ok(cookies);
        };

        let mut first_error = None;
        for cookie in &cookies {
            if let Err(err) = target.put_cookie(cookie.clone()) {
                warn!(domain = %cookie.domain, key = %cookie.key, error = %err, "export target rejected cookie");
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                debug!(count = cookies.len(), "exported cookies");
                Ok(cookies)
            }
        }
    }

    /// Merges the file contents into the index.
    ///
    /// A missing or empty file gets the header template written and leaves
    /// the index unchanged. A file that fails to decode leaves the index
    /// unchanged. `locked` tells whether the caller already holds the lock.
    fn reload(&mut self, locked: bool) -> Result<(), StoreError> {
        let text = self.read_text()?;

        if text.is_empty() {
            return self.write_header(locked);
        }

        let decoded = codec::decode(&text, self.options.codec())
            .map_err(|err| StoreError::from_decode(&self.path, err))?;
        self.index.merge(decoded);
        Ok(())
    }

    fn read_text(&self) -> Result<String, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes the header template into an empty or missing file.
    ///
    /// Never writes while another process holds the lock: without the lock
    /// the file is rechecked under a single lock attempt, and a busy lock
    /// leaves the file to its holder.
    fn write_header(&self, locked: bool) -> Result<(), StoreError> {
        if locked || !self.options.lockfile {
            debug!(path = %self.path.display(), "writing cookie file header");
            replace_contents(&self.path, HEADER, self.options.mode)?;
            return Ok(());
        }

        match FileLock::acquire(&self.lock_path, 0) {
            Ok(_guard) => {
                if self.read_text()?.is_empty() {
                    debug!(path = %self.path.display(), "writing cookie file header");
                    replace_contents(&self.path, HEADER, self.options.mode)?;
                }
                Ok(())
            }
            Err(err) if err.is_lock() => {
                debug!(path = %self.path.display(), "cookie file locked, header left to the holder");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn persist(&self) -> Result<(), StoreError> {
        let data = codec::encode(&self.index, self.options.http_only_extension);
        replace_contents(&self.path, &data, self.options.mode)?;
        debug!(path = %self.path.display(), cookies = self.index.len(), "cookie file written");
        Ok(())
    }

    fn acquire_lock(&self, disable: bool) -> Result<Option<FileLock>, StoreError> {
        if disable || !self.options.lockfile {
            return Ok(None);
        }
        FileLock::acquire(&self.lock_path, self.options.lockfile_retries).map(Some)
    }
}

impl CookieStore for FileCookieStore {
    fn find_cookie(
        &mut self,
        domain: &str,
        path: &str,
        key: &str,
    ) -> Result<Option<Cookie>, StoreError> {
        self.reload(false)?;
        Ok(self.index.find_one(domain, path, key).cloned())
    }

    fn find_cookies(
        &mut self,
        domain: &str,
        path: Option<&str>,
    ) -> Result<Vec<Cookie>, StoreError> {
        self.reload(false)?;
        Ok(self.index.find_many(domain, path))
    }

    fn put_cookie(&mut self, cookie: Cookie) -> Result<(), StoreError> {
        self.update(|index| index.insert(cookie))
    }

    fn remove_cookie(&mut self, domain: &str, path: &str, key: &str) -> Result<(), StoreError> {
        self.update(|index| index.remove_one(domain, path, key))
    }

    fn remove_cookies(&mut self, domain: &str, path: Option<&str>) -> Result<(), StoreError> {
        self.update(|index| index.remove_many(domain, path))
    }

    fn get_all_cookies(&mut self) -> Result<Vec<Cookie>, StoreError> {
        let mut cookies = self.export(None)?;
        sort_by_creation(&mut cookies);
        Ok(cookies)
    }
}

/// Creates an empty file with `mode`. A file created concurrently is kept.
fn create_with_mode(path: &Path, mode: u32) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    match options.open(path) {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(err) => Err(err),
    }
}

/// Atomically replaces the file contents through a sibling temporary file.
///
/// An existing file keeps its permissions; a new one gets `mode`.
fn replace_contents(path: &Path, data: &str, mode: u32) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    if let Some(permissions) = permissions_for(path, mode) {
        temp.as_file().set_permissions(permissions)?;
    }
    temp.write_all(data.as_bytes())?;
    temp.flush()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

fn permissions_for(path: &Path, mode: u32) -> Option<Permissions> {
    if let Ok(metadata) = fs::metadata(path) {
        return Some(metadata.permissions());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Some(Permissions::from_mode(mode))
    }
    #[cfg(not(unix))]
    {
        let _ = mode;
        None
    }
}
