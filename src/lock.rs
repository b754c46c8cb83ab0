//! Advisory lock on a sidecar `<file>.lock` file.
//!
//! The lock is an exclusive `fs2` lock held for as long as the [`FileLock`]
//! guard lives. Only cooperating processes that take the same lock are
//! serialized; other writers are not prevented from touching the file.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use fs2::FileExt;
use tracing::{debug, instrument, warn};

use crate::error::StoreError;

/// Pause between lock attempts.
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Returns the sidecar lock path for a cookie file (`cookies.txt.lock`).
#[must_use]
pub fn lock_path_for(file: &Path) -> PathBuf {
    let mut name = OsString::from(file.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// An acquired exclusive lock. Released on drop.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Acquires an exclusive lock on `path`, creating the file if needed.
    ///
    /// Makes one attempt plus up to `retries` more, pausing briefly between
    /// attempts while another holder has the lock.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Lock`] when the lock is still held after the
    /// last attempt, or [`StoreError::Io`] when the lock file cannot be
    /// opened or locked for any other reason.
    #[instrument(level = "debug")]
    pub fn acquire(path: &Path, retries: u32) -> Result<Self, StoreError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let mut retried: u32 = 0;
        loop {
            let attempts = retried.saturating_add(1);
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => {
                    debug!(attempts, "lock acquired");
                    return Ok(Self {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(err) if is_contended(&err) => {
                    let Some(next) = next_retry(retried, retries) else {
                        warn!(attempts, path = %path.display(), "giving up on cookie file lock");
                        return Err(StoreError::Lock {
                            path: path.to_path_buf(),
                            attempts,
                        });
                    };
                    retried = next;
                    thread::sleep(LOCK_RETRY_DELAY);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Returns the lock file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %err, "failed to release cookie file lock");
        } else {
            debug!(path = %self.path.display(), "lock released");
        }
    }
}

/// Returns the retry count after one more retry, or `None` once `retries`
/// retries have been made.
fn next_retry(retried: u32, retries: u32) -> Option<u32> {
    (retried < retries).then(|| retried + 1)
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
