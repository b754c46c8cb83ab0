//! Error types for cookie store operations.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::codec::DecodeError;

/// Errors that can occur during cookie store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store was opened without a file path.
    #[error("unknown file for read/write cookies")]
    MissingPath,

    /// The cookie file does not start with a Netscape cookie file header.
    #[error(
        "{} does not look like a netscape cookies file\n  Suggestion: Enable force_parse to read files without a header",
        .path.display()
    )]
    Format {
        /// Cookie file path.
        path: PathBuf,
    },

    /// A data line in the cookie file is malformed.
    #[error("{}: line {line_number} is not valid: {reason}", .path.display())]
    Parse {
        /// Cookie file path.
        path: PathBuf,
        /// 1-based line number in the cookie file.
        line_number: usize,
        /// Description of what was wrong (cookie value redacted).
        reason: String,
    },

    /// The advisory lock could not be acquired.
    #[error(
        "could not lock {} after {attempts} attempts\n  Suggestion: Another process may be holding the lock",
        .path.display()
    )]
    Lock {
        /// Lock file path.
        path: PathBuf,
        /// Number of attempts made.
        attempts: u32,
    },

    /// Filesystem I/O failed.
    #[error("cookie file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A foreign store implementation failed.
    #[error("cookie store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Attaches the cookie file path to a codec error.
    #[must_use]
    pub fn from_decode(path: &Path, error: DecodeError) -> Self {
        match error {
            DecodeError::MissingHeader => Self::Format {
                path: path.to_path_buf(),
            },
            DecodeError::InvalidLine {
                line_number,
                content,
                reason,
            } => Self::Parse {
                path: path.to_path_buf(),
                line_number,
                reason: format!("{reason} (got: {content})"),
            },
        }
    }

    /// Returns true when this error is a lock acquisition failure.
    #[must_use]
    pub fn is_lock(&self) -> bool {
        matches!(self, Self::Lock { .. })
    }
}
