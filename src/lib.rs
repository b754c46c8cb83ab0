//! Cookie File Store Library
//!
//! A persistent cookie jar backend that keeps cookies in the Netscape
//! (`cookies.txt`) format read and written by curl, wget and browsers.
//! Multiple processes can share one file: every change runs under an
//! advisory lock and merges what other writers saved before writing back.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`cookie`] - Cookie record and expiry
//! - [`domain`] - Domain canonicalization and domain/path permutation
//! - [`index`] - In-memory domain → path → name index and lookups
//! - [`codec`] - Netscape cookie file encoder and decoder
//! - [`lock`] - Advisory lock on the `<file>.lock` sidecar
//! - [`store`] - The [`CookieStore`] trait with file and memory backends
//! - [`config`] - Store options
//! - [`error`] - Store error type
//!
//! # Example
//!
//! ```no_run
//! use cookie_file_store::{Cookie, CookieStore, FileCookieStore, StoreOptions};
//!
//! # fn example() -> Result<(), cookie_file_store::StoreError> {
//! let mut store = FileCookieStore::open("cookies.txt", StoreOptions::default())?;
//!
//! let mut cookie = Cookie::new("example.com", "/", "session", "abc123");
//! cookie.http_only = true;
//! store.put_cookie(cookie)?;
//!
//! for cookie in store.find_cookies("www.example.com", Some("/account"))? {
//!     println!("{}={}", cookie.key, cookie.value());
//! }
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod config;
pub mod cookie;
pub mod domain;
pub mod error;
pub mod index;
pub mod lock;
pub mod store;

// Re-export commonly used types
pub use codec::{CodecOptions, DecodeError, HEADER, decode, encode};
pub use config::StoreOptions;
pub use cookie::{Cookie, Expiry};
pub use domain::{canonical_domain, permute_domain, permute_path};
pub use error::StoreError;
pub use index::CookieIndex;
pub use lock::FileLock;
pub use store::{CookieStore, FileCookieStore, MemoryCookieStore};
