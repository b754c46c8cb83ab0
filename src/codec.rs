//! Netscape cookie file encoder and decoder.
//!
//! The file is a fixed comment header followed by one cookie per line with
//! 7 TAB-separated fields: `domain`, `tailmatch`, `path`, `secure`,
//! `expires`, `name`, `value`. HttpOnly cookies are written with the
//! non-standard `#HttpOnly_` domain prefix used by curl and browsers.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::cookie::{Cookie, Expiry};
use crate::domain::canonical_domain;
use crate::index::CookieIndex;

/// Header written at the top of every encoded file.
pub const HEADER: &str = "# Netscape HTTP Cookie File\n\
                          # http://www.netscape.com/newsref/std/cookie_spec.html\n\
                          # This is a generated file!  Do not edit.\n\n";

/// Domain prefix marking an HttpOnly cookie line.
pub const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

const FIELD_COUNT: usize = 7;

#[allow(clippy::expect_used)]
static HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?: Netscape)? HTTP Cookie File").expect("header regex is valid") // Static pattern, safe to panic
});

/// Decoding and encoding switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// Skip the header check and drop malformed lines instead of failing.
    pub force_parse: bool,
    /// Read and write the `#HttpOnly_` domain prefix.
    pub http_only_extension: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            force_parse: false,
            http_only_extension: true,
        }
    }
}

/// Errors that can occur while decoding a cookie file.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The first non-blank line is not a Netscape cookie file header.
    #[error("missing Netscape HTTP Cookie File header")]
    MissingHeader,

    /// A data line does not have the expected shape.
    #[error("line {line_number}: {reason} (got: {content})")]
    InvalidLine {
        /// 1-based line number in the cookie file.
        line_number: usize,
        /// The offending line content, with the value redacted.
        content: String,
        /// Description of what was wrong.
        reason: String,
    },
}

/// Encodes every cookie in `index` as a Netscape cookie file.
///
/// Cookies are written in domain, path, name order so the same index
/// always produces the same text.
#[must_use]
#[instrument(level = "debug", skip(index), fields(cookies = index.len()))]
pub fn encode(index: &CookieIndex, http_only_extension: bool) -> String {
    let mut data = String::from(HEADER);

    for cookie in index.iter() {
        let domain = if cookie.host_only {
            cookie.domain.clone()
        } else {
            format!(".{}", cookie.domain)
        };
        let tailmatch = bool_field(!cookie.host_only);
        let token = if http_only_extension && cookie.http_only {
            format!("{HTTP_ONLY_PREFIX}{domain}")
        } else {
            domain
        };

        data.push_str(&format!(
            "{token}\t{tailmatch}\t{}\t{}\t{}\t{}\t{}\n",
            cookie.path,
            bool_field(cookie.secure),
            cookie.expires.to_unix_seconds(),
            cookie.key,
            cookie.value(),
        ));
    }

    data
}

/// Decodes Netscape cookie file text into a new index.
///
/// Blank lines and `#` comments are skipped. With the HttpOnly extension
/// enabled, `#HttpOnly_` lines are data lines for HttpOnly cookies.
/// Later lines replace earlier lines with the same domain, path and name.
///
/// # Errors
///
/// Without `force_parse`, returns [`DecodeError::MissingHeader`] when the
/// first non-blank line is not a recognized header, and
/// [`DecodeError::InvalidLine`] for the first data line without exactly 7
/// fields. With `force_parse` both checks are skipped and malformed lines
/// are dropped.
#[instrument(level = "debug", skip(text), fields(bytes = text.len()))]
pub fn decode(text: &str, options: CodecOptions) -> Result<CookieIndex, DecodeError> {
    if !options.force_parse && !has_header(text) {
        return Err(DecodeError::MissingHeader);
    }

    let mut index = CookieIndex::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_number = idx + 1;

        if raw_line.trim().is_empty() {
            continue;
        }

        let (line, http_only) = match raw_line.strip_prefix(HTTP_ONLY_PREFIX) {
            Some(rest) if options.http_only_extension => (rest, true),
            _ if raw_line.trim_start().starts_with('#') => continue,
            _ => (raw_line, false),
        };

        match parse_cookie_line(line, http_only, line_number) {
            Ok(cookie) => {
                debug!(
                    line = line_number,
                    domain = %cookie.domain,
                    name = %cookie.key,
                    "parsed cookie"
                );
                index.insert(cookie);
            }
            Err(e) if options.force_parse => {
                warn!(line = line_number, reason = %e, "skipping malformed cookie line");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(index)
}

/// Returns true when the first non-blank line is a Netscape cookie file header.
#[must_use]
pub fn has_header(text: &str) -> bool {
    text.lines()
        .find(|line| !line.trim().is_empty())
        .is_some_and(|line| HEADER_PATTERN.is_match(line))
}

/// Parses a single data line (with any HttpOnly prefix already removed).
fn parse_cookie_line(line: &str, http_only: bool, line_number: usize) -> Result<Cookie, DecodeError> {
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() != FIELD_COUNT {
        return Err(DecodeError::InvalidLine {
            line_number,
            content: redact_line_for_error(line),
            reason: format!(
                "expected {FIELD_COUNT} TAB-separated fields, found {}",
                fields.len()
            ),
        });
    }

    let raw_domain = fields[0];
    let mut cookie = Cookie::new(canonical_domain(raw_domain), fields[2], fields[5], fields[6]);
    cookie.secure = fields[3] == "TRUE";
    cookie.http_only = http_only;
    cookie.host_only = !raw_domain.starts_with('.');
    cookie.expires = parse_leading_integer(fields[4]).map_or(Expiry::Never, Expiry::from_unix_seconds);

    Ok(cookie)
}

fn bool_field(value: bool) -> &'static str {
    if value { "TRUE" } else { "FALSE" }
}

/// Parses an optionally signed run of leading digits, ignoring anything
/// after them (`"123abc"` is 123). Returns `None` when there are no digits.
fn parse_leading_integer(field: &str) -> Option<i64> {
    let trimmed = field.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    if digits_end == 0 {
        return None;
    }

    let magnitude = unsigned[..digits_end].parse::<i64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Redacts cookie value (7th field) from a line for safe error messages.
fn redact_line_for_error(line: &str) -> String {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() >= FIELD_COUNT {
        let mut redacted = fields[..FIELD_COUNT - 1].join("\t");
        redacted.push_str("\t[REDACTED]");
        redacted
    } else {
        // Not enough fields to identify value, show as-is
        line.to_string()
    }
}
