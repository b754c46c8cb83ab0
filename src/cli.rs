//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect and edit Netscape cookie files.
///
/// Every change takes the `<FILE>.lock` advisory lock, so the tool is safe
/// to run next to other programs that lock the same way.
#[derive(Parser, Debug)]
#[command(name = "cookie-file-store")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file to load instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Skip the header check and drop malformed lines instead of failing
    #[arg(long)]
    pub force_parse: bool,

    /// Do not take the advisory lock
    #[arg(long)]
    pub no_lockfile: bool,

    /// Treat `#HttpOnly_` lines as comments and never write them
    #[arg(long)]
    pub no_http_only: bool,

    /// Lock attempts before giving up (0-10000)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=10_000))]
    pub lockfile_retries: Option<u32>,

    /// Permission bits for a newly created cookie file, in octal (e.g. 600)
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<u32>,

    /// Cookie file to operate on
    pub file: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Operations on the cookie file.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List cookies, optionally only those that apply to a domain and path
    List {
        /// Only cookies that apply to this domain
        #[arg(long)]
        domain: Option<String>,

        /// Only cookies that apply to this path (requires --domain)
        #[arg(long, requires = "domain")]
        path: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the value of one cookie
    Get {
        /// Cookie domain
        domain: String,
        /// Cookie path
        path: String,
        /// Cookie name
        name: String,
    },

    /// Add or replace a cookie
    Set {
        /// Cookie domain
        domain: String,
        /// Cookie path
        path: String,
        /// Cookie name
        name: String,
        /// Cookie value
        value: String,

        /// Only send over secure connections
        #[arg(long)]
        secure: bool,

        /// Hide from scripts
        #[arg(long)]
        http_only: bool,

        /// Also match subdomains of DOMAIN
        #[arg(long)]
        include_subdomains: bool,

        /// Expiry as Unix seconds (0 for a session cookie)
        #[arg(long, default_value_t = 0)]
        expires: i64,
    },

    /// Remove one cookie, a path, or a whole domain
    Remove {
        /// Cookie domain
        domain: String,

        /// Only cookies stored under this path
        #[arg(long)]
        path: Option<String>,

        /// Only the cookie with this name (requires --path)
        #[arg(long, requires = "path")]
        name: Option<String>,
    },

    /// Copy every cookie into another cookie file
    Copy {
        /// Destination cookie file
        destination: PathBuf,
    },
}

fn parse_mode(raw: &str) -> Result<u32, String> {
    let digits = raw.trim_start_matches("0o");
    let mode = u32::from_str_radix(digits, 8)
        .map_err(|_| format!("'{raw}' is not an octal permission mode"))?;
    if mode > 0o777 {
        return Err(format!("'{raw}' is out of range (max 777)"));
    }
    Ok(mode)
}
