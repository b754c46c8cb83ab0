//! CLI entry point for the cookie file tool.

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use clap::Parser;
use cookie_file_store::{Cookie, CookieStore, Expiry, FileCookieStore, StoreOptions};
use serde::Serialize;
use tracing::{debug, info};

mod app_config;
mod cli;

use app_config::{FileConfig, LoadedConfig, load_config};
use cli::{Args, Command};

fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let loaded = load_config(args.config.as_deref())?;
    let file_config = loaded.file_config();

    init_tracing(&args, &file_config);
    debug!(?args, "CLI arguments parsed");
    log_config_source(&loaded);

    let options = store_options(&args, &file_config);
    let mut store = FileCookieStore::open(&args.file, options.clone())
        .with_context(|| format!("Failed to open cookie file '{}'", args.file.display()))?;

    run(&args.command, &mut store, &options)
}

// Priority: RUST_LOG env var > quiet flag > verbose flag > config verbosity > default (info)
fn init_tracing(args: &Args, file_config: &FileConfig) {
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => file_config
                .verbosity
                .map_or("info", app_config::VerbositySetting::filter),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn log_config_source(loaded: &LoadedConfig) {
    match (&loaded.path, &loaded.config) {
        (Some(path), Some(_)) => debug!(path = %path.display(), "loaded config file"),
        (Some(path), None) => debug!(path = %path.display(), "no config file, using defaults"),
        (None, _) => debug!("no config directory, using defaults"),
    }
}

/// Library defaults, then the config file, then command-line flags.
fn store_options(args: &Args, file_config: &FileConfig) -> StoreOptions {
    let mut options = StoreOptions::default();
    file_config.apply_to(&mut options);

    if args.force_parse {
        options.force_parse = true;
    }
    if args.no_lockfile {
        options.lockfile = false;
    }
    if args.no_http_only {
        options.http_only_extension = false;
    }
    if let Some(retries) = args.lockfile_retries {
        options.lockfile_retries = retries;
    }
    if let Some(mode) = args.mode {
        options.mode = mode;
    }
    options
}

fn run(command: &Command, store: &mut FileCookieStore, options: &StoreOptions) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Command::List { domain, path, json } => {
            let cookies = match domain {
                Some(domain) => store.find_cookies(domain, path.as_deref())?,
                None => store.get_all_cookies()?,
            };
            if *json {
                let rows = cookies.iter().map(CookieRow::from).collect::<Vec<_>>();
                serde_json::to_writer_pretty(&mut out, &rows)?;
                writeln!(out)?;
            } else {
                for cookie in &cookies {
                    writeln!(out, "{}", format_cookie(cookie))?;
                }
            }
            debug!(count = cookies.len(), "listed cookies");
        }
        Command::Get { domain, path, name } => {
            let Some(cookie) = store.find_cookie(domain, path, name)? else {
                bail!("No cookie named '{name}' for {domain}{path}");
            };
            writeln!(out, "{}", cookie.value())?;
        }
        Command::Set {
            domain,
            path,
            name,
            value,
            secure,
            http_only,
            include_subdomains,
            expires,
        } => {
            let mut cookie = Cookie::new(domain.as_str(), path.as_str(), name.as_str(), value.as_str());
            cookie.secure = *secure;
            cookie.http_only = *http_only;
            cookie.host_only = !*include_subdomains;
            cookie.expires = Expiry::from_unix_seconds(*expires);
            store.put_cookie(cookie)?;
            if !options.auto_sync {
                store.save()?;
            }
            info!(domain = %domain, path = %path, name = %name, "cookie stored");
        }
        Command::Remove { domain, path, name } => {
            match (path, name) {
                (Some(path), Some(name)) => store.remove_cookie(domain, path, name)?,
                (path, _) => store.remove_cookies(domain, path.as_deref())?,
            }
            if !options.auto_sync {
                store.save()?;
            }
            info!(domain = %domain, "cookies removed");
        }
        Command::Copy { destination } => {
            let mut target = FileCookieStore::open(destination, options.clone()).with_context(
                || format!("Failed to open destination '{}'", destination.display()),
            )?;
            let copied = store.export(Some(&mut target))?;
            if !options.auto_sync {
                target.save()?;
            }
            info!(count = copied.len(), destination = %destination.display(), "cookies copied");
        }
    }

    Ok(())
}

/// One cookie in `list --json` output.
#[derive(Debug, Serialize)]
struct CookieRow<'a> {
    domain: &'a str,
    path: &'a str,
    name: &'a str,
    value: &'a str,
    secure: bool,
    http_only: bool,
    host_only: bool,
    /// Unix seconds, or null for a session cookie.
    expires: Option<i64>,
}

impl<'a> From<&'a Cookie> for CookieRow<'a> {
    fn from(cookie: &'a Cookie) -> Self {
        Self {
            domain: &cookie.domain,
            path: &cookie.path,
            name: &cookie.key,
            value: cookie.value(),
            secure: cookie.secure,
            http_only: cookie.http_only,
            host_only: cookie.host_only,
            expires: match cookie.expires {
                Expiry::Never => None,
                Expiry::At(_) => Some(cookie.expires.to_unix_seconds()),
            },
        }
    }
}

fn format_cookie(cookie: &Cookie) -> String {
    let expires = match cookie.expires {
        Expiry::Never => "session".to_string(),
        Expiry::At(at) => httpdate::fmt_http_date(at),
    };

    let mut flags = Vec::new();
    if cookie.secure {
        flags.push("secure");
    }
    if cookie.http_only {
        flags.push("httponly");
    }
    if !cookie.host_only {
        flags.push("subdomains");
    }

    format!(
        "{}\t{}\t{}={}\t{}\t{}",
        cookie.domain,
        cookie.path,
        cookie.key,
        cookie.value(),
        expires,
        if flags.is_empty() { "-".to_string() } else { flags.join(",") },
    )
}
