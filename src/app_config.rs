//! Config file loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use cookie_file_store::StoreOptions;

/// Largest lock retry count accepted from config or flags.
pub const MAX_LOCKFILE_RETRIES: u32 = 10_000;

/// Store defaults read from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Skip the header check and drop malformed lines.
    pub force_parse: Option<bool>,
    /// Take the advisory lock around changes.
    pub lockfile: Option<bool>,
    /// Permission bits for newly created cookie files.
    pub mode: Option<u32>,
    /// Read and write `#HttpOnly_` lines.
    pub http_only_extension: Option<bool>,
    /// Lock attempts before giving up.
    pub lockfile_retries: Option<u32>,
    /// Write after every change.
    pub auto_sync: Option<bool>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against the CLI ranges.
    pub fn validate(&self) -> Result<()> {
        if let Some(mode) = self.mode
            && mode > 0o777
        {
            bail!("Invalid config value for `mode`: {mode:o}. Expected range: 0..=777 (octal)");
        }

        if let Some(retries) = self.lockfile_retries
            && retries > MAX_LOCKFILE_RETRIES
        {
            bail!(
                "Invalid config value for `lockfile_retries`: {retries}. Expected range: 0..={MAX_LOCKFILE_RETRIES}"
            );
        }

        Ok(())
    }

    /// Overlays the values present in this config onto `options`.
    pub fn apply_to(&self, options: &mut StoreOptions) {
        if let Some(force_parse) = self.force_parse {
            options.force_parse = force_parse;
        }
        if let Some(lockfile) = self.lockfile {
            options.lockfile = lockfile;
        }
        if let Some(mode) = self.mode {
            options.mode = mode;
        }
        if let Some(http_only_extension) = self.http_only_extension {
            options.http_only_extension = http_only_extension;
        }
        if let Some(lockfile_retries) = self.lockfile_retries {
            options.lockfile_retries = lockfile_retries;
        }
        if let Some(auto_sync) = self.auto_sync {
            options.auto_sync = auto_sync;
        }
    }
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the log filter directive for this setting.
    #[must_use]
    pub fn filter(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Quiet => "error",
            Self::Debug => "trace",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

impl LoadedConfig {
    /// Returns the parsed config, or an empty one when none was loaded.
    #[must_use]
    pub fn file_config(&self) -> FileConfig {
        self.config.clone().unwrap_or_default()
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/cookie-file-store/config.toml`
/// 2. `$HOME/.config/cookie-file-store/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("cookie-file-store")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("cookie-file-store")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from `explicit` when given, else from the default path if present.
///
/// An explicit path that does not exist is an error; a missing default
/// config is not.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = load_file_config(path)?;
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config: Some(config),
        });
    }

    let path = resolve_default_config_path();
    let Some(path_ref) = path.as_deref() else {
        return Ok(LoadedConfig { path, config: None });
    };

    if !path_ref.exists() {
        return Ok(LoadedConfig { path, config: None });
    }

    let config = load_file_config(path_ref)?;
    Ok(LoadedConfig {
        path,
        config: Some(config),
    })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!(
                "Invalid config syntax on line {}: expected key = value",
                line_index + 1
            );
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let line_number = line_index + 1;

        match key {
            "force_parse" => {
                cfg.force_parse = Some(parse_boolean(value).with_context(|| {
                    format!("Invalid `force_parse` value on line {line_number}")
                })?);
            }
            "lockfile" => {
                cfg.lockfile = Some(parse_boolean(value).with_context(|| {
                    format!("Invalid `lockfile` value on line {line_number}")
                })?);
            }
            "http_only_extension" => {
                cfg.http_only_extension = Some(parse_boolean(value).with_context(|| {
                    format!("Invalid `http_only_extension` value on line {line_number}")
                })?);
            }
            "auto_sync" => {
                cfg.auto_sync = Some(parse_boolean(value).with_context(|| {
                    format!("Invalid `auto_sync` value on line {line_number}")
                })?);
            }
            "mode" => {
                let parsed = parse_string_literal(value)
                    .and_then(|literal| parse_octal_mode(&literal))
                    .with_context(|| format!("Invalid `mode` value on line {line_number}"))?;
                cfg.mode = Some(parsed);
            }
            "lockfile_retries" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `lockfile_retries` value on line {line_number}")
                })?;
                let retries = u32::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("lockfile_retries out of range for u32"))?;
                cfg.lockfile_retries = Some(retries);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(|| {
                    format!("Invalid `verbosity` value on line {line_number}")
                })?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_number}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_octal_mode(raw_value: &str) -> Result<u32> {
    let digits = raw_value.trim().trim_start_matches("0o");
    if digits.is_empty() {
        bail!("Expected octal permission bits such as \"0600\"");
    }
    u32::from_str_radix(digits, 8)
        .map_err(|_| anyhow::anyhow!("Expected octal permission bits such as \"0600\""))
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}
