//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{fmt, fs, path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::script::EditAction;
use crate::domain::entities::CategoryValue;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "postblock";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Command-line arguments for the `postblock` binary.
#[derive(Debug, Parser)]
#[command(
    name = "postblock",
    version,
    about = "Edit post block attributes against a WordPress REST API"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "POSTBLOCK_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: RemoteOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print the category options offered by the multi-select.
    Categories,
    /// Print the preview posts for a category selection.
    Preview(PreviewArgs),
    /// Apply editor actions to a persisted block configuration.
    Edit(EditArgs),
}

#[derive(Debug, Args, Clone, Default)]
pub struct PreviewArgs {
    /// Comma-separated category ids, or `all`. Empty means unfiltered.
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    pub categories: Vec<CategoryValue>,
}

#[derive(Debug, Args, Clone)]
pub struct EditArgs {
    /// Block configuration JSON; defaults are used when the file is missing.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Where to write the result; printed to stdout when omitted.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Actions applied in order: mode:<tag>, add, remove:<i>, bind:<i>:<media-id>,
    /// select:<value>, deselect:<value>, clear.
    #[arg(value_name = "ACTION")]
    pub actions: Vec<EditAction>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct RemoteOverrides {
    /// Override the REST API root, e.g. <https://example.com/wp-json>.
    #[arg(long = "base-url", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Override the user name used with the application password.
    #[arg(long = "username", value_name = "NAME", global = true)]
    pub username: Option<String>,

    /// Read the application password from a file.
    #[arg(
        long = "application-password-file",
        env = "POSTBLOCK_APPLICATION_PASSWORD_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath,
        global = true
    )]
    pub application_password_file: Option<PathBuf>,

    /// Override the request timeout.
    #[arg(long = "timeout-seconds", value_name = "SECONDS", global = true)]
    pub timeout_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub remote: RemoteSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub base_url: Option<Url>,
    pub credentials: Option<Credentials>,
    pub timeout: Duration,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub application_password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("application_password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("failed to read {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("POSTBLOCK").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides)?;

    Settings::from_raw(raw)
}

pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    remote: RawRemoteSettings,
    logging: RawLoggingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &RemoteOverrides) -> Result<(), LoadError> {
        if let Some(url) = overrides.base_url.as_ref() {
            self.remote.base_url = Some(url.clone());
        }
        if let Some(username) = overrides.username.as_ref() {
            self.remote.username = Some(username.clone());
        }
        if let Some(path) = overrides.application_password_file.as_ref() {
            let password = fs::read_to_string(path).map_err(|source| LoadError::File {
                path: path.display().to_string(),
                source,
            })?;
            self.remote.application_password = Some(password.trim().to_string());
        }
        if let Some(seconds) = overrides.timeout_seconds {
            self.remote.timeout_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        Ok(())
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings { remote, logging } = raw;

        let remote = build_remote_settings(remote)?;
        let logging = build_logging_settings(logging)?;

        Ok(Self { remote, logging })
    }
}

fn build_remote_settings(remote: RawRemoteSettings) -> Result<RemoteSettings, LoadError> {
    let base_url = match non_empty(remote.base_url) {
        Some(value) => {
            let url = Url::parse(&value)
                .map_err(|err| LoadError::invalid("remote.base_url", format!("failed to parse: {err}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(LoadError::invalid(
                    "remote.base_url",
                    "scheme must be http or https",
                ));
            }
            Some(url)
        }
        None => None,
    };

    let credentials = match (
        non_empty(remote.username),
        non_empty(remote.application_password),
    ) {
        (Some(username), Some(application_password)) => Some(Credentials {
            username,
            application_password,
        }),
        (None, None) => None,
        _ => {
            return Err(LoadError::invalid(
                "remote.username",
                "username and application password must be set together",
            ));
        }
    };

    let timeout_secs = remote.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "remote.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(RemoteSettings {
        base_url,
        credentials,
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRemoteSettings {
    base_url: Option<String>,
    username: Option<String>,
    application_password: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[cfg(test)]
mod tests;
