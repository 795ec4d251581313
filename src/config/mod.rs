//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{num::NonZeroUsize, path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

pub use cli::{
    CliArgs, Command, CommitsArgs, GlobalOverrides, ListArticlesArgs, ListProjectsArgs,
    LocaleArgs, StarsArgs, UnitArgs,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "folio";
const ENV_PREFIX: &str = "FOLIO";
const DEFAULT_CONTENT_ROOT: &str = "content";
const DEFAULT_LOAD_CONCURRENCY: usize = 8;
const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
const DEFAULT_GITHUB_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STARS_TTL_SECS: u64 = 60 * 60;
const DEFAULT_COMMIT_DETAIL_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_COMMIT_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct Settings {
    pub content: ContentSettings,
    pub github: GithubSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub root: PathBuf,
    pub load_concurrency: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct GithubSettings {
    pub api_base: Url,
    pub token: Option<String>,
    pub timeout: Duration,
    pub stars_ttl: Duration,
    pub commit_detail_ttl: Duration,
    pub commit_limit: NonZeroUsize,
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

/// Load settings from configuration files, `FOLIO__*` environment variables and
/// the CLI overrides, in increasing precedence.
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

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
    content: RawContentSettings,
    github: RawGithubSettings,
    logging: RawLoggingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &GlobalOverrides) {
        if let Some(root) = overrides.content_root.as_ref() {
            self.content.root = Some(root.clone());
        }
        if let Some(concurrency) = overrides.load_concurrency {
            self.content.load_concurrency = Some(concurrency);
        }
        if let Some(base) = overrides.github_api_base.as_ref() {
            self.github.api_base = Some(base.clone());
        }
        if let Some(token) = overrides.github_token.as_ref() {
            self.github.token = Some(token.clone());
        }
        if let Some(seconds) = overrides.github_timeout_seconds {
            self.github.timeout_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            content,
            github,
            logging,
        } = raw;

        Ok(Self {
            content: build_content_settings(content)?,
            github: build_github_settings(github)?,
            logging: build_logging_settings(logging)?,
        })
    }
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let root = content
        .root
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_ROOT));
    if root.as_os_str().is_empty() {
        return Err(LoadError::invalid("content.root", "path must not be empty"));
    }

    let load_concurrency = non_zero_usize(
        content.load_concurrency.unwrap_or(DEFAULT_LOAD_CONCURRENCY),
        "content.load_concurrency",
    )?;

    Ok(ContentSettings {
        root,
        load_concurrency,
    })
}

fn build_github_settings(github: RawGithubSettings) -> Result<GithubSettings, LoadError> {
    let base = github
        .api_base
        .unwrap_or_else(|| DEFAULT_GITHUB_API_BASE.to_string());
    let api_base = Url::parse(base.trim())
        .map_err(|err| LoadError::invalid("github.api_base", format!("invalid URL: {err}")))?;
    if !matches!(api_base.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "github.api_base",
            "scheme must be http or https",
        ));
    }

    let token = github.token.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    let timeout = non_zero_seconds(
        github.timeout_seconds.unwrap_or(DEFAULT_GITHUB_TIMEOUT_SECS),
        "github.timeout_seconds",
    )?;
    let stars_ttl = non_zero_seconds(
        github.stars_ttl_seconds.unwrap_or(DEFAULT_STARS_TTL_SECS),
        "github.stars_ttl_seconds",
    )?;
    let commit_detail_ttl = Duration::from_secs(
        github
            .commit_detail_ttl_seconds
            .unwrap_or(DEFAULT_COMMIT_DETAIL_TTL_SECS),
    );
    let commit_limit = non_zero_usize(
        github.commit_limit.unwrap_or(DEFAULT_COMMIT_LIMIT),
        "github.commit_limit",
    )?;

    Ok(GithubSettings {
        api_base,
        token,
        timeout,
        stars_ttl,
        commit_detail_ttl,
        commit_limit,
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

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    root: Option<PathBuf>,
    load_concurrency: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawGithubSettings {
    api_base: Option<String>,
    token: Option<String>,
    timeout_seconds: Option<u64>,
    stars_ttl_seconds: Option<u64>,
    commit_detail_ttl_seconds: Option<u64>,
    commit_limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

fn non_zero_usize(value: usize, key: &'static str) -> Result<NonZeroUsize, LoadError> {
    NonZeroUsize::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

fn non_zero_seconds(value: u64, key: &'static str) -> Result<Duration, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    Ok(Duration::from_secs(value))
}

#[cfg(test)]
mod tests;
