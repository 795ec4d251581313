use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

use crate::domain::types::Locale;

/// Command-line arguments for the Folio binary.
#[derive(Debug, Parser)]
#[command(
    name = "folio",
    version,
    about = "Render portfolio content and print it as JSON"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "FOLIO_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the content root directory.
    #[arg(
        long = "content-root",
        value_name = "PATH",
        value_hint = ValueHint::DirPath,
        global = true
    )]
    pub content_root: Option<PathBuf>,

    /// Override how many units are loaded concurrently.
    #[arg(long = "load-concurrency", value_name = "COUNT", global = true)]
    pub load_concurrency: Option<usize>,

    /// Override the GitHub API base URL.
    #[arg(long = "github-api-base", value_name = "URL", global = true)]
    pub github_api_base: Option<String>,

    /// GitHub token sent as a bearer credential to raise rate limits.
    #[arg(
        long = "github-token",
        env = "GITHUB_TOKEN",
        value_name = "TOKEN",
        hide_env_values = true,
        global = true
    )]
    pub github_token: Option<String>,

    /// Override the per-request GitHub timeout.
    #[arg(long = "github-timeout-seconds", value_name = "SECONDS", global = true)]
    pub github_timeout_seconds: Option<u64>,

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

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List articles, newest first.
    Articles(ListArticlesArgs),
    /// Show one article.
    Article(UnitArgs),
    /// List the distinct article tags.
    Tags(LocaleArgs),
    /// List projects with star counts, newest first.
    Projects(ListProjectsArgs),
    /// Show one project.
    Project(UnitArgs),
    /// Show recent pushed commits for a GitHub account.
    Commits(CommitsArgs),
    /// Show the star count for a GitHub repository.
    Stars(StarsArgs),
}

#[derive(Debug, Args, Clone, Default)]
pub struct LocaleArgs {
    /// Content locale (en|fr).
    #[arg(long, default_value = "en", value_parser = parse_locale)]
    pub locale: Locale,
}

#[derive(Debug, Args, Clone)]
pub struct ListArticlesArgs {
    #[command(flatten)]
    pub locale: LocaleArgs,

    /// Only articles carrying this tag (case-insensitive).
    #[arg(long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Only featured articles.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub featured: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ListProjectsArgs {
    #[command(flatten)]
    pub locale: LocaleArgs,

    /// Only featured projects.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub featured: bool,
}

#[derive(Debug, Args, Clone)]
pub struct UnitArgs {
    #[command(flatten)]
    pub locale: LocaleArgs,

    #[arg(value_name = "SLUG")]
    pub slug: String,
}

#[derive(Debug, Args, Clone)]
pub struct CommitsArgs {
    #[arg(value_name = "ACCOUNT")]
    pub account: String,
}

#[derive(Debug, Args, Clone)]
pub struct StarsArgs {
    #[arg(value_name = "OWNER/NAME")]
    pub repo: String,
}

fn parse_locale(value: &str) -> Result<Locale, String> {
    value.parse::<Locale>().map_err(|err| err.to_string())
}
