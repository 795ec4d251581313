use super::*;

use crate::domain::types::Locale;

#[test]
fn defaults_are_valid() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.content.root, PathBuf::from("content"));
    assert_eq!(settings.content.load_concurrency.get(), 8);
    assert_eq!(settings.github.api_base.as_str(), "https://api.github.com/");
    assert_eq!(settings.github.token, None);
    assert_eq!(settings.github.timeout, Duration::from_secs(10));
    assert_eq!(settings.github.stars_ttl, Duration::from_secs(3600));
    assert_eq!(settings.github.commit_detail_ttl, Duration::from_secs(86_400));
    assert_eq!(settings.github.commit_limit.get(), 5);
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.content.root = Some(PathBuf::from("from-file"));
    raw.logging.level = Some("info".to_string());

    let overrides = GlobalOverrides {
        content_root: Some(PathBuf::from("from-cli")),
        log_level: Some("debug".to_string()),
        log_json: Some(true),
        github_token: Some("  secret  ".to_string()),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.content.root, PathBuf::from("from-cli"));
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert!(matches!(settings.logging.format, LogFormat::Json));
    assert_eq!(settings.github.token.as_deref(), Some("secret"));
}

#[test]
fn blank_token_is_treated_as_absent() {
    let mut raw = RawSettings::default();
    raw.github.token = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.github.token, None);
}

#[test]
fn zero_values_are_rejected() {
    let mut raw = RawSettings::default();
    raw.github.commit_limit = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero limit must fail");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "github.commit_limit",
            ..
        }
    ));

    let mut raw = RawSettings::default();
    raw.github.stars_ttl_seconds = Some(0);
    assert!(Settings::from_raw(raw).is_err());

    let mut raw = RawSettings::default();
    raw.content.load_concurrency = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn invalid_api_base_is_rejected() {
    let mut raw = RawSettings::default();
    raw.github.api_base = Some("not a url".to_string());
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "github.api_base",
            ..
        })
    ));

    let mut raw = RawSettings::default();
    raw.github.api_base = Some("ftp://example.com".to_string());
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn invalid_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "logging.level",
            ..
        })
    ));
}

#[test]
fn parses_subcommands_with_locale() {
    let args = CliArgs::try_parse_from([
        "folio",
        "--content-root",
        "site",
        "articles",
        "--locale",
        "fr",
        "--tag",
        "Rust",
    ])
    .expect("parse");

    assert_eq!(args.overrides.content_root, Some(PathBuf::from("site")));
    match args.command {
        Command::Articles(list) => {
            assert_eq!(list.locale.locale, Locale::Fr);
            assert_eq!(list.tag.as_deref(), Some("Rust"));
            assert!(!list.featured);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn unknown_locale_is_rejected_by_cli() {
    let result = CliArgs::try_parse_from(["folio", "article", "hello", "--locale", "de"]);
    assert!(result.is_err());
}

#[test]
fn locale_defaults_to_english() {
    let args = CliArgs::try_parse_from(["folio", "project", "tool"]).expect("parse");
    match args.command {
        Command::Project(unit) => {
            assert_eq!(unit.slug, "tool");
            assert_eq!(unit.locale.locale, Locale::En);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}
