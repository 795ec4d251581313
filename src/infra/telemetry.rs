use std::{io, sync::Once};

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Logs go to stderr; stdout carries the command output.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .with_writer(io::stderr)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .with_writer(io::stderr)
            .compact()
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "folio_stars_cache_hit_total",
            Unit::Count,
            "Star-count lookups answered from a fresh cache entry."
        );
        describe_counter!(
            "folio_stars_cache_miss_total",
            Unit::Count,
            "Star-count lookups that required a request to GitHub."
        );
        describe_counter!(
            "folio_stars_fallback_total",
            Unit::Count,
            "Star-count refreshes that failed and served a stale value or zero."
        );
        describe_counter!(
            "folio_commit_detail_cache_hit_total",
            Unit::Count,
            "Head-commit detail lookups answered from cache."
        );
        describe_counter!(
            "folio_units_dropped_total",
            Unit::Count,
            "Content units enumerated but missing or unreadable at load time."
        );
    });
}
