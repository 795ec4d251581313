//! Live GitHub metrics attached to content: star counts and recent commit activity.
//!
//! Everything here degrades instead of failing. The network is reached through
//! an injected [`Transport`], and freshness is judged against an injected
//! [`Clock`], so the cache rules can be exercised without either.

mod cache;
mod commits;
mod stars;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use thiserror::Error;
use time::{Duration, OffsetDateTime};

use crate::config::GithubSettings;

pub use cache::{CacheEntry, TtlCache};
pub use commits::CommitStrategy;

use commits::CommitDetail;

pub(crate) const METRIC_STARS_CACHE_HIT: &str = "folio_stars_cache_hit_total";
pub(crate) const METRIC_STARS_CACHE_MISS: &str = "folio_stars_cache_miss_total";
pub(crate) const METRIC_STARS_FALLBACK: &str = "folio_stars_fallback_total";
pub(crate) const METRIC_COMMIT_DETAIL_CACHE_HIT: &str = "folio_commit_detail_cache_hit_total";

const DEFAULT_STARS_TTL: Duration = Duration::hours(1);
const DEFAULT_COMMIT_DETAIL_TTL: Duration = Duration::hours(24);
const DEFAULT_COMMIT_LIMIT: usize = 5;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Raw response handed back by a [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request to `{path}` timed out")]
    Timeout { path: String },
    #[error("request to `{path}` failed: {message}")]
    Request { path: String, message: String },
}

/// GET access to the GitHub REST API. Paths are relative to the API base
/// (`repos/owner/name`). Implementations bound every call with a timeout.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("`{path}` answered with status {status}")]
    Status { path: String, status: u16 },
    #[error("`{path}` returned an undecodable body: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct EnrichmentSettings {
    pub stars_ttl: Duration,
    pub commit_detail_ttl: Duration,
    pub commit_limit: usize,
}

impl From<&GithubSettings> for EnrichmentSettings {
    fn from(settings: &GithubSettings) -> Self {
        Self {
            stars_ttl: to_time_duration(settings.stars_ttl),
            commit_detail_ttl: to_time_duration(settings.commit_detail_ttl),
            commit_limit: settings.commit_limit.get(),
        }
    }
}

fn to_time_duration(duration: std::time::Duration) -> Duration {
    Duration::try_from(duration).unwrap_or(Duration::MAX)
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            stars_ttl: DEFAULT_STARS_TTL,
            commit_detail_ttl: DEFAULT_COMMIT_DETAIL_TTL,
            commit_limit: DEFAULT_COMMIT_LIMIT,
        }
    }
}

/// Enrichment client owning the star-count and commit-detail caches.
///
/// The caches live as long as the client and are never evicted; the number of
/// keys is bounded by the repositories referenced from content.
pub struct GithubEnrichment {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    settings: EnrichmentSettings,
    stars: TtlCache<String, u64>,
    commit_details: TtlCache<String, CommitDetail>,
}

impl GithubEnrichment {
    pub fn new(
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        settings: EnrichmentSettings,
    ) -> Self {
        Self {
            transport,
            clock,
            settings,
            stars: TtlCache::new(),
            commit_details: TtlCache::new(),
        }
    }

    /// Cached star entry for `repo`, if one was ever fetched successfully.
    pub fn cached_stars(&self, repo: &str) -> Option<CacheEntry<u64>> {
        self.stars.entry(repo)
    }

    fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, EnrichmentError> {
        let response = self.transport.get(path).await?;
        if !response.is_success() {
            return Err(EnrichmentError::Status {
                path: path.to_string(),
                status: response.status,
            });
        }

        serde_json::from_slice(&response.body).map_err(|source| EnrichmentError::Decode {
            path: path.to_string(),
            source,
        })
    }
}
