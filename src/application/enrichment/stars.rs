use metrics::counter;
use serde::Deserialize;
use tracing::warn;

use crate::domain::types::RepositoryId;

use super::{
    EnrichmentError, GithubEnrichment, METRIC_STARS_CACHE_HIT, METRIC_STARS_CACHE_MISS,
    METRIC_STARS_FALLBACK,
};

#[derive(Debug, Deserialize)]
struct RepositoryMetadata {
    #[serde(default)]
    stargazers_count: u64,
}

impl GithubEnrichment {
    /// Star count for `repo` (`owner/name`).
    ///
    /// Fresh cache entries are served without a request. A failed refresh serves
    /// the last known value, or 0 when the repository was never fetched.
    pub async fn stars(&self, repo: &str) -> u64 {
        let repo = match RepositoryId::parse(repo) {
            Ok(repo) => repo,
            Err(err) => {
                warn!(
                    target = "application::enrichment::stars",
                    repo,
                    error = %err,
                    "Skipping star lookup for malformed repository"
                );
                return 0;
            }
        };
        let key = repo.to_string();

        if let Some(stars) = self
            .stars
            .fresh(key.as_str(), self.now(), self.settings.stars_ttl)
        {
            counter!(METRIC_STARS_CACHE_HIT).increment(1);
            return stars;
        }
        counter!(METRIC_STARS_CACHE_MISS).increment(1);

        match self.fetch_stars(&repo).await {
            Ok(stars) => {
                self.stars.store(key, stars, self.now());
                stars
            }
            Err(err) => {
                counter!(METRIC_STARS_FALLBACK).increment(1);
                let stale = self.stars.latest(key.as_str());
                warn!(
                    target = "application::enrichment::stars",
                    repo = key.as_str(),
                    error = %err,
                    stale = stale.is_some(),
                    "Failed to refresh star count; serving fallback"
                );
                stale.unwrap_or(0)
            }
        }
    }

    async fn fetch_stars(&self, repo: &RepositoryId) -> Result<u64, EnrichmentError> {
        let path = format!("repos/{repo}");
        let metadata: RepositoryMetadata = self.get_json(&path).await?;
        Ok(metadata.stargazers_count)
    }
}
