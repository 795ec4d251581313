use metrics::counter;
use serde::Deserialize;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::domain::entities::CommitActivity;

use super::{EnrichmentError, GithubEnrichment, METRIC_COMMIT_DETAIL_CACHE_HIT};

const PUSH_EVENT: &str = "PushEvent";
const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Deserialize)]
struct PushEvent {
    repo: EventRepo,
    #[serde(default)]
    payload: PushPayload,
    #[serde(default, with = "time::serde::rfc3339::option")]
    created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize)]
struct EventRepo {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PushPayload {
    #[serde(rename = "ref")]
    git_ref: Option<String>,
    head: Option<String>,
    commits: Option<Vec<PayloadCommit>>,
}

#[derive(Debug, Deserialize)]
struct PayloadCommit {
    sha: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct CommitDetailResponse {
    html_url: String,
    commit: CommitDetailBody,
}

#[derive(Debug, Deserialize)]
struct CommitDetailBody {
    message: String,
    author: CommitDetailAuthor,
}

#[derive(Debug, Deserialize)]
struct CommitDetailAuthor {
    #[serde(with = "time::serde::rfc3339")]
    date: OffsetDateTime,
}

/// Resolved head commit; immutable once fetched, so it is cached long-term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommitDetail {
    message: String,
    url: String,
    date: OffsetDateTime,
}

impl PushEvent {
    /// Short repository name: the part after `owner/`, or the whole name.
    fn short_repo(&self) -> &str {
        match self.repo.name.split_once('/') {
            Some((_, name)) if !name.is_empty() => name,
            _ => self.repo.name.as_str(),
        }
    }

    fn branch(&self) -> &str {
        match self.payload.git_ref.as_deref().map(str::trim) {
            Some(git_ref) if !git_ref.is_empty() => {
                git_ref.strip_prefix("refs/heads/").unwrap_or(git_ref)
            }
            _ => DEFAULT_BRANCH,
        }
    }

    /// Event time, or `now` when the feed omitted it.
    fn occurred_at(&self, now: OffsetDateTime) -> OffsetDateTime {
        self.created_at.unwrap_or(now)
    }

    fn activity(&self, message: String, url: String, date: OffsetDateTime) -> CommitActivity {
        CommitActivity {
            repo: self.short_repo().to_string(),
            message,
            url,
            date,
        }
    }
}

/// Ways of turning one push event into activity entries, tried in
/// [`CommitStrategy::ORDER`] until one yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStrategy {
    /// Commits embedded in the event payload, newest first.
    EmbeddedCommits,
    /// Detail lookup for the event's head commit.
    HeadCommitLookup,
    /// "Pushed to `<branch>`", built from event metadata alone. Always yields.
    SynthesizedPush,
}

impl CommitStrategy {
    pub const ORDER: [CommitStrategy; 3] = [
        CommitStrategy::EmbeddedCommits,
        CommitStrategy::HeadCommitLookup,
        CommitStrategy::SynthesizedPush,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CommitStrategy::EmbeddedCommits => "embedded_commits",
            CommitStrategy::HeadCommitLookup => "head_commit_lookup",
            CommitStrategy::SynthesizedPush => "synthesized_push",
        }
    }

    async fn resolve(
        self,
        client: &GithubEnrichment,
        event: &PushEvent,
        quota: usize,
    ) -> Option<Vec<CommitActivity>> {
        match self {
            CommitStrategy::EmbeddedCommits => {
                let commits = event.payload.commits.as_ref().filter(|c| !c.is_empty())?;
                let occurred_at = event.occurred_at(client.now());
                // Payloads list commits oldest first.
                let entries = commits
                    .iter()
                    .rev()
                    .take(quota)
                    .map(|commit| {
                        event.activity(
                            commit.message.clone(),
                            format!(
                                "https://github.com/{}/commit/{}",
                                event.repo.name, commit.sha
                            ),
                            occurred_at,
                        )
                    })
                    .collect();
                Some(entries)
            }
            CommitStrategy::HeadCommitLookup => {
                let head = event.payload.head.as_deref().filter(|h| !h.is_empty())?;
                match client.commit_detail(&event.repo.name, head).await {
                    Ok(detail) => Some(vec![event.activity(
                        detail.message,
                        detail.url,
                        detail.date,
                    )]),
                    Err(err) => {
                        warn!(
                            target = "application::enrichment::commits",
                            repo = event.repo.name.as_str(),
                            head,
                            error = %err,
                            "Head commit lookup failed; synthesizing push entry"
                        );
                        None
                    }
                }
            }
            CommitStrategy::SynthesizedPush => {
                let branch = event.branch();
                Some(vec![event.activity(
                    format!("Pushed to {branch}"),
                    format!("https://github.com/{}/tree/{branch}", event.repo.name),
                    event.occurred_at(client.now()),
                )])
            }
        }
    }
}

impl GithubEnrichment {
    /// Most recent pushed commits for `account`, newest first, capped at the
    /// configured limit. Any failure of the event feed itself yields an empty list.
    pub async fn recent_commits(&self, account: &str) -> Vec<CommitActivity> {
        let account = account.trim();
        if account.is_empty() || account.contains('/') {
            debug!(
                target = "application::enrichment::commits",
                account, "Skipping commit lookup for malformed account"
            );
            return Vec::new();
        }

        let events = match self.push_events(account).await {
            Ok(events) => events,
            Err(err) => {
                warn!(
                    target = "application::enrichment::commits",
                    account,
                    error = %err,
                    "Failed to fetch account events"
                );
                return Vec::new();
            }
        };

        let limit = self.settings.commit_limit;
        let mut activity = Vec::with_capacity(limit);
        for event in &events {
            let quota = limit.saturating_sub(activity.len());
            if quota == 0 {
                break;
            }

            for strategy in CommitStrategy::ORDER {
                if let Some(entries) = strategy.resolve(self, event, quota).await {
                    debug!(
                        target = "application::enrichment::commits",
                        repo = event.repo.name.as_str(),
                        strategy = strategy.as_str(),
                        entries = entries.len(),
                        "Resolved push event"
                    );
                    activity.extend(entries.into_iter().take(quota));
                    break;
                }
            }
        }

        activity
    }

    async fn push_events(&self, account: &str) -> Result<Vec<PushEvent>, EnrichmentError> {
        let path = format!("users/{account}/events");
        let events: Vec<Value> = self.get_json(&path).await?;

        Ok(events
            .into_iter()
            .filter(|event| event.get("type").and_then(Value::as_str) == Some(PUSH_EVENT))
            .filter_map(|event| {
                serde_json::from_value::<PushEvent>(event)
                    .map_err(|err| {
                        debug!(
                            target = "application::enrichment::commits",
                            error = %err,
                            "Skipping undecodable push event"
                        );
                    })
                    .ok()
            })
            .collect())
    }

    async fn commit_detail(&self, repo: &str, sha: &str) -> Result<CommitDetail, EnrichmentError> {
        let key = format!("{repo}@{sha}");
        if let Some(detail) =
            self.commit_details
                .fresh(key.as_str(), self.now(), self.settings.commit_detail_ttl)
        {
            counter!(METRIC_COMMIT_DETAIL_CACHE_HIT).increment(1);
            return Ok(detail);
        }

        let path = format!("repos/{repo}/commits/{sha}");
        let response: CommitDetailResponse = self.get_json(&path).await?;
        let detail = CommitDetail {
            message: response.commit.message,
            url: response.html_url,
            date: response.commit.author.date,
        };

        self.commit_details.store(key, detail.clone(), self.now());
        Ok(detail)
    }
}
