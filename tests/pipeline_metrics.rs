use std::{collections::HashMap, num::NonZeroUsize, path::Path, sync::Arc, time::Duration};

use folio::{
    application::{
        catalog::Catalog,
        enrichment::{EnrichmentSettings, GithubEnrichment, SystemClock},
        render::render_service,
    },
    config::GithubSettings,
    domain::types::Locale,
    infra::{fs::FsContentRepo, github::ReqwestTransport},
};
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use serde_json::json;
use tempfile::TempDir;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn enrichment(server: &MockServer, stars_ttl: Duration) -> Arc<GithubEnrichment> {
    let settings = GithubSettings {
        api_base: Url::parse(&server.uri()).expect("mock url"),
        token: None,
        timeout: Duration::from_secs(2),
        stars_ttl,
        commit_detail_ttl: Duration::from_secs(86_400),
        commit_limit: NonZeroUsize::new(5).expect("non-zero"),
    };
    let transport = ReqwestTransport::new(&settings).expect("transport");
    Arc::new(GithubEnrichment::new(
        Arc::new(transport),
        Arc::new(SystemClock),
        EnrichmentSettings::from(&settings),
    ))
}

fn catalog(root: &Path, enrichment: Arc<GithubEnrichment>) -> Catalog {
    Catalog::new(
        Arc::new(FsContentRepo::new(root)),
        render_service(),
        enrichment,
        Arc::new(SystemClock),
    )
}

#[tokio::test]
async fn pipeline_counters_track_cache_and_fallback_paths() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/steady"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "stargazers_count": 3 })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "stargazers_count": 8 })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/flaky"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/octo/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "type": "PushEvent",
            "repo": { "name": "octo/site" },
            "created_at": "2025-04-30T12:00:00Z",
            "payload": { "ref": "refs/heads/main", "head": "abc123" }
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/site/commits/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "html_url": "https://github.com/octo/site/commit/abc123",
            "commit": {
                "message": "Publish",
                "author": { "date": "2025-04-30T11:59:00Z" }
            }
        })))
        .mount(&server)
        .await;

    // One miss, then one hit.
    let cached = enrichment(&server, Duration::from_secs(3600));
    assert_eq!(cached.stars("octo/steady").await, 3);
    assert_eq!(cached.stars("octo/steady").await, 3);

    // A zero TTL forces a refresh; the second refresh fails and serves the stale count.
    let expiring = enrichment(&server, Duration::ZERO);
    assert_eq!(expiring.stars("octo/flaky").await, 8);
    assert_eq!(expiring.stars("octo/flaky").await, 8);

    assert_eq!(cached.recent_commits("octo").await.len(), 1);
    assert_eq!(cached.recent_commits("octo").await.len(), 1);

    let dir = TempDir::new().expect("tempdir");
    let catalog = catalog(dir.path(), cached.clone());
    assert!(catalog.article("vanished", Locale::En).await.is_none());

    let counters: HashMap<String, u64> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter_map(|(composite_key, _, _, value)| match value {
            DebugValue::Counter(count) => Some((composite_key.key().name().to_string(), count)),
            _ => None,
        })
        .collect();

    assert_eq!(counters.get("folio_stars_cache_miss_total"), Some(&3));
    assert_eq!(counters.get("folio_stars_cache_hit_total"), Some(&1));
    assert_eq!(counters.get("folio_stars_fallback_total"), Some(&1));
    assert_eq!(counters.get("folio_commit_detail_cache_hit_total"), Some(&1));
    assert_eq!(counters.get("folio_units_dropped_total"), Some(&1));
}
