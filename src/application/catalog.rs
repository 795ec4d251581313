//! Locale-scoped article and project listings.
//!
//! Every public operation returns a usable value: storage, rendering and
//! enrichment failures are logged and degrade to empty or default results.

use std::{collections::BTreeSet, sync::Arc};

use futures::{StreamExt, future, stream};
use metrics::counter;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::{
    application::{
        enrichment::{Clock, GithubEnrichment},
        frontmatter::{self, Extracted},
        reading_time::reading_time,
        render::{RenderRequest, RenderService},
        repos::ContentRepo,
    },
    domain::{
        entities::{ArticleRecord, ContentMeta, ProjectRecord},
        types::{ContentKind, Locale, RepositoryId},
    },
};

const METRIC_UNITS_DROPPED: &str = "folio_units_dropped_total";
const DEFAULT_LOAD_CONCURRENCY: usize = 8;
const BROKEN_LINK: &str = "#";

pub struct Catalog {
    repo: Arc<dyn ContentRepo>,
    renderer: Arc<dyn RenderService>,
    enrichment: Arc<GithubEnrichment>,
    clock: Arc<dyn Clock>,
    load_concurrency: usize,
}

impl Catalog {
    pub fn new(
        repo: Arc<dyn ContentRepo>,
        renderer: Arc<dyn RenderService>,
        enrichment: Arc<GithubEnrichment>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            renderer,
            enrichment,
            clock,
            load_concurrency: DEFAULT_LOAD_CONCURRENCY,
        }
    }

    pub fn with_load_concurrency(mut self, load_concurrency: usize) -> Self {
        self.load_concurrency = load_concurrency.max(1);
        self
    }

    pub fn enrichment(&self) -> &GithubEnrichment {
        &self.enrichment
    }

    /// All articles for `locale`, newest first.
    pub async fn articles(&self, locale: Locale) -> Vec<ArticleRecord> {
        let slugs = self.slugs(ContentKind::Article, locale).await;
        let mut articles: Vec<ArticleRecord> = stream::iter(slugs)
            .map(|slug| async move { self.article(&slug, locale).await })
            .buffered(self.load_concurrency)
            .filter_map(future::ready)
            .collect()
            .await;

        sort_newest_first(&mut articles, |article| article.meta.publish_date);
        articles
    }

    pub async fn article(&self, slug: &str, locale: Locale) -> Option<ArticleRecord> {
        let source = self.source(ContentKind::Article, locale, slug).await?;
        let Extracted {
            front_matter, body, ..
        } = frontmatter::extract(&source, self.clock.now());

        let rendered = self
            .renderer
            .render_lossy(&RenderRequest::new(slug, body.as_str()));

        let meta = ContentMeta {
            slug: slug.to_string(),
            locale,
            title: front_matter.title,
            description: front_matter.description,
            publish_date: front_matter.date,
            tags: front_matter.tags,
            featured: front_matter.featured,
            cover: front_matter.cover,
        };

        Some(ArticleRecord {
            meta,
            reading_time: reading_time(&body, locale),
            raw_body: body,
            rendered_html: rendered.html,
            code_blocks: rendered.code_blocks,
        })
    }

    pub async fn featured_articles(&self, locale: Locale) -> Vec<ArticleRecord> {
        self.articles(locale)
            .await
            .into_iter()
            .filter(|article| article.meta.featured)
            .collect()
    }

    /// Articles carrying `tag`, compared case-insensitively.
    pub async fn articles_by_tag(&self, tag: &str, locale: Locale) -> Vec<ArticleRecord> {
        self.articles(locale)
            .await
            .into_iter()
            .filter(|article| article.meta.has_tag(tag))
            .collect()
    }

    /// Distinct article tags for `locale`, lowercased and sorted.
    pub async fn article_tags(&self, locale: Locale) -> Vec<String> {
        let articles = self.articles(locale).await;
        tag_universe(articles.iter().map(|article| &article.meta))
    }

    /// All projects for `locale` with live star counts, newest first.
    pub async fn projects(&self, locale: Locale) -> Vec<ProjectRecord> {
        let slugs = self.slugs(ContentKind::Project, locale).await;
        let mut projects: Vec<ProjectRecord> = stream::iter(slugs)
            .map(|slug| async move { self.project(&slug, locale).await })
            .buffered(self.load_concurrency)
            .filter_map(future::ready)
            .collect()
            .await;

        sort_newest_first(&mut projects, |project| project.meta.publish_date);
        projects
    }

    pub async fn project(&self, slug: &str, locale: Locale) -> Option<ProjectRecord> {
        let source = self.source(ContentKind::Project, locale, slug).await?;
        let Extracted {
            front_matter, body, ..
        } = frontmatter::extract(&source, self.clock.now());

        let rendered = self
            .renderer
            .render_lossy(&RenderRequest::new(slug, body.as_str()));

        let repo = front_matter.repo.unwrap_or_default();
        let repository = (!repo.is_empty())
            .then(|| RepositoryId::parse(&repo))
            .and_then(|parsed| {
                parsed
                    .map_err(|err| {
                        warn!(
                            target = "application::catalog",
                            slug,
                            locale = locale.as_str(),
                            error = %err,
                            "Project repository is malformed; showing zero stars"
                        );
                    })
                    .ok()
            });

        let stars = match &repository {
            Some(repository) => self.enrichment.stars(&repository.to_string()).await,
            None => 0,
        };
        let link = front_matter.link.unwrap_or_else(|| {
            repository
                .as_ref()
                .map(RepositoryId::html_url)
                .unwrap_or_else(|| BROKEN_LINK.to_string())
        });

        let meta = ContentMeta {
            slug: slug.to_string(),
            locale,
            title: front_matter.title,
            description: front_matter.description,
            publish_date: front_matter.date,
            tags: front_matter.tags,
            featured: front_matter.featured,
            cover: front_matter.cover,
        };

        Some(ProjectRecord {
            meta,
            repo,
            link,
            stars,
            raw_body: body,
            rendered_html: rendered.html,
            code_blocks: rendered.code_blocks,
        })
    }

    pub async fn featured_projects(&self, locale: Locale) -> Vec<ProjectRecord> {
        self.projects(locale)
            .await
            .into_iter()
            .filter(|project| project.meta.featured)
            .collect()
    }

    async fn slugs(&self, kind: ContentKind, locale: Locale) -> Vec<String> {
        match self.repo.list_slugs(kind, locale).await {
            Ok(slugs) => slugs,
            Err(err) => {
                warn!(
                    target = "application::catalog",
                    kind = kind.as_str(),
                    locale = locale.as_str(),
                    error = %err,
                    "Failed to enumerate content; listing is empty"
                );
                Vec::new()
            }
        }
    }

    async fn source(&self, kind: ContentKind, locale: Locale, slug: &str) -> Option<String> {
        match self.repo.read_source(kind, locale, slug).await {
            Ok(Some(source)) => Some(source),
            Ok(None) => {
                debug!(
                    target = "application::catalog",
                    kind = kind.as_str(),
                    locale = locale.as_str(),
                    slug,
                    "Content unit not found"
                );
                counter!(METRIC_UNITS_DROPPED).increment(1);
                None
            }
            Err(err) => {
                warn!(
                    target = "application::catalog",
                    kind = kind.as_str(),
                    locale = locale.as_str(),
                    slug,
                    error = %err,
                    "Content unit unreadable; skipping"
                );
                counter!(METRIC_UNITS_DROPPED).increment(1);
                None
            }
        }
    }
}

/// Stable sort by date, newest first; equal dates keep enumeration order.
fn sort_newest_first<T>(units: &mut [T], date: impl Fn(&T) -> OffsetDateTime) {
    units.sort_by(|a, b| date(b).cmp(&date(a)));
}

fn tag_universe<'a>(metas: impl Iterator<Item = &'a ContentMeta>) -> Vec<String> {
    metas
        .flat_map(|meta| meta.tags.iter())
        .map(|tag| tag.to_lowercase())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
