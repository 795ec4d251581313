//! Content records produced by the pipeline and handed to the presentation layer.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::types::Locale;

/// Metadata shared by every content unit, resolved from front matter with defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentMeta {
    pub slug: String,
    pub locale: Locale,
    pub title: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub publish_date: OffsetDateTime,
    pub tags: Vec<String>,
    pub featured: bool,
    pub cover: Option<String>,
}

impl ContentMeta {
    /// Case-insensitive exact tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        let needle = tag.trim().to_lowercase();
        self.tags.iter().any(|candidate| candidate.to_lowercase() == needle)
    }
}

/// A fenced code block extracted during rendering. Diagram blocks are left for the
/// presentation layer to mount; their source is never validated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
    pub is_diagram: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleRecord {
    #[serde(flatten)]
    pub meta: ContentMeta,
    pub reading_time: String,
    pub raw_body: String,
    pub rendered_html: String,
    pub code_blocks: Vec<CodeBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRecord {
    #[serde(flatten)]
    pub meta: ContentMeta,
    /// Repository identifier as written by the author; empty when absent.
    pub repo: String,
    pub link: String,
    pub stars: u64,
    pub raw_body: String,
    pub rendered_html: String,
    pub code_blocks: Vec<CodeBlock>,
}

/// One recent commit (or synthesized push summary) for an account's activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitActivity {
    pub repo: String,
    pub message: String,
    pub url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}
