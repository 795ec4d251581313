//! Repository traits describing content storage adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::types::{ContentKind, Locale};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl RepoError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Locale-scoped store of authored content files.
#[async_trait]
pub trait ContentRepo: Send + Sync {
    /// Identifiers available for `locale`, sorted. A locale without content yields
    /// an empty list rather than an error.
    async fn list_slugs(&self, kind: ContentKind, locale: Locale)
    -> Result<Vec<String>, RepoError>;

    /// Raw source of one unit, or `None` when it does not exist (or no longer does).
    async fn read_source(
        &self,
        kind: ContentKind,
        locale: Locale,
        slug: &str,
    ) -> Result<Option<String>, RepoError>;
}
