//! Filesystem-backed content store: `<root>/<kind>/<locale>/<slug>.md`.

use std::{
    io::ErrorKind,
    path::PathBuf,
};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::{
    application::repos::{ContentRepo, RepoError},
    domain::types::{ContentKind, Locale},
};

const CONTENT_EXTENSION: &str = "md";

#[derive(Debug, Clone)]
pub struct FsContentRepo {
    root: PathBuf,
}

impl FsContentRepo {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn locale_dir(&self, kind: ContentKind, locale: Locale) -> PathBuf {
        self.root.join(kind.directory()).join(locale.as_str())
    }
}

#[async_trait]
impl ContentRepo for FsContentRepo {
    async fn list_slugs(
        &self,
        kind: ContentKind,
        locale: Locale,
    ) -> Result<Vec<String>, RepoError> {
        let dir = self.locale_dir(kind, locale);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(
                    target = "infra::fs",
                    path = %dir.display(),
                    "Content directory missing; no units for locale"
                );
                return Ok(Vec::new());
            }
            Err(err) => return Err(RepoError::io(dir.display().to_string(), err)),
        };

        let mut slugs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| RepoError::io(dir.display().to_string(), err))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(CONTENT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                slugs.push(stem.to_string());
            }
        }

        slugs.sort();
        Ok(slugs)
    }

    async fn read_source(
        &self,
        kind: ContentKind,
        locale: Locale,
        slug: &str,
    ) -> Result<Option<String>, RepoError> {
        if !is_safe_slug(slug) {
            return Err(RepoError::InvalidInput {
                message: format!("slug `{slug}` is not a plain file stem"),
            });
        }

        let path = self
            .locale_dir(kind, locale)
            .join(format!("{slug}.{CONTENT_EXTENSION}"));

        match fs::read_to_string(&path).await {
            Ok(source) => Ok(Some(source)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(RepoError::io(path.display().to_string(), err)),
        }
    }
}

fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\'])
        && !slug.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, contents).expect("write");
    }

    #[tokio::test]
    async fn lists_markdown_stems_sorted() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "articles/en/zeta.md", "z");
        write(dir.path(), "articles/en/alpha.md", "a");
        write(dir.path(), "articles/en/notes.txt", "ignored");
        write(dir.path(), "articles/fr/bonjour.md", "b");

        let repo = FsContentRepo::new(dir.path());
        let slugs = repo
            .list_slugs(ContentKind::Article, Locale::En)
            .await
            .expect("list");

        assert_eq!(slugs, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn missing_locale_directory_is_empty() {
        let dir = TempDir::new().expect("tempdir");
        let repo = FsContentRepo::new(dir.path());

        let slugs = repo
            .list_slugs(ContentKind::Project, Locale::Fr)
            .await
            .expect("list");
        assert!(slugs.is_empty());
    }

    #[tokio::test]
    async fn read_source_returns_none_for_missing_file() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "projects/en/tool.md", "---\ntitle: Tool\n---\n");
        let repo = FsContentRepo::new(dir.path());

        let found = repo
            .read_source(ContentKind::Project, Locale::En, "tool")
            .await
            .expect("read");
        assert_eq!(found.as_deref(), Some("---\ntitle: Tool\n---\n"));

        let missing = repo
            .read_source(ContentKind::Project, Locale::En, "gone")
            .await
            .expect("read");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn rejects_path_traversal() {
        let dir = TempDir::new().expect("tempdir");
        let repo = FsContentRepo::new(dir.path());

        let err = repo
            .read_source(ContentKind::Article, Locale::En, "../secret")
            .await
            .expect_err("traversal must be rejected");
        assert!(matches!(err, RepoError::InvalidInput { .. }));
    }
}
