use thiserror::Error;
use tracing::warn;

use crate::domain::entities::CodeBlock;

/// Rendering request passed into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Slug of the unit being rendered, used to attribute log lines.
    pub slug: String,
    /// Markdown body with the front matter already removed.
    pub markdown: String,
}

impl RenderRequest {
    pub fn new(slug: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            markdown: markdown.into(),
        }
    }
}

/// Deterministic rendering result returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    /// HTML fragment ready for embedding.
    pub html: String,
    /// Every fenced or indented code block, in document order. Diagram sources
    /// are flagged with `is_diagram`.
    pub code_blocks: Vec<CodeBlock>,
}

impl RenderOutput {
    /// Output used when the document could not be rendered at all: the markdown is
    /// shown as escaped literal text.
    pub fn literal(markdown: &str) -> Self {
        Self {
            html: format!("<p>{}</p>\n", ammonia::clean_text(markdown)),
            code_blocks: Vec::new(),
        }
    }
}

/// Structured errors surfaced by the rendering pipeline.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("markdown serialisation failed: {message}")]
    Markdown { message: String },
    #[error("syntax highlighting failed: {language}: {message}")]
    Highlighting { language: String, message: String },
}

/// Trait exposed by the rendering pipeline. Implementations must be pure and
/// deterministic: given the same input, they return identical outputs or errors.
pub trait RenderService: Send + Sync {
    fn render(&self, request: &RenderRequest) -> Result<RenderOutput, RenderError>;

    /// Render without surfacing errors; a failed document degrades to literal text.
    fn render_lossy(&self, request: &RenderRequest) -> RenderOutput {
        match self.render(request) {
            Ok(output) => output,
            Err(err) => {
                warn!(
                    target = "application::render",
                    slug = request.slug.as_str(),
                    error = %err,
                    "Rendering failed; falling back to literal text"
                );
                RenderOutput::literal(&request.markdown)
            }
        }
    }
}
