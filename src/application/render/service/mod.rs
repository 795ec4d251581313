mod config;
mod highlight;
mod rewrite;

use std::sync::Arc;

use comrak::{Arena, format_html, nodes::AstNode, parse_document};
use once_cell::sync::Lazy;
use syntect::{html::ClassStyle, parsing::SyntaxSet};

use crate::application::render::types::{
    RenderError, RenderOutput, RenderRequest, RenderService,
};

use config::default_options;
use rewrite::rewrite_ast;

/// Default Comrak-based rendering pipeline with Syntect highlighting.
pub struct ComrakRenderService {
    options: comrak::Options<'static>,
    syntax_set: SyntaxSet,
    class_style: ClassStyle,
}

impl ComrakRenderService {
    /// Construct a new renderer with GFM extensions enabled, raw HTML passthrough,
    /// and syntax highlighting configured to emit `hljs-` prefixed CSS classes.
    fn new() -> Self {
        Self {
            options: default_options(),
            syntax_set: SyntaxSet::load_defaults_newlines(),
            class_style: ClassStyle::SpacedPrefixed { prefix: "hljs-" },
        }
    }
}

static RENDER_SERVICE: Lazy<Arc<ComrakRenderService>> =
    Lazy::new(|| Arc::new(ComrakRenderService::new()));

/// Access the shared render service instance, initialised on first use.
pub fn render_service() -> Arc<ComrakRenderService> {
    Arc::clone(&RENDER_SERVICE)
}

impl Default for ComrakRenderService {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderService for ComrakRenderService {
    fn render(&self, request: &RenderRequest) -> Result<RenderOutput, RenderError> {
        let arena = Arena::new();
        let root = parse_document(&arena, &request.markdown, &self.options);

        let rewrite_outcome = rewrite_stage(
            root,
            &self.syntax_set,
            &self.class_style,
            request.slug.as_str(),
        );

        let html = render_html_stage(root, &self.options)?;

        Ok(RenderOutput {
            html,
            code_blocks: rewrite_outcome.code_blocks,
        })
    }
}

fn rewrite_stage<'a>(
    root: &'a AstNode<'a>,
    syntax_set: &SyntaxSet,
    class_style: &ClassStyle,
    slug: &str,
) -> rewrite::RewriteOutcome {
    rewrite_ast(root, syntax_set, class_style, slug)
}

fn render_html_stage<'a>(
    root: &'a AstNode<'a>,
    options: &comrak::Options<'static>,
) -> Result<String, RenderError> {
    let mut html = String::new();
    format_html(root, options, &mut html).map_err(|err| RenderError::Markdown {
        message: err.to_string(),
    })?;
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(markdown: &str) -> RenderOutput {
        render_service()
            .render(&RenderRequest::new("service-test", markdown))
            .expect("render")
    }

    #[test]
    fn identical_input_renders_identically() {
        let markdown = "# Notes\n\n- [x] done\n- [ ] todo\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n```python\nprint('hi')\n```\n\nText with a footnote[^1].\n\n[^1]: The note.\n";

        let first = render(markdown);
        let second = ComrakRenderService::new()
            .render(&RenderRequest::new("other-slug", markdown))
            .expect("render");

        assert_eq!(first.html, second.html);
        assert_eq!(first.code_blocks, second.code_blocks);
    }

    #[test]
    fn embedded_html_and_code_survive_together() {
        let output = render("<aside>trusted</aside>\n\n~~old~~ new\n\n```sh\necho hi\n```\n");

        assert!(output.html.contains("<aside>trusted</aside>"));
        assert!(output.html.contains("<del>old</del>"));
        assert!(output.html.contains("language-sh"));
        assert_eq!(output.code_blocks.len(), 1);
        assert!(!output.code_blocks[0].is_diagram);
    }

    #[test]
    fn unbalanced_inline_markup_is_kept_as_text() {
        let output = render("a *dangling emphasis and `open code\n");

        assert!(output.html.contains("*dangling emphasis"));
        assert!(output.html.contains("`open code"));
    }

    #[test]
    fn literal_fallback_escapes_markdown() {
        let output = RenderOutput::literal("<b>x</b> & y");
        assert!(output.html.starts_with("<p>"));
        assert!(output.html.contains("&lt;b&gt;x"));
        assert!(!output.html.contains("<b>"));
        assert!(output.code_blocks.is_empty());
    }
}
