use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};
use syntect::html::ClassStyle;
use syntect::parsing::SyntaxSet;
use tracing::warn;

use crate::domain::entities::CodeBlock;

use super::highlight::{self, PLAIN_TEXT_TOKEN, ResolvedLanguage};

const DIAGRAM_LANGUAGES: [&str; 1] = ["mermaid"];

#[derive(Debug, Default)]
pub(crate) struct RewriteOutcome {
    pub(crate) code_blocks: Vec<CodeBlock>,
}

/// Replace every code block in the tree with its final HTML. Highlighting
/// failures degrade the offending block to an escaped plain block.
pub(crate) fn rewrite_ast<'a>(
    root: &'a AstNode<'a>,
    syntax_set: &SyntaxSet,
    class_style: &ClassStyle,
    slug: &str,
) -> RewriteOutcome {
    let mut walker = RewriteWalker::new(syntax_set, class_style, slug);
    walker.visit_nodes(root);
    walker.outcome
}

struct RewriteWalker<'a> {
    syntax_set: &'a SyntaxSet,
    class_style: &'a ClassStyle,
    outcome: RewriteOutcome,
    slug: &'a str,
}

impl<'a> RewriteWalker<'a> {
    fn new(syntax_set: &'a SyntaxSet, class_style: &'a ClassStyle, slug: &'a str) -> Self {
        Self {
            syntax_set,
            class_style,
            outcome: RewriteOutcome::default(),
            slug,
        }
    }

    fn visit_nodes(&mut self, node: &AstNode<'_>) {
        if let Some((info, literal)) = extract_code_block(node) {
            let mut segments = info.split_whitespace();
            let language_owned = segments.next().map(|s| s.to_string());
            let meta_string = segments.collect::<Vec<_>>().join(" ");
            let language_ref = language_owned.as_deref();

            let html = if is_diagram_language(language_ref) {
                self.diagram_block(&literal)
            } else {
                let meta_ref = (!meta_string.is_empty()).then_some(meta_string.as_str());
                self.code_block(language_ref, meta_ref, &literal)
            };

            let mut data = node.data.borrow_mut();
            data.value = NodeValue::HtmlBlock(NodeHtmlBlock {
                block_type: 0,
                literal: html,
            });
        }

        let mut child = node.first_child();
        while let Some(next) = child {
            self.visit_nodes(next);
            child = next.next_sibling();
        }
    }

    fn code_block(&mut self, language: Option<&str>, meta: Option<&str>, literal: &str) -> String {
        let resolved = highlight::resolve_language(language, literal, self.syntax_set);
        let html = highlight::highlight_code(
            &resolved,
            meta,
            literal,
            self.syntax_set,
            self.class_style,
        )
        .unwrap_or_else(|err| {
            warn!(
                target = "application::render::highlight",
                slug = self.slug,
                error = %err,
                "Syntax highlighting failed; falling back to plain code block"
            );
            build_plain_code_block(&resolved, literal)
        });

        self.outcome.code_blocks.push(CodeBlock {
            language: resolved.token,
            code: literal.to_string(),
            is_diagram: false,
        });
        html
    }

    /// Diagram sources are emitted verbatim (escaped) for the presentation layer
    /// to mount; nothing here validates them.
    fn diagram_block(&mut self, literal: &str) -> String {
        self.outcome.code_blocks.push(CodeBlock {
            language: "mermaid".to_string(),
            code: literal.to_string(),
            is_diagram: true,
        });

        format!(
            "<pre class=\"mermaid-source\" data-role=\"diagram-mermaid\"><code class=\"language-mermaid\">{}</code></pre>\n",
            ammonia::clean_text(literal)
        )
    }
}

fn is_diagram_language(language: Option<&str>) -> bool {
    language.is_some_and(|lang| {
        DIAGRAM_LANGUAGES
            .iter()
            .any(|candidate| lang.eq_ignore_ascii_case(candidate))
    })
}

fn build_plain_code_block(language: &ResolvedLanguage<'_>, literal: &str) -> String {
    let token = if language.token.is_empty() {
        PLAIN_TEXT_TOKEN
    } else {
        language.token.as_str()
    };
    let escaped_code = ammonia::clean_text(literal);
    let mut html = String::from("<pre class=\"hljs-highlight\" data-language=\"");
    html.push_str(&ammonia::clean_text(token));
    html.push_str("\"><code class=\"hljs language-");
    html.push_str(&ammonia::clean_text(token));
    html.push_str("\">");
    html.push_str(&escaped_code);
    if !literal.ends_with('\n') {
        html.push('\n');
    }
    html.push_str("</code></pre>\n");
    html
}

fn extract_code_block(node: &AstNode<'_>) -> Option<(String, String)> {
    let data = node.data.borrow();
    if let NodeValue::CodeBlock(block) = &data.value {
        let info = block.info.trim().to_string();
        let literal = block.literal.clone();
        Some((info, literal))
    } else {
        None
    }
}
