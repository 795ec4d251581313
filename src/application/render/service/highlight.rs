use syntect::{
    html::{ClassStyle, ClassedHTMLGenerator},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

use crate::application::render::types::RenderError;

pub(crate) const PLAIN_TEXT_TOKEN: &str = "plaintext";

/// Language chosen for a code block along with the grammar used to highlight it.
pub(crate) struct ResolvedLanguage<'a> {
    pub(crate) token: String,
    pub(crate) syntax: &'a SyntaxReference,
}

/// Resolve the declared fence language, or detect one from the code's first line.
/// Unknown declared languages keep their token but highlight as plain text.
pub(crate) fn resolve_language<'a>(
    declared: Option<&str>,
    code: &str,
    syntax_set: &'a SyntaxSet,
) -> ResolvedLanguage<'a> {
    if let Some(token) = declared.map(str::to_ascii_lowercase) {
        let syntax =
            find_syntax(syntax_set, &token).unwrap_or_else(|| syntax_set.find_syntax_plain_text());
        return ResolvedLanguage { token, syntax };
    }

    match syntax_set.find_syntax_by_first_line(code) {
        Some(syntax) => ResolvedLanguage {
            token: syntax_token(syntax),
            syntax,
        },
        None => ResolvedLanguage {
            token: PLAIN_TEXT_TOKEN.to_string(),
            syntax: syntax_set.find_syntax_plain_text(),
        },
    }
}

pub(crate) fn highlight_code(
    language: &ResolvedLanguage<'_>,
    meta: Option<&str>,
    code: &str,
    syntax_set: &SyntaxSet,
    class_style: &ClassStyle,
) -> Result<String, RenderError> {
    let mut code_with_newline = code.to_string();
    if !code_with_newline.ends_with('\n') {
        code_with_newline.push('\n');
    }

    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(language.syntax, syntax_set, *class_style);

    for line in LinesWithEndings::from(code_with_newline.as_str()) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .map_err(|err| RenderError::Highlighting {
                language: language.token.clone(),
                message: err.to_string(),
            })?;
    }

    let highlighted = generator.finalize();
    let token = ammonia::clean_text(&language.token);

    let meta_attr = meta
        .filter(|m| !m.is_empty())
        .map(|m| format!(" data-meta=\"{}\"", ammonia::clean_text(m)))
        .unwrap_or_default();

    Ok(format!(
        "<pre class=\"hljs-highlight\" data-language=\"{token}\"><code class=\"hljs language-{token}\"{meta_attr}>{highlighted}</code></pre>\n"
    ))
}

fn find_syntax<'a>(syntax_set: &'a SyntaxSet, token: &str) -> Option<&'a SyntaxReference> {
    syntax_set
        .find_syntax_by_token(token)
        .or_else(|| syntax_set.find_syntax_by_name(token))
        .or_else(|| syntax_set.find_syntax_by_extension(token))
}

fn syntax_token(syntax: &SyntaxReference) -> String {
    syntax
        .file_extensions
        .first()
        .cloned()
        .unwrap_or_else(|| syntax.name.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syntax_and_style() -> (SyntaxSet, ClassStyle) {
        (
            SyntaxSet::load_defaults_newlines(),
            ClassStyle::SpacedPrefixed { prefix: "hljs-" },
        )
    }

    #[test]
    fn declared_language_is_lowercased() {
        let (syntax_set, _) = syntax_and_style();
        let resolved = resolve_language(Some("Rust"), "fn main() {}", &syntax_set);
        assert_eq!(resolved.token, "rust");
        assert_eq!(resolved.syntax.name, "Rust");
    }

    #[test]
    fn unknown_declared_language_highlights_as_plain_text() {
        let (syntax_set, _) = syntax_and_style();
        let resolved = resolve_language(Some("nosuchlang"), "x", &syntax_set);
        assert_eq!(resolved.token, "nosuchlang");
        assert_eq!(resolved.syntax.name, "Plain Text");
    }

    #[test]
    fn detects_language_from_shebang() {
        let (syntax_set, _) = syntax_and_style();
        let resolved = resolve_language(None, "#!/usr/bin/env python\nprint(1)\n", &syntax_set);
        assert_eq!(resolved.token, "py");
    }

    #[test]
    fn undetectable_code_is_plaintext() {
        let (syntax_set, _) = syntax_and_style();
        let resolved = resolve_language(None, "just words", &syntax_set);
        assert_eq!(resolved.token, PLAIN_TEXT_TOKEN);
    }

    #[test]
    fn highlighted_block_carries_language_classes() {
        let (syntax_set, class_style) = syntax_and_style();
        let resolved = resolve_language(Some("rust"), "let x = 1;", &syntax_set);
        let html = highlight_code(&resolved, None, "let x = 1;", &syntax_set, &class_style)
            .expect("highlight");

        assert!(html.starts_with("<pre class=\"hljs-highlight\" data-language=\"rust\">"));
        assert!(html.contains("<code class=\"hljs language-rust\">"));
        assert!(html.contains("hljs-"));
    }

    #[test]
    fn language_token_is_escaped_in_attributes() {
        let (syntax_set, class_style) = syntax_and_style();
        let resolved = resolve_language(Some("c\"x"), "int a;", &syntax_set);
        let html =
            highlight_code(&resolved, None, "int a;", &syntax_set, &class_style).expect("highlight");

        assert!(html.starts_with("<pre class=\"hljs-highlight\" data-language=\"c&quot;x\">"));
        assert!(html.contains("<code class=\"hljs language-c&quot;x\">"));
        assert!(!html.contains("c\"x"));
    }
}
