//! Markdown rendering with per-block class overrides and syntax highlighting
//!
//! Rendering is a pure function of the Markdown text: the renderer holds only
//! read-only settings, so the same input always produces the same HTML.

use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::config::{HighlightConfig, StyleConfig};

lazy_static! {
    /// Fence info strings reduce to a `language-xxx` class marker
    static ref FENCE_LANGUAGE: Regex = Regex::new(r"^([\w+#-]+)").unwrap();
}

/// Markdown renderer for blog articles
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
    styles: StyleConfig,
}

/// Fenced or indented code block being collected
struct CodeBlock {
    language: Option<String>,
    source: String,
}

/// Image whose alt text is still being collected
struct PendingImage {
    src: String,
    title: String,
    alt: String,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer with default styles
    pub fn new() -> Self {
        Self::with_options(&HighlightConfig::default(), &StyleConfig::default())
    }

    /// Create with custom settings
    pub fn with_options(highlight: &HighlightConfig, styles: &StyleConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: highlight.theme.clone(),
            highlight: highlight.enable,
            styles: styles.clone(),
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<CodeBlock> = None;
        let mut image: Option<PendingImage> = None;
        let mut in_table_head = false;

        for event in parser {
            if let Some(block) = code_block.as_mut() {
                match event {
                    Event::Text(text) => block.source.push_str(&text),
                    Event::End(TagEnd::CodeBlock) => {
                        if let Some(block) = code_block.take() {
                            events.push(Event::Html(self.render_code_block(&block).into()));
                        }
                    }
                    _ => {}
                }
                continue;
            }

            if let Some(pending) = image.as_mut() {
                match event {
                    Event::Text(text) | Event::Code(text) => pending.alt.push_str(&text),
                    Event::End(TagEnd::Image) => {
                        if let Some(pending) = image.take() {
                            events.push(Event::InlineHtml(self.render_image(&pending).into()));
                        }
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }) => match self.heading(level) {
                    Some((tag, class)) => {
                        let id_attr = id
                            .map(|id| format!(r#" id="{}""#, html_escape(&id)))
                            .unwrap_or_default();
                        events.push(Event::Html(
                            format!(r#"<{}{} class="{}">"#, tag, id_attr, class).into(),
                        ));
                    }
                    None => events.push(Event::Start(Tag::Heading {
                        level,
                        id,
                        classes,
                        attrs,
                    })),
                },
                Event::End(TagEnd::Heading(level)) => match self.heading(level) {
                    Some((tag, _)) => events.push(Event::Html(format!("</{}>\n", tag).into())),
                    None => events.push(Event::End(TagEnd::Heading(level))),
                },

                Event::Start(Tag::BlockQuote { .. }) => events.push(Event::Html(
                    format!(r#"<blockquote class="{}">"#, self.styles.blockquote).into(),
                )),
                Event::End(TagEnd::BlockQuote { .. }) => {
                    events.push(Event::Html("</blockquote>\n".into()))
                }

                Event::Start(Tag::CodeBlock(kind)) => {
                    let language = match kind {
                        CodeBlockKind::Fenced(info) => FENCE_LANGUAGE
                            .captures(info.trim())
                            .map(|caps| caps[1].to_string()),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some(CodeBlock {
                        language,
                        source: String::new(),
                    });
                }
                Event::Code(code) => events.push(Event::InlineHtml(
                    format!(
                        r#"<code class="{}">{}</code>"#,
                        self.styles.inline_code,
                        html_escape(&code)
                    )
                    .into(),
                )),

                Event::Start(Tag::Table(_)) => events.push(Event::Html(
                    format!(
                        r#"<div class="{}"><table class="{}">"#,
                        self.styles.table_wrapper, self.styles.table
                    )
                    .into(),
                )),
                Event::End(TagEnd::Table) => {
                    events.push(Event::Html("</tbody></table></div>\n".into()))
                }
                Event::Start(Tag::TableHead) => {
                    in_table_head = true;
                    events.push(Event::Html("<thead><tr>".into()));
                }
                Event::End(TagEnd::TableHead) => {
                    in_table_head = false;
                    events.push(Event::Html("</tr></thead><tbody>\n".into()));
                }
                Event::Start(Tag::TableRow) => events.push(Event::Html("<tr>".into())),
                Event::End(TagEnd::TableRow) => events.push(Event::Html("</tr>\n".into())),
                Event::Start(Tag::TableCell) => {
                    let cell = if in_table_head {
                        format!(r#"<th class="{}">"#, self.styles.table_head_cell)
                    } else {
                        format!(r#"<td class="{}">"#, self.styles.table_cell)
                    };
                    events.push(Event::Html(cell.into()));
                }
                Event::End(TagEnd::TableCell) => {
                    let close = if in_table_head { "</th>" } else { "</td>" };
                    events.push(Event::Html(close.into()));
                }

                Event::Start(Tag::Link {
                    dest_url, title, ..
                }) => events.push(Event::InlineHtml(
                    self.render_link_open(&dest_url, &title).into(),
                )),
                Event::End(TagEnd::Link) => events.push(Event::InlineHtml("</a>".into())),

                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) => {
                    image = Some(PendingImage {
                        src: dest_url.to_string(),
                        title: title.to_string(),
                        alt: String::new(),
                    });
                }

                // raw HTML in articles is shown as text, never injected
                Event::Html(raw) | Event::InlineHtml(raw) => events.push(Event::Text(raw)),

                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Tag name and class for the overridden heading levels
    fn heading(&self, level: HeadingLevel) -> Option<(&'static str, &str)> {
        match level {
            HeadingLevel::H1 => Some(("h1", self.styles.h1.as_str())),
            HeadingLevel::H2 => Some(("h2", self.styles.h2.as_str())),
            HeadingLevel::H3 => Some(("h3", self.styles.h3.as_str())),
            _ => None,
        }
    }

    /// Language-tagged fences get block styling (and highlighting); anything
    /// else is styled like inline code
    fn render_code_block(&self, block: &CodeBlock) -> String {
        match &block.language {
            Some(lang) => format!(
                r#"<pre class="{}"><code class="language-{}">{}</code></pre>"#,
                self.styles.code_block,
                html_escape(lang),
                self.highlight_code(&block.source, lang)
            ),
            None => format!(
                r#"<pre><code class="{}">{}</code></pre>"#,
                self.styles.inline_code,
                html_escape(&block.source)
            ),
        }
    }

    /// Highlight a code block; falls back to escaped text
    fn highlight_code(&self, code: &str, lang: &str) -> String {
        if !self.highlight {
            return html_escape(code);
        }

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang));
        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let (Some(syntax), Some(theme)) = (syntax, theme) else {
            return html_escape(code);
        };

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut output = String::new();
        for line in LinesWithEndings::from(code) {
            let highlighted = highlighter
                .highlight_line(line, &self.syntax_set)
                .and_then(|regions| styled_line_to_highlighted_html(&regions, IncludeBackground::No));
            match highlighted {
                Ok(html) => output.push_str(&html),
                Err(e) => {
                    tracing::debug!("Highlighting {} failed: {}", lang, e);
                    return html_escape(code);
                }
            }
        }
        output
    }

    fn render_link_open(&self, href: &str, title: &str) -> String {
        let title_attr = if title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, html_escape(title))
        };
        format!(
            r#"<a href="{}"{} class="{}">"#,
            html_escape(safe_url(href).unwrap_or("#")),
            title_attr,
            self.styles.link
        )
    }

    fn render_image(&self, image: &PendingImage) -> String {
        let title_attr = if image.title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, html_escape(&image.title))
        };
        format!(
            r#"<img src="{}" alt="{}"{} class="{}" />"#,
            html_escape(safe_url(&image.src).unwrap_or_default()),
            html_escape(&image.alt),
            title_attr,
            self.styles.image
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Schemes a link or image may use; scheme-less URLs are relative
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// The URL when it is relative or uses an allowed scheme
fn safe_url(url: &str) -> Option<&str> {
    let url = url.trim();
    match url.find([':', '/', '?', '#']) {
        Some(i) if url.as_bytes()[i] == b':' => ALLOWED_SCHEMES
            .iter()
            .any(|scheme| url[..i].eq_ignore_ascii_case(scheme))
            .then_some(url),
        _ => Some(url),
    }
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> MarkdownRenderer {
        MarkdownRenderer::with_options(
            &HighlightConfig {
                enable: false,
                ..Default::default()
            },
            &StyleConfig::default(),
        )
    }

    #[test]
    fn test_headings_get_classes() {
        let html = plain().render("# One\n\n## Two\n\n### Three\n\n#### Four");
        assert!(html.contains(r#"<h1 class="article-h1">One</h1>"#));
        assert!(html.contains(r#"<h2 class="article-h2">Two</h2>"#));
        assert!(html.contains(r#"<h3 class="article-h3">Three</h3>"#));
        assert!(html.contains("<h4>Four</h4>"));
    }

    #[test]
    fn test_blockquote() {
        let html = plain().render("> Location, location.");
        assert!(html.contains(r#"<blockquote class="article-quote">"#));
        assert!(html.contains("<p>Location, location.</p>"));
        assert!(html.contains("</blockquote>"));
    }

    #[test]
    fn test_language_fence_vs_plain_fence() {
        let renderer = plain();
        let tagged = renderer.render("```rust\nlet x = 1 < 2;\n```");
        assert!(tagged.contains(r#"<pre class="article-code-block"><code class="language-rust">"#));
        assert!(tagged.contains("let x = 1 &lt; 2;"));

        let untagged = renderer.render("```\nplain text\n```");
        assert!(untagged.contains(r#"<pre><code class="article-code">plain text"#));
        assert!(!untagged.contains("language-"));

        let inline = renderer.render("Use `cargo` here");
        assert!(inline.contains(r#"<code class="article-code">cargo</code>"#));
    }

    #[test]
    fn test_highlighted_fence_keeps_language_marker() {
        let html = MarkdownRenderer::new().render("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"<code class="language-rust">"#));
        assert!(html.contains("<span"));
    }

    #[test]
    fn test_table_head_and_body_cells() {
        let md = "| City | Price |\n|------|-------|\n| Caracas | $85,000 |\n";
        let html = plain().render(md);
        assert!(html.contains(r#"<div class="article-table-wrap"><table class="article-table">"#));
        assert!(html.contains(r#"<th class="article-th">City</th>"#));
        assert!(html.contains(r#"<td class="article-td">Caracas</td>"#));
        assert!(html.contains("</tbody></table></div>"));
    }

    #[test]
    fn test_links_and_images() {
        let html = plain().render(
            r#"See [listings](/buy?beds=3 "Browse") and ![Caracas *skyline*](/img/c.jpg)"#,
        );
        assert!(html.contains(
            r#"<a href="/buy?beds=3" title="Browse" class="article-link">listings</a>"#
        ));
        assert!(html.contains(r#"<img src="/img/c.jpg" alt="Caracas skyline" class="article-image" />"#));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let renderer = plain();
        let block = renderer.render("<script>alert(1)</script>\n\nAfter");
        assert!(!block.contains("<script"));
        assert!(block.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(block.contains("<p>After</p>"));

        let inline = renderer.render("Nice <img src=x onerror=alert(1)> home");
        assert!(!inline.contains("<img src=x"));
        assert!(inline.contains("&lt;img src=x onerror=alert(1)&gt;"));
    }

    #[test]
    fn test_unsafe_url_schemes_are_dropped() {
        let renderer = plain();
        let html = renderer.render("[click](javascript:alert(1)) ![x](JavaScript:alert(2))");
        assert!(!html.to_lowercase().contains("javascript:"));
        assert!(html.contains(r##"<a href="#" class="article-link">click</a>"##));
        assert!(html.contains(r#"<img src="" alt="x""#));

        let html = renderer.render("[data](data:text/html;base64,PHNjcmlwdD4=)");
        assert!(!html.contains("data:"));
    }

    #[test]
    fn test_safe_urls_are_kept() {
        assert_eq!(safe_url("https://example.com/a"), Some("https://example.com/a"));
        assert_eq!(safe_url("mailto:sales@example.com"), Some("mailto:sales@example.com"));
        assert_eq!(safe_url("/buy?beds=3"), Some("/buy?beds=3"));
        assert_eq!(safe_url("../img/a.jpg"), Some("../img/a.jpg"));
        assert_eq!(safe_url("#section"), Some("#section"));
        assert_eq!(safe_url("/path?next=a:b"), Some("/path?next=a:b"));
        assert_eq!(safe_url(" vbscript:msgbox"), None);
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = MarkdownRenderer::new();
        let md = "# Title\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n```python\nprint(1)\n```\n";
        assert_eq!(renderer.render(md), renderer.render(md));
    }
}
