//! Markdown to HTML rendering for note previews.
//!
//! The output is pasted into a notes app with no stylesheet, so selected
//! elements carry inline styles. Which elements, and how, is decided by a
//! [`RenderOverrides`] table owned by each [`HtmlRenderer`]; there is no
//! shared renderer configuration.
//!
//! Raw HTML in the Markdown is never passed through: it is escaped and shown
//! as text.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use pulldown_cmark::{
    Alignment, CodeBlockKind, Event, Options, Parser, Tag, TagEnd, TextMergeStream,
};
use pulldown_cmark_escape::escape_href;

use crate::normalize::normalize_markdown;
use crate::patterns::BARE_URL;

const CODE_BLOCK_STYLE: &str = "background:#f6f8fa;padding:12px;border-radius:8px;overflow:auto;white-space:pre-wrap;font-family:Menlo,Monaco,Consolas,\"Courier New\",monospace;font-size:12px;line-height:1.5;";
const INLINE_CODE_STYLE: &str = "background:#f6f8fa;padding:0 4px;border-radius:4px;font-family:Menlo,Monaco,Consolas,\"Courier New\",monospace;font-size:0.95em;";
const BLOCKQUOTE_STYLE: &str =
    "border-left:4px solid #d0d7de;padding:4px 12px;margin:8px 0;color:#4b5563;";
const TABLE_STYLE: &str = "border-collapse:collapse;width:100%;";
const CELL_STYLE: &str = "border:1px solid #d0d7de;padding:6px 8px;";
const PARA_STYLE: &str = "margin:8px 0;line-height:1.6;";
const LIST_STYLE: &str = "margin:8px 0 8px 20px;";

const NO_ATTRS: &[(&str, String)] = &[];

/// Link schemes that are rendered as plain text.
const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:", "file:", "data:"];

static STYLED_RENDERER: LazyLock<HtmlRenderer> = LazyLock::new(HtmlRenderer::styled);

/// Render Markdown with the inline-styled override table.
///
/// # Example
///
/// ```rust
/// use notes_clipper::render::render_markdown_to_html;
///
/// let html = render_markdown_to_html("```js\nlet a = 1 < 2;\n```");
/// assert!(html.contains("<code class=\"language-js\">let a = 1 &lt; 2;"));
/// assert!(html.starts_with("<pre style=\""));
/// ```
#[must_use]
pub fn render_markdown_to_html(markdown: &str) -> String {
    STYLED_RENDERER.render(markdown)
}

/// Element kinds whose rendering can be overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Fenced code block. Override returns the whole element.
    CodeBlock,
    /// Indented code block. Override returns the whole element.
    IndentedCodeBlock,
    /// Inline code span. Override returns the whole element.
    InlineCode,
    /// `<blockquote>` opening tag.
    BlockQuote,
    /// `<table>` opening tag.
    Table,
    /// `<th>` opening tag.
    TableHeaderCell,
    /// `<td>` opening tag.
    TableCell,
    /// `<p>` opening tag.
    Paragraph,
    /// `<ul>` opening tag.
    BulletList,
    /// `<ol>` opening tag.
    OrderedList,
}

/// The element handed to an override.
#[derive(Debug, Clone, Copy)]
pub struct RenderNode<'a> {
    /// Which kind of element this is.
    pub kind: NodeKind,
    /// HTML tag the default rendering uses.
    pub tag: &'static str,
    /// Attributes the default rendering would emit (alignment style, list
    /// start), unescaped.
    pub attrs: &'a [(&'static str, String)],
    /// First word of a fenced block's info string.
    pub info: Option<&'a str>,
    /// Literal code for code kinds, empty otherwise.
    pub content: &'a str,
}

impl RenderNode<'_> {
    /// The default opening tag.
    #[must_use]
    pub fn open(&self) -> String {
        open_tag(self.tag, self.attrs.iter().map(|(k, v)| (*k, v.as_str())))
    }

    /// The opening tag with `style` appended to any existing style,
    /// semicolon-joined.
    #[must_use]
    pub fn open_with_style(&self, style: &str) -> String {
        let mut attrs: Vec<(&str, String)> = self
            .attrs
            .iter()
            .map(|(key, value)| (*key, value.clone()))
            .collect();
        match attrs.iter_mut().find(|(key, _)| *key == "style") {
            Some((_, existing)) => {
                existing.push(';');
                existing.push_str(style);
            }
            None => attrs.push(("style", style.to_string())),
        }
        open_tag(self.tag, attrs.iter().map(|(k, v)| (*k, v.as_str())))
    }

    /// ` class="language-<info>"` when an info string is present.
    fn language_class(&self) -> String {
        self.info
            .map(|info| format!(" class=\"language-{}\"", escape_html(info)))
            .unwrap_or_default()
    }
}

/// Rendering function for one [`NodeKind`].
pub type RenderFn = Arc<dyn Fn(&RenderNode<'_>) -> String + Send + Sync>;

/// Override table: node kind to rendering function.
#[derive(Clone, Default)]
pub struct RenderOverrides {
    table: HashMap<NodeKind, RenderFn>,
}

impl RenderOverrides {
    /// No overrides; plain HTML.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Inline styles for every overridable kind.
    #[must_use]
    pub fn styled() -> Self {
        Self::empty()
            .with(NodeKind::CodeBlock, |node| {
                format!(
                    "<pre style=\"{}\"><code{}>{}</code></pre>\n",
                    escape_html(CODE_BLOCK_STYLE),
                    node.language_class(),
                    escape_html(node.content)
                )
            })
            .with(NodeKind::InlineCode, |node| {
                format!(
                    "<code style=\"{}\">{}</code>",
                    escape_html(INLINE_CODE_STYLE),
                    escape_html(node.content)
                )
            })
            .with(NodeKind::BlockQuote, styled_open(BLOCKQUOTE_STYLE))
            .with(NodeKind::Table, styled_open(TABLE_STYLE))
            .with(NodeKind::TableHeaderCell, styled_open(CELL_STYLE))
            .with(NodeKind::TableCell, styled_open(CELL_STYLE))
            .with(NodeKind::Paragraph, styled_open(PARA_STYLE))
            .with(NodeKind::BulletList, styled_open(LIST_STYLE))
            .with(NodeKind::OrderedList, styled_open(LIST_STYLE))
    }

    /// Set the override for `kind`, replacing any previous one.
    #[must_use]
    pub fn with<F>(mut self, kind: NodeKind, render: F) -> Self
    where
        F: Fn(&RenderNode<'_>) -> String + Send + Sync + 'static,
    {
        self.table.insert(kind, Arc::new(render));
        self
    }

    /// Remove the override for `kind`.
    #[must_use]
    pub fn without(mut self, kind: NodeKind) -> Self {
        self.table.remove(&kind);
        self
    }

    fn render(&self, node: &RenderNode<'_>) -> String {
        match self.table.get(&node.kind) {
            Some(render) => render(node),
            None => default_render(node),
        }
    }
}

impl fmt::Debug for RenderOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.table.keys().collect();
        kinds.sort_by_key(|kind| format!("{kind:?}"));
        f.debug_struct("RenderOverrides").field("kinds", &kinds).finish()
    }
}

fn styled_open(style: &'static str) -> impl Fn(&RenderNode<'_>) -> String + Send + Sync + 'static {
    move |node| node.open_with_style(style)
}

fn default_render(node: &RenderNode<'_>) -> String {
    match node.kind {
        NodeKind::CodeBlock | NodeKind::IndentedCodeBlock => format!(
            "<pre><code{}>{}</code></pre>\n",
            node.language_class(),
            escape_html(node.content)
        ),
        NodeKind::InlineCode => format!("<code>{}</code>", escape_html(node.content)),
        _ => node.open(),
    }
}

/// Markdown renderer with its own override table.
///
/// Immutable after construction; share it freely across threads.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    overrides: RenderOverrides,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::styled()
    }
}

impl HtmlRenderer {
    /// Create a renderer with the given override table.
    #[must_use]
    pub fn new(overrides: RenderOverrides) -> Self {
        Self { overrides }
    }

    /// Renderer with [`RenderOverrides::styled`].
    #[must_use]
    pub fn styled() -> Self {
        Self::new(RenderOverrides::styled())
    }

    /// Normalize `markdown`, then render it.
    #[must_use]
    pub fn render(&self, markdown: &str) -> String {
        self.render_normalized(&normalize_markdown(markdown))
    }

    /// Render Markdown as-is, skipping normalization.
    #[must_use]
    pub fn render_normalized(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        let parser = TextMergeStream::new(Parser::new_ext(markdown, options));

        let mut writer = HtmlWriter::new(&self.overrides);
        for event in parser {
            writer.handle_event(event);
        }
        writer.out
    }
}

struct CodeBlockState {
    kind: NodeKind,
    info: Option<String>,
    content: String,
}

struct ImageState {
    src: String,
    title: String,
    alt: String,
    depth: usize,
}

struct HtmlWriter<'r> {
    overrides: &'r RenderOverrides,
    out: String,

    code_block: Option<CodeBlockState>,
    html_block: Option<String>,
    image: Option<ImageState>,

    // One entry per open link: whether an <a> was emitted for it
    links: Vec<bool>,

    table_alignments: Vec<Alignment>,
    table_cell: usize,
    in_table_head: bool,
}

impl<'r> HtmlWriter<'r> {
    fn new(overrides: &'r RenderOverrides) -> Self {
        Self {
            overrides,
            out: String::new(),
            code_block: None,
            html_block: None,
            image: None,
            links: Vec::new(),
            table_alignments: Vec::new(),
            table_cell: 0,
            in_table_head: false,
        }
    }

    fn handle_event(&mut self, event: Event<'_>) {
        if let Some(image) = &mut self.image {
            let finished = match event {
                Event::Start(Tag::Image { .. }) => {
                    image.depth += 1;
                    false
                }
                Event::End(TagEnd::Image) if image.depth > 0 => {
                    image.depth -= 1;
                    false
                }
                Event::End(TagEnd::Image) => true,
                Event::Text(text) | Event::Code(text) => {
                    image.alt.push_str(&text);
                    false
                }
                _ => false,
            };
            if finished {
                self.finish_image();
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.handle_text(&text),
            Event::Code(code) => {
                let node = RenderNode {
                    kind: NodeKind::InlineCode,
                    tag: "code",
                    attrs: NO_ATTRS,
                    info: None,
                    content: &code,
                };
                let html = self.overrides.render(&node);
                self.out.push_str(&html);
            }
            Event::Html(html) | Event::InlineHtml(html) => self.handle_raw_html(&html),
            Event::SoftBreak | Event::HardBreak => self.out.push_str("<br />\n"),
            Event::Rule => self.out.push_str("<hr />\n"),
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.open(NodeKind::Paragraph, "p", NO_ATTRS),
            Tag::HtmlBlock => {
                self.html_block = Some(String::new());
                self.open(NodeKind::Paragraph, "p", NO_ATTRS);
            }
            Tag::Heading { level, .. } => {
                self.out.push_str(&format!("<{level}>"));
            }
            Tag::BlockQuote(_) => {
                self.open(NodeKind::BlockQuote, "blockquote", NO_ATTRS);
                self.out.push('\n');
            }
            Tag::CodeBlock(kind) => {
                let (kind, info) = match kind {
                    CodeBlockKind::Fenced(info) => (
                        NodeKind::CodeBlock,
                        info.split_whitespace().next().map(ToString::to_string),
                    ),
                    CodeBlockKind::Indented => (NodeKind::IndentedCodeBlock, None),
                };
                self.code_block = Some(CodeBlockState {
                    kind,
                    info,
                    content: String::new(),
                });
            }
            Tag::List(Some(start)) => {
                let attrs = if start == 1 {
                    Vec::new()
                } else {
                    vec![("start", start.to_string())]
                };
                self.open(NodeKind::OrderedList, "ol", &attrs);
                self.out.push('\n');
            }
            Tag::List(None) => {
                self.open(NodeKind::BulletList, "ul", NO_ATTRS);
                self.out.push('\n');
            }
            Tag::Item => self.out.push_str("<li>"),
            Tag::Table(alignments) => {
                self.table_alignments = alignments;
                self.open(NodeKind::Table, "table", NO_ATTRS);
                self.out.push('\n');
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.table_cell = 0;
                self.out.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table_cell = 0;
                self.out.push_str("<tr>");
            }
            Tag::TableCell => {
                let attrs = match self.table_alignments.get(self.table_cell) {
                    Some(Alignment::Left) => vec![("style", "text-align: left".to_string())],
                    Some(Alignment::Center) => vec![("style", "text-align: center".to_string())],
                    Some(Alignment::Right) => vec![("style", "text-align: right".to_string())],
                    _ => Vec::new(),
                };
                if self.in_table_head {
                    self.open(NodeKind::TableHeaderCell, "th", &attrs);
                } else {
                    self.open(NodeKind::TableCell, "td", &attrs);
                }
            }
            Tag::Emphasis => self.out.push_str("<em>"),
            Tag::Strong => self.out.push_str("<strong>"),
            Tag::Strikethrough => self.out.push_str("<del>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                if is_safe_url(&dest_url) {
                    self.out.push_str(&open_tag(
                        "a",
                        [("href", &*dest_url), ("title", &*title)]
                            .into_iter()
                            .filter(|(_, value)| !value.is_empty()),
                    ));
                    self.links.push(true);
                } else {
                    self.links.push(false);
                }
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image = Some(ImageState {
                    src: dest_url.to_string(),
                    title: title.to_string(),
                    alt: String::new(),
                    depth: 0,
                });
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.out.push_str("</p>\n"),
            TagEnd::HtmlBlock => {
                let text = self.html_block.take().unwrap_or_default();
                let lines: Vec<String> = text.trim_end().lines().map(escape_html).collect();
                self.out.push_str(&lines.join("<br />\n"));
                self.out.push_str("</p>\n");
            }
            TagEnd::Heading(level) => self.out.push_str(&format!("</{level}>\n")),
            TagEnd::BlockQuote(_) => self.out.push_str("</blockquote>\n"),
            TagEnd::CodeBlock => {
                if let Some(block) = self.code_block.take() {
                    let node = RenderNode {
                        kind: block.kind,
                        tag: "pre",
                        attrs: NO_ATTRS,
                        info: block.info.as_deref(),
                        content: &block.content,
                    };
                    let html = self.overrides.render(&node);
                    self.out.push_str(&html);
                }
            }
            TagEnd::List(true) => self.out.push_str("</ol>\n"),
            TagEnd::List(false) => self.out.push_str("</ul>\n"),
            TagEnd::Item => self.out.push_str("</li>\n"),
            TagEnd::Table => self.out.push_str("</tbody></table>\n"),
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.out.push_str("</tr></thead><tbody>\n");
            }
            TagEnd::TableRow => self.out.push_str("</tr>\n"),
            TagEnd::TableCell => {
                self.out
                    .push_str(if self.in_table_head { "</th>" } else { "</td>" });
                self.table_cell += 1;
            }
            TagEnd::Emphasis => self.out.push_str("</em>"),
            TagEnd::Strong => self.out.push_str("</strong>"),
            TagEnd::Strikethrough => self.out.push_str("</del>"),
            TagEnd::Link => {
                if self.links.pop().unwrap_or(false) {
                    self.out.push_str("</a>");
                }
            }
            _ => {}
        }
    }

    fn handle_text(&mut self, text: &str) {
        if let Some(block) = &mut self.code_block {
            block.content.push_str(text);
        } else if self.links.is_empty() {
            push_linkified(&mut self.out, text);
        } else {
            self.out.push_str(&escape_html(text));
        }
    }

    fn handle_raw_html(&mut self, html: &str) {
        if let Some(block) = &mut self.html_block {
            block.push_str(html);
        } else {
            self.handle_text(html);
        }
    }

    fn finish_image(&mut self) {
        let Some(image) = self.image.take() else {
            return;
        };
        let src = if is_safe_url(&image.src) { image.src.as_str() } else { "" };
        self.out.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\"",
            escape_url(src),
            escape_html(&image.alt)
        ));
        if !image.title.is_empty() {
            self.out
                .push_str(&format!(" title=\"{}\"", escape_html(&image.title)));
        }
        self.out.push_str(" />");
    }

    fn open(&mut self, kind: NodeKind, tag: &'static str, attrs: &[(&'static str, String)]) {
        let node = RenderNode {
            kind,
            tag,
            attrs,
            info: None,
            content: "",
        };
        let html = self.overrides.render(&node);
        self.out.push_str(&html);
    }
}

/// Escape text and wrap bare http(s) URLs in links.
fn push_linkified(out: &mut String, text: &str) {
    let mut last = 0;
    for found in BARE_URL.find_iter(text) {
        let url = trim_url_punctuation(found.as_str());
        if url.is_empty() {
            continue;
        }
        let end = found.start() + url.len();
        out.push_str(&escape_html(&text[last..found.start()]));
        out.push_str(&format!(
            "<a href=\"{}\">{}</a>",
            escape_url(url),
            escape_html(url)
        ));
        last = end;
    }
    out.push_str(&escape_html(&text[last..]));
}

/// Drop sentence punctuation and unbalanced closing parens from a URL's end.
fn trim_url_punctuation(url: &str) -> &str {
    let mut url = url;
    loop {
        let trimmed = url.trim_end_matches(['.', ',', ';', ':', '!', '?']);
        let trimmed = if trimmed.ends_with(')') && trimmed.matches('(').count() < trimmed.matches(')').count() {
            &trimmed[..trimmed.len() - 1]
        } else {
            trimmed
        };
        if trimmed.len() == url.len() {
            return url;
        }
        url = trimmed;
    }
}

fn is_safe_url(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    !UNSAFE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

fn open_tag<'a>(tag: &str, attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut out = format!("<{tag}");
    for (key, value) in attrs {
        let value = if matches!(key, "href" | "src") {
            escape_url(value)
        } else {
            escape_html(value)
        };
        out.push_str(&format!(" {key}=\"{value}\""));
    }
    out.push('>');
    out
}

/// Escape `&`, `<`, `>`, `"` and `'` for text or a quoted attribute value.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing to a String cannot fail.
    let _ = pulldown_cmark_escape::escape_html(&mut out, text);
    out
}

/// Escape a URL for an `href` or `src` value: unsafe bytes are
/// percent-encoded and `&` becomes `&amp;`.
#[must_use]
pub fn escape_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let _ = escape_href(&mut out, url);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_breaks_become_br() {
        let html = render_markdown_to_html("line1\nline2");
        assert!(html.contains("line1<br />\nline2"));
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = render_markdown_to_html("Hello <b>there</b>\n\n<div onclick=\"x()\">box</div>");
        assert!(!html.contains("<b>"));
        assert!(html.contains("&lt;b&gt;there&lt;/b&gt;"));
        assert!(html.contains("&lt;div onclick=&quot;x()&quot;&gt;box&lt;/div&gt;"));
        assert!(!html.contains("<div"));
    }

    #[test]
    fn alignment_style_is_kept_before_cell_style() {
        let html = render_markdown_to_html("| a |\n|:-:|\n| b |");
        assert!(html.contains(&format!("<th style=\"text-align: center;{CELL_STYLE}\">")));
        assert!(html.contains(&format!("<td style=\"text-align: center;{CELL_STYLE}\">")));
    }

    #[test]
    fn ordered_list_start_is_kept() {
        let html = render_markdown_to_html("3. three\n4. four");
        assert!(html.contains(&format!("<ol start=\"3\" style=\"{LIST_STYLE}\">")));
    }

    #[test]
    fn empty_overrides_render_plain_tags() {
        let renderer = HtmlRenderer::new(RenderOverrides::empty());
        let html = renderer.render("para\n\n> quote\n\n```\nx\n```\n\n`c`");
        assert!(html.contains("<p>para</p>"));
        assert!(html.contains("<blockquote>"));
        assert!(html.contains("<pre><code>x\n</code></pre>"));
        assert!(html.contains("<code>c</code>"));
    }

    #[test]
    fn custom_override_replaces_one_kind() {
        let overrides = RenderOverrides::empty().with(NodeKind::Paragraph, |_| "<p class=\"n\">".to_string());
        let html = HtmlRenderer::new(overrides).render("hi");
        assert_eq!(html, "<p class=\"n\">hi</p>\n");
    }

    #[test]
    fn bare_urls_are_linked() {
        let html = render_markdown_to_html("see https://ex.com/a?b=1&c=2.");
        assert!(html.contains("<a href=\"https://ex.com/a?b=1&amp;c=2\">https://ex.com/a?b=1&amp;c=2</a>."));
    }

    #[test]
    fn urls_inside_links_are_not_relinked() {
        let html = render_markdown_to_html("[https://ex.com](https://ex.com)");
        assert_eq!(html.matches("<a ").count(), 1);
    }

    #[test]
    fn javascript_links_render_as_text() {
        let html = render_markdown_to_html("[click](javascript:alert(1))");
        assert!(!html.contains("<a"));
        assert!(html.contains("click"));
    }

    #[test]
    fn indented_code_is_not_styled_as_fenced() {
        let html = render_markdown_to_html("para\n\n    let x = 1;\n\n```\ny\n```");
        assert!(html.contains("<pre><code>let x = 1;\n</code></pre>"));
        assert_eq!(html.matches("<pre style=").count(), 1);

        let overrides = RenderOverrides::empty()
            .with(NodeKind::IndentedCodeBlock, |node| format!("<pre class=\"i\">{}</pre>", node.content));
        let html = HtmlRenderer::new(overrides).render_normalized("    let x = 1;");
        assert!(html.contains("<pre class=\"i\">let x = 1;\n</pre>"));
    }

    #[test]
    fn escapes_quotes_and_urls() {
        assert_eq!(escape_html(r#"<a href="x">Tom's</a>"#), "&lt;a href=&quot;x&quot;&gt;Tom&#39;s&lt;/a&gt;");
        assert_eq!(escape_url("https://ex.com/a b?q=\"1\"&r=2"), "https://ex.com/a%20b?q=%221%22&amp;r=2");

        let html = render_markdown_to_html("[x](<https://ex.com/a b>)");
        assert!(html.contains("<a href=\"https://ex.com/a%20b\">x</a>"));
    }

    #[test]
    fn trims_url_punctuation() {
        assert_eq!(trim_url_punctuation("https://ex.com/a)."), "https://ex.com/a");
        assert_eq!(trim_url_punctuation("https://ex.com/(a)"), "https://ex.com/(a)");
    }
}
