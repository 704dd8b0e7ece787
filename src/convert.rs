//! HTML to Markdown conversion with image tokenization.
//!
//! Conversion runs on `htmd` (ATX headings, `-` bullets, fenced code, `_`
//! emphasis, `**` strong). Before it runs, the DOM is prepared with
//! `dom_query`: images and tables become private-use markers, `<pre>` blocks
//! get a `language-*` class on their `<code>`, and links are resolved against
//! the base URL. Afterwards each image marker becomes a `[[[IMG:<token>]]]`
//! placeholder on its own line and is reported as an [`ImageRef`]; each table
//! marker becomes a GFM table.

use dom_query::{Document, Selection};
use htmd::options::{
    BrStyle, BulletListMarker, CodeBlockStyle, HeadingStyle, HrStyle, LinkStyle, Options,
};
use htmd::HtmlToMarkdown;
use regex::Captures;
use url::Url;

use crate::dom;
use crate::patterns::{CODE_LANGUAGE_CLASS, CONVERSION_MARKER};
use crate::render::escape_html;
use crate::result::{placeholder, ImageRef};
use crate::url_utils::to_absolute_url;

/// Elements whose content never reaches the Markdown.
const DROPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

const MARKER_OPEN: char = '\u{E000}';
const MARKER_CLOSE: char = '\u{E001}';

/// Generator for image tokens.
///
/// One sequence is threaded through a whole extraction so tokens stay unique
/// even when several fragments are converted.
#[derive(Debug, Clone, Default)]
pub struct TokenSequence {
    prefix: &'static str,
    next: usize,
}

impl TokenSequence {
    /// Tokens `0`, `1`, `2`, ...
    #[must_use]
    pub fn numeric() -> Self {
        Self::default()
    }

    /// Tokens `<prefix>0`, `<prefix>1`, ...
    #[must_use]
    pub fn prefixed(prefix: &'static str) -> Self {
        Self { prefix, next: 0 }
    }

    /// Issue the next token.
    pub fn next_token(&mut self) -> String {
        let token = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        token
    }

    /// Number of tokens issued so far.
    #[must_use]
    pub fn issued(&self) -> usize {
        self.next
    }
}

/// Markdown produced from one HTML fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversion {
    /// Trimmed Markdown with image placeholders.
    pub markdown: String,
    /// One entry per placeholder, in document order.
    pub images: Vec<ImageRef>,
}

/// Convert an HTML fragment to Markdown, numbering images from `0`.
///
/// # Example
///
/// ```rust
/// use notes_clipper::convert::html_to_markdown;
///
/// let out = html_to_markdown(r#"<p>Hello <img src="/a.png"> world</p>"#, "https://ex.com/page");
/// assert!(out.markdown.contains("[[[IMG:0]]]"));
/// assert_eq!(out.images[0].url, "https://ex.com/a.png");
/// ```
#[must_use]
pub fn html_to_markdown(html: &str, base_url: &str) -> Conversion {
    let mut tokens = TokenSequence::numeric();
    html_to_markdown_with(html, base_url, &mut tokens, &|_| false)
}

/// Convert an HTML fragment to Markdown, drawing tokens from `tokens`.
///
/// Images whose resolved URL satisfies `skip_image` are not tokenized; their
/// alt text (if any) is kept inline instead. Placeholder-like text already in
/// the page gets a zero-width space after `IMG`, so every placeholder in the
/// output has exactly one entry in `images`.
pub fn html_to_markdown_with(
    html: &str,
    base_url: &str,
    tokens: &mut TokenSequence,
    skip_image: &dyn Fn(&str) -> bool,
) -> Conversion {
    let doc = Document::from(html.replace([MARKER_OPEN, MARKER_CLOSE], ""));
    let base = Url::parse(base_url).ok();

    doc.select(&DROPPED_TAGS.join(", ")).remove();
    let mut pending = mark_images(&doc, base.as_ref(), skip_image);
    prepare_code_blocks(&doc);
    resolve_links(&doc, base.as_ref());
    let tables = mark_tables(&doc);

    let body = doc.select("body");
    let raw = match converter().convert(&dom::inner_html(&body)) {
        Ok(markdown) => markdown,
        Err(err) => {
            tracing::warn!(error = %err, "htmd conversion failed, keeping plain text");
            body.text().to_string()
        }
    };
    tracing::debug!(
        raw_len = raw.len(),
        images = pending.len(),
        tables = tables.len(),
        "htmd conversion complete"
    );

    let raw = lift_heading_markers(&break_placeholders(&raw));
    let with_tables = CONVERSION_MARKER.replace_all(&raw, |caps: &Captures| {
        if &caps[2] != "T" {
            return caps[0].to_string();
        }
        caps[3]
            .parse::<usize>()
            .ok()
            .and_then(|index| tables.get(index))
            .map_or_else(
                || format!("{}{}", &caps[1], &caps[4]),
                |table| format!("\n{table}\n"),
            )
    });

    let mut images = Vec::new();
    let markdown = CONVERSION_MARKER.replace_all(&with_tables, |caps: &Captures| {
        let image = caps[3]
            .parse::<usize>()
            .ok()
            .and_then(|index| pending.get_mut(index))
            .and_then(Option::take);
        let Some(PendingImage { url, alt }) = image else {
            return format!("{}{}", &caps[1], &caps[4]);
        };

        let token = tokens.next_token();
        let text = placeholder(&token);
        images.push(ImageRef { token, url, alt });
        if &caps[2] == "J" {
            format!("{}{text}{}", &caps[1], &caps[4])
        } else {
            format!("\n{text}\n")
        }
    });

    Conversion {
        markdown: markdown.trim().to_string(),
        images,
    }
}

/// Pick the best candidate from a `srcset` attribute.
///
/// Width descriptors rank by width, density descriptors by density x 10000
/// (so any density beats any width), anything else scores 1. Ties keep the
/// earlier candidate.
#[must_use]
pub fn pick_best_srcset(srcset: &str) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;
    for candidate in srcset.split(',') {
        let mut fields = candidate.split_whitespace();
        let Some(url) = fields.next() else {
            continue;
        };
        let score = descriptor_score(fields.next().unwrap_or(""));
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((url, score));
        }
    }
    best.map(|(url, _)| url.to_string())
}

fn descriptor_score(descriptor: &str) -> f64 {
    let number = |s: &str| s.parse::<f64>().ok().filter(|n| n.is_finite()).unwrap_or(0.0);
    if let Some(width) = descriptor.strip_suffix('w') {
        number(width)
    } else if let Some(density) = descriptor.strip_suffix('x') {
        number(density) * 10_000.0
    } else {
        1.0
    }
}

/// Resolve an `<img>` to an absolute URL.
///
/// Priority: best `srcset` candidate, `data-original`, `data-src`, `src`.
#[must_use]
pub fn resolve_image_url(img: &Selection, base: Option<&Url>) -> Option<String> {
    let chosen = dom::attr(img, "srcset")
        .and_then(|srcset| pick_best_srcset(&srcset))
        .or_else(|| dom::attr(img, "data-original"))
        .or_else(|| dom::attr(img, "data-src"))
        .or_else(|| dom::attr(img, "src"))?;
    Some(to_absolute_url(&chosen, base))
}

fn converter() -> HtmlToMarkdown {
    HtmlToMarkdown::builder()
        .options(Options {
            heading_style: HeadingStyle::Atx,
            hr_style: HrStyle::Asterisks,
            br_style: BrStyle::TwoSpaces,
            link_style: LinkStyle::Inlined,
            code_block_style: CodeBlockStyle::Fenced,
            bullet_list_marker: BulletListMarker::Dash,
            ..Options::default()
        })
        .skip_tags(DROPPED_TAGS.to_vec())
        .build()
}

struct PendingImage {
    url: String,
    alt: Option<String>,
}

/// Swap every `<img>` for an image marker, its alt text, or nothing.
fn mark_images(
    doc: &Document,
    base: Option<&Url>,
    skip_image: &dyn Fn(&str) -> bool,
) -> Vec<Option<PendingImage>> {
    let mut pending = Vec::new();
    for img in dom::elements(&doc.select("img")) {
        let Some(url) = resolve_image_url(&img, base) else {
            img.remove();
            continue;
        };
        let alt = dom::attr(&img, "alt");

        if skip_image(&url) {
            tracing::trace!(%url, "image kept as alt text");
            match alt {
                Some(alt) => img.replace_with_html(escape_html(&alt)),
                None => img.remove(),
            }
            continue;
        }

        img.replace_with_html(format!("{MARKER_OPEN}I{}{MARKER_CLOSE}", pending.len()));
        pending.push(Some(PendingImage { url, alt }));
    }
    pending
}

/// Rebuild each `<pre>` as `<pre><code class="language-x">text</code></pre>`.
fn prepare_code_blocks(doc: &Document) {
    for pre in dom::elements(&doc.select("pre")) {
        let language = pre
            .select("code")
            .attr("class")
            .or_else(|| pre.attr("class"))
            .and_then(|class| {
                CODE_LANGUAGE_CLASS
                    .captures(&class)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().to_string())
            });
        let class = language
            .map(|lang| format!(" class=\"language-{}\"", escape_html(&lang)))
            .unwrap_or_default();

        let text = pre.text().to_string();
        let code = text.strip_suffix('\n').unwrap_or(&text);
        pre.set_html(format!("<code{class}>{}</code>", escape_html(code)));
    }
}

/// Absolutize link targets; `javascript:` links lose their target.
fn resolve_links(doc: &Document, base: Option<&Url>) {
    for link in dom::elements(&doc.select("a[href]")) {
        let href = dom::attr(&link, "href").unwrap_or_default();
        if href.is_empty() || href.to_ascii_lowercase().starts_with("javascript:") {
            link.remove_attr("href");
            continue;
        }
        let href = to_absolute_url(&href, base)
            .replace('(', "%28")
            .replace(')', "%29");
        link.set_attr("href", &href);
    }
}

/// Swap data tables for table markers and return their GFM text.
///
/// Tables that contain other tables are layout tables and are left to `htmd`.
fn mark_tables(doc: &Document) -> Vec<String> {
    let mut tables = Vec::new();
    for table in dom::elements(&doc.select("table")) {
        if table.select("table").exists() {
            continue;
        }
        let rows: Vec<Vec<String>> = dom::elements(&table.select("tr"))
            .map(|row| {
                dom::elements(&row.select("th, td"))
                    .map(|cell| table_cell(&cell))
                    .collect::<Vec<_>>()
            })
            .filter(|cells| !cells.is_empty())
            .collect();
        let Some(markdown) = gfm_table(&rows) else {
            continue;
        };

        table.replace_with_html(format!("<p>{MARKER_OPEN}T{}{MARKER_CLOSE}</p>", tables.len()));
        tables.push(markdown);
    }
    tables
}

/// Cell text on one line; image markers switch to the inline kind so the row
/// stays intact.
fn table_cell(cell: &Selection) -> String {
    let text = cell.text();
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    break_placeholders(&text)
        .replace('|', "\\|")
        .replace(&format!("{MARKER_OPEN}I"), &format!("{MARKER_OPEN}J"))
}

fn gfm_table(rows: &[Vec<String>]) -> Option<String> {
    let (header, body) = rows.split_first()?;
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let line = |row: &[String]| {
        let cells: Vec<&str> = (0..columns)
            .map(|column| row.get(column).map_or("", String::as_str))
            .collect();
        format!("| {} |", cells.join(" | "))
    };

    let mut lines = vec![line(header), format!("|{}", " --- |".repeat(columns))];
    lines.extend(body.iter().map(|row| line(row)));
    Some(lines.join("\n"))
}

/// Move image markers off ATX heading lines onto the lines after them.
fn lift_heading_markers(markdown: &str) -> String {
    markdown
        .split('\n')
        .map(|line| {
            if !line.starts_with('#') || !line.contains(MARKER_OPEN) {
                return line.to_string();
            }
            let markers: Vec<&str> = CONVERSION_MARKER
                .find_iter(line)
                .map(|m| m.as_str().trim())
                .collect();
            let heading = CONVERSION_MARKER.replace_all(line, " ");
            format!("{}\n{}", heading.trim_end(), markers.join("\n"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn break_placeholders(text: &str) -> String {
    text.replace("[[[IMG:", "[[[IMG\u{200B}:")
}
