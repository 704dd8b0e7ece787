use std::sync::LazyLock;

use notes_clipper::convert::{html_to_markdown, html_to_markdown_with, pick_best_srcset, TokenSequence};
use notes_clipper::render::render_markdown_to_html;
use pulldown_cmark::{Event, Parser};
use regex::Regex;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[\[IMG:([^\]\s]+)\]\]\]").unwrap());

const BASE: &str = "https://ex.com/page";

#[test]
fn plain_article_tokenizes_image() {
    let out = html_to_markdown(r#"<p>Hello <img src="/a.png"> world</p>"#, BASE);

    assert_eq!(out.markdown, "Hello\n[[[IMG:0]]]\nworld");
    assert_eq!(out.images.len(), 1);
    assert_eq!(out.images[0].token, "0");
    assert_eq!(out.images[0].url, "https://ex.com/a.png");
    assert_eq!(out.markdown.matches("[[[IMG:").count(), 1);
}

#[test]
fn every_image_gets_a_unique_token() {
    let html = r#"<p><img src="/1.png"><img src="/2.png"></p><div><img src="/3.png" alt="three"></div>"#;
    let out = html_to_markdown(html, BASE);

    let tokens: Vec<&str> = out.images.iter().map(|i| i.token.as_str()).collect();
    assert_eq!(tokens, ["0", "1", "2"]);
    for image in &out.images {
        assert_eq!(out.markdown.matches(&image.placeholder()).count(), 1);
    }
    assert_eq!(out.images[2].alt.as_deref(), Some("three"));
}

#[test]
fn shared_sequence_spans_fragments() {
    let mut tokens = TokenSequence::prefixed("twimg-");
    let first = html_to_markdown_with(r#"<img src="/a.png">"#, BASE, &mut tokens, &|_| false);
    let second = html_to_markdown_with(r#"<img src="/b.png">"#, BASE, &mut tokens, &|_| false);

    assert_eq!(first.images[0].token, "twimg-0");
    assert_eq!(second.images[0].token, "twimg-1");
    assert_eq!(tokens.issued(), 2);
}

#[test]
fn skipped_images_keep_alt_text() {
    let mut tokens = TokenSequence::numeric();
    let html = r#"<p>Hi <img src="https://abs.twimg.com/emoji/v2/1f600.svg" alt="smile"></p>"#;
    let out = html_to_markdown_with(html, BASE, &mut tokens, &|url| url.contains("/emoji/"));

    assert_eq!(out.markdown, "Hi smile");
    assert!(out.images.is_empty());
}

#[test]
fn srcset_and_lazy_attributes_win_over_src() {
    let out = html_to_markdown(
        r#"<img srcset="/s.jpg 1x, /l.jpg 2x" src="/d.jpg"><img data-src="/lazy.png" src="data:image/gif;base64,R0l">"#,
        BASE,
    );
    assert_eq!(out.images[0].url, "https://ex.com/l.jpg");
    assert_eq!(out.images[1].url, "https://ex.com/lazy.png");
}

#[test]
fn srcset_ranking() {
    assert_eq!(pick_best_srcset("a.jpg 100w, b.jpg 300w, c.jpg 200w").as_deref(), Some("b.jpg"));
    assert_eq!(pick_best_srcset("a.jpg 640w, b.jpg 1.5x").as_deref(), Some("b.jpg"));
    assert_eq!(pick_best_srcset("a.jpg 2x, b.jpg 2x").as_deref(), Some("a.jpg"));
}

#[test]
fn image_without_url_is_dropped() {
    let out = html_to_markdown(r#"<p><img alt="nothing"></p>"#, BASE);
    assert!(out.images.is_empty());
    assert!(out.markdown.is_empty());
}

#[test]
fn unresolvable_base_keeps_raw_url() {
    let out = html_to_markdown(r#"<img src="/a.png">"#, "not a url");
    assert_eq!(out.images[0].url, "/a.png");
}

#[test]
fn headings_lists_and_quotes() {
    let html = r#"
        <h2>Title <a href="/x">link</a></h2>
        <ul><li>One</li><li>Two <b>bold</b></li></ul>
        <ol><li>a</li><li>b</li></ol>
        <blockquote><p>quoted</p></blockquote>
    "#;
    let out = html_to_markdown(html, BASE);

    assert!(out.markdown.starts_with("## Title [link](https://ex.com/x)"));
    assert!(out.markdown.lines().any(|l| l.starts_with('-') && l.ends_with("One")));
    assert!(!out.markdown.lines().any(|l| l.starts_with("* ")));
    assert!(out.markdown.contains("**bold**"));
    assert!(out.markdown.contains("> quoted"));

    let html = render_markdown_to_html(&out.markdown);
    assert!(html.contains("<h2>Title <a href=\"https://ex.com/x\">link</a></h2>"));
    assert_eq!(html.matches("<li>").count(), 4);
    assert!(html.contains("<ol"));
    assert!(html.contains("<blockquote"));
}

#[test]
fn heading_images_move_to_their_own_line() {
    let out = html_to_markdown(r#"<h2><img src="/h.png">Title</h2>"#, BASE);
    assert_eq!(out.markdown, "## Title\n[[[IMG:0]]]");
}

#[test]
fn fenced_code_keeps_code_verbatim() {
    let out = html_to_markdown(
        "<pre class=\"lang-rust\"><code>fn main() { let a = b * c; }\n</code></pre>",
        BASE,
    );
    assert!(out.markdown.starts_with("```"));
    assert!(out.markdown.ends_with("```"));
    assert!(out.markdown.contains("fn main() { let a = b * c; }"));
}

#[test]
fn tables_become_gfm() {
    let html = "<p>Before</p><table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2 <img src=\"/t.png\"></td></tr></table>";
    let out = html_to_markdown(html, BASE);
    assert_eq!(
        out.markdown,
        "Before\n\n| A | B |\n| --- | --- |\n| 1 | 2 [[[IMG:0]]] |"
    );
    assert_eq!(out.images[0].url, "https://ex.com/t.png");
}

#[test]
fn rule_and_dropped_elements() {
    let out = html_to_markdown("<p>a</p><hr><p>b</p><script>var x = 1;</script>", BASE);
    assert!(out.markdown.contains("* * *"));
    assert!(!out.markdown.contains("var x"));
    assert!(render_markdown_to_html(&out.markdown).contains("<hr />"));
}

#[test]
fn line_breaks_are_hard_breaks() {
    let out = html_to_markdown("<p>line one<br>line two</p>", BASE);
    assert!(
        out.markdown.contains("line one  \nline two") || out.markdown.contains("line one\\\nline two"),
        "{:?}",
        out.markdown
    );

    let events: Vec<Event<'_>> = Parser::new(&out.markdown).collect();
    assert!(events.contains(&Event::HardBreak));
    assert!(render_markdown_to_html(&out.markdown).contains("line one<br />\nline two"));
}

#[test]
fn placeholder_text_in_code_never_collides() {
    let html = "<p><img src=\"/a.png\"> and <code>[[[IMG:0]]]</code></p><pre><code>[[[IMG:7]]]</code></pre>";
    let out = html_to_markdown(html, BASE);

    let found: Vec<&str> = PLACEHOLDER
        .captures_iter(&out.markdown)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    assert_eq!(found, ["0"]);
    assert_eq!(out.images.len(), 1);
    assert_eq!(out.images[0].url, "https://ex.com/a.png");
    assert!(out.markdown.contains("IMG\u{200B}:0"));
    assert!(out.markdown.contains("IMG\u{200B}:7"));
}

#[test]
fn links_escape_parens_and_skip_javascript() {
    let out = html_to_markdown(
        r#"<p><a href="/x(1)">see</a> it <a href="javascript:void(0)">here</a></p>"#,
        BASE,
    );
    assert!(out.markdown.starts_with("[see](https://ex.com/x%281%29) it"));
    assert!(out.markdown.contains("here"));
    assert!(!out.markdown.contains("javascript"));
}

#[test]
fn linked_image_unwraps_after_normalizing() {
    let out = html_to_markdown(r#"<p><a href="/p"><img src="/i.png"></a></p>"#, BASE);
    assert!(out.markdown.contains("\n[[[IMG:0]]]\n"));
    assert_eq!(
        notes_clipper::normalize::normalize_markdown(&out.markdown),
        "[[[IMG:0]]]"
    );
}
