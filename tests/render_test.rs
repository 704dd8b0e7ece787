use notes_clipper::render::{render_markdown_to_html, HtmlRenderer, NodeKind, RenderOverrides};

#[test]
fn renders_note_with_label_and_quote() {
    let md = ["# Title", "line1", "line2", "", "bash", "", "```bash", "ls -la", "```", "", "> Quote"]
        .join("\n");
    let html = render_markdown_to_html(&md);

    assert!(html.contains("<h1>Title</h1>"));
    assert!(html.contains("line1<br />\nline2"));
    assert!(html.contains("<pre style=\""));
    assert!(html.contains("<code class=\"language-bash\">ls -la\n</code>"));
    assert!(html.contains("<blockquote style=\"border-left:4px solid #d0d7de;"));
    assert!(!html.contains(">bash</p>"));
}

#[test]
fn renders_normalized_x_capture() {
    let md = [
        "# (19) someone on X: \"Very long title\" / X",
        "",
        "https://x.com/user/status/123",
        "Captured: 2026-02-03T00:00:00Z",
        "",
        "---",
        "",
        "Main content line",
        "",
        "[",
        "",
        "[[[IMG:0]]]",
        "",
        "](/user)",
        "",
        "https://x.com/user/status/123/analytics",
        "",
        "---",
        "",
        "Related content line",
    ]
    .join("\n");
    let html = render_markdown_to_html(&md);

    assert!(html.contains("Main content line"));
    assert!(html.contains("[[[IMG:0]]]"));
    assert!(!html.contains("Related content line"));
    assert!(!html.contains("analytics"));
    assert!(!html.contains("](/user)"));
}

#[test]
fn fenced_js_is_styled_and_escaped() {
    let html = render_markdown_to_html("```js\nconst a = \"<b>\" && 1;\n```");

    assert!(html.starts_with("<pre style=\"background:#f6f8fa;"));
    assert!(html.contains(
        "<code class=\"language-js\">const a = &quot;&lt;b&gt;&quot; &amp;&amp; 1;\n</code></pre>"
    ));
}

#[test]
fn plain_renderer_has_no_styles() {
    let md = [
        "# Title", "", "- Item 1", "- Item 2", "", "> Quote", "", "```js", "console.log(\"ok\")",
        "```", "", "| A | B |", "| --- | --- |", "| 1 | 2 |",
    ]
    .join("\n");
    let html = HtmlRenderer::new(RenderOverrides::empty()).render(&md);

    assert!(html.contains("<h1>Title</h1>"));
    assert!(html.contains("<ul>\n<li>Item 1</li>"));
    assert!(html.contains("<blockquote>"));
    assert!(html.contains("<code class=\"language-js\">"));
    assert!(html.contains("<table>"));
    assert!(html.contains("<th>A</th>"));
    assert!(html.contains("<td>2</td>"));
    assert!(!html.contains("style="));
}

#[test]
fn styled_tables_and_lists() {
    let html = render_markdown_to_html("- a\n- b\n\n| A | B |\n| --- | --- |\n| 1 | 2 |");

    assert!(html.contains("<ul style=\"margin:8px 0 8px 20px;\">"));
    assert!(html.contains("<table style=\"border-collapse:collapse;width:100%;\">"));
    assert!(html.contains("<th style=\"border:1px solid #d0d7de;padding:6px 8px;\">A</th>"));
    assert!(html.contains("<td style=\"border:1px solid #d0d7de;padding:6px 8px;\">1</td>"));
}

#[test]
fn images_and_links() {
    let html = render_markdown_to_html("![cat *pic*](https://ex.com/a.png \"t\") [home](https://ex.com/)");

    assert!(html.contains("<img src=\"https://ex.com/a.png\" alt=\"cat pic\" title=\"t\" />"));
    assert!(html.contains("<a href=\"https://ex.com/\">home</a>"));
}

#[test]
fn unsafe_targets_are_not_emitted() {
    let html = render_markdown_to_html("[x](javascript:alert(1)) ![y](data:image/png;base64,AAA)");

    assert!(!html.contains("javascript:"));
    assert!(!html.contains("data:image"));
    assert!(html.contains("<img src=\"\" alt=\"y\" />"));
}

#[test]
fn inline_code_override_can_be_removed() {
    let renderer = HtmlRenderer::new(RenderOverrides::styled().without(NodeKind::InlineCode));
    let html = renderer.render("use `a < b` here");
    assert!(html.contains("<code>a &lt; b</code>"));
    assert!(html.starts_with("<p style=\""));
}

#[test]
fn renderers_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HtmlRenderer>();

    let renderer = std::sync::Arc::new(HtmlRenderer::styled());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let renderer = std::sync::Arc::clone(&renderer);
            std::thread::spawn(move || renderer.render(&format!("post {i}")))
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().contains("post"));
    }
}
