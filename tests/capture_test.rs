use chrono::{TimeZone, Utc};
use notes_clipper::dom::Document;
use notes_clipper::extractor::{capture, capture_with, ReadabilityEngine, ReadableArticle, ReaderExtractor};
use notes_clipper::page::{Page, SelectionRange};
use notes_clipper::{clip, CaptureMode, Error, Options};
use url::Url;

const PAGE_HTML: &str = r#"<html><head><title>My Page</title></head>
<body><nav>Menu</nav><p>Hello <img src="/a.png"> world</p></body></html>"#;

fn options(mode: CaptureMode) -> Options {
    Options {
        mode,
        captured_at: Some(Utc.with_ymd_and_hms(2026, 2, 3, 0, 0, 0).unwrap()),
        ..Options::default()
    }
}

struct BodyEngine;

impl ReadabilityEngine for BodyEngine {
    fn parse(&self, document: Document, _url: &Url) -> Option<ReadableArticle> {
        let html = document.select("p").inner_html().to_string();
        Some(ReadableArticle {
            title: Some("Engine Title".to_string()),
            content_html: format!("<p>{html}</p>"),
        })
    }
}

#[test]
fn selection_capture_produces_enveloped_document() {
    let page = Page::new("https://ex.com/page", PAGE_HTML)
        .unwrap()
        .with_selection(vec![SelectionRange::new(r#"<p>Hello <img src="/a.png"> world</p>"#)]);
    let doc = capture(&page, &options(CaptureMode::Selection)).unwrap();

    assert_eq!(
        doc.markdown,
        "# My Page\n\nhttps://ex.com/page\nCaptured: 2026-02-03T00:00:00.000Z\n\n---\n\nHello\n[[[IMG:0]]]\nworld"
    );
    assert_eq!(doc.title, "My Page");
    assert_eq!(doc.images.len(), 1);
    assert_eq!(doc.images[0].url, "https://ex.com/a.png");
    assert_eq!(doc.suggested_folder_path, None);
}

#[test]
fn selection_capture_without_selection_fails() {
    let page = Page::new("https://ex.com/page", PAGE_HTML).unwrap();
    let err = capture(&page, &options(CaptureMode::Selection)).unwrap_err();
    assert!(matches!(err, Error::EmptySelection));
    assert!(err.to_string().contains("select some content"));
}

#[test]
fn reader_capture_uses_engine_article() {
    let page = Page::new("https://ex.com/blog/post", PAGE_HTML).unwrap();
    let reader = ReaderExtractor::new(BodyEngine);
    let doc = capture_with(&page, &options(CaptureMode::Reader), &reader).unwrap();

    assert_eq!(doc.title, "Engine Title");
    assert!(doc.markdown.starts_with("# Engine Title\n\nhttps://ex.com/blog/post\n"));
    assert!(doc.markdown.ends_with("Hello\n[[[IMG:0]]]\nworld"));
    assert!(!doc.markdown.contains("Menu"));
    assert_eq!(doc.images[0].url, "https://ex.com/a.png");
}

#[test]
fn reader_engine_mutations_do_not_touch_the_page() {
    struct Destructive;
    impl ReadabilityEngine for Destructive {
        fn parse(&self, document: Document, _url: &Url) -> Option<ReadableArticle> {
            document.select("p").remove();
            None
        }
    }

    let page = Page::new("https://ex.com/blog/post", PAGE_HTML).unwrap();
    let err = capture_with(&page, &options(CaptureMode::Reader), &ReaderExtractor::new(Destructive))
        .unwrap_err();
    assert!(matches!(err, Error::NoReaderContent));
    assert!(page.document().select("p").exists());
}

#[cfg(feature = "readability")]
#[test]
fn default_reader_extracts_article_body() {
    let paragraph = "Rust gives you fine-grained control over memory without a garbage \
        collector, and its ownership rules catch whole classes of bugs at compile time. \
        This paragraph is long enough to look like real article prose to a readability \
        scorer, with commas, sentences, and plenty of characters.";
    let html = format!(
        "<html><head><title>Why Rust</title></head><body>\
         <nav><a href=\"/\">Home</a> <a href=\"/about\">About</a></nav>\
         <article><h1>Why Rust</h1><p>{paragraph}</p><p>{paragraph}</p><p>{paragraph}</p><p>{paragraph}</p></article>\
         <footer>Copyright</footer></body></html>"
    );
    let doc = clip("https://ex.com/why-rust", &html, &options(CaptureMode::Reader)).unwrap();

    assert!(doc.markdown.contains("fine-grained control over memory"));
    assert!(doc.markdown.starts_with("# Why Rust\n\nhttps://ex.com/why-rust\n"));
}

#[test]
fn restricted_pages_are_refused() {
    for url in ["chrome://extensions/", "about:blank", "https://chromewebstore.google.com/detail/x"] {
        let err = clip(url, "<p>x</p>", &options(CaptureMode::Reader)).unwrap_err();
        assert!(matches!(err, Error::RestrictedPage(_)), "{url}");
    }
}

#[test]
fn unparseable_url_is_invalid() {
    let err = clip("no scheme here", "<p>x</p>", &Options::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));
}

#[test]
fn document_serializes_with_wire_names() {
    let page = Page::new("https://ex.com/page", PAGE_HTML)
        .unwrap()
        .with_selection(vec![SelectionRange::new("<p>x</p>")]);
    let doc = capture(&page, &options(CaptureMode::Selection)).unwrap();
    let json = serde_json::to_value(&doc).unwrap();

    assert_eq!(json["sourceUrl"], "https://ex.com/page");
    assert_eq!(json["title"], "My Page");
    assert!(json.get("suggestedFolderPath").is_none());
}
