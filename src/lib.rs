//! # notes-clipper
//!
//! Web clipper core: turns a page (article body, user selection or an
//! X/Twitter thread) into Markdown with image placeholders, and turns that
//! Markdown back into a clean title and a note-ready HTML preview.
//!
//! ## Quick Start
//!
//! ```rust
//! use notes_clipper::{CaptureMode, Options};
//! use notes_clipper::page::SelectionRange;
//!
//! let html = r#"<html><head><title>My Page</title></head>
//! <body><p>Hello <img src="/a.png"> world</p></body></html>"#;
//!
//! let options = Options { mode: CaptureMode::Selection, ..Options::default() };
//! let page = notes_clipper::page::Page::new("https://ex.com/page", html)?
//!     .with_selection(vec![SelectionRange::new(r#"<p>Hello <img src="/a.png"> world</p>"#)]);
//! let doc = notes_clipper::extractor::capture(&page, &options)?;
//!
//! assert_eq!(doc.images[0].url, "https://ex.com/a.png");
//! assert!(doc.markdown.contains("[[[IMG:0]]]"));
//! # Ok::<(), notes_clipper::Error>(())
//! ```
//!
//! ## Pipeline
//!
//! - **Capture**: [`extractor`] picks a strategy from the URL and produces an
//!   [`ExtractedDocument`] whose Markdown carries the [`envelope`] header.
//! - **Normalize**: [`normalize`] strips conversion artifacts and X/Twitter UI
//!   debris; it is idempotent.
//! - **Present**: [`title`] derives a display title, [`render`] produces
//!   inline-styled HTML, [`preview`] produces the notes app's body format.
//!
//! Image placeholders (`[[[IMG:<token>]]]`) are resolved outside this crate,
//! through [`preview::ImageResolver`].

mod error;
mod options;
mod patterns;
mod result;

/// DOM helpers over `dom_query`.
pub mod dom;

/// Character encoding detection and transcoding.
pub mod encoding;

/// URL resolution, X/Twitter URL parsing and restricted-page detection.
pub mod url_utils;

/// HTML to Markdown conversion with image tokenization.
pub mod convert;

/// Page snapshots.
pub mod page;

/// Capture strategies (X/Twitter, reader, selection).
pub mod extractor;

/// Markdown envelope header.
pub mod envelope;

/// Markdown normalization.
pub mod normalize;

/// Display-title derivation.
pub mod title;

/// Markdown to styled HTML.
pub mod render;

/// Notes-app body format and preview documents.
pub mod preview;

/// Note-creation requests and debug payloads.
pub mod note;

// Public API - re-exports
pub use error::{Error, Result};
pub use options::{CaptureMode, Options};
pub use result::{placeholder, ExtractedDocument, ImageRef};

/// Captures a page given its URL and HTML, using the options' mode.
///
/// Reader mode needs the `readability` feature (enabled by default); without
/// it every generic reader-mode capture fails with
/// [`Error::NoReaderContent`].
///
/// # Example
///
/// ```rust
/// use notes_clipper::{clip, Error, Options};
///
/// let html = "<html><body><article><p>Text</p></article></body></html>";
/// let err = clip("https://x.com/home", html, &Options::default()).unwrap_err();
/// assert!(matches!(err, Error::UnsupportedTwitterPage));
/// ```
pub fn clip(url: &str, html: &str, options: &Options) -> Result<ExtractedDocument> {
    let page = page::Page::new(url, html)?;
    extractor::capture(&page, options)
}

/// Captures a page from raw HTML bytes with automatic encoding detection.
///
/// The charset comes from `<meta charset>` or an http-equiv Content-Type
/// declaration and defaults to UTF-8. Invalid sequences become U+FFFD.
pub fn clip_bytes(url: &str, html: &[u8], options: &Options) -> Result<ExtractedDocument> {
    let page = page::Page::from_bytes(url, html)?;
    extractor::capture(&page, options)
}
