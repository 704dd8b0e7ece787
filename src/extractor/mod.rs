//! Capture strategies and the capture entry point.
//!
//! # Module Structure
//!
//! - `twitter`: X/Twitter status threads and long-form articles
//! - `reader`: full-page readability extraction
//! - `selection`: the user's current selection
//!
//! A page is classified from its URL alone ([`classify`]); the matching
//! [`Extractor`] produces an [`Extraction`], which [`capture`] wraps in the
//! Markdown envelope.
//!
//! # Usage
//!
//! ```rust
//! use notes_clipper::extractor::capture;
//! use notes_clipper::page::{Page, SelectionRange};
//! use notes_clipper::{CaptureMode, Options};
//!
//! let page = Page::new("https://ex.com/post", "<html><body><p>Hi</p></body></html>")?
//!     .with_selection(vec![SelectionRange::new("<p>Hello <b>there</b></p>")]);
//! let options = Options { mode: CaptureMode::Selection, ..Options::default() };
//!
//! let doc = capture(&page, &options)?;
//! assert!(doc.markdown.ends_with("Hello **there**"));
//! # Ok::<(), notes_clipper::Error>(())
//! ```

pub mod reader;
pub mod selection;
pub mod twitter;

use chrono::{DateTime, Utc};
use url::Url;

use crate::envelope::envelope_at;
use crate::error::{Error, Result};
use crate::options::{CaptureMode, Options};
use crate::page::Page;
use crate::result::{ExtractedDocument, ImageRef};
use crate::url_utils::{is_restricted_url, is_twitter_host};

pub use reader::{ReadabilityEngine, ReadableArticle, ReaderExtractor};
pub use selection::SelectionExtractor;
pub use twitter::TwitterExtractor;

/// Content pulled out of a page, before the envelope is added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Title for the envelope header.
    pub title: String,
    /// Raw extracted Markdown with image placeholders.
    pub markdown: String,
    /// One entry per placeholder.
    pub images: Vec<ImageRef>,
    /// Folder the note should go to, if the strategy has an opinion.
    pub suggested_folder_path: Option<String>,
}

impl Extraction {
    /// Wrap the Markdown in the envelope and produce the final document.
    #[must_use]
    pub fn into_document(self, source_url: &str, captured_at: DateTime<Utc>) -> ExtractedDocument {
        ExtractedDocument {
            markdown: envelope_at(&self.title, source_url, &self.markdown, captured_at),
            title: self.title,
            source_url: source_url.to_string(),
            images: self.images,
            suggested_folder_path: self.suggested_folder_path,
        }
    }
}

/// A capture strategy.
pub trait Extractor {
    /// Extract content from `page`.
    fn extract(&self, page: &Page, options: &Options) -> Result<Extraction>;
}

/// Which strategy a page gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Browser-internal page; nothing can be captured.
    Restricted,
    /// X/Twitter host.
    Twitter,
    /// Anything else.
    Generic,
}

/// Classify a page by its URL.
#[must_use]
pub fn classify(url: &Url) -> PageKind {
    if is_restricted_url(url.as_str()) {
        PageKind::Restricted
    } else if url.host_str().is_some_and(is_twitter_host) {
        PageKind::Twitter
    } else {
        PageKind::Generic
    }
}

/// Capture a page with the default readability engine.
pub fn capture(page: &Page, options: &Options) -> Result<ExtractedDocument> {
    capture_with(page, options, &ReaderExtractor::<reader::DefaultEngine>::default())
}

/// Capture a page, using `reader` for reader mode.
pub fn capture_with<E: ReadabilityEngine>(
    page: &Page,
    options: &Options,
    reader: &ReaderExtractor<E>,
) -> Result<ExtractedDocument> {
    let kind = classify(page.url());
    tracing::debug!(url = %page.url(), ?kind, mode = ?options.mode, "capturing page");

    let extraction = match kind {
        PageKind::Restricted => {
            tracing::warn!(url = %page.url(), "restricted page");
            return Err(Error::RestrictedPage(page.url().to_string()));
        }
        PageKind::Twitter => TwitterExtractor.extract(page, options),
        PageKind::Generic => match options.mode {
            CaptureMode::Reader => reader.extract(page, options),
            CaptureMode::Selection => SelectionExtractor.extract(page, options),
        },
    };

    let extraction = extraction.inspect_err(|err| {
        tracing::warn!(url = %page.url(), error = %err, "capture failed");
    })?;
    tracing::debug!(
        title = %extraction.title,
        images = extraction.images.len(),
        "capture succeeded"
    );

    Ok(extraction.into_document(page.url().as_str(), options.capture_time()))
}
