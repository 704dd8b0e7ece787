//! Page snapshots handed to the extractors.
//!
//! A [`Page`] is one frozen view of a browser tab: its URL, its parsed DOM and
//! the user's selection ranges at capture time.

use dom_query::Document;
use url::Url;

use crate::encoding::transcode_to_utf8;
use crate::error::{Error, Result};

/// One selection range, serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionRange {
    /// Markup of the range's cloned contents.
    pub html: String,
    /// Whether the range is collapsed (a caret, not a selection).
    pub collapsed: bool,
}

impl SelectionRange {
    /// A non-collapsed range over `html`.
    #[must_use]
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            collapsed: false,
        }
    }

    /// A caret position.
    #[must_use]
    pub fn collapsed() -> Self {
        Self {
            html: String::new(),
            collapsed: true,
        }
    }
}

/// A captured page.
pub struct Page {
    url: Url,
    document: Document,
    selection: Vec<SelectionRange>,
}

impl Page {
    /// Parse a page from its URL and HTML.
    pub fn new(url: &str, html: &str) -> Result<Self> {
        let url = Url::parse(url.trim()).map_err(|_| Error::InvalidUrl(url.to_string()))?;
        Ok(Self {
            url,
            document: Document::from(html),
            selection: Vec::new(),
        })
    }

    /// Parse a page from raw bytes, honoring the declared charset.
    pub fn from_bytes(url: &str, html: &[u8]) -> Result<Self> {
        Self::new(url, &transcode_to_utf8(html))
    }

    /// Attach the selection ranges, in document order.
    #[must_use]
    pub fn with_selection(mut self, ranges: Vec<SelectionRange>) -> Self {
        self.selection = ranges;
        self
    }

    /// The page URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The page DOM.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Selection ranges, possibly empty.
    #[must_use]
    pub fn selection(&self) -> &[SelectionRange] {
        &self.selection
    }

    /// The document `<title>`, if any.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        crate::dom::document_title(&self.document)
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("url", &self.url.as_str())
            .field("selection", &self.selection.len())
            .finish_non_exhaustive()
    }
}
