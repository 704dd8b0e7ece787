//! Error types for notes-clipper.
//!
//! Every capture failure is a variant here; the messages are user-facing and
//! tell the user what to do next.

/// Error type for capture operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reader mode could not find any article content.
    #[error("Reader mode could not extract this page; try capturing a selection instead")]
    NoReaderContent,

    /// Selection mode was used without a usable selection.
    #[error("No selected content detected; select some content first, then retry")]
    EmptySelection,

    /// X/Twitter page that is neither a status nor an article page.
    #[error("Open a tweet (/status/...) or an article (/i/article/...), then retry")]
    UnsupportedTwitterPage,

    /// X/Twitter status page without any rendered posts.
    #[error("No tweets found on this page (try scrolling a bit, then retry)")]
    NoPosts,

    /// Browser-internal page that content can never be read from.
    #[error("This page cannot be captured: {0}")]
    RestrictedPage(String),

    /// Page URL that could not be parsed.
    #[error("Invalid page URL: {0}")]
    InvalidUrl(String),

    /// An image could not be fetched or cached.
    #[error("Image unavailable: {url}: {reason}")]
    ImageUnavailable {
        /// Image URL.
        url: String,
        /// What went wrong.
        reason: String,
    },

    /// Stored payload could not be decoded.
    #[error("Invalid payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Result type alias for capture operations.
pub type Result<T> = std::result::Result<T, Error>;
