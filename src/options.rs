//! Configuration options for capture.
//!
//! The `Options` struct controls which extraction mode runs and pins the
//! values that otherwise come from the environment (the capture time).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which part of a generic page to capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Full-page readability extraction.
    #[default]
    Reader,
    /// Only the user's current selection.
    Selection,
}

/// Configuration options for capture.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use notes_clipper::{CaptureMode, Options};
///
/// let options = Options {
///     mode: CaptureMode::Selection,
///     ..Options::default()
/// };
/// assert_eq!(options.title_max_chars, 80);
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Generic extraction mode. X/Twitter pages ignore it.
    ///
    /// Default: `CaptureMode::Reader`
    pub mode: CaptureMode,

    /// Timestamp written into the envelope's `Captured:` line.
    ///
    /// Default: `None` (the current time)
    pub captured_at: Option<DateTime<Utc>>,

    /// Folder suggested for X/Twitter captures.
    ///
    /// Default: `"Twitter"`
    pub twitter_folder: String,

    /// Maximum length of a derived title, in characters.
    ///
    /// Default: `80`
    pub title_max_chars: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: CaptureMode::Reader,
            captured_at: None,
            twitter_folder: "Twitter".to_string(),
            title_max_chars: crate::title::MAX_TITLE_CHARS,
        }
    }
}

impl Options {
    /// The capture timestamp, falling back to now.
    #[must_use]
    pub fn capture_time(&self) -> DateTime<Utc> {
        self.captured_at.unwrap_or_else(Utc::now)
    }
}
