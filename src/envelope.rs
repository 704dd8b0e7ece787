//! The fixed Markdown header wrapped around captured content.
//!
//! ```text
//! # <title>
//!
//! <source url>
//! Captured: <ISO-8601 UTC, milliseconds>
//!
//! ---
//!
//! <content>
//! ```

use chrono::{DateTime, SecondsFormat, Utc};

/// Wrap `content` in the envelope header, stamped with the current time.
#[must_use]
pub fn envelope(title: &str, source_url: &str, content: &str) -> String {
    envelope_at(title, source_url, content, Utc::now())
}

/// Wrap `content` in the envelope header with an explicit capture time.
///
/// # Example
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use notes_clipper::envelope::envelope_at;
///
/// let at = Utc.with_ymd_and_hms(2026, 2, 3, 0, 0, 0).unwrap();
/// let md = envelope_at("T", "https://ex.com", "  body  ", at);
/// assert_eq!(md, "# T\n\nhttps://ex.com\nCaptured: 2026-02-03T00:00:00.000Z\n\n---\n\nbody");
/// ```
#[must_use]
pub fn envelope_at(
    title: &str,
    source_url: &str,
    content: &str,
    captured_at: DateTime<Utc>,
) -> String {
    let stamp = captured_at.to_rfc3339_opts(SecondsFormat::Millis, true);
    let doc = format!(
        "# {title}\n\n{source_url}\nCaptured: {stamp}\n\n---\n\n{}",
        content.trim()
    );
    doc.trim().to_string()
}
