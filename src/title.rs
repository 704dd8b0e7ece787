//! Display-title derivation from enveloped Markdown.

use crate::normalize::normalize_markdown;
use crate::patterns::{HEADING_PREFIX, MARKDOWN_LINK, ON_X_QUOTED, PLACEHOLDER_LINE, WHITESPACE_RUN};

/// Longest title handed to the notes app, in characters.
pub const MAX_TITLE_CHARS: usize = 80;

/// Marker appended to a truncated title.
const ELLIPSIS: char = '\u{2026}';

/// Derive a display title, at most [`MAX_TITLE_CHARS`] characters long.
///
/// Returns an empty string when neither the Markdown nor the fallback yields
/// anything; callers then keep the extracted title.
///
/// # Example
///
/// ```rust
/// use notes_clipper::title::derive_title;
///
/// let md = "[[[IMG:0]]]\n\n## The [real](https://ex.com) title";
/// assert_eq!(derive_title(md, "fallback"), "The real title");
/// ```
#[must_use]
pub fn derive_title(markdown: &str, fallback: &str) -> String {
    derive_title_with_limit(markdown, fallback, MAX_TITLE_CHARS)
}

/// [`derive_title`] with an explicit character limit.
#[must_use]
pub fn derive_title_with_limit(markdown: &str, fallback: &str, max_chars: usize) -> String {
    let normalized = normalize_markdown(markdown);

    let candidate = normalized
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !PLACEHOLDER_LINE.is_match(line))
        .map(clean_line)
        .find(|cleaned| !cleaned.is_empty())
        .unwrap_or_else(|| title_from_fallback(fallback));

    truncate(&candidate, max_chars)
}

/// Quoted post text from an `... on X: "text" / X` page title, else the
/// cleaned fallback itself.
fn title_from_fallback(fallback: &str) -> String {
    ON_X_QUOTED
        .captures(fallback)
        .and_then(|c| c.get(1))
        .map(|m| clean_line(m.as_str()))
        .filter(|quoted| !quoted.is_empty())
        .unwrap_or_else(|| clean_line(fallback))
}

/// Strip heading markers and link syntax, collapse whitespace.
fn clean_line(line: &str) -> String {
    let line = HEADING_PREFIX.replace(line, "");
    let line = MARKDOWN_LINK.replace_all(&line, "$1");
    WHITESPACE_RUN.replace_all(&line, " ").trim().to_string()
}

fn truncate(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        return title.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut cut: String = title.chars().take(max_chars - 1).collect();
    cut.truncate(cut.trim_end().len());
    cut.push(ELLIPSIS);
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_placeholder_lines() {
        assert_eq!(derive_title("[[[IMG:0]]]\n\nHello", ""), "Hello");
    }

    #[test]
    fn skips_lines_that_clean_to_nothing() {
        assert_eq!(derive_title("#\n\nSecond", ""), "Second");
    }

    #[test]
    fn uses_quoted_x_fallback() {
        assert_eq!(
            derive_title("", "(3) someone on X: \"Quoted text\" / X"),
            "Quoted text"
        );
        assert_eq!(
            derive_title("", "someone on X: \u{201c}Curly\u{201d} / X"),
            "Curly"
        );
    }

    #[test]
    fn cleans_plain_fallback() {
        assert_eq!(derive_title("", "  # Page   title "), "Page title");
        assert_eq!(derive_title("", ""), "");
    }

    #[test]
    fn truncates_on_char_boundary() {
        let long = "\u{e9}".repeat(100);
        let title = derive_title(&long, "");
        assert_eq!(title.chars().count(), MAX_TITLE_CHARS);
        assert!(title.ends_with(ELLIPSIS));
    }

    #[test]
    fn short_title_is_not_truncated() {
        assert_eq!(derive_title_with_limit("abcdef", "", 6), "abcdef");
        assert_eq!(derive_title_with_limit("abcdefg", "", 6), "abcde\u{2026}");
    }
}
