//! Compiled regex patterns for normalization, title derivation and rendering.
//!
//! All patterns are compiled once on first use via `LazyLock`.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Image Placeholders
// =============================================================================

/// A line consisting of exactly one image placeholder.
pub static PLACEHOLDER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[\[\[IMG:[^\]\s]+\]\]\]$").expect("PLACEHOLDER_LINE regex")
});

/// A conversion marker left in the DOM before `htmd` runs, with the spaces and
/// at most one newline on either side. Groups: leading whitespace, kind
/// (`I` image, `J` image inside a table row, `T` table), index, trailing
/// whitespace.
pub static CONVERSION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([ \t]*\n?)\x{E000}([IJT])(\d+)\x{E001}(\n?[ \t]*)").expect("CONVERSION_MARKER regex")
});

/// A placeholder wrapped in the link construct left behind by a linked image:
/// `[` + whitespace + placeholder + whitespace + `](target)`.
pub static LINKED_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\s*(\[\[\[IMG:[^\]\s]+\]\]\])\s*\]\([^)]*\)").expect("LINKED_PLACEHOLDER regex")
});

// =============================================================================
// X/Twitter Noise
// =============================================================================

/// The envelope's capture timestamp line, anywhere in the text.
pub static CAPTURED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*Captured:").expect("CAPTURED_LINE regex"));

/// Post analytics links, absolute or path-only.
pub static ANALYTICS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\S*/analytics(?:[/?#]\S*)?$").expect("ANALYTICS_URL regex")
});

/// Thousands-grouped integers such as `12,345`.
pub static GROUPED_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(?:,\d{3})+$").expect("GROUPED_INTEGER regex"));

/// Engagement counters such as `42`, `1.2K` or `3M`.
pub static ENGAGEMENT_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?[KM]?$").expect("ENGAGEMENT_COUNT regex"));

/// Quoted post text inside an X page title: `someone on X: "text" / X`.
pub static ON_X_QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"on X:\s*["\u{201C}]([^"\u{201D}]+)["\u{201D}]"#).expect("ON_X_QUOTED regex")
});

// =============================================================================
// Whitespace and Inline Markdown
// =============================================================================

/// Three or more consecutive newlines.
pub static MULTIPLE_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("MULTIPLE_NEWLINES regex"));

/// Any whitespace run.
pub static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_RUN regex"));

/// Leading ATX heading markers.
pub static HEADING_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#+\s*").expect("HEADING_PREFIX regex"));

/// Inline Markdown link; group 1 is the link text.
pub static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("MARKDOWN_LINK regex"));

/// Bare http(s) URL inside rendered text.
pub static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"'`\[\]]+"#).expect("BARE_URL regex"));

// =============================================================================
// HTML Class Hints
// =============================================================================

/// Code language from `language-xxx` / `lang-xxx` class names.
pub static CODE_LANGUAGE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(?:language|lang)-([A-Za-z0-9_+#.-]+)").expect("CODE_LANGUAGE_CLASS regex")
});
