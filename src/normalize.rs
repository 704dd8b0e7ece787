//! Markdown normalization.
//!
//! Strips conversion artifacts and X/Twitter UI debris from enveloped
//! Markdown before it is rendered or mined for a title. The result is a
//! fixpoint: normalizing normalized text returns it unchanged.

use crate::patterns::{
    ANALYTICS_URL, CAPTURED_LINE, ENGAGEMENT_COUNT, GROUPED_INTEGER, LINKED_PLACEHOLDER,
    MULTIPLE_NEWLINES,
};

/// How far into the text the `on X:` marker is looked for.
const X_MARKER_WINDOW: usize = 2000;

/// Lines that are pure X/Twitter UI chrome.
const UI_NOISE: &[&str] = &["Article", "Relevant", "View quotes", "Views"];

/// Caption labels some sites print above a code block.
pub const LANGUAGE_LABELS: &[&str] = &[
    "bash", "shell", "sh", "zsh", "json", "yaml", "yml", "js", "ts", "javascript", "typescript",
    "python", "py", "html", "css", "sql",
];

/// Normalize enveloped Markdown.
///
/// # Example
///
/// ```rust
/// use notes_clipper::normalize::normalize_markdown;
///
/// let md = "Intro\r\n\r\n[\n[[[IMG:0]]]\n](https://ex.com/a)\n\n\n\nOutro";
/// assert_eq!(normalize_markdown(md), "Intro\n\n[[[IMG:0]]]\n\nOutro");
/// ```
#[must_use]
pub fn normalize_markdown(markdown: &str) -> String {
    // Every rule only removes text, so repeating the pass terminates.
    let mut current = normalize_once(markdown);
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// One ordered pass over the rules.
fn normalize_once(markdown: &str) -> String {
    let text = markdown.replace("\r\n", "\n").replace('\r', "\n");
    let text = LINKED_PLACEHOLDER.replace_all(&text, "$1");
    let text = if is_x_capture(&text) {
        strip_x_envelope(&text)
    } else {
        text.into_owned()
    };

    let kept: Vec<&str> = text.lines().filter(|line| !is_noise_line(line)).collect();
    let kept = drop_language_labels(&kept);

    MULTIPLE_NEWLINES
        .replace_all(&kept.join("\n"), "\n\n")
        .trim()
        .to_string()
}

/// Enveloped X capture: an x.com link, a `Captured:` line and `on X:` near
/// the top.
fn is_x_capture(text: &str) -> bool {
    if !text.contains("https://x.com/") || !CAPTURED_LINE.is_match(text) {
        return false;
    }
    let window_end = text
        .char_indices()
        .nth(X_MARKER_WINDOW)
        .map_or(text.len(), |(index, _)| index);
    text[..window_end].contains("on X:")
}

/// Keep only what sits between the first and second `---` lines.
fn strip_x_envelope(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let Some(first) = lines.iter().position(|line| is_separator(line)) else {
        return text.to_string();
    };

    let mut start = first + 1;
    while start < lines.len() && lines[start].trim().is_empty() {
        start += 1;
    }
    let end = lines[start..]
        .iter()
        .position(|line| is_separator(line))
        .map_or(lines.len(), |offset| start + offset);

    lines[start..end].join("\n")
}

fn is_separator(line: &str) -> bool {
    line.trim() == "---"
}

fn is_noise_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed == "["
        || trimmed == "]"
        || trimmed == "\u{b7}"
        || trimmed.starts_with("Captured:")
        || ANALYTICS_URL.is_match(trimmed)
        || UI_NOISE.contains(&trimmed)
        || GROUPED_INTEGER.is_match(trimmed)
        || ENGAGEMENT_COUNT.is_match(trimmed)
}

fn is_language_label(line: &str) -> bool {
    let trimmed = line.trim();
    LANGUAGE_LABELS
        .iter()
        .any(|label| label.eq_ignore_ascii_case(trimmed))
}

/// Drop a language label whose next non-blank line opens a fence.
fn drop_language_labels<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut out = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        if is_language_label(line) {
            let opens_fence = lines[index + 1..]
                .iter()
                .find(|next| !next.trim().is_empty())
                .is_some_and(|next| next.trim().starts_with("```"));
            if opens_fence {
                continue;
            }
        }
        out.push(*line);
    }
    out
}
