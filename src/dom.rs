//! DOM helpers over `dom_query`.
//!
//! Thin wrappers that give the extractors and the converter one vocabulary
//! for attributes, tag names, text and markup.

pub use dom_query::{Document, NodeRef, Selection};

/// Get an attribute value, trimmed; empty values count as missing.
#[must_use]
pub fn attr(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get the tag name (lowercase).
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    sel.nodes()
        .first()
        .and_then(dom_query::NodeRef::node_name)
        .map(|t| t.to_ascii_lowercase())
}

/// Get the inner HTML of the first node in the selection.
#[inline]
#[must_use]
pub fn inner_html(sel: &Selection) -> String {
    sel.inner_html().to_string()
}

/// Check whether an element renders any non-whitespace text.
#[must_use]
pub fn has_text(sel: &Selection) -> bool {
    !sel.text().trim().is_empty()
}

/// The document's `<title>`, trimmed, if non-empty.
#[must_use]
pub fn document_title(doc: &Document) -> Option<String> {
    let title = doc.select("head title").text();
    let title = if title.trim().is_empty() {
        doc.select("title").text()
    } else {
        title
    };
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Deep-copy a document by re-parsing its markup.
#[must_use]
pub fn clone_document(doc: &Document) -> Document {
    Document::from(doc.html().to_string())
}

/// Parse a markup fragment into a detached container and re-serialize its
/// inner markup.
///
/// This is what copying a selection range into a scratch `<div>` does in a
/// browser: unbalanced tags get closed and the result is trimmed.
#[must_use]
pub fn detached_inner_html(fragment: &str) -> String {
    let doc = Document::from(format!("<html><body>{fragment}</body></html>"));
    doc.select("body").inner_html().trim().to_string()
}

/// Iterate selected elements in document order as single-node selections.
pub fn elements<'a>(sel: &Selection<'a>) -> impl Iterator<Item = Selection<'a>> + 'a {
    sel.nodes().to_vec().into_iter().map(Selection::from)
}
