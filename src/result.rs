//! Result types for capture output.
//!
//! These are the wire types handed to storage and to the native host, so
//! their serialized field names are fixed.

use serde::{Deserialize, Serialize};

/// An image replaced by a placeholder token during conversion.
///
/// The external image collaborator swaps `[[[IMG:<token>]]]` in the Markdown
/// for a cached reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Opaque token, unique within one extraction.
    pub token: String,

    /// Absolute image URL (raw string when it could not be resolved).
    pub url: String,

    /// Alt text from `<img alt="...">`.
    #[serde(default)]
    pub alt: Option<String>,
}

impl ImageRef {
    /// The placeholder text standing in for this image.
    #[must_use]
    pub fn placeholder(&self) -> String {
        placeholder(&self.token)
    }
}

/// Builds the wire-stable placeholder for `token`.
#[must_use]
pub fn placeholder(token: &str) -> String {
    format!("[[[IMG:{token}]]]")
}

/// Result of one capture action.
///
/// Produced once, never mutated afterwards, and persisted verbatim so it can
/// be re-rendered later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDocument {
    /// Page or readability title.
    pub title: String,

    /// Absolute URL of the captured page.
    pub source_url: String,

    /// Enveloped Markdown (header + content).
    pub markdown: String,

    /// Images referenced by placeholders in `markdown`, in token order.
    #[serde(default)]
    pub images: Vec<ImageRef>,

    /// Folder the note should go to when the user has no preference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_folder_path: Option<String>,
}
