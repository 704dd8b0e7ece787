//! Note-creation requests and the stored debug payload.
//!
//! These are the shapes handed to the native host that files a capture into
//! the notes app; field names are fixed by that boundary.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::options::CaptureMode;
use crate::render::render_markdown_to_html;
use crate::result::{ExtractedDocument, ImageRef};
use crate::title::derive_title_with_limit;

/// A folder in a notes account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRef {
    /// Account name; empty means the app's default account.
    #[serde(default)]
    pub account_name: String,
    /// Slash-separated folder path.
    #[serde(default)]
    pub folder_path: String,
}

impl FolderRef {
    /// A folder in the default account.
    #[must_use]
    pub fn in_default_account(folder_path: impl Into<String>) -> Self {
        Self {
            account_name: String::new(),
            folder_path: folder_path.into(),
        }
    }
}

/// Stored folder preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderSettings {
    /// Always ask; never pick a folder automatically.
    #[serde(default)]
    pub ask_every_time: bool,
    /// Folder used when the user made no choice for this capture.
    #[serde(default)]
    pub default_folder: Option<FolderRef>,
}

/// Pick the folder for a capture.
///
/// An explicit choice wins. Otherwise nothing is picked when the user asks
/// every time; then the saved default, then the extractor's suggestion in the
/// default account.
#[must_use]
pub fn choose_folder(
    explicit: Option<FolderRef>,
    settings: &FolderSettings,
    suggested: Option<&str>,
) -> Option<FolderRef> {
    if explicit.is_some() {
        return explicit;
    }
    if settings.ask_every_time {
        return None;
    }
    settings
        .default_folder
        .clone()
        .or_else(|| suggested.map(FolderRef::in_default_account))
}

/// Request to create one note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRequest {
    /// Note title.
    pub title: String,
    /// Page the content came from.
    #[serde(default)]
    pub source_url: String,
    /// Enveloped Markdown with image placeholders.
    #[serde(default)]
    pub markdown: String,
    /// Images to cache and substitute for their placeholders.
    #[serde(default)]
    pub images: Vec<ImageRef>,
    /// Target folder; `None` lets the host decide.
    #[serde(default)]
    pub folder: Option<FolderRef>,
    /// Rendered preview HTML, when rendering succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl NoteRequest {
    /// Build the request for a captured document.
    ///
    /// The title is re-derived from the Markdown (at most `title_max_chars`
    /// characters) and falls back to the extracted title; the preview HTML is
    /// rendered up front.
    #[must_use]
    pub fn from_document(
        doc: &ExtractedDocument,
        folder: Option<FolderRef>,
        title_max_chars: usize,
    ) -> Self {
        let derived = derive_title_with_limit(&doc.markdown, &doc.title, title_max_chars);
        let title = if derived.is_empty() {
            doc.title.clone()
        } else {
            derived
        };

        Self {
            title,
            source_url: doc.source_url.clone(),
            markdown: doc.markdown.clone(),
            images: doc.images.clone(),
            folder,
            html: Some(render_markdown_to_html(&doc.markdown)),
        }
    }
}

/// The last capture, kept for re-rendering and debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugPayload {
    /// When the capture happened, ISO-8601.
    pub captured_at: String,
    /// Generic capture mode in effect.
    pub mode: CaptureMode,
    /// Folder chosen for the note.
    pub folder: Option<FolderRef>,
    /// The successful extraction.
    pub extracted: DebugExtraction,
}

/// A successful extraction as stored in a [`DebugPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugExtraction {
    /// Always `true`; failed captures are not stored.
    pub ok: bool,
    /// The captured document.
    #[serde(flatten)]
    pub document: ExtractedDocument,
}

impl DebugPayload {
    /// Record a successful capture.
    #[must_use]
    pub fn new(
        document: ExtractedDocument,
        mode: CaptureMode,
        folder: Option<FolderRef>,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            captured_at: captured_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            mode,
            folder,
            extracted: DebugExtraction { ok: true, document },
        }
    }
}
