//! Notes-app body format and preview documents.
//!
//! The notes app takes one `<div>` per line. Image placeholders are swapped
//! for `<img>` tags pointing at cached copies (via an [`ImageResolver`]) or,
//! when caching is off or fails, for the raw image URL.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::Result;
use crate::note::{FolderRef, NoteRequest};
use crate::render::{escape_html, escape_url};
use crate::result::ImageRef;

/// Fetches and caches images for a note.
pub trait ImageResolver {
    /// Cache the image at `url` and return a reference the notes app can
    /// load (typically a `file://` URL). `referer` is the captured page.
    fn resolve(&self, url: &str, referer: Option<&str>) -> Result<String>;
}

/// Replace each image's placeholder with an `<img>` from `resolver`.
///
/// Images the resolver cannot provide are replaced by their raw URL.
#[must_use]
pub fn replace_image_tokens(
    markdown: &str,
    images: &[ImageRef],
    source_url: Option<&str>,
    resolver: &dyn ImageResolver,
) -> String {
    let mut out = markdown.to_string();
    for image in images {
        let replacement = match resolver.resolve(&image.url, source_url) {
            Ok(src) => format!("<img src=\"{}\">", escape_url(&src)),
            Err(err) => {
                tracing::warn!(url = %image.url, error = %err, "image not cached, keeping URL");
                image.url.clone()
            }
        };
        out = out.replace(&image.placeholder(), &replacement);
    }
    out
}

/// Replace each image's placeholder with its raw URL.
#[must_use]
pub fn replace_tokens_with_urls(markdown: &str, images: &[ImageRef]) -> String {
    images.iter().fold(markdown.to_string(), |out, image| {
        out.replace(&image.placeholder(), &image.url)
    })
}

/// Convert Markdown to the notes app's line-per-`<div>` body.
///
/// Blank lines become `<div><br></div>`, `<img ...>` lines pass through
/// unescaped, leading indentation is kept as `&nbsp;` (tabs count as four
/// spaces) and everything else is escaped.
#[must_use]
pub fn notes_body_html(markdown: &str) -> String {
    markdown
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                return "<div><br></div>".to_string();
            }
            if line.trim_start().starts_with("<img ") && line.trim_end().ends_with('>') {
                return format!("<div>{}</div>", line.trim());
            }
            let rest = line.trim_start_matches([' ', '\t']);
            let indent = &line[..line.len() - rest.len()];
            let indent = indent.replace('\t', "    ").replace(' ', "&nbsp;");
            format!("<div>{indent}{}</div>", escape_html(rest))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap a body fragment in a standalone HTML document.
#[must_use]
pub fn preview_document(title: &str, fragment: &str) -> String {
    let title_line = format!("  <title>{}</title>", escape_html(title));
    [
        "<!doctype html>",
        "<html>",
        "<head>",
        "  <meta charset=\"utf-8\">",
        title_line.as_str(),
        "</head>",
        "<body>",
        fragment,
        "</body>",
        "</html>",
    ]
    .join("\n")
}

/// Render a note request into a preview document.
///
/// Without a resolver, placeholders become raw image URLs.
#[must_use]
pub fn render_preview(request: &NoteRequest, resolver: Option<&dyn ImageResolver>) -> String {
    let markdown = request.markdown.trim();
    let source_url = (!request.source_url.is_empty()).then_some(request.source_url.as_str());

    let markdown = match resolver {
        Some(resolver) => replace_image_tokens(markdown, &request.images, source_url, resolver),
        None => replace_tokens_with_urls(markdown, &request.images),
    };
    preview_document(&request.title, &notes_body_html(&markdown))
}

/// Read a stored payload: either a debug payload wrapping a successful
/// extraction, or a note request directly.
///
/// Missing fields default; a missing or empty title becomes `Untitled`;
/// malformed image entries are skipped.
pub fn parse_payload(json: &str) -> Result<NoteRequest> {
    let (body, folder) = match serde_json::from_str(json)? {
        StoredPayload::Capture { extracted, folder } => (extracted.body, folder),
        StoredPayload::Request(mut body) => {
            let folder = body.folder.take();
            (body, folder)
        }
    };

    let title = Some(body.title)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Untitled".to_string());

    Ok(NoteRequest {
        title,
        source_url: body.source_url,
        markdown: body.markdown,
        images: body.images,
        folder,
        html: None,
    })
}

/// The two payload shapes `render_preview` accepts.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredPayload {
    /// `{ capturedAt, mode, folder, extracted: { ok: true, ... } }`
    Capture {
        extracted: SuccessfulExtraction,
        #[serde(default, deserialize_with = "lenient")]
        folder: Option<FolderRef>,
    },
    /// A note request, or a debug payload whose extraction failed.
    Request(PayloadBody),
}

#[derive(Deserialize)]
struct SuccessfulExtraction {
    #[serde(deserialize_with = "succeeded")]
    #[allow(dead_code)]
    ok: bool,
    #[serde(flatten)]
    body: PayloadBody,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PayloadBody {
    #[serde(deserialize_with = "lenient")]
    title: String,
    #[serde(deserialize_with = "lenient")]
    source_url: String,
    #[serde(deserialize_with = "lenient")]
    markdown: String,
    #[serde(deserialize_with = "well_formed_images")]
    images: Vec<ImageRef>,
    #[serde(deserialize_with = "lenient")]
    folder: Option<FolderRef>,
}

/// Accept only `true`, so a failed extraction falls through to the request
/// shape.
fn succeeded<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    if bool::deserialize(deserializer)? {
        Ok(true)
    } else {
        Err(serde::de::Error::custom("extraction did not succeed"))
    }
}

/// Wrong-typed values read as the default.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn well_formed_images<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<ImageRef>, D::Error> {
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}
