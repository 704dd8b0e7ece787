//! Reader-mode capture.
//!
//! The page is cloned and handed to a [`ReadabilityEngine`]; the engine's
//! article HTML is converted to Markdown. The default engine is
//! `dom_smoothie`, available with the `readability` feature.

use dom_query::Document;
use url::Url;

use super::{Extraction, Extractor};
use crate::convert::html_to_markdown;
use crate::dom;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::page::Page;

/// Title used when neither the engine nor the page has one.
const UNTITLED: &str = "Untitled";

/// Article found by a readability engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadableArticle {
    /// Article title, if the engine found one.
    pub title: Option<String>,
    /// Cleaned article markup.
    pub content_html: String,
}

/// A readability algorithm.
pub trait ReadabilityEngine {
    /// Find the main article in `document`, which the engine owns and may
    /// mutate. `None` when there is no article.
    fn parse(&self, document: Document, url: &Url) -> Option<ReadableArticle>;
}

/// Readability engine backed by `dom_smoothie`.
#[cfg(feature = "readability")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothieReadability;

#[cfg(feature = "readability")]
impl ReadabilityEngine for SmoothieReadability {
    fn parse(&self, document: Document, url: &Url) -> Option<ReadableArticle> {
        use dom_smoothie::Readability;

        let mut reader = Readability::with_document(document, Some(url.as_str()), None)
            .inspect_err(|err| tracing::debug!(error = %err, "readability setup failed"))
            .ok()?;
        let article = reader
            .parse()
            .inspect_err(|err| tracing::debug!(error = %err, "readability parse failed"))
            .ok()?;

        let title = article.title.trim().to_string();
        Some(ReadableArticle {
            title: (!title.is_empty()).then_some(title),
            content_html: article.content.to_string(),
        })
    }
}

/// Engine used when the crate is built without `readability`: never finds
/// an article.
#[cfg(not(feature = "readability"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReadability;

#[cfg(not(feature = "readability"))]
impl ReadabilityEngine for NoReadability {
    fn parse(&self, _document: Document, _url: &Url) -> Option<ReadableArticle> {
        None
    }
}

/// The engine [`ReaderExtractor::default`] uses.
#[cfg(feature = "readability")]
pub type DefaultEngine = SmoothieReadability;

/// The engine [`ReaderExtractor::default`] uses.
#[cfg(not(feature = "readability"))]
pub type DefaultEngine = NoReadability;

/// Extractor for reader mode.
#[derive(Debug, Clone, Default)]
pub struct ReaderExtractor<E = DefaultEngine> {
    engine: E,
}

impl<E: ReadabilityEngine> ReaderExtractor<E> {
    /// Use a specific engine.
    pub fn new(engine: E) -> Self {
        Self { engine }
    }
}

impl<E: ReadabilityEngine> Extractor for ReaderExtractor<E> {
    fn extract(&self, page: &Page, _options: &Options) -> Result<Extraction> {
        let clone = dom::clone_document(page.document());
        let article = self
            .engine
            .parse(clone, page.url())
            .filter(|article| !article.content_html.trim().is_empty())
            .ok_or(Error::NoReaderContent)?;

        let title = article
            .title
            .or_else(|| page.title())
            .unwrap_or_else(|| UNTITLED.to_string());
        let conversion = html_to_markdown(&article.content_html, page.url().as_str());

        Ok(Extraction {
            title,
            markdown: conversion.markdown,
            images: conversion.images,
            suggested_folder_path: None,
        })
    }
}
