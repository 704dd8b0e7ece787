//! Selection-mode capture.

use super::{Extraction, Extractor};
use crate::convert::html_to_markdown;
use crate::dom;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::page::Page;

/// Extractor for the user's current selection.
///
/// Only the first range counts; a collapsed range or one whose markup is
/// blank is [`Error::EmptySelection`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionExtractor;

impl Extractor for SelectionExtractor {
    fn extract(&self, page: &Page, _options: &Options) -> Result<Extraction> {
        let range = page
            .selection()
            .first()
            .filter(|range| !range.collapsed)
            .ok_or(Error::EmptySelection)?;

        let html = dom::detached_inner_html(&range.html);
        if html.is_empty() {
            return Err(Error::EmptySelection);
        }

        let conversion = html_to_markdown(&html, page.url().as_str());
        Ok(Extraction {
            title: page.title().unwrap_or_else(|| "Untitled".to_string()),
            markdown: conversion.markdown,
            images: conversion.images,
            suggested_folder_path: None,
        })
    }
}
