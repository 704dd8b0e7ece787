//! X/Twitter capture.
//!
//! Status pages become a thread: every rendered post by the opened status's
//! author, in page order, each followed by its media and permalink. Article
//! pages (`/i/article/...`) are converted as a single body.

use std::collections::HashSet;

use dom_query::Selection;
use url::Url;

use super::{Extraction, Extractor};
use crate::convert::{html_to_markdown, html_to_markdown_with, TokenSequence};
use crate::dom;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::page::Page;
use crate::result::ImageRef;
use crate::url_utils::{
    is_article_url, normalize_twitter_image_url, to_absolute_url, StatusRef,
};

/// Token prefix for images found in posts.
const TOKEN_PREFIX: &str = "twimg-";

/// URL fragments marking avatars and emoji rather than post media.
const NON_MEDIA_MARKERS: &[&str] = &["profile_images", "/emoji/"];

const POST_SELECTOR: &str = "article";
const POST_TEXT_SELECTOR: &str = r#"[data-testid="tweetText"]"#;
const POST_PHOTO_SELECTOR: &str = r#"[data-testid="tweetPhoto"] img"#;
const PERMALINK_SELECTOR: &str = r#"a[href*="/status/"]"#;

/// Extractor for X/Twitter pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwitterExtractor;

impl Extractor for TwitterExtractor {
    fn extract(&self, page: &Page, options: &Options) -> Result<Extraction> {
        let status = StatusRef::parse(page.url());

        if status.is_none() && is_article_url(page.url()) {
            return Ok(extract_article(page, options));
        }
        let Some(status) = status else {
            return Err(Error::UnsupportedTwitterPage);
        };

        extract_thread(page, &status, options)
    }
}

fn extract_article(page: &Page, options: &Options) -> Extraction {
    let doc = page.document();
    let root = [doc.select("article"), doc.select("main"), doc.select("body")]
        .into_iter()
        .find(|sel| sel.exists())
        .map(|sel| sel.first());
    let html = root.map(|sel| dom::inner_html(&sel)).unwrap_or_default();

    let conversion = html_to_markdown(&html, page.url().as_str());
    tracing::debug!(images = conversion.images.len(), "converted X article");

    Extraction {
        title: page.title().unwrap_or_else(|| "X Article".to_string()),
        markdown: conversion.markdown,
        images: conversion.images,
        suggested_folder_path: Some(options.twitter_folder.clone()),
    }
}

fn extract_thread(page: &Page, status: &StatusRef, options: &Options) -> Result<Extraction> {
    let posts: Vec<Selection> = dom::elements(&page.document().select(POST_SELECTOR))
        .filter(dom::has_text)
        .collect();
    if posts.is_empty() {
        return Err(Error::NoPosts);
    }

    let by_author: Vec<&Selection> = posts
        .iter()
        .filter(|post| {
            permalink(post, page.url())
                .and_then(|link| StatusRef::parse(&link))
                .is_some_and(|link| link.same_author(status))
        })
        .collect();
    let thread = if by_author.is_empty() {
        tracing::debug!(handle = %status.handle, "no posts by author, keeping all posts");
        posts.iter().collect()
    } else {
        by_author
    };
    tracing::debug!(posts = posts.len(), thread = thread.len(), "collected thread");

    let mut tokens = TokenSequence::prefixed(TOKEN_PREFIX);
    let mut blocks = Vec::with_capacity(thread.len());
    let mut images = Vec::new();
    for post in thread {
        let (block, post_images) = post_block(post, page.url(), &mut tokens);
        blocks.push(block);
        images.extend(post_images);
    }

    Ok(Extraction {
        title: page
            .title()
            .unwrap_or_else(|| format!("@{} thread", status.handle)),
        markdown: blocks.join("\n\n").trim().to_string(),
        images,
        suggested_folder_path: Some(options.twitter_folder.clone()),
    })
}

/// Render one post: text, media placeholders, permalink, separator.
fn post_block(post: &Selection, page_url: &Url, tokens: &mut TokenSequence) -> (String, Vec<ImageRef>) {
    let text_region = post.select(POST_TEXT_SELECTOR);
    let text_region = if text_region.exists() {
        text_region.first()
    } else {
        post.clone()
    };

    let mut conversion = html_to_markdown_with(
        &dom::inner_html(&text_region),
        page_url.as_str(),
        tokens,
        &is_non_media_url,
    );
    for image in &mut conversion.images {
        image.url = normalize_twitter_image_url(&image.url);
    }

    let mut seen: HashSet<String> = conversion.images.iter().map(|i| i.url.clone()).collect();
    let mut media = Vec::new();
    for (url, alt) in media_images(post, page_url) {
        if seen.insert(url.clone()) {
            media.push(ImageRef {
                token: tokens.next_token(),
                url,
                alt,
            });
        }
    }

    let link = permalink(post, page_url).map_or_else(|| page_url.to_string(), |u| u.to_string());

    let mut lines = vec![conversion.markdown.trim().to_string(), String::new()];
    if !media.is_empty() {
        lines.extend(media.iter().map(ImageRef::placeholder));
        lines.push(String::new());
    }
    lines.extend([link, String::new(), "---".to_string()]);

    let mut images = conversion.images;
    images.extend(media);
    (lines.join("\n"), images)
}

/// Media images of a post: photo containers first, else every image.
///
/// Returns absolute, original-size URLs with their alt text.
fn media_images(post: &Selection, page_url: &Url) -> Vec<(String, Option<String>)> {
    let photos = post.select(POST_PHOTO_SELECTOR);
    let candidates = if photos.exists() {
        photos
    } else {
        post.select("img")
    };

    dom::elements(&candidates)
        .filter_map(|img| {
            let src = dom::attr(&img, "src")?;
            if is_non_media_url(&src) {
                return None;
            }
            let url = normalize_twitter_image_url(&to_absolute_url(&src, Some(page_url)));
            Some((url, dom::attr(&img, "alt")))
        })
        .collect()
}

fn is_non_media_url(url: &str) -> bool {
    url.starts_with("data:") || NON_MEDIA_MARKERS.iter().any(|marker| url.contains(marker))
}

/// The post's own permalink, resolved against the page.
fn permalink(post: &Selection, page_url: &Url) -> Option<Url> {
    let href = dom::attr(&post.select(PERMALINK_SELECTOR).first(), "href")?;
    page_url.join(&href).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_avatars_emoji_and_data_urls() {
        assert!(is_non_media_url("https://pbs.twimg.com/profile_images/1/a.jpg"));
        assert!(is_non_media_url("https://abs-0.twimg.com/emoji/v2/svg/1f600.svg"));
        assert!(is_non_media_url("data:image/png;base64,AAAA"));
        assert!(!is_non_media_url("https://pbs.twimg.com/media/abc?format=jpg"));
    }

    #[test]
    fn block_layout_without_media() {
        let doc = dom::Document::from(
            r#"<article><div data-testid="tweetText"><span>Just text</span></div>
               <a href="/alice/status/9">time</a></article>"#,
        );
        let post = doc.select("article");
        let page_url = Url::parse("https://x.com/alice/status/9").unwrap();
        let mut tokens = TokenSequence::prefixed(TOKEN_PREFIX);

        let (block, images) = post_block(&post, &page_url, &mut tokens);
        assert_eq!(block, "Just text\n\nhttps://x.com/alice/status/9\n\n---");
        assert!(images.is_empty());
    }

    #[test]
    fn media_placeholder_uses_token() {
        let image = ImageRef {
            token: "twimg-0".to_string(),
            ..ImageRef::default()
        };
        assert_eq!(image.placeholder(), "[[[IMG:twimg-0]]]");
    }
}
