//! URL utilities: resolution, X/Twitter URL recognition, CDN rewriting and
//! restricted-page detection.

use url::Url;

/// Hostname of the X/Twitter image CDN.
const TWITTER_IMAGE_HOST: &str = "pbs.twimg.com";

/// URL prefixes the browser never lets an extension read.
const RESTRICTED_PREFIXES: &[&str] = &[
    "chrome://",
    "chrome-extension://",
    "chrome-search://",
    "chrome-untrusted://",
    "devtools://",
    "edge://",
    "about:",
    "view-source:",
    "brave://",
    "https://chrome.google.com/webstore",
    "https://chromewebstore.google.com/",
];

/// Resolve `raw` against `base`.
///
/// Falls back to the raw string (trimmed) when it cannot be resolved, so a
/// malformed URL never fails a whole extraction.
#[must_use]
pub fn to_absolute_url(raw: &str, base: Option<&Url>) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    let resolved = match base {
        Some(base) => base.join(raw),
        None => Url::parse(raw),
    };

    match resolved {
        Ok(url) => url.to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Check whether a hostname belongs to X/Twitter.
#[must_use]
pub fn is_twitter_host(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    host == "twitter.com" || host == "x.com" || host.ends_with(".twitter.com") || host.ends_with(".x.com")
}

/// Handle and id parsed from a `/<handle>/status/<id>` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRef {
    /// Account handle, as written in the URL.
    pub handle: String,
    /// Status id segment.
    pub status_id: String,
}

impl StatusRef {
    /// Parse a status reference out of a URL.
    ///
    /// The handle is the first path segment and must come before `status`.
    #[must_use]
    pub fn parse(url: &Url) -> Option<Self> {
        let parts: Vec<&str> = url
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .collect();
        let status_index = parts.iter().position(|segment| *segment == "status")?;
        if status_index == 0 {
            return None;
        }
        let handle = parts.first()?;
        let status_id = parts.get(status_index + 1)?;
        Some(Self {
            handle: (*handle).to_string(),
            status_id: (*status_id).to_string(),
        })
    }

    /// Case-insensitive handle comparison.
    #[must_use]
    pub fn same_author(&self, other: &Self) -> bool {
        self.handle.eq_ignore_ascii_case(&other.handle)
    }
}

/// Check whether a URL is an X long-form article page.
#[must_use]
pub fn is_article_url(url: &Url) -> bool {
    url.path().contains("/i/article/")
}

/// Ask the X image CDN for the original resolution.
///
/// Sets `name=orig` (replacing the first `name` pair and dropping any others)
/// on `pbs.twimg.com` URLs. Anything else, including unparseable input, is
/// returned unchanged.
#[must_use]
pub fn normalize_twitter_image_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };
    if url.host_str() != Some(TWITTER_IMAGE_HOST) {
        return url.to_string();
    }

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;
    for (key, value) in url.query_pairs() {
        if key == "name" {
            if !replaced {
                pairs.push(("name".to_string(), "orig".to_string()));
                replaced = true;
            }
            continue;
        }
        pairs.push((key.into_owned(), value.into_owned()));
    }
    if !replaced {
        pairs.push(("name".to_string(), "orig".to_string()));
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}

/// Check whether the browser forbids reading this page.
#[must_use]
pub fn is_restricted_url(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    !lower.is_empty() && RESTRICTED_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
}
