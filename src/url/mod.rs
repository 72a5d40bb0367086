//! URL handling module for Trawl
//!
//! This module provides URL normalization, link resolution and the canonical
//! keys used by the dedup filter.

mod normalize;

pub use normalize::{normalize_url, resolve_link};

use url::Url;

/// Builds the dedup key for a URL
///
/// The key is the lower-cased `host[:port]:path:query` triple. Scheme and
/// fragment are ignored, so `http://` and `https://` variants of a page count
/// as the same URL.
///
/// # Examples
///
/// ```
/// use trawl::url::dedup_key;
/// use url::Url;
///
/// let url = Url::parse("https://Example.com/Page?q=1#top").unwrap();
/// assert_eq!(dedup_key(&url), "example.com:/page:q=1");
/// ```
pub fn dedup_key(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let netloc = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    format!("{}:{}:{}", netloc, url.path(), url.query().unwrap_or_default()).to_lowercase()
}
