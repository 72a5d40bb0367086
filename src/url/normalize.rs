use crate::UrlError;
use url::Url;

/// Normalizes a URL before it enters the frontier
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only `http` and `https`
/// 3. Require a host
/// 4. Remove fragment (everything after #)
///
/// The query is kept as written so the renderer visits the URL it was given.
/// Canonicalization for duplicate detection happens in [`dedup_key`].
///
/// [`dedup_key`]: crate::url::dedup_key
///
/// # Examples
///
/// ```
/// use trawl::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.com/list/?b=2&a=1&utm_source=x#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/list/?b=2&a=1&utm_source=x");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url)
}

/// Resolves an anchor href against the page it was found on
///
/// Returns None if the link should not be followed:
/// - empty or fragment-only hrefs
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - hrefs that fail to resolve or normalize
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    normalize_url(absolute.as_str()).ok()
}
