//! Static HTTP page renderer
//!
//! This renderer fetches pages with reqwest and inspects them with scraper.
//! It has no DOM to act on, so:
//! - scrolling is accepted and does nothing
//! - clicks and input report `ElementNotFound` when the selector has no
//!   match and `Unsupported` otherwise
//! - anchors come from `<a href>` and `<link rel="canonical">` tags

use crate::config::RendererConfig;
use crate::renderer::{PageRenderer, RenderError};
use crate::TrawlError;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

/// The page currently held by the renderer
#[derive(Debug, Clone)]
struct LoadedPage {
    /// Final URL after redirects
    url: Url,
    body: String,
}

/// A [`PageRenderer`] that loads pages over plain HTTP
pub struct HttpRenderer {
    client: Client,
    page: Option<LoadedPage>,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use trawl::config::RendererConfig;
/// use trawl::renderer::build_http_client;
///
/// let client = build_http_client(&RendererConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &RendererConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.page_timeout())
        .connect_timeout(config.page_timeout().min(std::time::Duration::from_secs(10)))
        .redirect(reqwest::redirect::Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

impl HttpRenderer {
    /// Creates a renderer with a client built from the configuration
    ///
    /// Fails with `TrawlError::Http` if the TLS backend cannot be set up.
    pub fn new(config: &RendererConfig) -> Result<Self, TrawlError> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    /// Creates a renderer around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client, page: None }
    }

    fn page(&self) -> Result<&LoadedPage, RenderError> {
        self.page.as_ref().ok_or(RenderError::NoPage)
    }

    /// Fails unless the selector matches at least one element on the page
    fn require_element(&self, selector: &str) -> Result<(), RenderError> {
        let page = self.page()?;
        if count_matches(&page.body, selector)? == 0 {
            return Err(RenderError::ElementNotFound {
                selector: selector.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        self.page = None;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                RenderError::Timeout {
                    url: url.to_string(),
                }
            } else {
                RenderError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| RenderError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        tracing::trace!("Loaded {} ({} bytes)", final_url, body.len());
        self.page = Some(LoadedPage {
            url: final_url,
            body,
        });
        Ok(())
    }

    async fn current_html(&mut self) -> Result<String, RenderError> {
        Ok(self.page()?.body.clone())
    }

    async fn scroll(&mut self, pixels: i64) -> Result<(), RenderError> {
        self.page()?;
        tracing::debug!("Ignoring scroll by {}px on a static page", pixels);
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<(), RenderError> {
        self.require_element(selector)?;
        Err(RenderError::Unsupported("click"))
    }

    async fn fill_input(&mut self, selector: &str, _text: &str) -> Result<(), RenderError> {
        self.require_element(selector)?;
        Err(RenderError::Unsupported("input"))
    }

    async fn anchors(&mut self) -> Result<Vec<String>, RenderError> {
        let page = self.page()?;
        Ok(extract_anchors(&page.body, &page.url))
    }
}

/// Counts the elements matching a CSS selector
fn count_matches(html: &str, selector: &str) -> Result<usize, RenderError> {
    let parsed = Selector::parse(selector).map_err(|e| RenderError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })?;
    let document = Html::parse_document(html);
    let count = document.select(&parsed).count();
    Ok(count)
}

/// Extracts anchor targets from an HTML document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - hrefs that cannot be resolved against `base_url`
///
/// Scheme filtering and normalization happen later, when the coordinator
/// turns anchors into frontier requests.
///
/// # Example
///
/// ```
/// use trawl::renderer::extract_anchors;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// assert_eq!(extract_anchors(html, &base_url), vec!["https://example.com/page"]);
/// ```
pub fn extract_anchors(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut anchors = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Ok(absolute) = base_url.join(href.trim()) {
                    anchors.push(absolute.to_string());
                }
            }
        }
    }

    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Ok(absolute) = base_url.join(href.trim()) {
                    anchors.push(absolute.to_string());
                }
            }
        }
    }

    anchors
}
