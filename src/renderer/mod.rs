//! Page renderer capability
//!
//! The coordinator never renders pages itself. It drives an implementation of
//! [`PageRenderer`] that owns a single page session: navigate to a URL, read
//! back the HTML, perform low-level interactions and list the page's anchors.
//!
//! [`HttpRenderer`] is a static implementation backed by reqwest and scraper.
//! Browser-backed renderers plug in behind the same trait.

#[cfg(test)]
pub(crate) mod fake;
mod http;

pub use http::{build_http_client, extract_anchors, HttpRenderer};

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a page renderer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation to {url} timed out")]
    Timeout { url: String },

    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Interaction rejected: {0}")]
    Interaction(String),

    #[error("Renderer does not support {0}")]
    Unsupported(&'static str),

    #[error("No page has been loaded")]
    NoPage,
}

impl RenderError {
    /// Returns true if repeating the same attempt later could succeed
    ///
    /// Capability gaps and malformed selectors fail the same way every time.
    /// Only `fail-fast` crawls act on the difference.
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            Self::Unsupported(_) | Self::InvalidSelector { .. } | Self::NoPage
        )
    }
}

/// An exclusively owned page session
///
/// Only one navigation or interaction is in flight at a time, which is why
/// every method takes `&mut self`.
#[async_trait]
pub trait PageRenderer: Send {
    /// Loads the URL and waits until the page is ready
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError>;

    /// Returns the current HTML of the loaded page
    async fn current_html(&mut self) -> Result<String, RenderError>;

    /// Scrolls the page vertically by the given number of pixels
    async fn scroll(&mut self, pixels: i64) -> Result<(), RenderError>;

    /// Clicks the first element matching the CSS selector
    async fn click(&mut self, selector: &str) -> Result<(), RenderError>;

    /// Types text into the first element matching the CSS selector
    async fn fill_input(&mut self, selector: &str, text: &str) -> Result<(), RenderError>;

    /// Returns the hrefs of all anchors on the current page, resolved to absolute URLs
    async fn anchors(&mut self) -> Result<Vec<String>, RenderError>;
}
