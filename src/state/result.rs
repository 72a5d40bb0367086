use super::Metadata;
use chrono::Utc;

/// The terminal record of one crawled URL
///
/// Exactly one of `body` and `error` is set. The constructors are the only
/// way to build a result outside this module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    url: String,
    timestamp: i64,
    body: Option<String>,
    error: Option<String>,
    metadata: Option<Metadata>,
}

impl CrawlResult {
    /// A successful visit with the captured page body
    pub fn success(url: impl Into<String>, body: String, metadata: Option<Metadata>) -> Self {
        Self {
            url: url.into(),
            timestamp: Utc::now().timestamp_millis(),
            body: Some(body),
            error: None,
            metadata,
        }
    }

    /// A visit that failed after all retries
    pub fn failure(url: impl Into<String>, error: String, metadata: Option<Metadata>) -> Self {
        Self {
            url: url.into(),
            timestamp: Utc::now().timestamp_millis(),
            body: None,
            error: Some(error),
            metadata,
        }
    }

    /// Rebuilds a stored record
    ///
    /// Returns None if the row does not carry exactly one of body and error.
    pub fn from_parts(
        url: String,
        timestamp: i64,
        body: Option<String>,
        error: Option<String>,
        metadata: Option<Metadata>,
    ) -> Option<Self> {
        if body.is_some() == error.is_some() {
            return None;
        }
        Some(Self {
            url,
            timestamp,
            body,
            error,
            metadata,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Creation time in milliseconds since the Unix epoch
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.body.is_some()
    }
}
