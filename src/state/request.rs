use std::collections::HashMap;

/// Free-form string metadata carried from a request into its output record
pub type Metadata = HashMap<String, String>;

/// A URL waiting in (or taken from) the frontier
///
/// Requests are immutable once created. A retry produces a new request via
/// [`CrawlRequest::next_attempt`] rather than mutating the failed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    /// The normalized URL to visit
    pub url: String,

    /// Number of link hops from the seed that led here
    pub depth: u32,

    /// Number of failed attempts that preceded this one
    pub retry_count: u32,

    /// Metadata copied into the terminal record
    pub metadata: Option<Metadata>,
}

impl CrawlRequest {
    /// Creates a first-attempt request
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
            retry_count: 0,
            metadata: None,
        }
    }

    /// Attaches metadata to the request
    pub fn with_metadata(mut self, metadata: Option<Metadata>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns a copy of this request for the following attempt
    pub fn next_attempt(&self) -> Self {
        Self {
            retry_count: self.retry_count + 1,
            ..self.clone()
        }
    }

    /// Total number of attempts including this one
    pub fn attempt(&self) -> u32 {
        self.retry_count + 1
    }
}
