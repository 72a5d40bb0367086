//! Trawl: a scripted, depth-bounded page crawler
//!
//! This crate drives a page renderer through a frontier of URLs, runs
//! pattern-keyed action scripts against each loaded page, follows discovered
//! links up to a configured depth and writes one record per visited URL.

pub mod actions;
pub mod config;
pub mod crawler;
pub mod dedup;
pub mod input;
pub mod output;
pub mod renderer;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for run-level failures
///
/// Per-page navigation and interaction failures never surface here; they
/// become error records once their retries are exhausted.
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Action script error: {0}")]
    Script(#[from] actions::ScriptError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Seed input error at line {line}: {message}")]
    Seed { line: usize, message: String },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::RequestState,
        to: state::RequestState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single request failed
///
/// Page errors are routed through the retry controller and end up as error
/// records; they never abort a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("{0}")]
    Navigation(#[source] RenderError),

    #[error("action `{action}` failed: {source}")]
    Interaction {
        action: String,
        #[source]
        source: RenderError,
    },
}

impl PageError {
    /// The renderer error behind this failure
    pub fn render_error(&self) -> &RenderError {
        match self {
            PageError::Navigation(source) => source,
            PageError::Interaction { source, .. } => source,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.render_error().is_transient()
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for run-level operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use actions::{Action, ActionScript};
pub use config::Config;
pub use crawler::{Coordinator, CrawlOutcome, StopReason};
pub use renderer::{PageRenderer, RenderError};
pub use state::{CrawlRequest, CrawlResult, RequestState};
pub use crate::url::normalize_url;
