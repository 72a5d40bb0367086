//! Retry and backoff decisions for failed requests

use crate::config::CrawlerConfig;
use crate::state::CrawlRequest;
use crate::PageError;
use std::time::Duration;

/// What to do with a failed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Park the follow-up attempt for `delay`
    Retry {
        request: CrawlRequest,
        delay: Duration,
    },
    /// Write a terminal error record
    GiveUp,
}

/// Decides between retrying and giving up, and counts terminal errors
#[derive(Debug, Clone)]
pub struct RetryController {
    max_retries: u32,
    max_errors: Option<u32>,
    delay: Duration,
    fail_fast: bool,
    error_count: u32,
}

impl RetryController {
    pub fn new(max_retries: u32, max_errors: Option<u32>, delay: Duration) -> Self {
        Self {
            max_retries,
            max_errors,
            delay,
            fail_fast: false,
            error_count: 0,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.max_retries, config.max_errors, config.sleep_error())
            .with_fail_fast(config.fail_fast)
    }

    /// Gives up without retrying on errors that are not transient
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Decides the fate of a failed request
    ///
    /// A request is retried while it has retries left, whatever the error.
    /// With fail-fast, permanent errors give up on the first attempt. Every
    /// `GiveUp` counts towards the error ceiling.
    pub fn on_failure(&mut self, request: &CrawlRequest, error: &PageError) -> RetryDecision {
        let skip_retry = self.fail_fast && !error.is_transient();
        if request.retry_count < self.max_retries && !skip_retry {
            return RetryDecision::Retry {
                request: request.next_attempt(),
                delay: self.delay,
            };
        }

        self.error_count += 1;
        RetryDecision::GiveUp
    }

    /// True once the terminal error tally reaches `max_errors`
    pub fn ceiling_reached(&self) -> bool {
        self.max_errors
            .is_some_and(|max_errors| self.error_count >= max_errors)
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }
}
