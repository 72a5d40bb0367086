//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlRequest`: A unit of work in the frontier (URL, depth, retry count)
//! - `RequestState`: The lifecycle a request moves through while it is processed
//! - `CrawlResult`: The terminal record written for each request

mod request;
mod request_state;
mod result;

// Re-export main types
pub use request::{CrawlRequest, Metadata};
pub use request_state::RequestState;
pub use result::CrawlResult;
