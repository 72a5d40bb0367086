//! Integration tests for Trawl

mod crawl_properties;
mod end_to_end_tests;
mod http_renderer_tests;
