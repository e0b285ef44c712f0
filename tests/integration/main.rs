//! Integration tests for Harrow
//!
//! These tests use wiremock to create mock HTTP servers and drive the
//! fetch engine, extractor, crawler and batch fetcher end-to-end.

mod crawl_tests;
mod extractor_tests;
mod fetch_tests;

use harrow::{FetchConfig, Fetcher};
use std::sync::Arc;
use std::time::Duration;
use wiremock::ResponseTemplate;

/// Fetch settings with near-zero pacing and backoff
pub fn fast_config(max_retries: u32) -> FetchConfig {
    FetchConfig {
        delay: Duration::from_millis(1),
        timeout: Duration::from_secs(5),
        max_retries,
        backoff_min: Duration::ZERO,
        backoff_max: Duration::ZERO,
        ..FetchConfig::default()
    }
}

pub fn fast_fetcher(max_retries: u32) -> Arc<Fetcher> {
    Arc::new(Fetcher::new(fast_config(max_retries)).expect("Failed to build fetcher"))
}

/// A 200 HTML response with the given body
pub fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html")
}
