//! Harrow: a selector-driven web harvester
//!
//! This crate fetches web pages through a retrying, identity-rotating HTTP
//! layer, extracts structured fields, links and tables from them with CSS
//! selectors, and can either crawl a site breadth-first or fan out over a
//! fixed list of URLs with a bounded pool of workers.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Harrow operations
///
/// Returned by the crawl entry points, which fail fast only on bad bounds and
/// unusable start URLs. Per-URL fetch failures and per-field selector
/// failures are contained by the fetch and extraction layers and show up as
/// missing results instead.
#[derive(Debug, Error)]
pub enum HarrowError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Duplicate selector field: {0}")]
    DuplicateField(String),
}

/// Terminal failures reported by the fetch engine
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Failed to fetch {url} after {attempts} attempts: {last_error}")]
    Exhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },
}

impl FetchError {
    /// The URL the failed request was aimed at
    pub fn url(&self) -> &str {
        match self {
            Self::InvalidUrl { url, .. } | Self::Exhausted { url, .. } => url,
        }
    }
}

/// Errors raised while evaluating selectors against a document
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to parse selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Malformed table #{index}: {reason}")]
    MalformedTable { index: usize, reason: String },
}

/// Errors raised by the export sink
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for export operations
pub type OutputResult<T> = std::result::Result<T, OutputError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{BatchFetcher, Coordinator, CrawlOptions};
pub use extract::{ExtractionResult, Extractor, FieldValue, SelectorSpec, Table};
pub use fetch::{FetchConfig, FetchRequest, FetchedPage, Fetcher, IdentityRotator, ProxyPool};
