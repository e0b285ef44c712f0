//! Configuration module for Harrow
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; missing values fall back to the engine defaults.
//!
//! # Example
//!
//! ```no_run
//! use harrow::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harrow.toml")).unwrap();
//! println!("Pacing delay: {}s", config.fetcher.delay);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BatchConfig, Config, CrawlConfig, FetcherConfig, ProxyConfig, SelectorEntry, TablesConfig,
    DEFAULT_PROXY_SOURCES,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
