use crate::config::types::{
    BatchConfig, Config, CrawlConfig, FetcherConfig, ProxyConfig, SelectorEntry, TablesConfig,
};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Longest pacing delay or backoff accepted, in seconds
pub const MAX_WAIT_SECS: f64 = 3600.0;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_proxy_config(&config.proxies)?;
    validate_crawl_config(&config.crawl)?;
    validate_batch_config(&config.batch)?;
    validate_tables_config(&config.tables)?;
    validate_selectors(&config.selectors)?;
    Ok(())
}

/// Validates fetch engine configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if !config.delay.is_finite() || config.delay <= 0.0 || config.delay > MAX_WAIT_SECS {
        return Err(ConfigError::Validation(format!(
            "delay must be between 0 and {}s, got {}",
            MAX_WAIT_SECS, config.delay
        )));
    }

    if config.timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout must be >= 1s, got {}s",
            config.timeout
        )));
    }

    if config.max_retries < 1 || config.max_retries > 20 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be between 1 and 20, got {}",
            config.max_retries
        )));
    }

    if !config.backoff_min.is_finite()
        || !config.backoff_max.is_finite()
        || config.backoff_min < 0.0
    {
        return Err(ConfigError::Validation(format!(
            "backoff bounds must be finite and non-negative, got {}..{}",
            config.backoff_min, config.backoff_max
        )));
    }

    if config.backoff_max > MAX_WAIT_SECS {
        return Err(ConfigError::Validation(format!(
            "backoff_max must be <= {}s, got {}",
            MAX_WAIT_SECS, config.backoff_max
        )));
    }

    if config.backoff_min > config.backoff_max {
        return Err(ConfigError::Validation(format!(
            "backoff_min ({}) must not exceed backoff_max ({})",
            config.backoff_min, config.backoff_max
        )));
    }

    if let Some(path) = &config.user_agents_file {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user_agents_file cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates proxy sourcing configuration
fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    if config.per_source_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "per_source_limit must be >= 1, got {}",
            config.per_source_limit
        )));
    }

    if config.load_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "load_timeout must be >= 1s, got {}s",
            config.load_timeout
        )));
    }

    for source in &config.sources {
        let url = Url::parse(source).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid proxy source '{}': {}", source, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Proxy source '{}' must use http or https",
                source
            )));
        }
    }

    Ok(())
}

/// Validates crawl defaults
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if let Some(selector) = &config.link_selector {
        if selector.trim().is_empty() {
            return Err(ConfigError::Validation(
                "link_selector cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates batch defaults
fn validate_batch_config(config: &BatchConfig) -> Result<(), ConfigError> {
    if config.max_workers < 1 || config.max_workers > 100 {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and 100, got {}",
            config.max_workers
        )));
    }

    Ok(())
}

/// Validates table defaults
fn validate_tables_config(config: &TablesConfig) -> Result<(), ConfigError> {
    if config.selector.trim().is_empty() {
        return Err(ConfigError::Validation(
            "table selector cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates selector entries
///
/// CSS syntax is not checked here; a bad selector nulls only its own field at
/// extraction time.
fn validate_selectors(entries: &[SelectorEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in entries {
        if entry.field.trim().is_empty() {
            return Err(ConfigError::Validation(
                "selector field name cannot be empty".to_string(),
            ));
        }

        if entry.field == "url" {
            return Err(ConfigError::Validation(
                "selector field name 'url' is reserved for the source URL".to_string(),
            ));
        }

        if entry.css.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "selector for field '{}' cannot be empty",
                entry.field
            )));
        }

        if !seen.insert(entry.field.as_str()) {
            return Err(ConfigError::DuplicateField(entry.field.clone()));
        }
    }

    Ok(())
}
