//! Crawler coordinator - breadth-first crawl orchestration
//!
//! This module contains the crawl loop, including:
//! - Seeding and draining the frontier in FIFO order
//! - Enforcing the page and depth bounds
//! - Fetching each page once and extracting both fields and links from it

use crate::config::CrawlConfig;
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::extract::{
    fields_from_document, links_from_document, ExtractionResult, Extractor, SelectorSpec,
};
use crate::{ConfigError, HarrowError};
use scraper::Html;
use url::Url;

/// Bounds and link selection for one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Maximum number of pages processed, failed fetches included
    pub max_pages: usize,

    /// Links are followed only from pages shallower than this
    pub max_depth: u32,

    /// Selector picking the elements whose `href` is followed
    pub link_selector: Option<String>,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self::from(&CrawlConfig::default())
    }
}

impl From<&CrawlConfig> for CrawlOptions {
    fn from(config: &CrawlConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            max_depth: config.max_depth,
            link_selector: config.link_selector.clone(),
        }
    }
}

/// Main crawler coordinator structure
///
/// Crawls are single-task and sequential; all crawl state lives inside one
/// [`Coordinator::crawl`] call, so a coordinator can be reused.
#[derive(Debug, Clone)]
pub struct Coordinator {
    extractor: Extractor,
}

impl Coordinator {
    pub fn new(extractor: Extractor) -> Self {
        Self { extractor }
    }

    /// Crawls a site breadth-first from `start_url`
    ///
    /// Each dequeued URL is marked visited and counts against `max_pages`
    /// whether or not its fetch succeeds. Successful pages contribute one
    /// [`ExtractionResult`]; pages shallower than `max_depth` also feed
    /// their same-origin links back into the frontier at `depth + 1`. The
    /// frontier never holds more than `2 × max_pages` entries.
    ///
    /// # Arguments
    ///
    /// * `start_url` - Absolute URL the crawl starts from (depth 0)
    /// * `spec` - Fields to extract from every page
    /// * `options` - Page and depth bounds plus optional link selector
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ExtractionResult>)` - Results in visit order
    /// * `Err(HarrowError)` - `max_pages` was zero or `start_url` did not
    ///   parse; nothing was fetched
    pub async fn crawl(
        &self,
        start_url: &str,
        spec: &SelectorSpec,
        options: &CrawlOptions,
    ) -> Result<Vec<ExtractionResult>, HarrowError> {
        if options.max_pages == 0 {
            return Err(ConfigError::Validation("max_pages must be at least 1".to_string()).into());
        }
        let start = Url::parse(start_url)?;

        let mut frontier = Frontier::new(options.max_pages.saturating_mul(2));
        frontier.push(FrontierEntry::new(start.to_string(), 0));

        let mut results = Vec::new();
        let mut processed = 0;

        tracing::info!(
            "Starting crawl at {} (max {} pages, depth {})",
            start,
            options.max_pages,
            options.max_depth
        );

        while processed < options.max_pages {
            let Some(entry) = frontier.pop() else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };

            if frontier.is_visited(&entry.url) {
                continue;
            }
            frontier.mark_visited(&entry.url);
            processed += 1;

            tracing::info!(
                "Crawling {} (depth {}) [{}/{}]",
                entry.url,
                entry.depth,
                processed,
                options.max_pages
            );

            let Some(page) = self.extractor.fetch(&entry.url).await else {
                continue;
            };

            let (result, links) = {
                let document = Html::parse_document(&page.body);
                let result = fields_from_document(&document, &entry.url, spec);
                let links = if entry.depth < options.max_depth {
                    self.discover_links(&document, &entry.url, options, &frontier)
                } else {
                    Vec::new()
                };
                (result, links)
            };

            results.push(result);

            let mut enqueued = 0;
            for link in links {
                if frontier.push(FrontierEntry::new(link, entry.depth + 1)) {
                    enqueued += 1;
                }
            }
            tracing::debug!(
                "{} new links queued from {} ({} in frontier)",
                enqueued,
                entry.url,
                frontier.len()
            );
        }

        tracing::info!(
            "Crawl finished: {} pages processed, {} results",
            processed,
            results.len()
        );

        Ok(results)
    }

    fn discover_links(
        &self,
        document: &Html,
        page_url: &str,
        options: &CrawlOptions,
        frontier: &Frontier,
    ) -> Vec<String> {
        let page_url = match Url::parse(page_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("Cannot resolve links for {}: {}", page_url, e);
                return Vec::new();
            }
        };

        match links_from_document(
            document,
            &page_url,
            options.link_selector.as_deref(),
            frontier.visited(),
        ) {
            Ok(links) => links,
            Err(e) => {
                tracing::error!("Error extracting links from {}: {}", page_url, e);
                Vec::new()
            }
        }
    }
}
