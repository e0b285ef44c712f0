//! Fetch-then-parse extraction front end

use crate::extract::parser::{parse_fields, parse_links, parse_tables, DEFAULT_TABLE_SELECTOR};
use crate::extract::types::{ExtractionResult, SelectorSpec, Table};
use crate::fetch::{FetchedPage, Fetcher};
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Fetches pages and runs the parsers over them
///
/// Every operation returns `None` when the page could not be fetched. The
/// fetch engine has already logged the reason by then, so callers simply
/// skip the URL.
#[derive(Debug, Clone)]
pub struct Extractor {
    fetcher: Arc<Fetcher>,
}

impl Extractor {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }

    /// The fetch engine behind this extractor
    pub fn fetcher(&self) -> &Arc<Fetcher> {
        &self.fetcher
    }

    /// Fetches a page and extracts the selector spec's fields from it
    pub async fn extract_fields(&self, url: &str, spec: &SelectorSpec) -> Option<ExtractionResult> {
        let page = self.fetch(url).await?;
        Some(parse_fields(&page.body, url, spec))
    }

    /// Fetches a page and extracts its same-origin links
    ///
    /// A link selector that does not parse is logged and yields no links.
    pub async fn extract_links(
        &self,
        url: &str,
        link_selector: Option<&str>,
        visited: &HashSet<String>,
    ) -> Option<Vec<String>> {
        let page = self.fetch(url).await?;

        let page_url = match Url::parse(url) {
            Ok(page_url) => page_url,
            Err(e) => {
                tracing::error!("Cannot resolve links for {}: {}", url, e);
                return Some(Vec::new());
            }
        };

        match parse_links(&page.body, &page_url, link_selector, visited) {
            Ok(links) => Some(links),
            Err(e) => {
                tracing::error!("Error extracting links from {}: {}", url, e);
                Some(Vec::new())
            }
        }
    }

    /// Fetches a page and extracts its tables
    ///
    /// # Returns
    ///
    /// * `None` - The page could not be fetched
    /// * `Some(vec![])` - The page was fetched but no usable table matched
    /// * `Some(tables)` - One entry per matched table
    pub async fn extract_tables(&self, url: &str, table_selector: Option<&str>) -> Option<Vec<Table>> {
        let page = self.fetch(url).await?;
        let selector = table_selector.unwrap_or(DEFAULT_TABLE_SELECTOR);

        match parse_tables(&page.body, selector) {
            Ok(tables) => {
                tracing::debug!("{} tables extracted from {}", tables.len(), url);
                Some(tables)
            }
            Err(e) => {
                tracing::error!("Error extracting tables from {}: {}", url, e);
                Some(Vec::new())
            }
        }
    }

    /// Fetches a page, swallowing the error into a log line
    pub(crate) async fn fetch(&self, url: &str) -> Option<FetchedPage> {
        match self.fetcher.get(url).await {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::debug!("Skipping {}: {}", e.url(), e);
                None
            }
        }
    }
}
