//! Outbound proxy pool
//!
//! The pool is filled once from public `host:port` lists and only shrinks
//! afterwards: an entry is evicted as soon as a request routed through it
//! fails. All operations lock a single mutex, which is plenty given that
//! every draw is followed by a network round trip.

use rand::seq::SliceRandom;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Default cap on entries taken from one source
pub const DEFAULT_PER_SOURCE_LIMIT: usize = 50;

/// Shared, shrinking set of `host:port` proxy addresses
#[derive(Debug)]
pub struct ProxyPool {
    entries: Mutex<Vec<String>>,
    per_source_limit: usize,
    load_timeout: Duration,
}

impl Default for ProxyPool {
    fn default() -> Self {
        Self::new(DEFAULT_PER_SOURCE_LIMIT, Duration::from_secs(5))
    }
}

impl ProxyPool {
    /// Creates an empty pool
    ///
    /// # Arguments
    ///
    /// * `per_source_limit` - Maximum entries taken from each source list
    /// * `load_timeout` - Timeout for fetching one source list
    pub fn new(per_source_limit: usize, load_timeout: Duration) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            per_source_limit,
            load_timeout,
        }
    }

    /// Creates a pool holding the given entries, deduplicated
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pool = Self::default();
        pool.extend(entries.into_iter().map(Into::into).collect());
        pool
    }

    /// Fetches every source and adds the proxies they list
    ///
    /// Unreachable sources and non-2xx responses are skipped. Each source
    /// contributes at most `per_source_limit` entries, and the pool is
    /// deduplicated afterwards.
    ///
    /// # Returns
    ///
    /// The number of entries in the pool after loading
    pub async fn load(&self, client: &Client, sources: &[String]) -> usize {
        let mut found = Vec::new();

        for source in sources {
            let response = match client.get(source).timeout(self.load_timeout).send().await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!("Skipping proxy source {}: {}", source, e);
                    continue;
                }
            };

            if !response.status().is_success() {
                tracing::warn!(
                    "Skipping proxy source {}: HTTP {}",
                    source,
                    response.status().as_u16()
                );
                continue;
            }

            match response.text().await {
                Ok(text) => {
                    let entries = parse_proxy_list(&text, self.per_source_limit);
                    tracing::debug!("{} proxies from {}", entries.len(), source);
                    found.extend(entries);
                }
                Err(e) => tracing::warn!("Skipping proxy source {}: {}", source, e),
            }
        }

        self.extend(found);
        let total = self.len();
        tracing::info!("{} proxies loaded", total);
        total
    }

    /// Draws a random proxy, or None if the pool is empty
    pub fn random(&self) -> Option<String> {
        self.lock().choose(&mut rand::thread_rng()).cloned()
    }

    /// Removes a proxy after a failure attributed to it
    ///
    /// # Returns
    ///
    /// `true` if the entry was present; removing an absent entry is a no-op.
    pub fn evict(&self, entry: &str) -> bool {
        let mut entries = self.lock();
        match entries.iter().position(|e| e == entry) {
            Some(index) => {
                entries.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of proxies currently in the pool
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the pool is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of the current entries
    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }

    fn extend(&self, new_entries: Vec<String>) {
        let mut entries = self.lock();
        let mut seen: HashSet<String> = entries.iter().cloned().collect();
        for entry in new_entries {
            if seen.insert(entry.clone()) {
                entries.push(entry);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        // The list stays consistent even if a holder panicked
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Parses a newline-delimited proxy list
///
/// Keeps trimmed, non-empty lines containing a `:` and stops after `limit`
/// entries.
pub fn parse_proxy_list(text: &str, limit: usize) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.contains(':'))
        .take(limit)
        .map(str::to_string)
        .collect()
}
