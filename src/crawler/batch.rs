//! Batch extraction over a fixed list of URLs
//!
//! A bounded pool of tokio workers drains a shared FIFO queue. Workers only
//! hold the queue and result locks long enough to pop or push one item.

use crate::extract::{ExtractionResult, Extractor, SelectorSpec};
use crate::{ConfigError, HarrowError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;

/// Upper bound on workers accepted from callers
pub const MAX_WORKERS: usize = 100;

/// Fans field extraction out over many URLs
#[derive(Debug, Clone)]
pub struct BatchFetcher {
    extractor: Extractor,
}

impl BatchFetcher {
    pub fn new(extractor: Extractor) -> Self {
        Self { extractor }
    }

    /// Extracts the selector spec's fields from every URL
    ///
    /// Spawns `min(max_workers, urls.len())` workers. URLs whose fetch fails
    /// are left out of the results. Results arrive in completion order, not
    /// input order.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ExtractionResult>)` - One result per successfully fetched URL
    /// * `Err(HarrowError)` - `max_workers` was zero
    pub async fn crawl_many(
        &self,
        urls: &[String],
        spec: &SelectorSpec,
        max_workers: usize,
    ) -> Result<Vec<ExtractionResult>, HarrowError> {
        if max_workers == 0 {
            return Err(
                ConfigError::Validation("max_workers must be at least 1".to_string()).into(),
            );
        }
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        let workers = max_workers.min(MAX_WORKERS).min(urls.len());
        tracing::info!("Fetching {} URLs with {} workers", urls.len(), workers);

        let queue = Arc::new(Mutex::new(urls.iter().cloned().collect::<VecDeque<_>>()));
        let results = Arc::new(Mutex::new(Vec::with_capacity(urls.len())));
        let spec = Arc::new(spec.clone());

        let mut tasks = JoinSet::new();
        for worker in 0..workers {
            tasks.spawn(run_worker(
                worker,
                self.extractor.clone(),
                Arc::clone(&queue),
                Arc::clone(&results),
                Arc::clone(&spec),
            ));
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Batch worker failed: {}", e);
            }
        }

        let results = std::mem::take(&mut *results.lock().unwrap_or_else(|e| e.into_inner()));
        tracing::info!(
            "Batch finished: {}/{} URLs extracted",
            results.len(),
            urls.len()
        );

        Ok(results)
    }
}

async fn run_worker(
    worker: usize,
    extractor: Extractor,
    queue: Arc<Mutex<VecDeque<String>>>,
    results: Arc<Mutex<Vec<ExtractionResult>>>,
    spec: Arc<SelectorSpec>,
) {
    loop {
        let next = queue.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
        let Some(url) = next else {
            break;
        };

        tracing::debug!("Worker {} fetching {}", worker, url);

        if let Some(result) = extractor.extract_fields(&url, &spec).await {
            results
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(result);
        }
    }
}
