//! Crawler module for multi-page extraction
//!
//! This module contains the two ways of covering more than one page:
//! - Breadth-first crawling from a start URL with page and depth bounds
//! - Batch extraction over a fixed URL list with a bounded worker pool

mod batch;
mod coordinator;
mod frontier;

pub use batch::{BatchFetcher, MAX_WORKERS};
pub use coordinator::{Coordinator, CrawlOptions};
pub use frontier::{Frontier, FrontierEntry};
