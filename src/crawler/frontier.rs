//! Breadth-first crawl frontier
//!
//! This module handles:
//! - FIFO ordering of discovered URLs
//! - Remembering which URLs were already queued or visited
//! - Bounding the queue length

use std::collections::{HashSet, VecDeque};

/// A URL waiting to be crawled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// The absolute URL to fetch
    pub url: String,

    /// Link distance from the start URL
    pub depth: u32,
}

impl FrontierEntry {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// FIFO queue of URLs with visited and queued bookkeeping
///
/// A URL is accepted at most once for the lifetime of the frontier, so no
/// page is fetched twice within one crawl.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    queued: HashSet<String>,
    visited: HashSet<String>,
    capacity: usize,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of entries waiting at once
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
            capacity,
        }
    }

    /// Adds an entry at the back of the queue
    ///
    /// # Returns
    ///
    /// `false` if the URL was already queued or visited, or the queue is full
    pub fn push(&mut self, entry: FrontierEntry) -> bool {
        if self.queue.len() >= self.capacity
            || self.visited.contains(&entry.url)
            || self.queued.contains(&entry.url)
        {
            return false;
        }

        self.queued.insert(entry.url.clone());
        self.queue.push_back(entry);
        true
    }

    /// Removes the oldest entry
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    pub fn mark_visited(&mut self, url: &str) {
        self.visited.insert(url.to_string());
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Number of entries waiting
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// URLs visited so far
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }
}
