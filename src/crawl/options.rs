// src/crawl/options.rs
// Knobs for a single crawl run. Filled in from the command line.

use std::num::NonZeroUsize;
use std::time::Duration;

use crate::fetch::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};

pub const DEFAULT_WORKERS: usize = 20;

/// Bounded channel slots per worker when no capacity is given.
pub const QUEUE_SLOTS_PER_WORKER: usize = 500;

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// 1 means sequential, breadth-first order.
    pub workers: NonZeroUsize,
    pub queue_capacity: Option<usize>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl CrawlOptions {
    pub fn is_sequential(&self) -> bool {
        self.workers.get() == 1
    }

    /// Size of the parallel crawl's bounded channel.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
            .unwrap_or(self.workers.get() * QUEUE_SLOTS_PER_WORKER)
            .max(1)
    }
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            workers: NonZeroUsize::new(DEFAULT_WORKERS).unwrap_or(NonZeroUsize::MIN),
            queue_capacity: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
