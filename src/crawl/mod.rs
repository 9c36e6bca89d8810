// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling starting from a seed URL
// - Same-site restriction (external links are never followed)
// - Every page visited exactly once, even with many workers
// - Sequential mode (strict discovery order) or parallel mode (N workers)
//
// Submodules:
// - queue:   the frontier, sequential and concurrent flavours
// - engine:  the Crawler that drives fetch -> report -> enqueue
// - options: worker count, queue size, timeouts
// =============================================================================

mod engine;
mod options;
mod queue;

pub use engine::Crawler;
pub use options::{CrawlOptions, DEFAULT_WORKERS};
