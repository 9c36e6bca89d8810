// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
//   site-spider <SEED_URL> [WORKERS] [--queue-capacity N] [--timeout SECS]
//               [--json] [--verbose]
//
// Bad input (not an http/https URL, a worker count of 0 or a non-number)
// makes clap print the usage message and exit with a non-zero status.
// =============================================================================

use std::num::NonZeroUsize;
use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::crawl::{CrawlOptions, DEFAULT_WORKERS};
use crate::fetch::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use crate::publish::StatsFormat;

#[derive(Parser, Debug)]
#[command(
    name = "site-spider",
    version,
    about = "Visit every page of a website exactly once and report its links",
    long_about = "site-spider starts from a seed URL and follows every same-site link \
                  breadth-first, printing the links found on each page and a summary \
                  at the end. With one worker pages are visited in discovery order; \
                  with more, they are fetched concurrently."
)]
pub struct Cli {
    /// Website to crawl (e.g., https://example.com)
    #[arg(value_parser = parse_seed_url)]
    pub seed_url: String,

    /// Number of concurrent workers (1 = sequential, in discovery order)
    #[arg(default_value_t = default_workers())]
    pub workers: NonZeroUsize,

    /// Size of the bounded work queue (default: 500 per worker)
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Print the final statistics as JSON
    #[arg(long)]
    pub json: bool,

    /// Log debug details to stderr (RUST_LOG overrides this)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            workers: self.workers,
            queue_capacity: self.queue_capacity,
            timeout: Duration::from_secs(self.timeout),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn stats_format(&self) -> StatsFormat {
        if self.json {
            StatsFormat::Json
        } else {
            StatsFormat::Text
        }
    }
}

fn default_workers() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_WORKERS).unwrap_or(NonZeroUsize::MIN)
}

// Accepts only absolute http/https URLs with a host.
fn parse_seed_url(input: &str) -> Result<String, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("the seed URL is empty".to_string());
    }

    let url = Url::parse(input).map_err(|e| format!("not a valid link: {}", e))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(format!("unsupported scheme '{}', use http or https", url.scheme()));
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(input.to_string()),
        _ => Err("the seed URL has no host".to_string()),
    }
}
