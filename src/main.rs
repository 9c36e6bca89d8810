// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap (bad input exits with usage)
// 2. Set up logging to stderr
// 3. Build the HTTP fetcher, the console publisher and the crawler
// 4. Crawl sequentially (1 worker) or in parallel (more workers)
// 5. Exit with 0 on success, 1 if the crawl could not start
// =============================================================================

mod cli;     // src/cli.rs - command-line parsing
mod crawl;   // src/crawl/ - frontier and crawl engine
mod fetch;   // src/fetch/ - HTTP fetching and link extraction
mod publish; // src/publish/ - reporting results
mod scope;   // src/scope/ - which links are in bounds

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use crawl::Crawler;
use fetch::HttpFetcher;
use publish::ConsolePublisher;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<()> {
    let options = cli.crawl_options();

    let fetcher = HttpFetcher::new(options.timeout, &options.user_agent)
        .context("failed to build HTTP client")?;
    let publisher = Arc::new(ConsolePublisher::new(cli.stats_format()));
    let crawler = Crawler::new(&cli.seed_url, Arc::new(fetcher), publisher);

    if options.is_sequential() {
        println!("🔍 Crawling {} sequentially", cli.seed_url);
    } else {
        println!("🔍 Crawling {} with {} workers", cli.seed_url, options.workers);
    }

    crawler
        .run(&options)
        .await
        .context("spider had issues spidering")?;

    Ok(())
}

// RUST_LOG wins if set; otherwise warnings only, or debug with --verbose.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("site_spider={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
