// src/crawl/engine.rs
// =============================================================================
// This module drives the crawl: fetch a page, report it, queue its links,
// repeat until nothing is left.
//
// Two ways to run it:
// - crawl():          one worker, pages visited in the order found (BFS)
// - crawl_parallel(): N tokio tasks sharing a TaskQueue, no ordering
//
// Both use the same per-page step (`process`), so both visit the same set
// of pages.
//
// Failures:
// - seed unreachable    -> CrawlError, nothing else happens
// - any other page fails -> reported to the publisher, crawl continues
// - publisher fails      -> logged, crawl continues
// =============================================================================

use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::options::CrawlOptions;
use super::queue::{FifoQueue, Frontier, TaskQueue};
use crate::fetch::{fetch_links, Fetch, FetchError};
use crate::publish::{ErrorKind, Publisher};
use crate::scope::{Address, Scope};

/// The only errors that stop a crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("failed to access initial URL {url}: {source}")]
    SeedUnreachable {
        url: String,
        #[source]
        source: FetchError,
    },
}

/// Crawls one site. Cheap to clone: every field is shared.
#[derive(Clone)]
pub struct Crawler {
    scope: Arc<Scope>,
    fetcher: Arc<dyn Fetch>,
    publisher: Arc<dyn Publisher>,
}

impl Crawler {
    pub fn new(base_url: &str, fetcher: Arc<dyn Fetch>, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            scope: Arc::new(Scope::for_seed(base_url)),
            fetcher,
            publisher,
        }
    }

    /// Runs sequentially for one worker, in parallel otherwise.
    pub async fn run(&self, options: &CrawlOptions) -> Result<(), CrawlError> {
        if options.is_sequential() {
            self.crawl().await
        } else {
            self.crawl_parallel(options.workers.get(), options.queue_capacity())
                .await
        }
    }

    /// Visits every in-scope page in discovery order on the current task.
    pub async fn crawl(&self) -> Result<(), CrawlError> {
        self.check_seed().await?;

        let queue = FifoQueue::new();
        queue.try_enqueue(self.seed());

        // Process the queue until empty
        // New links are appended while we go, giving breadth-first order
        while let Some(address) = queue.next_or_done().await {
            self.process(0, &address, &queue).await;
        }

        queue.close();
        self.publish_stats();
        Ok(())
    }

    /// Visits every in-scope page using `workers` concurrent tasks.
    ///
    /// Returns once every worker has exited.
    pub async fn crawl_parallel(&self, workers: usize, capacity: usize) -> Result<(), CrawlError> {
        self.check_seed().await?;

        // The seed goes in first and counts as outstanding work,
        // so the queue can't close before any worker starts
        let queue = Arc::new(TaskQueue::new(self.seed(), capacity));
        info!(workers, capacity, "starting parallel crawl");

        // Spawn one tokio task per worker
        // Each gets its own handle to the crawler and the queue (both Arc)
        let handles: Vec<_> = (0..workers.max(1))
            .map(|id| {
                let crawler = self.clone();
                let queue = Arc::clone(&queue);
                tokio::spawn(async move { crawler.work(id, &queue).await })
            })
            .collect();

        // Wait for every worker to exit
        // They only exit once the queue closes, i.e. all work is done
        for result in join_all(handles).await {
            if let Err(error) = result {
                warn!(%error, "worker task failed");
            }
        }

        queue.close();
        self.publish_stats();
        Ok(())
    }

    fn seed(&self) -> Address {
        Address::new(self.scope.base_url())
    }

    // A failure here means the whole site is unreachable, so we stop
    // before doing any work.
    async fn check_seed(&self) -> Result<(), CrawlError> {
        let url = self.scope.base_url();
        match self.fetcher.fetch(url).await {
            Ok(_) => Ok(()),
            Err(source) => Err(CrawlError::SeedUnreachable {
                url: url.to_string(),
                source,
            }),
        }
    }

    // One worker of the parallel crawl. Exits when the queue closes.
    async fn work(&self, worker: usize, queue: &TaskQueue) {
        while let Some(address) = queue.next_or_done().await {
            // Dropped at the end of this iteration, after any children
            // were queued.
            let _in_flight = queue.in_flight();

            if !queue.claim(&address) {
                debug!(worker, url = %address, "already started by another worker, skipping");
                continue;
            }
            self.process(worker, &address, queue).await;
        }
        debug!(worker, outstanding = queue.outstanding(), "worker finished");
    }

    // Fetch -> report -> filter -> normalize -> enqueue, for one page.
    async fn process(&self, worker: usize, address: &Address, frontier: &dyn Frontier) {
        // Download the page (or learn where it redirects to)
        let links = match fetch_links(self.fetcher.as_ref(), address.as_str()).await {
            Ok(links) => links,
            Err(error) => {
                // Put the failure in a bucket for the final report.
                // The original error goes along with it.
                let kind = ErrorKind::classify(&error);
                warn!(
                    worker,
                    url = %address,
                    %kind,
                    status = ?error.status(),
                    transient = error.is_transient(),
                    %error,
                    "failed to crawl page"
                );
                if let Err(error) = self.publisher.record_error(address.as_str(), kind, &error) {
                    warn!(worker, url = %address, %error, "failed to record error");
                }
                // A failed page has no children, so this branch ends here
                return;
            }
        };

        // Drop links that can never be pages (empty, mailto:, tel:, files)
        // before they show up in the report
        let links: Vec<String> = links
            .into_iter()
            .filter(|link| self.scope.is_listable(link))
            .collect();

        // Report first. A broken publisher must not stop the crawl
        if let Err(error) = self.publisher.publish(address.as_str(), &links) {
            warn!(worker, url = %address, %error, "failed to publish page");
        }

        // Queue every in-scope link we haven't seen yet
        for link in &links {
            // External links, fragments etc. are skipped here
            let Some(child) = self.scope.admit(link) else {
                continue;
            };
            // try_enqueue returns false for anything already queued
            if frontier.try_enqueue(child.clone()) {
                debug!(worker, url = %child, "queued");
            }
        }
    }

    fn publish_stats(&self) {
        if let Err(error) = self.publisher.publish_stats() {
            warn!(%error, "failed to publish stats");
        }
    }
}
