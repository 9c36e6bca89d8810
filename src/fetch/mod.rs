// src/fetch/mod.rs
// =============================================================================
// This module is the crawler's only window onto the network.
//
// Submodules:
// - http: GET a URL and classify the response (page / redirect / failure)
// - html: pull raw link strings out of a page body
//
// The crawler never talks to reqwest directly. It goes through the `Fetch`
// trait, so tests can swap in an in-memory site.
// =============================================================================

mod html;
mod http;

use async_trait::async_trait;
use tracing::debug;

use html::extract_raw_links;
pub use http::{FetchError, Fetched, HttpFetcher, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};

/// Anything that can turn a URL into a page or a redirect.
///
/// Implementations are shared by every worker, hence Send + Sync.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Fetched, FetchError>;
}

/// Fetches a URL and returns the raw links found on it.
///
/// A redirect counts as a page whose only link is the redirect target.
pub async fn fetch_links(fetcher: &dyn Fetch, url: &str) -> Result<Vec<String>, FetchError> {
    match fetcher.fetch(url).await? {
        Fetched::Redirect { status, location } => {
            debug!(url, status, location = %location, "redirect target queued as a link");
            Ok(vec![location])
        }
        Fetched::Page { status, body } => {
            debug!(url, status, bytes = body.len(), "page fetched");
            Ok(extract_raw_links(&body))
        }
    }
}
