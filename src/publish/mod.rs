// src/publish/mod.rs
// =============================================================================
// This module receives everything the crawler finds.
//
// The crawler reports three things:
// - publish:      "page X had these links" (once per fetched page)
// - record_error: "page X failed, here's why" (once per failed page)
// - publish_stats: final numbers, called exactly once at the end
//
// Implementations:
// - ConsolePublisher: prints to stdout and keeps running totals
// - MemoryPublisher:  collects everything in memory (used by tests)
//
// Workers call a publisher concurrently, so every implementation keeps its
// state behind a lock.
// =============================================================================

mod console;
#[cfg(test)]
mod memory;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::fetch::FetchError;

pub use console::{ConsolePublisher, StatsFormat};
#[cfg(test)]
pub use memory::MemoryPublisher;

/// Broad bucket for a failed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    NoAccess,
    #[serde(rename = "internal_issue")]
    Internal,
    Unknown,
}

impl ErrorKind {
    /// Maps a fetch failure to a bucket using only its status code.
    ///
    /// 404 -> NotFound, 403 -> NoAccess, 500 -> Internal, anything else
    /// (including network errors) -> Unknown.
    pub fn classify(error: &FetchError) -> Self {
        match error {
            FetchError::UnexpectedStatus(404) => ErrorKind::NotFound,
            FetchError::UnexpectedStatus(403) => ErrorKind::NoAccess,
            FetchError::UnexpectedStatus(500) => ErrorKind::Internal,
            _ => ErrorKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::NoAccess => "no_access",
            ErrorKind::Internal => "internal_issue",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A publisher failed to do its job.
///
/// The crawler logs these and keeps going.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize stats: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination for crawl results.
pub trait Publisher: Send + Sync {
    /// Reports a fetched page and the raw links found on it, in page order.
    fn publish(&self, address: &str, links: &[String]) -> Result<(), PublishError>;

    /// Reports a page that could not be fetched.
    fn record_error(
        &self,
        address: &str,
        kind: ErrorKind,
        cause: &FetchError,
    ) -> Result<(), PublishError>;

    /// Reports final statistics. Called once, after the crawl finishes.
    fn publish_stats(&self) -> Result<(), PublishError>;
}
