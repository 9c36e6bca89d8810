// src/publish/memory.rs
// =============================================================================
// An in-memory publisher for tests.
//
// Every published address is appended to one list, followed by the links
// found on that page. Errors never fail the crawl; the errored addresses are
// kept so tests can check that each page was reported once.
// =============================================================================

use parking_lot::Mutex;

use super::{ErrorKind, PublishError, Publisher};
use crate::fetch::FetchError;

#[derive(Default)]
struct Recorded {
    published: Vec<String>,
    pages: Vec<String>,
    errored: Vec<(String, ErrorKind)>,
    stats_calls: usize,
}

#[derive(Default)]
pub struct MemoryPublisher {
    recorded: Mutex<Recorded>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Addresses and links in the order they were published.
    pub fn published(&self) -> Vec<String> {
        self.recorded.lock().published.clone()
    }

    /// Only the page addresses, in the order they were published.
    pub fn pages(&self) -> Vec<String> {
        self.recorded.lock().pages.clone()
    }

    pub fn errored(&self) -> Vec<(String, ErrorKind)> {
        self.recorded.lock().errored.clone()
    }

    pub fn stats_calls(&self) -> usize {
        self.recorded.lock().stats_calls
    }
}

impl Publisher for MemoryPublisher {
    fn publish(&self, address: &str, links: &[String]) -> Result<(), PublishError> {
        let mut recorded = self.recorded.lock();
        recorded.published.push(address.to_string());
        recorded.published.extend(links.iter().cloned());
        recorded.pages.push(address.to_string());
        Ok(())
    }

    fn record_error(
        &self,
        address: &str,
        kind: ErrorKind,
        _cause: &FetchError,
    ) -> Result<(), PublishError> {
        self.recorded.lock().errored.push((address.to_string(), kind));
        Ok(())
    }

    fn publish_stats(&self) -> Result<(), PublishError> {
        self.recorded.lock().stats_calls += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_addresses_and_links_in_order() {
        let publisher = MemoryPublisher::new();
        publisher.publish("a", &["x".to_string(), "y".to_string()]).expect("publish");
        publisher.publish("b", &[]).expect("publish");

        assert_eq!(publisher.published(), vec!["a", "x", "y", "b"]);
        assert_eq!(publisher.pages(), vec!["a", "b"]);
    }

    #[test]
    fn test_errors_do_not_fail() {
        let publisher = MemoryPublisher::new();
        let cause = FetchError::UnexpectedStatus(500);
        publisher.record_error("c", ErrorKind::Internal, &cause).expect("ignored");
        publisher.publish_stats().expect("no-op");

        assert!(publisher.published().is_empty());
        assert_eq!(publisher.errored(), vec![("c".to_string(), ErrorKind::Internal)]);
        assert_eq!(publisher.stats_calls(), 1);
    }
}
