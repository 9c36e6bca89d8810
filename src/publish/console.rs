// src/publish/console.rs
// =============================================================================
// Prints crawl results as they arrive and a summary at the end.
//
// Output for each page:
//   Links found on:  https://example.com
//    - /about
//    - https://example.com/contact
//
// The summary can be plain text or JSON (--json).
// =============================================================================

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;

use super::{ErrorKind, PublishError, Publisher};
use crate::fetch::FetchError;

/// How the final summary is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsFormat {
    Text,
    Json,
}

/// A page that could not be fetched, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErroredPage {
    pub address: String,
    pub cause: String,
}

/// Final numbers for a crawl.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrawlStats {
    pub seconds_spent: f64,
    pub pages_crawled: usize,
    pub links_found: usize,
    pub errors: usize,
    pub errored_pages: BTreeMap<ErrorKind, Vec<ErroredPage>>,
}

struct State {
    out: Box<dyn Write + Send>,
    pages: usize,
    links: usize,
    errors: usize,
    errored_pages: BTreeMap<ErrorKind, Vec<ErroredPage>>,
}

/// Writes results to stdout (or any writer) and tallies totals.
pub struct ConsolePublisher {
    started_at: Instant,
    format: StatsFormat,
    // One lock for counters and output: a page's lines never interleave
    // with another worker's.
    state: Mutex<State>,
}

impl ConsolePublisher {
    pub fn new(format: StatsFormat) -> Self {
        Self::with_writer(format, Box::new(io::stdout()))
    }

    pub fn with_writer(format: StatsFormat, out: Box<dyn Write + Send>) -> Self {
        Self {
            started_at: Instant::now(),
            format,
            state: Mutex::new(State {
                out,
                pages: 0,
                links: 0,
                errors: 0,
                errored_pages: BTreeMap::new(),
            }),
        }
    }

    /// Snapshot of the totals so far.
    pub fn stats(&self) -> CrawlStats {
        let state = self.state.lock();
        CrawlStats {
            seconds_spent: self.started_at.elapsed().as_secs_f64(),
            pages_crawled: state.pages,
            links_found: state.links,
            errors: state.errors,
            errored_pages: state.errored_pages.clone(),
        }
    }
}

impl Publisher for ConsolePublisher {
    fn publish(&self, address: &str, links: &[String]) -> Result<(), PublishError> {
        let mut state = self.state.lock();
        state.pages += 1;
        state.links += links.len();

        writeln!(state.out, "Links found on:  {}", address)?;
        for link in links {
            writeln!(state.out, " - {}", link)?;
        }
        Ok(())
    }

    fn record_error(
        &self,
        address: &str,
        kind: ErrorKind,
        cause: &FetchError,
    ) -> Result<(), PublishError> {
        let mut state = self.state.lock();
        state.errors += 1;
        // Keep the reason as text: FetchError isn't Clone, and the summary
        // only needs to print it
        state.errored_pages.entry(kind).or_default().push(ErroredPage {
            address: address.to_string(),
            cause: cause.to_string(),
        });
        Ok(())
    }

    fn publish_stats(&self) -> Result<(), PublishError> {
        let stats = self.stats();
        let mut state = self.state.lock();

        match self.format {
            StatsFormat::Json => {
                let json = serde_json::to_string_pretty(&stats)?;
                writeln!(state.out, "{}", json)?;
            }
            StatsFormat::Text => {
                let out = &mut state.out;
                writeln!(out, "--------------------- Crawler stats ---------------------")?;
                writeln!(out, "Total time spent: {:.2} seconds", stats.seconds_spent)?;
                writeln!(out, "Total pages crawled: {}", stats.pages_crawled)?;
                writeln!(out, "Total links found: {}", stats.links_found)?;
                writeln!(out, "Total errors: {}", stats.errors)?;
                // One block per error kind, each failed page with its cause
                for (kind, pages) in &stats.errored_pages {
                    writeln!(out, "  {}: {}", kind, pages.len())?;
                    for page in pages {
                        writeln!(out, "   - {} ({})", page.address, page.cause)?;
                    }
                }
                writeln!(out, "---------------------------------------------------------")?;
            }
        }
        state.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    // A writer the test can read back after the publisher is done with it.
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().clone()).expect("utf8 output")
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_publish_prints_page_and_links() {
        let buffer = SharedBuffer::default();
        let publisher = ConsolePublisher::with_writer(StatsFormat::Text, Box::new(buffer.clone()));

        publisher
            .publish("https://example.com", &["/a".to_string(), "/b".to_string()])
            .expect("publish");

        assert_eq!(buffer.contents(), "Links found on:  https://example.com\n - /a\n - /b\n");
    }

    #[test]
    fn test_stats_count_pages_links_and_errors() {
        let publisher = ConsolePublisher::with_writer(StatsFormat::Text, Box::new(io::sink()));

        publisher.publish("https://example.com", &["/a".to_string()]).expect("publish");
        publisher
            .publish("https://example.com/a", &["/b".to_string(), "/c".to_string()])
            .expect("publish");
        let cause = FetchError::UnexpectedStatus(404);
        publisher
            .record_error("https://example.com/b", ErrorKind::classify(&cause), &cause)
            .expect("record");

        let stats = publisher.stats();
        assert_eq!(stats.pages_crawled, 2);
        assert_eq!(stats.links_found, 3);
        assert_eq!(stats.errors, 1);
        assert_eq!(
            stats.errored_pages.get(&ErrorKind::NotFound),
            Some(&vec![ErroredPage {
                address: "https://example.com/b".to_string(),
                cause: "failed with status 404".to_string(),
            }])
        );
    }

    #[test]
    fn test_json_stats() {
        let buffer = SharedBuffer::default();
        let publisher = ConsolePublisher::with_writer(StatsFormat::Json, Box::new(buffer.clone()));
        publisher.publish("https://example.com", &[]).expect("publish");
        publisher.publish_stats().expect("stats");

        let value: serde_json::Value =
            serde_json::from_str(buffer.contents().split_once('\n').map(|(_, rest)| rest).unwrap_or(""))
                .expect("valid json");
        assert_eq!(value["pages_crawled"], 1);
        assert_eq!(value["links_found"], 0);
    }

    #[test]
    fn test_text_stats_list_errors_by_kind() {
        let buffer = SharedBuffer::default();
        let publisher = ConsolePublisher::with_writer(StatsFormat::Text, Box::new(buffer.clone()));
        let cause = FetchError::UnexpectedStatus(403);
        publisher
            .record_error("https://example.com/private", ErrorKind::NoAccess, &cause)
            .expect("record");
        publisher.publish_stats().expect("stats");

        let output = buffer.contents();
        assert!(output.contains("Total errors: 1"));
        assert!(output.contains("  no_access: 1"));
        assert!(output.contains("   - https://example.com/private (failed with status 403)"));
    }

    #[test]
    fn test_json_stats_keep_error_cause() {
        let buffer = SharedBuffer::default();
        let publisher = ConsolePublisher::with_writer(StatsFormat::Json, Box::new(buffer.clone()));
        let cause = FetchError::UnexpectedStatus(502);
        publisher
            .record_error("https://example.com/flaky", ErrorKind::classify(&cause), &cause)
            .expect("record");
        publisher.publish_stats().expect("stats");

        let value: serde_json::Value = serde_json::from_str(&buffer.contents()).expect("valid json");
        let unknown = &value["errored_pages"]["unknown"][0];
        assert_eq!(unknown["address"], "https://example.com/flaky");
        assert_eq!(unknown["cause"], "failed with status 502");
    }

    #[test]
    fn test_write_failure_surfaces_as_publish_error() {
        let publisher = ConsolePublisher::with_writer(StatsFormat::Text, Box::new(FailingWriter));
        let err = publisher.publish("https://example.com", &[]).expect_err("write fails");
        assert!(matches!(err, PublishError::Io(_)));
    }
}
