// src/fetch/http.rs
// =============================================================================
// This module fetches pages over HTTP and sorts each response into one of:
// - a page we can read links from (200, 201, 203, 204, 206)
// - a redirect we hand back to the crawler (301, 302, 303, 307, 308)
// - a failure (everything else, plus network errors)
//
// Redirects are NOT followed here. The crawler treats the Location target
// as the only link on the page, so redirect chains go through the same
// dedup as every other link and can't loop forever.
//
// Rust concepts:
// - async/await: network I/O without blocking the worker thread
// - thiserror: each failure mode is its own enum variant with a message
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use super::Fetch;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Looking like a browser keeps some servers from answering 202.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

/// A response the crawler can work with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// The page body (may be empty, e.g. for 204).
    Page { status: u16, body: String },
    /// The page moved; `location` is the raw Location header value.
    Redirect { status: u16, location: String },
}

/// Every way a single fetch can fail.
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS, connection, TLS or timeout problems
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("received HTTP 202 Accepted - processing not complete")]
    Accepted,

    #[error("received HTTP 429 Too Many Requests")]
    TooManyRequests,

    #[error("failed with status {0}")]
    UnexpectedStatus(u16),

    #[error("redirect status {0} without Location header")]
    MissingLocation(u16),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

impl FetchError {
    /// The HTTP status behind this failure, if there was a response at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Accepted => Some(202),
            FetchError::TooManyRequests => Some(429),
            FetchError::UnexpectedStatus(code) | FetchError::MissingLocation(code) => Some(*code),
            FetchError::Transport(_) | FetchError::Body(_) => None,
        }
    }

    /// 202 and 429 mean "try again later" rather than "this page is broken".
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Accepted | FetchError::TooManyRequests)
    }
}

/// Fetches pages with a shared reqwest client.
///
/// Client is cheap to clone (it's reference counted internally), so one
/// HttpFetcher can serve every worker.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            // 3xx responses must reach the crawler untouched
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Fetched, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status().as_u16();
        debug!(url, status, "received response");

        match status {
            200 | 201 | 203 | 204 | 206 => {
                let body = response.text().await.map_err(FetchError::Body)?;
                Ok(Fetched::Page { status, body })
            }
            301 | 302 | 303 | 307 | 308 => {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .filter(|value| !value.trim().is_empty())
                    .map(str::to_string)
                    .ok_or(FetchError::MissingLocation(status))?;
                Ok(Fetched::Redirect { status, location })
            }
            202 => Err(FetchError::Accepted),
            429 => Err(FetchError::TooManyRequests),
            other => Err(FetchError::UnexpectedStatus(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(5), DEFAULT_USER_AGENT).expect("client builds")
    }

    async fn respond(server: &MockServer, route: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(template)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_ok_page_returns_body() {
        let server = MockServer::start().await;
        respond(&server, "/", ResponseTemplate::new(200).set_body_string("<a href=\"/x\">x</a>")).await;

        let result = fetcher().fetch(&server.uri()).await.expect("page");
        assert_eq!(
            result,
            Fetched::Page { status: 200, body: "<a href=\"/x\">x</a>".to_string() }
        );
    }

    #[tokio::test]
    async fn test_no_content_is_an_empty_page() {
        let server = MockServer::start().await;
        respond(&server, "/empty", ResponseTemplate::new(204)).await;

        let url = format!("{}/empty", server.uri());
        let result = fetcher().fetch(&url).await.expect("page");
        assert_eq!(result, Fetched::Page { status: 204, body: String::new() });
    }

    #[tokio::test]
    async fn test_redirect_is_not_followed() {
        let server = MockServer::start().await;
        respond(
            &server,
            "/old",
            ResponseTemplate::new(301).insert_header("Location", "https://example.com/new"),
        )
        .await;

        let url = format!("{}/old", server.uri());
        let result = fetcher().fetch(&url).await.expect("redirect");
        assert_eq!(
            result,
            Fetched::Redirect { status: 301, location: "https://example.com/new".to_string() }
        );
    }

    #[tokio::test]
    async fn test_redirect_without_location_fails() {
        let server = MockServer::start().await;
        respond(&server, "/moved", ResponseTemplate::new(302)).await;

        let url = format!("{}/moved", server.uri());
        let err = fetcher().fetch(&url).await.expect_err("missing location");
        assert!(matches!(err, FetchError::MissingLocation(302)));
        assert_eq!(err.status(), Some(302));
    }

    #[tokio::test]
    async fn test_transient_statuses() {
        let server = MockServer::start().await;
        respond(&server, "/accepted", ResponseTemplate::new(202)).await;
        respond(&server, "/busy", ResponseTemplate::new(429)).await;

        let accepted = fetcher()
            .fetch(&format!("{}/accepted", server.uri()))
            .await
            .expect_err("202 is a failure");
        assert!(matches!(accepted, FetchError::Accepted));
        assert!(accepted.is_transient());

        let busy = fetcher()
            .fetch(&format!("{}/busy", server.uri()))
            .await
            .expect_err("429 is a failure");
        assert!(matches!(busy, FetchError::TooManyRequests));
        assert!(busy.is_transient());
    }

    #[tokio::test]
    async fn test_unexpected_status_carries_code() {
        let server = MockServer::start().await;
        respond(&server, "/missing", ResponseTemplate::new(404)).await;

        let err = fetcher()
            .fetch(&format!("{}/missing", server.uri()))
            .await
            .expect_err("404");
        assert!(matches!(err, FetchError::UnexpectedStatus(404)));
        assert_eq!(err.to_string(), "failed with status 404");
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Port 1 is privileged and nothing listens there in test environments.
        let err = fetcher()
            .fetch("http://127.0.0.1:1/")
            .await
            .expect_err("nothing listening");
        assert!(matches!(err, FetchError::Transport(_)));
        assert_eq!(err.status(), None);
    }
}
