// src/scope/filters.rs
// =============================================================================
// This module decides which raw links are allowed into the crawl frontier.
//
// A link must pass every filter to be crawled:
// - NotEmpty:     something is left after sanitizing ("", "/", "#" are empty)
// - Internal:     it points at the site we started from
// - NotFragment:  it is not just a jump to a section of the same page
// - NotMailLink:  it is not a mailto: link
// - NotTelephone: it is not a tel: link
// - NotFile:      it does not end with a known non-HTML file extension
//
// Each filter is a small enum variant with one capability: `matches`.
// The Scope holds them in a Vec and checks them in order.
//
// Rust concepts:
// - Enums with data: Internal carries the base domain it compares against
// - Iterator::all: short-circuits on the first filter that says no
// =============================================================================

use url::Url;

// Extensions that never lead to an HTML page.
//
// The check is a plain, case-sensitive suffix match on the whole link, so
// "photo.jpg?v=1" is NOT treated as a file.
const FILE_SUFFIXES: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".webp", ".tiff", ".ico",
    ".js", ".mjs", ".cjs", ".css",
    ".mp4", ".webm", ".ogv", ".avi", ".mov", ".flv", ".mkv", ".wmv",
    ".mp3", ".wav", ".ogg", ".m4a", ".flac",
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".odt", ".ods", ".odp",
    ".zip", ".rar", ".7z", ".tar", ".gz", ".bz2",
    ".exe", ".dmg", ".apk", ".bin", ".iso",
    ".csv", ".txt", ".xml", ".json", ".rss", ".rss.xml", ".woff2",
];

/// Reduces a link to the form used for comparisons and identity.
///
/// Steps, in order: trim whitespace, drop one trailing `#`, drop an
/// `https://` or `http://` scheme, trim slashes on both ends, drop a
/// leading `www.`.
///
/// ```text
/// "https://www.example.com/about/" -> "example.com/about"
/// " /contact# "                    -> "contact"
/// ```
pub fn sanitize_link(link: &str) -> String {
    let link = link.trim();
    let link = link.strip_suffix('#').unwrap_or(link);
    let link = link.strip_prefix("https://").unwrap_or(link);
    let link = link.strip_prefix("http://").unwrap_or(link);
    let link = link.trim_matches('/');
    let link = link.strip_prefix("www.").unwrap_or(link);
    link.to_string()
}

/// One check in the scope pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkFilter {
    NotEmpty,
    /// Holds the sanitized, lower-cased domain of the seed (with port, if any).
    Internal { base_domain: String },
    NotFragment,
    NotMailLink,
    NotTelephone,
    NotFile,
}

impl LinkFilter {
    /// Builds the internal-link filter for a seed URL.
    ///
    /// "https://www.Example.com/docs" -> base domain "example.com"
    pub fn internal(base_url: &str) -> Self {
        let sanitized = sanitize_link(base_url);
        // split always yields at least one item, even for ""
        let base_domain = sanitized
            .split('/')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        LinkFilter::Internal { base_domain }
    }

    /// Returns true if the link passes this check.
    pub fn matches(&self, link: &str) -> bool {
        match self {
            LinkFilter::NotEmpty => {
                let sanitized = sanitize_link(link);
                !sanitized.trim_matches('#').is_empty()
            }
            LinkFilter::Internal { base_domain } => is_internal(link, base_domain),
            LinkFilter::NotFragment => {
                let sanitized = sanitize_link(link);
                !sanitized.is_empty() && !sanitized.starts_with('#')
            }
            LinkFilter::NotMailLink => !link.trim().starts_with("mailto:"),
            LinkFilter::NotTelephone => !link.trim().starts_with("tel:"),
            LinkFilter::NotFile => !FILE_SUFFIXES.iter().any(|suffix| link.ends_with(suffix)),
        }
    }
}

// A link is internal when:
// - it starts with '/' or '#' (same site by construction)
// - it has no "://" (relative, like "about" or "docs/intro")
// - its host, ignoring case and a "www." prefix, equals the base domain
//
// Absolute links that don't parse or have no host are rejected.
fn is_internal(link: &str, base_domain: &str) -> bool {
    let link = link.trim();
    if link.starts_with('#') || link.starts_with('/') {
        return true;
    }
    if !link.contains("://") {
        return true;
    }

    let parsed = match Url::parse(link) {
        Ok(url) => url,
        Err(_) => return false,
    };
    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host.to_lowercase(),
        _ => return false,
    };

    // The base domain keeps its port (e.g. "127.0.0.1:8080"), so compare
    // against host:port when the link carries an explicit port.
    let authority = match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    };
    let authority = authority.strip_prefix("www.").unwrap_or(&authority);

    authority == base_domain
}
