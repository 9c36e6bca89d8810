// src/scope/normalize.rs
// =============================================================================
// Turns a raw link into an absolute address on the seed's site.
//
// This is a best-effort heuristic, not a browser-grade resolver:
// - it does not resolve ".." segments
// - relative links are resolved against the seed, not the current page
// - query strings and fragments are kept as sanitizing leaves them
// =============================================================================

use std::fmt;

use super::filters::sanitize_link;

/// An absolute URL that has been accepted into the crawl.
///
/// Two addresses are the same page when their sanitized forms match, so
/// `https://www.example.com/` and `http://example.com` share one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    url: String,
    key: String,
}

impl Address {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let key = sanitize_link(&url);
        Self { url, key }
    }

    /// The URL to fetch.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// The identity used for deduplication.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

// Picks the scheme for normalized links.
// Only a seed that literally starts with https:// gets https; anything else
// (including a seed with no scheme at all) falls back to http.
fn scheme_for(base_url: &str) -> &'static str {
    if base_url.trim().starts_with("https://") {
        "https://"
    } else {
        "http://"
    }
}

/// Builds an absolute URL for `link` relative to the seed `base_url`.
///
/// Examples:
///   base "https://example.com",  link "/about"   -> "https://example.com/about"
///   base "example.com",          link "/services" -> "http://example.com/services"
///   base "https://example.com/", link "about"     -> "https://example.com/about"
pub fn to_absolute(link: &str, base_url: &str) -> String {
    let link = sanitize_link(link);
    let base_domain = sanitize_link(base_url);
    let scheme = scheme_for(base_url);

    if link.starts_with(&base_domain) {
        format!("{}{}", scheme, link)
    } else {
        format!("{}{}/{}", scheme, base_domain, link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https_base_with_relative_link() {
        assert_eq!(to_absolute("/about", "https://example.com"), "https://example.com/about");
    }

    #[test]
    fn test_http_base_with_relative_link() {
        assert_eq!(to_absolute("/contact", "http://example.com"), "http://example.com/contact");
    }

    #[test]
    fn test_base_without_scheme_defaults_to_http() {
        assert_eq!(to_absolute("/services", "example.com"), "http://example.com/services");
    }

    #[test]
    fn test_link_already_containing_base_domain() {
        assert_eq!(
            to_absolute("example.com/products", "https://example.com"),
            "https://example.com/products"
        );
        assert_eq!(
            to_absolute("https://www.example.com/products/", "https://example.com"),
            "https://example.com/products"
        );
    }

    #[test]
    fn test_relative_link_without_leading_slash() {
        assert_eq!(to_absolute("about", "https://example.com"), "https://example.com/about");
        assert_eq!(to_absolute("about", "https://example.com/"), "https://example.com/about");
    }

    #[test]
    fn test_subdomain_base_with_nested_path() {
        assert_eq!(
            to_absolute("posts/2023/article", "https://blog.example.com"),
            "https://blog.example.com/posts/2023/article"
        );
    }

    #[test]
    fn test_address_identity_ignores_scheme_and_www() {
        let a = Address::new("https://www.example.com/");
        let b = Address::new("http://example.com");
        assert_eq!(a.key(), b.key());
        assert_ne!(a.as_str(), b.as_str());
        assert_eq!(a.to_string(), "https://www.example.com/");
    }
}
