// src/scope/mod.rs
// =============================================================================
// This module decides what the crawler is allowed to visit.
//
// Submodules:
// - filters:   the predicate chain every raw link must pass
// - normalize: turns an accepted raw link into an absolute Address
//
// A Scope is built once per crawl from the seed URL. It is immutable after
// that, so every worker can share it without locking.
// =============================================================================

mod filters;
mod normalize;

use filters::LinkFilter;
use normalize::to_absolute;

pub use normalize::Address;

/// The filter pipeline plus the seed it was built for.
#[derive(Debug, Clone)]
pub struct Scope {
    base_url: String,
    filters: Vec<LinkFilter>,
    // Subset applied to a page's link list before it is reported. External
    // links and fragments stay in the listing; only junk is dropped.
    listing: Vec<LinkFilter>,
}

impl Scope {
    /// Builds the standard pipeline for a seed URL.
    ///
    /// Order matters only for speed: cheap string checks run before the
    /// internal-link check, which may parse a URL.
    pub fn for_seed(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            filters: vec![
                LinkFilter::NotEmpty,
                LinkFilter::NotFragment,
                LinkFilter::NotMailLink,
                LinkFilter::NotTelephone,
                LinkFilter::NotFile,
                LinkFilter::internal(base_url),
            ],
            listing: vec![
                LinkFilter::NotFile,
                LinkFilter::NotEmpty,
                LinkFilter::NotMailLink,
                LinkFilter::NotTelephone,
            ],
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// True if the raw link passes every filter.
    pub fn is_eligible(&self, link: &str) -> bool {
        self.filters.iter().all(|filter| filter.matches(link))
    }

    /// True if the raw link belongs in the page's reported link list.
    ///
    /// Empty, mailto:, tel: and file links are never listed.
    pub fn is_listable(&self, link: &str) -> bool {
        self.listing.iter().all(|filter| filter.matches(link))
    }

    /// Filters and normalizes a raw link in one step.
    ///
    /// Returns None for links outside the scope; malformed links land here
    /// too and are not treated as errors.
    pub fn admit(&self, link: &str) -> Option<Address> {
        if !self.is_eligible(link) {
            return None;
        }
        Some(Address::new(to_absolute(link, &self.base_url)))
    }
}
