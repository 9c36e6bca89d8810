// src/fetch/html.rs
// =============================================================================
// This module pulls raw link strings out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Only three elements carry links we follow:
// - <a href="...">
// - <area href="...">
// - <link href="...">
//
// Links come back exactly as written in the page, in document order.
// Duplicates are kept: deduplication is the frontier's job.
// =============================================================================

use scraper::{Html, Selector};

// Matches every link-bearing element we recognize.
// scraper yields matches in document order, whatever the selector order is.
const LINK_SELECTOR: &str = "a[href], area[href], link[href]";

/// Extracts every href from recognized link elements, unmodified.
///
/// Example:
///   html = "<a href='/docs'>Docs</a><link href='style'>"
///   result = ["/docs", "style"]
pub fn extract_raw_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    // The selector is a constant known to be valid, so failing to parse it
    // is a programmer error rather than something a page can trigger.
    let selector = Selector::parse(LINK_SELECTOR).expect("link selector is valid CSS");

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}
