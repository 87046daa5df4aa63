// src/checker/html.rs
// =============================================================================
// This module pulls raw href values out of HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Resolving and filtering the hrefs is NOT done here. The crawler hands every
// href to crawl::normalize, which knows about base URLs and schemes.
// =============================================================================

use scraper::{Html, Selector};
use std::sync::LazyLock;

// "a[href]" means "all <a> tags that have an href attribute"
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector"));

/// Returns the href of every anchor element, in document order.
///
/// Values are trimmed; empty hrefs are dropped. Nothing is resolved, so
/// relative paths, fragments and `mailto:` links all come back as written.
pub fn extract_html_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect()
}
