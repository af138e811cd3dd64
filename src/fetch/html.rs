// src/fetch/html.rs
// =============================================================================
// This module extracts raw href values from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Never fails: broken markup is repaired the way a browser would do it
// - Supports CSS selectors for finding elements
//
// Resolution and filtering are NOT done here; the crawl engine runs every
// href through crate::normalize against the page URL.
// =============================================================================

use std::sync::OnceLock;

use scraper::{Html, Selector};

// Anchors that carry an href. <a> without href never reaches the loop.
fn anchor_selector() -> Option<&'static Selector> {
    static SELECTOR: OnceLock<Option<Selector>> = OnceLock::new();
    SELECTOR
        .get_or_init(|| Selector::parse("a[href]").ok())
        .as_ref()
}

// Extracts every href attribute value from the anchors in `html`, in
// document order, without any cleanup.
//
// Example:
//   html = "<a href='/docs'>Docs</a><a>no link</a>"
//   result = ["/docs"]
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let Some(selector) = anchor_selector() else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    document
        .select(selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why OnceLock?
//    - Selector::parse is not free; the selector is built once per process
//      and shared by every worker task
//
// 2. Why return a Vec and not an iterator?
//    - scraper::Html is not Send, so it cannot be held across an .await in a
//      worker task. Collecting into owned Strings lets the document drop
//      before the engine does anything async
// -----------------------------------------------------------------------------
