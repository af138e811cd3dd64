// src/normalize.rs
// =============================================================================
// URL normalization for the crawler.
//
// Two jobs:
// 1. resolve(): turn an href found on a page into an absolute URL string
// 2. same_domain(): decide whether a URL belongs to the host being crawled
//
// Deduplication downstream is plain string equality, so these functions
// deliberately do NOT canonicalize anything beyond what relative resolution
// requires. "https://a.com" and "https://a.com/" are two different URLs.
//
// Rust concepts:
// - Pattern matching on error variants: url::ParseError tells us whether a
//   string was merely relative or genuinely malformed
// =============================================================================

use url::{ParseError, Url};

// Resolves a possibly-relative href against the URL of the page it was
// found on.
//
// Returns:
//   - the href itself (trimmed) when it is already absolute
//   - the RFC 3986 resolution against `base_url` when it is relative
//   - an empty string when either input is malformed; callers drop it
//
// Examples:
//   resolve("../../search", "https://monzo.com/about/a/") -> "https://monzo.com/search"
//   resolve("/search", "https://monzo.com/about/a/")     -> "https://monzo.com/search"
//   resolve("https://monzo.com", "https://google.com")   -> "https://monzo.com"
pub fn resolve(href: &str, base_url: &str) -> String {
    let href = href.trim();
    match Url::parse(href) {
        Ok(_) => href.to_string(),
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(base_url)
            .and_then(|base| base.join(href))
            .map(|url| url.to_string())
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

// Checks whether `url` is on `target_host`.
//
// The match is exact on the host: no subdomain matching, no scheme check,
// no port normalization. A relative string is accepted (it can only show up
// here when resolution fell back), a malformed one never is.
pub fn same_domain(url: &str, target_host: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.host_str() == Some(target_host),
        Err(ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

// Extracts the host a crawl is restricted to from its root URL.
// None when the root does not parse or has no host ("com", "/a", "ww.bb.cc").
pub fn root_host(root_url: &str) -> Option<String> {
    Url::parse(root_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .filter(|host| !host.is_empty())
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why return String instead of Option<String>?
//    - The empty string is the "discard me" value; the engine checks
//      is_empty() before doing anything else with a resolved link
//
// 2. Why is "mailto:x@y.com" rejected by same_domain?
//    - It parses as an absolute URL but has no host, so it can never equal
//      the crawl host
// -----------------------------------------------------------------------------
