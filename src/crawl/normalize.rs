// src/crawl/normalize.rs
// =============================================================================
// URL canonicalization and domain classification.
//
// Everything here is pure: no I/O, no state. The crawler uses these helpers to
// decide (1) whether two hrefs point at the same page and (2) whether a link
// stays on the site or is an external link to be checked but never crawled.
//
// Canonical form = what the `url` crate serializes, minus any #fragment.
// "https://Example.com/a#intro" and "https://example.com/a" are the same page.
// =============================================================================

use url::Url;

/// Parses an absolute http(s) URL and drops its fragment.
///
/// Returns `None` for anything unparseable or for other schemes.
pub fn normalize(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    canonical(&mut url)
}

/// Resolves a possibly-relative `href` against the page it appeared on.
pub fn resolve(href: &str, base_url: &str) -> Option<String> {
    let base = Url::parse(base_url).ok()?;
    let mut url = base.join(href.trim()).ok()?;
    canonical(&mut url)
}

/// Hostname of an already-normalized URL.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .map(|host| host.to_ascii_lowercase())
}

/// True if `hostname` equals an allowed domain or is a strict subdomain of one.
///
/// Only a dot boundary counts: `notexample.com` does not match `example.com`.
pub fn is_allowed<'a, I>(hostname: &str, allowed_domains: I) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    let hostname = hostname.to_ascii_lowercase();
    allowed_domains.into_iter().any(|domain| {
        hostname == *domain
            || hostname
                .strip_suffix(domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

fn canonical(url: &mut Url) -> Option<String> {
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    url.set_fragment(None);
    Some(url.to_string())
}
