// src/config.rs
// =============================================================================
// Configuration for a crawl session.
//
// Three layers:
// - CrawlOptions:  what a caller may ask for (all optional, JSON-friendly)
// - CrawlConfig:   the resolved, fixed-at-start values for one session
// - CrawlSettings: knobs the caller can NOT change (timeouts, concurrency)
//
// Rust concepts:
// - #[serde(default)]: missing JSON fields fall back to Default
// - BTreeSet: a sorted set, so logs and tests see domains in a stable order
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

pub const DEFAULT_MAX_PAGES: usize = 50;
pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Header value sent with every request so site owners can identify us.
pub const USER_AGENT: &str = concat!("link-sentinel/", env!("CARGO_PKG_VERSION"));

/// Options supplied by whoever starts the crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrawlOptions {
    pub max_pages: Option<usize>,
    pub max_depth: Option<usize>,
    pub allowed_domains: Option<Vec<String>>,
}

/// Session configuration, fixed once the crawl starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    pub max_pages: usize,
    pub max_depth: usize,
    pub allowed_domains: BTreeSet<String>,
}

impl CrawlConfig {
    /// Applies defaults and adds the seed's own host to the allowed set.
    pub fn resolve(options: &CrawlOptions, seed_host: &str) -> Self {
        let mut allowed_domains: BTreeSet<String> = options
            .allowed_domains
            .iter()
            .flatten()
            .map(|domain| domain.trim().to_ascii_lowercase())
            .filter(|domain| !domain.is_empty())
            .collect();
        allowed_domains.insert(seed_host.to_ascii_lowercase());

        Self {
            max_pages: options.max_pages.unwrap_or(DEFAULT_MAX_PAGES),
            max_depth: options.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
            allowed_domains,
        }
    }
}

/// Engine constants. Not client-configurable; tests shrink the delays.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub concurrency: usize,
    pub page_timeout: Duration,
    pub link_timeout: Duration,
    pub politeness_delay: Duration,
    pub drain_poll_interval: Duration,
    pub user_agent: String,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            page_timeout: Duration::from_millis(10_000),
            link_timeout: Duration::from_millis(5_000),
            politeness_delay: Duration::from_millis(500),
            drain_poll_interval: Duration::from_millis(500),
            user_agent: USER_AGENT.to_string(),
        }
    }
}
