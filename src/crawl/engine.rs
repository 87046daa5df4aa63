// src/crawl/engine.rs
// =============================================================================
// This module implements the breadth-first crawl loop.
//
// How it works:
// 1. Start with the seed URL in the frontier queue (depth 0)
// 2. Pop the next page, fetch it, report it if it's broken
// 3. If it's HTML and we're not at max depth, extract its links
// 4. Same-site links go to the back of the frontier (depth + 1)
//    Off-site links go to the external link scheduler (checked, not crawled)
// 5. Repeat until the frontier is empty, the page budget runs out,
//    or someone calls stop()
// 6. Wait for the external link checks to finish, then emit `finished`
//
// Politeness:
// - Fixed delay between page fetches
// - Only one page fetch at a time
//
// Rust concepts:
// - HashSet: To track visited and already-classified URLs (O(1) lookup)
// - VecDeque: Double-ended queue for breadth-first crawling
// - Arc<dyn Trait>: Shared, swappable HTTP and sink implementations
// =============================================================================

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::lifecycle::{CrawlControl, CrawlPhase};
use super::normalize::{host_of, is_allowed, normalize, resolve};
use super::report::Reporter;
use super::scheduler::{ExternalCheckScheduler, ExternalWorkItem};
use crate::checker::{extract_html_links, Fetcher, LinkVerifier, Method};
use crate::config::{CrawlConfig, CrawlOptions, CrawlSettings};
use crate::error::CrawlError;
use crate::events::{BrokenLinkRecord, BrokenStatus, LinkSource, ProgressSink, ProgressUpdate};

/// One entry in the frontier queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub url: String,
    /// Link hops from the seed (seed = 0)
    pub depth: usize,
}

#[derive(Debug, Default)]
struct CrawlState {
    frontier: VecDeque<CrawlTarget>,
    // Pages the loop has dequeued and fetched
    visited: HashSet<String>,
    // Links already routed to the frontier or the external scheduler
    checked: HashSet<String>,
    pages_crawled: usize,
}

/// One crawl session. Build a fresh engine for every crawl.
pub struct CrawlEngine {
    fetcher: Arc<dyn Fetcher>,
    reporter: Arc<Reporter>,
    scheduler: ExternalCheckScheduler,
    settings: CrawlSettings,
    control: CrawlControl,
    state: CrawlState,
}

impl CrawlEngine {
    pub fn new(fetcher: Arc<dyn Fetcher>, sink: Arc<dyn ProgressSink>, settings: CrawlSettings) -> Self {
        let control = CrawlControl::new();
        let reporter = Arc::new(Reporter::new(sink));
        let verifier = LinkVerifier::new(fetcher.clone(), settings.link_timeout);
        let scheduler = ExternalCheckScheduler::new(
            verifier,
            reporter.clone(),
            control.clone(),
            settings.concurrency,
        );

        Self {
            fetcher,
            reporter,
            scheduler,
            settings,
            control,
            state: CrawlState::default(),
        }
    }

    /// Handle for stopping this session from another task
    pub fn control(&self) -> CrawlControl {
        self.control.clone()
    }

    pub fn stop(&self) {
        self.control.stop();
    }

    pub fn phase(&self) -> CrawlPhase {
        self.control.phase()
    }

    pub fn pages_crawled(&self) -> usize {
        self.state.pages_crawled
    }

    /// Crawls from `seed_url` until done or stopped.
    ///
    /// Returns the broken links in the order they were reported. An invalid
    /// seed emits an `error` event and the session never starts. An engine
    /// stopped before this call finishes at once with an empty list.
    pub async fn start(
        &mut self,
        seed_url: &str,
        options: &CrawlOptions,
    ) -> Result<Vec<BrokenLinkRecord>, CrawlError> {
        // Parse and validate the starting URL
        let Some((seed, seed_host)) = normalize(seed_url).and_then(|url| {
            let host = host_of(&url)?;
            Some((url, host))
        }) else {
            self.reporter.error(format!("Invalid URL: {}", seed_url));
            return Err(CrawlError::InvalidSeedUrl(seed_url.to_string()));
        };

        if !self.control.begin() {
            // Stopped before it ever ran: the caller still gets its `finished`
            if self.control.phase() == CrawlPhase::Cancelled && !self.reporter.is_finished() {
                info!(seed = %seed, "crawl stopped before it started");
                return Ok(self.reporter.finish());
            }
            return Err(CrawlError::NotIdle);
        }

        let config = CrawlConfig::resolve(options, &seed_host);
        info!(
            seed = %seed,
            max_pages = config.max_pages,
            max_depth = config.max_depth,
            "crawl started"
        );
        self.reporter.log(format!(
            "Starting crawl of {} (max {} pages, depth {})",
            seed, config.max_pages, config.max_depth
        ));

        self.state.checked.insert(seed.clone());
        self.state.frontier.push_back(CrawlTarget { url: seed, depth: 0 });

        // Process the queue until empty, out of budget, or stopped
        while self.control.is_running() && self.state.pages_crawled < config.max_pages {
            let Some(target) = self.state.frontier.pop_front() else {
                break;
            };

            // Skip if already visited
            if !self.state.visited.insert(target.url.clone()) {
                continue;
            }

            self.state.pages_crawled += 1;
            self.reporter.progress(ProgressUpdate {
                url: target.url.clone(),
                count: self.state.pages_crawled,
                queue_size: self.state.frontier.len(),
                depth: target.depth,
            });
            self.reporter
                .log(format!("Crawling [depth {}]: {}", target.depth, target.url));

            self.crawl_page(&target, &config).await;

            // Polite crawling: fixed delay between requests
            tokio::time::sleep(self.settings.politeness_delay).await;
        }

        // Let the external link checks catch up
        while self.control.is_running() && !self.scheduler.is_idle() {
            self.scheduler.drain();
            tokio::time::sleep(self.settings.drain_poll_interval).await;
        }

        let broken_links = self.reporter.finish();
        self.control.complete();
        info!(
            pages = self.state.pages_crawled,
            broken = broken_links.len(),
            phase = ?self.control.phase(),
            "crawl finished"
        );
        Ok(broken_links)
    }

    // Fetches one frontier page and, if allowed, mines it for links
    async fn crawl_page(&mut self, target: &CrawlTarget, config: &CrawlConfig) {
        let response = match self
            .fetcher
            .fetch(Method::Get, &target.url, self.settings.page_timeout)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(url = %target.url, error = %err, "page fetch failed");
                self.reporter
                    .error(format!("Failed to fetch {}: {}", target.url, err));
                self.reporter.broken_link(BrokenLinkRecord {
                    url: target.url.clone(),
                    status: BrokenStatus::Transport(err),
                    source: LinkSource::Frontier,
                });
                return;
            }
        };

        if response.status >= 400 {
            self.reporter.broken_link(BrokenLinkRecord {
                url: target.url.clone(),
                status: BrokenStatus::Http(response.status),
                source: LinkSource::Frontier,
            });
            return;
        }

        if !response.is_html() {
            debug!(url = %target.url, content_type = ?response.content_type, "not HTML, skipping links");
            return;
        }

        // At the depth limit the page is checked but not mined
        if target.depth >= config.max_depth {
            return;
        }

        for href in extract_html_links(&response.body) {
            self.classify_link(&href, target, config);
        }
    }

    // Routes one discovered href to the frontier or the external scheduler
    fn classify_link(&mut self, href: &str, page: &CrawlTarget, config: &CrawlConfig) {
        // Relative, malformed, mailto:, javascript: ... all end up None here
        let Some(url) = resolve(href, &page.url) else {
            return;
        };
        let Some(host) = host_of(&url) else {
            return;
        };
        if !self.state.checked.insert(url.clone()) {
            return;
        }

        if is_allowed(&host, &config.allowed_domains) {
            let queued = self.state.frontier.iter().any(|t| t.url == url);
            if !self.state.visited.contains(&url) && !queued {
                self.state.frontier.push_back(CrawlTarget {
                    url,
                    depth: page.depth + 1,
                });
            }
        } else {
            self.scheduler.submit(ExternalWorkItem {
                url,
                source: page.url.clone(),
            });
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why two sets (visited and checked)?
//    - visited: pages this loop actually fetched
//    - checked: every link we've already decided what to do with
//    - The same link often appears on dozens of pages; `checked` makes sure
//      it's queued (or sent off for checking) only the first time
//
// 2. What is `let ... else`?
//    - Pattern match, and if it doesn't match, run the else block
//    - The else block must leave the function or loop (return/break/continue)
//
// 3. Why is stop() cooperative?
//    - It only flips a flag; the loops look at it between pages
//    - A fetch that's already running is allowed to finish
//
// 4. Why await the sleep instead of std::thread::sleep?
//    - tokio::time::sleep yields to other tasks (like the link checkers)
//    - std::thread::sleep would freeze the whole worker thread
// -----------------------------------------------------------------------------
