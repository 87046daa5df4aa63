// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling starting from a seed URL
// - Same-site pages are crawled; off-site links are only checked
// - Configurable depth and page budgets
// - Bounded concurrency for external link checks
// - Cooperative cancellation through CrawlControl
//
// Submodules:
// - normalize: URL canonicalization and allowed-domain matching
// - engine: the frontier loop
// - scheduler: the external link checker pool
// - report: ordered event delivery and the broken-link list
// - lifecycle: idle / running / completed / cancelled
// =============================================================================

mod engine;
mod lifecycle;
pub mod normalize;
mod report;
mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

// Re-export the crawl API
pub use engine::{CrawlEngine, CrawlTarget};
pub use lifecycle::{CrawlControl, CrawlPhase};
pub use report::Reporter;
pub use scheduler::{ExternalCheckScheduler, ExternalWorkItem};
