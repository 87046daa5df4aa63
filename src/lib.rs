// src/lib.rs
// =============================================================================
// link-sentinel: a live, cancellable website link checker.
//
// Give it a seed URL and it crawls same-site pages breadth-first, checks every
// link it finds (internal and external), and streams progress and broken links
// to a ProgressSink as they happen.
//
// Modules:
// - checker: HTTP fetching, HTML link extraction, single-link verification
// - crawl:   the crawl engine, external link scheduler, URL normalization
// - session: background sessions and the per-channel registry
// - config, events, error: shared types
// =============================================================================

pub mod checker;
pub mod config;
pub mod crawl;
pub mod error;
pub mod events;
pub mod session;

pub use checker::{Fetcher, ReqwestFetcher};
pub use config::{CrawlOptions, CrawlSettings};
pub use crawl::{CrawlControl, CrawlEngine, CrawlPhase};
pub use error::{CrawlError, TransportError, TransportKind};
pub use events::{
    BrokenLinkRecord, BrokenStatus, ChannelSink, CrawlEvent, LinkSource, ProgressSink,
    ProgressUpdate, SessionEvent, TaggedSink,
};
pub use session::{ControlCommand, Session, SessionRegistry};
