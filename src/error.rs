// src/error.rs
// =============================================================================
// Typed errors for the library side of link-sentinel.
//
// Two families:
// - CrawlError: things that stop a session from starting at all
// - TransportError: a request never produced an HTTP status (timeout, DNS, ...)
//
// Non-2xx statuses are NOT errors here. A 404 is a perfectly good answer
// from the server; the crawler turns it into a broken-link record.
// =============================================================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that prevent a crawl session from running.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The seed could not be parsed, or is not an http(s) URL with a host.
    #[error("Invalid URL '{0}'")]
    InvalidSeedUrl(String),

    /// start() was called on an engine that already ran or was stopped.
    #[error("crawl session is no longer idle")]
    NotIdle,

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Broad category of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    Timeout,
    TooManyRedirects,
    Dns,
    Connect,
    Tls,
    Other,
}

/// A request that failed before any status code came back.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
