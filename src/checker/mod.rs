// src/checker/mod.rs
// =============================================================================
// This module contains everything that talks to (or reads from) the web.
//
// Submodules:
// - http: The Fetcher trait and the reqwest-backed implementation
// - html: Extracts href values from HTML pages
// - verify: Decides whether a single link is reachable (HEAD, then GET)
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of the crate can use.
// =============================================================================

// Declare submodules (tells Rust to include these files)
mod html;
mod http;
mod verify;

// Re-export public items from submodules
// This lets users write `checker::LinkVerifier` instead of
// `checker::verify::LinkVerifier`
pub use html::extract_html_links;
pub use http::{FetchResponse, Fetcher, Method, ReqwestFetcher};
pub use verify::{LinkVerifier, VerificationOutcome};
