// src/checker/http.rs
// =============================================================================
// This module is the crawler's only door to the network.
//
// Key functionality:
// - The Fetcher trait: "give me the status of this URL" (GET or HEAD)
// - ReqwestFetcher: the real implementation, built on reqwest
// - Detects transport failure modes (timeout, DNS, SSL errors, etc.)
//
// Important: a 404 or 500 is NOT an error at this layer. The server answered,
// so we hand back the status and let the caller decide what it means.
//
// Rust concepts:
// - async_trait: async methods inside a trait (needed for mocking in tests)
// - Result<T, E>: Ok(response) vs Err(TransportError)
// - Enums: To represent the request method
// =============================================================================

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

use crate::config::CrawlSettings;
use crate::error::{CrawlError, TransportError, TransportKind};

/// HTTP request method used by the crawler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
}

/// What came back from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code (any value, including 4xx/5xx)
    pub status: u16,
    /// Raw Content-Type header, if the server sent one
    pub content_type: Option<String>,
    /// Body text. Only read for GET responses that look like HTML.
    pub body: String,
}

impl FetchResponse {
    /// True when the Content-Type says this is an HTML page
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
            .unwrap_or(false)
    }
}

/// The HTTP fetch capability the crawler depends on.
///
/// Implementations must never fail on a non-2xx status; only transport
/// problems come back as `Err`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(
        &self,
        method: Method,
        url: &str,
        timeout: Duration,
    ) -> Result<FetchResponse, TransportError>;
}

/// Fetcher backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    // We reuse one client for every request (connection pooling).
    // Timeouts are set per request because pages and link checks differ.
    pub fn new(settings: &CrawlSettings) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))  // Follow up to 5 redirects
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(
        &self,
        method: Method,
        url: &str,
        timeout: Duration,
    ) -> Result<FetchResponse, TransportError> {
        let request = match method {
            Method::Get => self.client.get(url),
            Method::Head => self.client.head(url),
        };

        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(categorize_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut fetched = FetchResponse {
            status,
            content_type,
            body: String::new(),
        };

        // Only pages we might mine for links are worth downloading
        if method == Method::Get && fetched.is_html() {
            fetched.body = response.text().await.map_err(categorize_error)?;
        }

        Ok(fetched)
    }
}

// Categorizes different error types from reqwest
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
// - etc.
pub(crate) fn categorize_error(error: reqwest::Error) -> TransportError {
    // The Debug form includes the source chain; drop the URL so it can't match
    let error = error.without_url();
    let error_string = format!("{:?}", error).to_ascii_lowercase();

    if error.is_timeout() {
        TransportError::new(TransportKind::Timeout, "Request timed out")
    } else if error.is_redirect() {
        TransportError::new(TransportKind::TooManyRedirects, "Too many redirects")
    } else if error_string.contains("certificate")
        || error_string.contains("ssl")
        || error_string.contains("tls")
    {
        TransportError::new(TransportKind::Tls, "SSL certificate error")
    } else if error.is_connect() {
        // Connection errors often mean DNS issues or host unreachable
        if error_string.contains("dns") || error_string.contains("resolve") {
            TransportError::new(TransportKind::Dns, "Could not resolve hostname")
        } else {
            TransportError::new(TransportKind::Connect, "Connection failed")
        }
    } else {
        TransportError::new(TransportKind::Other, error.to_string())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a trait instead of calling reqwest directly?
//    - The crawler only needs "status (and maybe body) for a URL"
//    - Tests can plug in a fake Fetcher that never touches the network
//    - Arc<dyn Fetcher> lets the engine and the link checker share one
//
// 2. Why async_trait?
//    - It boxes the returned future so the trait stays object-safe
//    - That is what makes `dyn Fetcher` possible
//
// 3. Why is a 404 an Ok(...)?
//    - The request worked; the server just said "not found"
//    - The caller decides whether that makes the link broken
//
// 4. Why per-request timeouts?
//    - Page fetches get 10 seconds, link checks only 5
//    - RequestBuilder::timeout overrides the client-wide setting
// -----------------------------------------------------------------------------
