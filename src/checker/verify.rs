// src/checker/verify.rs
// =============================================================================
// Reachability check for a single link.
//
// Protocol:
// 1. HEAD the URL (cheap, no body download)
//    - no response at all (timeout, DNS, ...) -> broken, done
// 2. If HEAD says >= 400, try GET once
//    - some servers answer HEAD with 405/403/404 but serve GET just fine
// 3. Final status >= 400 -> broken, otherwise ok
//
// This module never reports anything. It returns an outcome and the caller
// (the external link scheduler) decides what to do with it.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::http::{Fetcher, Method};
use crate::events::BrokenStatus;

/// Result of checking one link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Ok,
    Broken(BrokenStatus),
}

impl VerificationOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, VerificationOutcome::Ok)
    }
}

pub struct LinkVerifier {
    fetcher: Arc<dyn Fetcher>,
    timeout: Duration,
}

impl LinkVerifier {
    pub fn new(fetcher: Arc<dyn Fetcher>, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    pub async fn verify(&self, url: &str) -> VerificationOutcome {
        let head = match self.fetcher.fetch(Method::Head, url, self.timeout).await {
            Ok(response) => response,
            Err(err) => return VerificationOutcome::Broken(BrokenStatus::Transport(err)),
        };

        let mut status = head.status;
        if status >= 400 {
            debug!(url, status, "HEAD rejected, retrying with GET");
            status = match self.fetcher.fetch(Method::Get, url, self.timeout).await {
                Ok(response) => response.status,
                Err(err) => return VerificationOutcome::Broken(BrokenStatus::Transport(err)),
            };
        }

        if status >= 400 {
            VerificationOutcome::Broken(BrokenStatus::Http(status))
        } else {
            VerificationOutcome::Ok
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::http::FetchResponse;
    use crate::error::{TransportError, TransportKind};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Answers from a fixed table and records every request it sees
    #[derive(Default)]
    struct TableFetcher {
        answers: HashMap<Method, Result<u16, TransportError>>,
        calls: Mutex<Vec<Method>>,
    }

    impl TableFetcher {
        fn with(mut self, method: Method, answer: Result<u16, TransportError>) -> Self {
            self.answers.insert(method, answer);
            self
        }

        fn calls(&self) -> Vec<Method> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for TableFetcher {
        async fn fetch(
            &self,
            method: Method,
            _url: &str,
            _timeout: Duration,
        ) -> Result<FetchResponse, TransportError> {
            self.calls.lock().unwrap().push(method);
            self.answers[&method].clone().map(|status| FetchResponse {
                status,
                content_type: None,
                body: String::new(),
            })
        }
    }

    async fn run(fetcher: TableFetcher) -> (VerificationOutcome, Vec<Method>) {
        let fetcher = Arc::new(fetcher);
        let verifier = LinkVerifier::new(fetcher.clone(), Duration::from_secs(5));
        let outcome = verifier.verify("https://external.test/").await;
        (outcome, fetcher.calls())
    }

    #[tokio::test]
    async fn test_head_ok_skips_get() {
        let (outcome, calls) = run(TableFetcher::default().with(Method::Head, Ok(200))).await;
        assert!(outcome.is_ok());
        assert_eq!(calls, vec![Method::Head]);
    }

    #[tokio::test]
    async fn test_redirect_status_is_ok() {
        let (outcome, _) = run(TableFetcher::default().with(Method::Head, Ok(301))).await;
        assert_eq!(outcome, VerificationOutcome::Ok);
    }

    #[tokio::test]
    async fn test_head_405_falls_back_to_get() {
        let fetcher = TableFetcher::default()
            .with(Method::Head, Ok(405))
            .with(Method::Get, Ok(200));
        let (outcome, calls) = run(fetcher).await;
        assert!(outcome.is_ok());
        assert_eq!(calls, vec![Method::Head, Method::Get]);
    }

    #[tokio::test]
    async fn test_get_status_is_final() {
        let fetcher = TableFetcher::default()
            .with(Method::Head, Ok(403))
            .with(Method::Get, Ok(404));
        let (outcome, _) = run(fetcher).await;
        assert_eq!(outcome, VerificationOutcome::Broken(BrokenStatus::Http(404)));
    }

    #[tokio::test]
    async fn test_head_transport_failure_is_broken_without_retry() {
        let err = TransportError::new(TransportKind::Timeout, "Request timed out");
        let (outcome, calls) =
            run(TableFetcher::default().with(Method::Head, Err(err.clone()))).await;
        assert_eq!(outcome, VerificationOutcome::Broken(BrokenStatus::Transport(err)));
        assert_eq!(calls, vec![Method::Head]);
    }

    #[tokio::test]
    async fn test_get_transport_failure_after_head_rejection() {
        let err = TransportError::new(TransportKind::Connect, "Connection failed");
        let fetcher = TableFetcher::default()
            .with(Method::Head, Ok(500))
            .with(Method::Get, Err(err.clone()));
        let (outcome, _) = run(fetcher).await;
        assert_eq!(outcome, VerificationOutcome::Broken(BrokenStatus::Transport(err)));
    }
}
