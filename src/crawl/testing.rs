// Test doubles shared by the crawl and session tests: a scripted website
// and a sink that records every event.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use super::lifecycle::CrawlControl;
use crate::checker::{FetchResponse, Fetcher, Method};
use crate::config::CrawlSettings;
use crate::error::{TransportError, TransportKind};
use crate::events::{CrawlEvent, ProgressSink, ProgressUpdate};

/// Unknown URLs answer 404.
#[derive(Default)]
pub struct FakeSite {
    pages: HashMap<String, FetchResponse>,
    head_overrides: HashMap<String, u16>,
    failing: HashSet<String>,
    calls: Mutex<Vec<(Method, String)>>,
}

impl FakeSite {
    pub fn page(self, url: &str, links: &[&str]) -> Self {
        let body = links
            .iter()
            .map(|href| format!(r#"<a href="{}">link</a>"#, href))
            .collect::<String>();
        self.raw(url, 200, Some("text/html; charset=utf-8"), &body)
    }

    pub fn status(self, url: &str, status: u16) -> Self {
        self.raw(url, status, Some("text/html"), "")
    }

    pub fn raw(mut self, url: &str, status: u16, content_type: Option<&str>, body: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            FetchResponse {
                status,
                content_type: content_type.map(str::to_string),
                body: body.to_string(),
            },
        );
        self
    }

    pub fn head(mut self, url: &str, status: u16) -> Self {
        self.head_overrides.insert(url.to_string(), status);
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(Method, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetched(&self, method: Method, url: &str) -> bool {
        self.calls().iter().any(|(m, u)| *m == method && u == url)
    }
}

#[async_trait]
impl Fetcher for FakeSite {
    async fn fetch(
        &self,
        method: Method,
        url: &str,
        _timeout: Duration,
    ) -> Result<FetchResponse, TransportError> {
        self.calls.lock().unwrap().push((method, url.to_string()));
        tokio::task::yield_now().await;

        if self.failing.contains(url) {
            return Err(TransportError::new(TransportKind::Connect, "Connection failed"));
        }
        if method == Method::Head {
            if let Some(status) = self.head_overrides.get(url) {
                return Ok(FetchResponse {
                    status: *status,
                    content_type: None,
                    body: String::new(),
                });
            }
        }
        Ok(self.pages.get(url).cloned().unwrap_or(FetchResponse {
            status: 404,
            content_type: Some("text/html".to_string()),
            body: String::new(),
        }))
    }
}

/// Records events; can stop a session once a given progress count is seen.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<CrawlEvent>>,
    stop_at: Mutex<Option<(usize, CrawlControl)>>,
}

impl RecordingSink {
    pub fn stop_at_progress(&self, count: usize, control: CrawlControl) {
        *self.stop_at.lock().unwrap() = Some((count, control));
    }

    pub fn events(&self) -> Vec<CrawlEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<ProgressUpdate> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                CrawlEvent::Progress(update) => Some(update),
                _ => None,
            })
            .collect()
    }

    pub fn progress_urls(&self) -> Vec<String> {
        self.progress().into_iter().map(|p| p.url).collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: CrawlEvent) {
        if let CrawlEvent::Progress(update) = &event {
            if let Some((count, control)) = self.stop_at.lock().unwrap().as_ref() {
                if update.count == *count {
                    control.stop();
                }
            }
        }
        self.events.lock().unwrap().push(event);
    }
}

/// Default settings with the sleeps shrunk so tests run fast.
pub fn fast_settings() -> CrawlSettings {
    CrawlSettings {
        politeness_delay: Duration::ZERO,
        drain_poll_interval: Duration::from_millis(1),
        ..CrawlSettings::default()
    }
}
