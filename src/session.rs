// src/session.rs
// =============================================================================
// The thin control plane around the crawl engine.
//
// - Session: one engine running on its own tokio task
// - SessionRegistry: at most one session per channel (a connection, a stdin
//   stream, ...). Starting a new crawl on a channel stops the old one first.
// - ControlCommand: the JSON commands a remote caller can send
//
// A panic inside the crawl task is caught here and turned into an `error`
// event, so one bad session can never take the process down.
// =============================================================================

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::checker::Fetcher;
use crate::config::{CrawlOptions, CrawlSettings};
use crate::crawl::{CrawlControl, CrawlEngine, CrawlPhase};
use crate::events::{CrawlEvent, ProgressSink};

/// Commands accepted from a remote caller, one JSON object each.
///
/// `{"type": "startCrawl", "url": "https://example.com", "options": {"maxPages": 10}}`
/// `{"type": "stopCrawl"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ControlCommand {
    StartCrawl {
        url: String,
        #[serde(default)]
        options: CrawlOptions,
    },
    StopCrawl,
}

/// A crawl engine running in the background.
pub struct Session {
    control: CrawlControl,
    task: JoinHandle<()>,
}

impl Session {
    pub fn spawn(
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<dyn ProgressSink>,
        settings: CrawlSettings,
        seed_url: String,
        options: CrawlOptions,
    ) -> Self {
        let mut engine = CrawlEngine::new(fetcher, sink.clone(), settings);
        let control = engine.control();
        let task_control = control.clone();

        let task = tokio::spawn(async move {
            let outcome = AssertUnwindSafe(engine.start(&seed_url, &options))
                .catch_unwind()
                .await;
            match outcome {
                Ok(Ok(broken)) => debug!(seed = %seed_url, broken = broken.len(), "session ended"),
                // Already reported to the sink by the engine
                Ok(Err(err)) => debug!(seed = %seed_url, error = %err, "session did not start"),
                Err(_) => {
                    error!(seed = %seed_url, "crawl task panicked");
                    task_control.stop();
                    sink.emit(CrawlEvent::Error("Internal error".to_string()));
                }
            }
        });

        Self { control, task }
    }

    pub fn control(&self) -> CrawlControl {
        self.control.clone()
    }

    pub fn phase(&self) -> CrawlPhase {
        self.control.phase()
    }

    pub fn stop(&self) {
        self.control.stop();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the crawl task to wind down.
    pub async fn wait(self) {
        let _ = self.task.await;
    }
}

/// One active session per channel key.
pub struct SessionRegistry<K> {
    fetcher: Arc<dyn Fetcher>,
    settings: CrawlSettings,
    sessions: HashMap<K, Session>,
}

impl<K> SessionRegistry<K>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: CrawlSettings) -> Self {
        Self {
            fetcher,
            settings,
            sessions: HashMap::new(),
        }
    }

    /// Stops any session on `key`, then starts a fresh one.
    pub fn start_crawl(
        &mut self,
        key: K,
        seed_url: impl Into<String>,
        options: CrawlOptions,
        sink: Arc<dyn ProgressSink>,
    ) -> CrawlControl {
        self.stop_crawl(&key);

        let seed_url = seed_url.into();
        info!(channel = ?key, seed = %seed_url, "starting crawl session");
        let session = Session::spawn(
            self.fetcher.clone(),
            sink,
            self.settings.clone(),
            seed_url,
            options,
        );
        let control = session.control();
        self.sessions.insert(key, session);
        control
    }

    /// Stops the session on `key`, if any. Returns true if one was running.
    pub fn stop_crawl(&mut self, key: &K) -> bool {
        match self.sessions.remove(key) {
            Some(session) => {
                info!(channel = ?key, "stopping crawl session");
                session.stop();
                true
            }
            None => false,
        }
    }

    /// The channel went away; same as stopping its crawl.
    pub fn disconnect(&mut self, key: &K) {
        self.stop_crawl(key);
    }

    pub fn apply(&mut self, key: K, command: ControlCommand, sink: Arc<dyn ProgressSink>) {
        match command {
            ControlCommand::StartCrawl { url, options } => {
                self.start_crawl(key, url, options, sink);
            }
            ControlCommand::StopCrawl => {
                self.stop_crawl(&key);
            }
        }
    }

    pub fn session(&self, key: &K) -> Option<&Session> {
        self.sessions.get(key)
    }

    /// Sessions whose task is still running.
    pub fn active_count(&self) -> usize {
        self.sessions.values().filter(|s| !s.is_finished()).count()
    }

    /// Stops everything and waits for the tasks to end.
    pub async fn shutdown(&mut self) {
        for (_, session) in self.sessions.drain() {
            session.stop();
            session.wait().await;
        }
    }
}
