// src/events.rs
// =============================================================================
// The events a crawl session streams to its observer.
//
// Every event goes through a ProgressSink. The sink decides what "delivery"
// means (print to a terminal, push down a channel, record in a test). The
// engine only promises that events arrive in the order they were emitted.
//
// JSON shape (one object per event):
//   {"event": "progress", "payload": {"url": ..., "count": ..., ...}}
//   {"event": "broken-link", "payload": {"url": ..., "status": 404, ...}}
//
// Rust concepts:
// - #[serde(tag, content)]: "adjacently tagged" enums, a name plus a payload
// - #[serde(untagged)]: pick the variant by the shape of the data
// - Trait objects: Arc<dyn ProgressSink> lets callers plug in any sink
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::TransportError;

/// Where a broken link was found.
///
/// `Frontier` means the crawled page itself failed to load, as opposed to
/// a link discovered on some page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum LinkSource {
    Frontier,
    Page(String),
}

impl fmt::Display for LinkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkSource::Frontier => write!(f, "(crawled page)"),
            LinkSource::Page(url) => write!(f, "{}", url),
        }
    }
}

/// Why a link counts as broken: an HTTP status >= 400, or no status at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BrokenStatus {
    Http(u16),
    Transport(TransportError),
}

impl fmt::Display for BrokenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokenStatus::Http(code) => write!(f, "HTTP {}", code),
            BrokenStatus::Transport(err) => write!(f, "{}", err.message),
        }
    }
}

/// One broken link. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenLinkRecord {
    pub url: String,
    pub status: BrokenStatus,
    pub source: LinkSource,
}

/// Emitted each time the engine dequeues a page to crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub url: String,
    pub count: usize,
    pub queue_size: usize,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum CrawlEvent {
    Log(String),
    Progress(ProgressUpdate),
    BrokenLink(BrokenLinkRecord),
    Error(String),
    #[serde(rename_all = "camelCase")]
    Finished {
        broken_links: Vec<BrokenLinkRecord>,
    },
}

/// Receives crawl events in emission order.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: CrawlEvent);
}

/// Forwards events into a tokio channel. A closed receiver is ignored.
pub struct ChannelSink {
    tx: UnboundedSender<CrawlEvent>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<CrawlEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: CrawlEvent) {
        let _ = self.tx.send(event);
    }
}

/// An event stamped with the session that emitted it.
///
/// Several sessions can share one output stream (a replaced session still
/// delivers its `finished`), so the number tells them apart:
///   {"session": 2, "event": "finished", "payload": {"brokenLinks": []}}
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionEvent {
    pub session: u64,
    #[serde(flatten)]
    pub event: CrawlEvent,
}

/// Like ChannelSink, but stamps every event with a session number.
pub struct TaggedSink {
    session: u64,
    tx: UnboundedSender<SessionEvent>,
}

impl TaggedSink {
    pub fn new(session: u64, tx: UnboundedSender<SessionEvent>) -> Self {
        Self { session, tx }
    }
}

impl ProgressSink for TaggedSink {
    fn emit(&self, event: CrawlEvent) {
        let _ = self.tx.send(SessionEvent {
            session: self.session,
            event,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportKind;
    use serde_json::json;

    #[test]
    fn test_broken_link_json_shape() {
        let event = CrawlEvent::BrokenLink(BrokenLinkRecord {
            url: "https://example.com/gone".to_string(),
            status: BrokenStatus::Http(404),
            source: LinkSource::Frontier,
        });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "broken-link",
                "payload": {
                    "url": "https://example.com/gone",
                    "status": 404,
                    "source": {"kind": "frontier"}
                }
            })
        );
    }

    #[test]
    fn test_transport_status_and_page_source() {
        let record = BrokenLinkRecord {
            url: "https://nowhere.invalid/".to_string(),
            status: BrokenStatus::Transport(TransportError::new(
                TransportKind::Dns,
                "Could not resolve hostname",
            )),
            source: LinkSource::Page("https://example.com/".to_string()),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["status"]["kind"], "dns");
        assert_eq!(value["source"]["url"], "https://example.com/");

        let back: BrokenLinkRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_finished_and_progress_keys() {
        let finished = serde_json::to_value(CrawlEvent::Finished {
            broken_links: vec![],
        })
        .unwrap();
        assert_eq!(finished, json!({"event": "finished", "payload": {"brokenLinks": []}}));

        let progress = serde_json::to_value(CrawlEvent::Progress(ProgressUpdate {
            url: "https://example.com/".to_string(),
            count: 1,
            queue_size: 0,
            depth: 0,
        }))
        .unwrap();
        assert_eq!(progress["payload"]["queueSize"], 0);
    }

    #[test]
    fn test_tagged_sink_stamps_session() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let first = TaggedSink::new(1, tx.clone());
        let second = TaggedSink::new(2, tx);

        second.emit(CrawlEvent::Log("second up".to_string()));
        first.emit(CrawlEvent::Finished {
            broken_links: vec![],
        });

        let line = serde_json::to_value(rx.try_recv().unwrap()).unwrap();
        assert_eq!(
            line,
            json!({"session": 2, "event": "log", "payload": "second up"})
        );
        let line = serde_json::to_value(rx.try_recv().unwrap()).unwrap();
        assert_eq!(
            line,
            json!({"session": 1, "event": "finished", "payload": {"brokenLinks": []}})
        );
    }

    #[test]
    fn test_log_display() {
        assert_eq!(LinkSource::Frontier.to_string(), "(crawled page)");
        assert_eq!(BrokenStatus::Http(500).to_string(), "HTTP 500");
    }
}
