// src/crawl/report.rs
// =============================================================================
// The single funnel for everything a session tells its observer.
//
// Both the page crawler and the external link workers report through one
// Reporter. Its mutex gives every event a place in one total order, and keeps
// the broken-link list in the same order the broken-link events went out.
//
// After finish() the reporter is sealed: nothing is emitted after `finished`.
// =============================================================================

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

use crate::events::{BrokenLinkRecord, CrawlEvent, ProgressSink, ProgressUpdate};

#[derive(Default)]
struct ReportState {
    broken_links: Vec<BrokenLinkRecord>,
    sealed: bool,
}

pub struct Reporter {
    sink: Arc<dyn ProgressSink>,
    state: Mutex<ReportState>,
}

impl Reporter {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            sink,
            state: Mutex::new(ReportState::default()),
        }
    }

    pub fn log(&self, message: impl Into<String>) {
        self.emit(CrawlEvent::Log(message.into()));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(CrawlEvent::Error(message.into()));
    }

    pub fn progress(&self, update: ProgressUpdate) {
        self.emit(CrawlEvent::Progress(update));
    }

    /// Appends to the result list and emits the record, atomically.
    pub fn broken_link(&self, record: BrokenLinkRecord) {
        let mut state = self.lock();
        if state.sealed {
            warn!(url = %record.url, "dropping broken link reported after finish");
            return;
        }
        state.broken_links.push(record.clone());
        self.sink.emit(CrawlEvent::BrokenLink(record));
    }

    pub fn broken_count(&self) -> usize {
        self.lock().broken_links.len()
    }

    /// True once `finished` has gone out.
    pub fn is_finished(&self) -> bool {
        self.lock().sealed
    }

    /// Emits `finished` with the full list plus a closing log line, then seals.
    pub fn finish(&self) -> Vec<BrokenLinkRecord> {
        let mut state = self.lock();
        if state.sealed {
            return state.broken_links.clone();
        }
        let broken_links = state.broken_links.clone();
        self.sink.emit(CrawlEvent::Finished {
            broken_links: broken_links.clone(),
        });
        self.sink.emit(CrawlEvent::Log(format!(
            "Crawl complete. Found {} broken link(s).",
            broken_links.len()
        )));
        state.sealed = true;
        broken_links
    }

    fn emit(&self, event: CrawlEvent) {
        let state = self.lock();
        if !state.sealed {
            self.sink.emit(event);
        }
    }

    // A panic while holding the lock leaves plain data behind; keep going.
    fn lock(&self) -> MutexGuard<'_, ReportState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{BrokenStatus, LinkSource};

    #[derive(Default)]
    struct VecSink(Mutex<Vec<CrawlEvent>>);

    impl ProgressSink for VecSink {
        fn emit(&self, event: CrawlEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn record(url: &str) -> BrokenLinkRecord {
        BrokenLinkRecord {
            url: url.to_string(),
            status: BrokenStatus::Http(404),
            source: LinkSource::Frontier,
        }
    }

    #[test]
    fn test_finish_carries_ordered_list_then_seals() {
        let sink = Arc::new(VecSink::default());
        let reporter = Reporter::new(sink.clone());

        reporter.log("start");
        reporter.broken_link(record("https://a.test/"));
        reporter.broken_link(record("https://b.test/"));
        let list = reporter.finish();
        reporter.broken_link(record("https://late.test/"));
        reporter.log("ignored");

        assert_eq!(list, vec![record("https://a.test/"), record("https://b.test/")]);
        assert_eq!(reporter.broken_count(), 2);

        let events = sink.0.lock().unwrap().clone();
        assert_eq!(events.len(), 5);
        assert_eq!(events[0], CrawlEvent::Log("start".to_string()));
        assert!(matches!(&events[3], CrawlEvent::Finished { broken_links } if broken_links.len() == 2));
        assert!(matches!(&events[4], CrawlEvent::Log(_)));
    }

    #[test]
    fn test_finish_twice_emits_once() {
        let sink = Arc::new(VecSink::default());
        let reporter = Reporter::new(sink.clone());
        reporter.finish();
        reporter.finish();
        let finished = sink
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, CrawlEvent::Finished { .. }))
            .count();
        assert_eq!(finished, 1);
    }
}
