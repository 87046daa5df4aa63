// src/crawl/scheduler.rs
// =============================================================================
// Bounded-concurrency checking of external links.
//
// The crawler never fetches off-site pages for more links, but it still wants
// to know whether they are reachable. Each off-site link lands here as an
// ExternalWorkItem and is verified on its own tokio task, at most
// `concurrency` at a time.
//
// Drain protocol:
// - submit() appends to `pending`, then tries to drain
// - drain() pops items while the session runs and a slot is free
// - a finished verification frees its slot and drains again
// - the `draining` flag keeps two drain loops from running at once
// - a drain turned away by that flag is covered by the running loop, which
//   looks at the queue once more after dropping the flag
//
// All counters live behind one Mutex, so no two completions can interleave
// a read-modify-write of `active` or `pending`.
// =============================================================================

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use super::lifecycle::CrawlControl;
use super::report::Reporter;
use crate::checker::{LinkVerifier, VerificationOutcome};
use crate::events::{BrokenLinkRecord, LinkSource};

/// An off-site link waiting to be verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalWorkItem {
    pub url: String,
    /// Page the link was found on
    pub source: String,
}

#[derive(Default)]
struct SchedulerState {
    pending: VecDeque<ExternalWorkItem>,
    active: usize,
    draining: bool,
}

struct Shared {
    verifier: LinkVerifier,
    reporter: Arc<Reporter>,
    control: CrawlControl,
    concurrency: usize,
    state: Mutex<SchedulerState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Clone)]
pub struct ExternalCheckScheduler {
    shared: Arc<Shared>,
}

impl ExternalCheckScheduler {
    pub fn new(
        verifier: LinkVerifier,
        reporter: Arc<Reporter>,
        control: CrawlControl,
        concurrency: usize,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                verifier,
                reporter,
                control,
                concurrency: concurrency.max(1),
                state: Mutex::new(SchedulerState::default()),
            }),
        }
    }

    pub fn submit(&self, item: ExternalWorkItem) {
        self.shared.lock().pending.push_back(item);
        self.drain();
    }

    /// Dispatches pending items until the queue empties, every slot is busy,
    /// or the session stops. Must be called from inside a tokio runtime.
    pub fn drain(&self) {
        loop {
            {
                let mut state = self.shared.lock();
                if state.draining {
                    return;
                }
                state.draining = true;
            }

            while let Some(item) = self.next_item() {
                self.dispatch(item);
            }

            // A check that finished while we held the guard had its drain()
            // turned away; pick up the slot it freed before letting go.
            let mut state = self.shared.lock();
            state.draining = false;
            let slot_free = state.active < self.shared.concurrency;
            if state.pending.is_empty() || !slot_free || !self.shared.control.is_running() {
                return;
            }
        }
    }

    /// Nothing queued and nothing in flight.
    pub fn is_idle(&self) -> bool {
        let state = self.shared.lock();
        state.pending.is_empty() && state.active == 0
    }

    pub fn active(&self) -> usize {
        self.shared.lock().active
    }

    pub fn pending(&self) -> usize {
        self.shared.lock().pending.len()
    }

    fn next_item(&self) -> Option<ExternalWorkItem> {
        let mut state = self.shared.lock();
        if !self.shared.control.is_running() || state.active >= self.shared.concurrency {
            return None;
        }
        let item = state.pending.pop_front()?;
        state.active += 1;
        Some(item)
    }

    fn dispatch(&self, item: ExternalWorkItem) {
        let scheduler = self.clone();
        tokio::spawn(async move {
            // Frees the slot even if verification panics
            let slot = ActiveSlot(scheduler.shared.clone());

            debug!(url = %item.url, "checking external link");
            let outcome = scheduler.shared.verifier.verify(&item.url).await;
            if let VerificationOutcome::Broken(status) = outcome {
                scheduler.shared.reporter.broken_link(BrokenLinkRecord {
                    url: item.url,
                    status,
                    source: LinkSource::Page(item.source),
                });
            }

            drop(slot);
            scheduler.drain();
        });
    }
}

struct ActiveSlot(Arc<Shared>);

impl Drop for ActiveSlot {
    fn drop(&mut self) {
        let mut state = self.0.lock();
        state.active = state.active.saturating_sub(1);
    }
}
