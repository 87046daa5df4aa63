// src/crawl/lifecycle.rs
// =============================================================================
// Start/stop state shared between a crawl engine and whoever controls it.
//
//   Idle --begin--> Running --complete--> Completed
//     \               \
//      \--stop-------->\--stop----------> Cancelled
//
// There is no way back to Running. stop() is cooperative: it only flips the
// phase, and the crawl loops notice at their next check point.
// =============================================================================

use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CrawlPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// Cloneable handle onto one session's phase.
#[derive(Debug, Clone, Default)]
pub struct CrawlControl {
    phase: Arc<Mutex<CrawlPhase>>,
}

impl CrawlControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> CrawlPhase {
        *self.lock()
    }

    pub fn is_running(&self) -> bool {
        self.phase() == CrawlPhase::Running
    }

    /// Idle -> Running. Returns false if the session already left Idle.
    pub(crate) fn begin(&self) -> bool {
        let mut phase = self.lock();
        if *phase != CrawlPhase::Idle {
            return false;
        }
        *phase = CrawlPhase::Running;
        true
    }

    /// Running -> Completed. A cancelled session stays cancelled.
    pub(crate) fn complete(&self) {
        let mut phase = self.lock();
        if *phase == CrawlPhase::Running {
            *phase = CrawlPhase::Completed;
        }
    }

    /// Requests cancellation. Safe to call any number of times.
    pub fn stop(&self) {
        let mut phase = self.lock();
        if matches!(*phase, CrawlPhase::Idle | CrawlPhase::Running) {
            *phase = CrawlPhase::Cancelled;
        }
    }

    fn lock(&self) -> MutexGuard<'_, CrawlPhase> {
        self.phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
