//! Stateful subscriber tracking per-worker progress.
//!
//! [`ProgressTracker`] maintains the last observed counter for every worker
//! by listening to `Progress` and `WorkerStopped` events. Embedders use it to
//! answer "how far has each worker gotten" without wiring their own
//! subscriber; tests use it to assert worker isolation.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Tracks the latest reported counter per worker index.
///
/// Thread-safe; clone the `Arc` you register with the pool to query it later.
#[derive(Default)]
pub struct ProgressTracker {
    counters: Mutex<HashMap<usize, u64>>,
}

impl ProgressTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last reported counter for one worker, if any report was seen.
    pub fn counter(&self, worker: usize) -> Option<u64> {
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&worker)
            .copied()
    }

    /// Snapshot of all per-worker counters, sorted by worker index.
    pub fn snapshot(&self) -> Vec<(usize, u64)> {
        let mut all: Vec<(usize, u64)> = self
            .counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(w, c)| (*w, *c))
            .collect();
        all.sort_unstable();
        all
    }

    fn record(&self, worker: usize, counter: u64) {
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(worker, counter);
    }
}

#[async_trait]
impl Subscribe for ProgressTracker {
    async fn on_event(&self, event: &Event) {
        match event.kind {
            EventKind::Progress | EventKind::WorkerStopped => {
                if let (Some(worker), Some(counter)) = (event.worker, event.counter) {
                    self.record(worker, counter);
                }
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "progress_tracker"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(tracker: &ProgressTracker, ev: Event) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(tracker.on_event(&ev));
    }

    #[test]
    fn records_progress_per_worker() {
        let tracker = ProgressTracker::new();
        feed(
            &tracker,
            Event::now(EventKind::Progress).with_worker(0).with_counter(100),
        );
        feed(
            &tracker,
            Event::now(EventKind::Progress).with_worker(1).with_counter(200),
        );
        feed(
            &tracker,
            Event::now(EventKind::Progress).with_worker(0).with_counter(300),
        );

        assert_eq!(tracker.counter(0), Some(300));
        assert_eq!(tracker.counter(1), Some(200));
        assert_eq!(tracker.snapshot(), vec![(0, 300), (1, 200)]);
    }

    #[test]
    fn final_counter_comes_from_worker_stopped() {
        let tracker = ProgressTracker::new();
        feed(
            &tracker,
            Event::now(EventKind::WorkerStopped)
                .with_worker(2)
                .with_counter(42),
        );
        assert_eq!(tracker.counter(2), Some(42));
    }

    #[test]
    fn unrelated_events_are_ignored() {
        let tracker = ProgressTracker::new();
        feed(
            &tracker,
            Event::now(EventKind::OperationFailed)
                .with_worker(1)
                .with_counter(5),
        );
        assert_eq!(tracker.counter(1), None);
    }
}
