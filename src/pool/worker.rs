//! The perpetual worker loop.
//!
//! One worker owns one OS thread and drives a strictly sequential loop:
//! create operation → fresh bridge → blocking wait → classify → report.
//! Iteration *i+1* never starts before iteration *i*'s bridge has resolved,
//! which caps this worker's outstanding operations at one.
//!
//! ## Event flow
//! ```text
//! WorkerStarted → [iterations] → WorkerStopped
//!
//! per iteration:
//!   valid payload    → counter += 1, Progress every `report_every`
//!   short payload    → IntegrityViolation → continue or stop (Reaction)
//!   failure/timeout  → OperationFailed/TimeoutHit → BackoffScheduled
//!                      → sleep(delay) → continue or stop (Reaction)
//! ```
//!
//! ## Rules
//! - Nothing in this loop is ever process-fatal; the strongest reaction
//!   stops this one worker.
//! - The loop is expressed iteratively, never as self-scheduling recursion.
//! - Cancellation is checked at safe points only: the top of each iteration
//!   and during backoff sleeps.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::bridge::{CompletionBridge, OpsMeter};
use crate::config::PoolConfig;
use crate::error::BridgeError;
use crate::events::{Bus, Event, EventKind};
use crate::operation::OperationFactory;
use crate::policies::Reaction;
use crate::pool::liveness::Liveness;

/// Granularity of cancellation checks inside a backoff sleep.
const SLEEP_SLICE: Duration = Duration::from_millis(10);

pub(crate) struct Worker {
    pub index: usize,
    pub cfg: Arc<PoolConfig>,
    pub factory: Arc<dyn OperationFactory>,
    pub bus: Bus,
    pub meter: Arc<OpsMeter>,
    pub exec: Handle,
    pub shutdown: CancellationToken,
    pub liveness: Arc<Liveness>,
}

impl Worker {
    /// Runs the loop until shutdown or a `StopWorker` reaction.
    pub(crate) fn run(self) {
        self.liveness.register(self.index);
        self.bus
            .publish(Event::now(EventKind::WorkerStarted).with_worker(self.index));

        let mut counter: u64 = 0;
        let mut failure_streak: u32 = 0;
        let mut stop_reason: Option<String> = None;

        while !self.shutdown.is_cancelled() {
            let op = self.factory.create(self.index, &self.exec);
            let bridge = CompletionBridge::with_meter(Arc::clone(&self.meter));
            let cancel = op.start(bridge.completion());

            match bridge.wait(cancel, self.cfg.iteration_timeout()) {
                Ok(payload) => {
                    failure_streak = 0;
                    if payload.len() != self.cfg.expected_len {
                        let reason = format!(
                            "expected={} actual={}",
                            self.cfg.expected_len,
                            payload.len()
                        );
                        self.bus.publish(
                            Event::now(EventKind::IntegrityViolation)
                                .with_worker(self.index)
                                .with_counter(counter)
                                .with_reason(reason.clone()),
                        );
                        if self.cfg.on_integrity == Reaction::StopWorker {
                            stop_reason = Some(format!("integrity violation: {reason}"));
                            break;
                        }
                    } else {
                        counter += 1;
                        if let Some(every) = self.cfg.progress_cadence() {
                            if counter % every == 0 {
                                self.bus.publish(
                                    Event::now(EventKind::Progress)
                                        .with_worker(self.index)
                                        .with_counter(counter),
                                );
                            }
                        }
                    }
                }
                Err(err) => {
                    self.publish_failure(&err);
                    if self.cfg.on_failure == Reaction::StopWorker {
                        stop_reason = Some(err.to_string());
                        break;
                    }
                    let delay = self.cfg.backoff.next(failure_streak);
                    failure_streak = failure_streak.saturating_add(1);
                    self.bus.publish(
                        Event::now(EventKind::BackoffScheduled)
                            .with_worker(self.index)
                            .with_delay(delay)
                            .with_reason(err.to_string()),
                    );
                    self.sleep_cancellable(delay);
                }
            }

            let outstanding = self.meter.outstanding();
            if outstanding > self.cfg.workers {
                self.bus.publish(
                    Event::now(EventKind::ResourceAlert)
                        .with_worker(self.index)
                        .with_outstanding(outstanding),
                );
            }
        }

        let mut stopped = Event::now(EventKind::WorkerStopped)
            .with_worker(self.index)
            .with_counter(counter);
        if let Some(reason) = stop_reason {
            stopped = stopped.with_reason(reason);
        }
        self.bus.publish(stopped);
        self.liveness.deregister(self.index);
    }

    fn publish_failure(&self, err: &BridgeError) {
        match err {
            BridgeError::Timeout { timeout } => {
                self.bus.publish(
                    Event::now(EventKind::TimeoutHit)
                        .with_worker(self.index)
                        .with_timeout(*timeout),
                );
            }
            BridgeError::Failed(op_err) => {
                self.bus.publish(
                    Event::now(EventKind::OperationFailed)
                        .with_worker(self.index)
                        .with_reason(op_err.to_string()),
                );
            }
        }
    }

    /// Sleeps for `delay` in slices so shutdown is not held hostage by a
    /// long backoff.
    fn sleep_cancellable(&self, delay: Duration) {
        let mut remaining = delay;
        while remaining > Duration::ZERO && !self.shutdown.is_cancelled() {
            let slice = remaining.min(SLEEP_SLICE);
            std::thread::sleep(slice);
            remaining = remaining.saturating_sub(slice);
        }
    }
}
