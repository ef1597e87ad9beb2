//! Diagnostics events emitted by workers and the pool.
//!
//! [`EventKind`] classifies events across three categories:
//! - **Worker lifecycle**: started, stopped, progress
//! - **Iteration outcomes**: failures, timeouts, integrity violations, backoff
//! - **Pool lifecycle**: shutdown requested, stopped within grace, grace exceeded
//!
//! [`Event`] carries metadata such as the worker index, the per-worker
//! counter, reasons, and delays.
//!
//! ## Ordering
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically; use it to restore order when events are observed out of
//! order across subscribers.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of diagnostics events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Worker lifecycle ===
    /// A worker thread entered its loop.
    ///
    /// Sets: `worker`, `at`, `seq`.
    WorkerStarted,

    /// A worker thread left its loop (shutdown or `Reaction::StopWorker`).
    ///
    /// Sets: `worker`, `counter` (final), optional `reason`, `at`, `seq`.
    WorkerStopped,

    /// Periodic progress observation (every `report_every` iterations).
    ///
    /// Sets: `worker`, `counter`, `at`, `seq`.
    Progress,

    // === Iteration outcomes ===
    /// The operation completed with a failure result.
    ///
    /// Sets: `worker`, `counter`, `reason`, `at`, `seq`.
    OperationFailed,

    /// The payload violated the expected shape. Recoverable by design.
    ///
    /// Sets: `worker`, `counter`, `reason` (expected/actual lengths), `at`, `seq`.
    IntegrityViolation,

    /// The per-iteration timeout elapsed before the operation resolved.
    ///
    /// Sets: `worker`, `timeout_ms`, `at`, `seq`.
    TimeoutHit,

    /// A backoff delay was scheduled after a failed iteration.
    ///
    /// Sets: `worker`, `delay_ms`, `reason` (last failure), `at`, `seq`.
    BackoffScheduled,

    /// Outstanding-operation bookkeeping exceeded the worker count.
    ///
    /// This signals a leak (callbacks outliving their bridges); it is a
    /// metric-grade alert, never a crash.
    ///
    /// Sets: `worker`, `outstanding`, `at`, `seq`.
    ResourceAlert,

    // === Pool lifecycle ===
    /// Shutdown requested (OS signal observed or `shutdown()` called).
    ///
    /// Sets: `at`, `seq`.
    ShutdownRequested,

    /// All workers stopped within the configured grace period.
    ///
    /// Sets: `at`, `seq`.
    AllStoppedWithin,

    /// Grace period exceeded; some workers were still mid-iteration.
    ///
    /// Sets: `at`, `seq`.
    GraceExceeded,

    // === Subscriber plumbing ===
    /// A subscriber panicked while processing an event.
    ///
    /// Sets: `reason` (panic info), `at`, `seq`.
    SubscriberPanicked,

    /// A subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `reason`, `at`, `seq`.
    SubscriberOverflow,
}

/// Diagnostics event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Worker index, if applicable.
    pub worker: Option<usize>,
    /// Per-worker completed-iteration counter.
    pub counter: Option<u64>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Backoff delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Iteration timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Outstanding-operation gauge reading, for `ResourceAlert`.
    pub outstanding: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next global sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            counter: None,
            reason: None,
            delay_ms: None,
            timeout_ms: None,
            outstanding: None,
        }
    }

    /// Attaches a worker index.
    #[inline]
    pub fn with_worker(mut self, worker: usize) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Attaches the per-worker counter.
    #[inline]
    pub fn with_counter(mut self, counter: u64) -> Self {
        self.counter = Some(counter);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u32::MAX)) as u32);
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(d.as_millis().min(u128::from(u32::MAX)) as u32);
        self
    }

    /// Attaches an outstanding-operation gauge reading.
    #[inline]
    pub fn with_outstanding(mut self, outstanding: usize) -> Self {
        self.outstanding = Some(outstanding);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::now(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::now(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} panic={info}"))
    }
}
