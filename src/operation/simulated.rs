//! Timer-backed stand-in operation.
//!
//! [`SimulatedQueryFactory`] fabricates a fixed-size byte payload after a
//! randomized delay, standing in for a real network or disk query. The
//! delivery and the cancellation race inside a single spawned task via
//! `tokio::select!`, which makes cancel-vs-complete a total order: whichever
//! branch the select picks is the only one that runs.

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::bridge::Completion;
use crate::operation::op::{AsyncOperation, BoxedOperation, OperationFactory, Payload};

/// Factory fabricating fixed-size payloads after a randomized latency.
///
/// Defaults: 1024-byte payloads, 0–5 ms latency.
#[derive(Clone, Debug)]
pub struct SimulatedQueryFactory {
    latency_us: RangeInclusive<u64>,
    payload_len: usize,
}

impl SimulatedQueryFactory {
    /// Creates a factory with default latency and payload size.
    pub fn new() -> Self {
        Self {
            latency_us: 0..=5_000,
            payload_len: 1024,
        }
    }

    /// Sets the completion latency range.
    pub fn with_latency(mut self, range: RangeInclusive<Duration>) -> Self {
        let start = range.start().as_micros().min(u128::from(u64::MAX)) as u64;
        let end = range.end().as_micros().min(u128::from(u64::MAX)) as u64;
        self.latency_us = start..=end.max(start);
        self
    }

    /// Sets the fabricated payload length.
    pub fn with_payload_len(mut self, len: usize) -> Self {
        self.payload_len = len;
        self
    }

    fn pick_latency(&self) -> Duration {
        let us = if self.latency_us.start() == self.latency_us.end() {
            *self.latency_us.start()
        } else {
            rand::rng().random_range(self.latency_us.clone())
        };
        Duration::from_micros(us)
    }
}

impl Default for SimulatedQueryFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationFactory for SimulatedQueryFactory {
    fn create(&self, _worker: usize, exec: &Handle) -> BoxedOperation {
        Box::new(SimulatedQuery {
            exec: exec.clone(),
            latency: self.pick_latency(),
            payload_len: self.payload_len,
        })
    }
}

/// One simulated query: sleeps, then fabricates the payload.
struct SimulatedQuery {
    exec: Handle,
    latency: Duration,
    payload_len: usize,
}

impl AsyncOperation<Payload> for SimulatedQuery {
    fn start(self: Box<Self>, completion: Completion<Payload>) -> CancellationToken {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let latency = self.latency;
        let payload_len = self.payload_len;

        self.exec.spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(latency) => {
                    completion.succeed(vec![0u8; payload_len]);
                }
            }
        });

        token
    }
}
