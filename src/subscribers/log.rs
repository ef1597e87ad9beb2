//! Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format:
//!
//! ```text
//! [worker-started] worker=0
//! [progress] worker=0 counter=100
//! [op-failed] worker=3 reason="connection refused"
//! [integrity] worker=0 reason="expected=1024 actual=512"
//! [backoff] worker=3 delay_ms=200 reason="connection refused"
//! [timeout] worker=1 timeout_ms=5000
//! [shutdown-requested]
//! ```
//!
//! Intended for development and the demos; implement a custom
//! [`Subscribe`](crate::Subscribe) for structured logging or metrics.

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Stdout logging subscriber.
#[derive(Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::WorkerStarted => {
                println!("[worker-started] worker={:?}", e.worker);
            }
            EventKind::WorkerStopped => {
                println!(
                    "[worker-stopped] worker={:?} counter={:?} reason={:?}",
                    e.worker, e.counter, e.reason
                );
            }
            EventKind::Progress => {
                if let (Some(worker), Some(counter)) = (e.worker, e.counter) {
                    println!("[progress] worker={worker} counter={counter}");
                }
            }
            EventKind::OperationFailed => {
                println!("[op-failed] worker={:?} reason={:?}", e.worker, e.reason);
            }
            EventKind::IntegrityViolation => {
                println!("[integrity] worker={:?} reason={:?}", e.worker, e.reason);
            }
            EventKind::TimeoutHit => {
                println!(
                    "[timeout] worker={:?} timeout_ms={:?}",
                    e.worker, e.timeout_ms
                );
            }
            EventKind::BackoffScheduled => {
                println!(
                    "[backoff] worker={:?} delay_ms={:?} reason={:?}",
                    e.worker, e.delay_ms, e.reason
                );
            }
            EventKind::ResourceAlert => {
                println!(
                    "[resource-alert] worker={:?} outstanding={:?}",
                    e.worker, e.outstanding
                );
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::AllStoppedWithin => {
                println!("[all-stopped-within-grace]");
            }
            EventKind::GraceExceeded => {
                println!("[grace-exceeded]");
            }
            EventKind::SubscriberPanicked | EventKind::SubscriberOverflow => {
                println!("[subscriber-issue] reason={:?}", e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
