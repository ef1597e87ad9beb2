//! Non-blocking fan-out over multiple subscribers.
//!
//! [`SubscriberSet`] distributes each [`Event`] to every subscriber without
//! awaiting their processing.
//!
//! ## Guarantees
//! - `emit(&Event)` returns immediately.
//! - Per-subscriber FIFO (queue order).
//! - Panics inside subscribers are caught and logged (isolation).
//!
//! ## Not guaranteed
//! - No global ordering across different subscribers (use `Event::seq`).
//! - No retries on per-subscriber queue overflow; the event is dropped for
//!   that subscriber.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};

use super::Subscribe;

/// Per-subscriber channel with metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Composite fan-out with per-subscriber bounded queues and worker tasks.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Option<Bus>,
}

/// A plumbing fault while handling a plumbing event must not report again,
/// or two misbehaving subscribers could feed each other forever.
fn is_plumbing(kind: EventKind) -> bool {
    matches!(
        kind,
        EventKind::SubscriberPanicked | EventKind::SubscriberOverflow
    )
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// Must be called from within a tokio runtime context (the pool enters
    /// its owned runtime before building the set).
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self::build(subs, None)
    }

    /// Like [`new`](Self::new), and additionally reports subscriber panics
    /// and queue overflows on `bus` as `SubscriberPanicked` /
    /// `SubscriberOverflow` events.
    #[must_use]
    pub fn with_bus(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        Self::build(subs, Some(bus))
    }

    fn build(subs: Vec<Arc<dyn Subscribe>>, bus: Option<Bus>) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let s = Arc::clone(&sub);
            let report = bus.clone();

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = s.on_event(ev.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        eprintln!(
                            "[blockbridge] subscriber '{}' panicked: {:?}",
                            s.name(),
                            panic_err
                        );
                        if let Some(bus) = &report {
                            if !is_plumbing(ev.kind) {
                                bus.publish(Event::subscriber_panicked(
                                    s.name(),
                                    format!("{panic_err:?}"),
                                ));
                            }
                        }
                    }
                }
            });

            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }

        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Fans one event out to all subscribers (non-blocking).
    ///
    /// If a subscriber's queue is full or closed, the event is dropped for it
    /// and a warning names the subscriber.
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&ev)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    eprintln!(
                        "[blockbridge] subscriber '{}' dropped event: queue full",
                        channel.name
                    );
                    self.report_overflow(event.kind, channel.name, "queue full");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    eprintln!(
                        "[blockbridge] subscriber '{}' dropped event: worker closed",
                        channel.name
                    );
                    self.report_overflow(event.kind, channel.name, "worker closed");
                }
            }
        }
    }

    fn report_overflow(&self, dropped: EventKind, subscriber: &'static str, reason: &'static str) {
        if let Some(bus) = &self.bus {
            if !is_plumbing(dropped) {
                bus.publish(Event::subscriber_overflow(subscriber, reason));
            }
        }
    }

    /// Graceful shutdown: close all queues and await worker completion.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Counting {
        seen: AtomicUsize,
    }

    #[async_trait]
    impl Subscribe for Counting {
        async fn on_event(&self, _event: &Event) {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[test]
    fn events_reach_every_subscriber() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .build()
            .unwrap();

        let a = Arc::new(Counting {
            seen: AtomicUsize::new(0),
        });
        let b = Arc::new(Counting {
            seen: AtomicUsize::new(0),
        });

        let set = {
            let _guard = rt.enter();
            SubscriberSet::new(vec![a.clone() as Arc<dyn Subscribe>, b.clone() as _])
        };
        assert_eq!(set.len(), 2);

        for _ in 0..5 {
            set.emit(&Event::now(EventKind::Progress));
        }
        rt.block_on(async {
            tokio::time::sleep(Duration::from_millis(100)).await;
        });

        assert_eq!(a.seen.load(Ordering::SeqCst), 5);
        assert_eq!(b.seen.load(Ordering::SeqCst), 5);
        rt.block_on(set.shutdown());
    }

    struct Panicky;

    #[async_trait]
    impl Subscribe for Panicky {
        async fn on_event(&self, _event: &Event) {
            panic!("boom");
        }

        fn name(&self) -> &'static str {
            "panicky"
        }
    }

    #[test]
    fn panicking_subscriber_is_isolated() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .build()
            .unwrap();

        let healthy = Arc::new(Counting {
            seen: AtomicUsize::new(0),
        });
        let set = {
            let _guard = rt.enter();
            SubscriberSet::new(vec![Arc::new(Panicky) as Arc<dyn Subscribe>, healthy.clone() as _])
        };

        set.emit(&Event::now(EventKind::Progress));
        set.emit(&Event::now(EventKind::Progress));
        rt.block_on(async {
            tokio::time::sleep(Duration::from_millis(100)).await;
        });

        assert_eq!(healthy.seen.load(Ordering::SeqCst), 2);
        rt.block_on(set.shutdown());
    }

    #[test]
    fn panic_is_reported_on_the_bus_once() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .build()
            .unwrap();

        let bus = crate::events::Bus::new(16);
        let mut rx = bus.subscribe();
        let set = {
            let _guard = rt.enter();
            SubscriberSet::with_bus(vec![Arc::new(Panicky) as Arc<dyn Subscribe>], bus.clone())
        };

        set.emit(&Event::now(EventKind::Progress));

        let reported = rt.block_on(rx.recv()).unwrap();
        assert_eq!(reported.kind, EventKind::SubscriberPanicked);
        let reason = reported.reason.as_deref().unwrap_or("");
        assert!(reason.contains("panicky"), "reason names the subscriber: {reason}");

        // The report itself reaches the panicky subscriber again (via the
        // pool listener in production); that second panic must not report.
        set.emit(&reported);
        rt.block_on(async {
            tokio::time::sleep(Duration::from_millis(100)).await;
        });
        assert!(
            rx.try_recv().is_err(),
            "a plumbing event must not trigger another report"
        );
        rt.block_on(set.shutdown());
    }
}
