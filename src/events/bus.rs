//! Broadcast bus for diagnostics events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. Publishing
//! never blocks and is safe from both async tasks and plain OS threads, which
//! is what lets worker threads report diagnostics without ever stalling their
//! loop (bounded buffering only, per the diagnostics contract).
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` calls `broadcast::Sender::send`.
//! - **Bounded capacity**: one ring buffer stores recent events for all
//!   receivers; slow receivers observe `RecvError::Lagged(n)` and skip the
//!   `n` oldest items.
//! - **No persistence**: events are dropped if no receiver is subscribed at
//!   send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for diagnostics events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender). Multiple
/// publishers can publish concurrently; subscribers receive clones of each
/// event.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (min 1, clamped).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active subscribers.
    ///
    /// If there are no receivers the event is dropped; this function still
    /// returns immediately.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes subsequent events.
    ///
    /// Each call creates an independent receiver; a receiver only gets events
    /// sent after it subscribed.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
