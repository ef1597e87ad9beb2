//! Core subscriber trait.
//!
//! `Subscribe` is the extension point for plugging custom diagnostics
//! handlers into the pool. Each subscriber is driven by a dedicated worker
//! task fed by a bounded queue owned by the
//! [`SubscriberSet`](crate::subscribers::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching) — they do not block the
//!   publishing worker threads nor other subscribers.
//! - Each subscriber declares its preferred queue capacity via
//!   [`Subscribe::queue_capacity`]; on overflow, events for that subscriber
//!   are dropped.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for diagnostics subscribers.
///
/// Called from a subscriber-dedicated worker task on the pool's runtime.
/// Implementations should avoid blocking the runtime (prefer async I/O).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
