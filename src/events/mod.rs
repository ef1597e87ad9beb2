//! Diagnostics events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by workers, the bridge bookkeeping,
//! and the pool.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: worker threads (progress, failures, integrity, backoff),
//!   the pool (shutdown lifecycle), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the pool's subscriber listener, which fans out to the
//!   [`SubscriberSet`](crate::subscribers::SubscriberSet).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
