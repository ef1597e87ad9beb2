//! Event subscribers: the diagnostics sink side of the pool.
//!
//! ## Architecture
//! ```text
//! worker threads ── publish(Event) ──► Bus ──► pool listener ──► SubscriberSet
//!                                                              ┌─────────┼─────────┐
//!                                                              ▼         ▼         ▼
//!                                                         [queue S1] [queue S2] [queue SN]
//!                                                              │         │         │
//!                                                         worker S1  worker S2  worker SN
//!                                                              │         │         │
//!                                                      sub.on_event(&Event) (per subscriber)
//! ```
//!
//! Subscribers never block a worker: publishing is non-blocking and each
//! subscriber sits behind its own bounded queue; on overflow, events are
//! dropped for that subscriber only.

mod log;
mod progress;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use progress::ProgressTracker;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
