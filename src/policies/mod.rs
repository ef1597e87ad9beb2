//! Failure-handling policies.
//!
//! This module groups the knobs that control **what** a worker does after a
//! bad iteration and **how long** it waits before the next one.
//!
//! ## Contents
//! - [`Reaction`] continue the loop or stop the worker
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`] randomization strategy to avoid synchronized retries
//!
//! ## Defaults
//! - `Reaction::Continue` for both failures and integrity violations.
//! - `BackoffPolicy::default()` → first=100ms, factor=1.0 (constant), max=30s,
//!   jitter=None.

mod backoff;
mod jitter;
mod reaction;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use reaction::Reaction;
