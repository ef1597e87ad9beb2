//! Outstanding-operation bookkeeping.
//!
//! [`OpsMeter`] is shared by every bridge a pool creates. It exposes:
//! - `outstanding`: bridges that have been created but not yet resolved. With
//!   one bridge per worker iteration this must never exceed the worker count;
//!   a higher reading signals leaked callbacks and surfaces as a
//!   `ResourceAlert` event, never a crash.
//! - `peak`: high-water mark of `outstanding`.
//! - `absorbed`: deliveries that lost the resolution race (double signal or
//!   completion after timeout) and were dropped. A sustained non-zero rate
//!   points at a misbehaving operation.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Shared gauge/counter set for bridge bookkeeping.
#[derive(Debug, Default)]
pub struct OpsMeter {
    outstanding: AtomicUsize,
    peak: AtomicUsize,
    absorbed: AtomicU64,
}

impl OpsMeter {
    /// Creates a fresh meter with all readings at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current number of unresolved bridges.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// High-water mark of [`outstanding`](Self::outstanding).
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }

    /// Total deliveries absorbed after losing the resolution race.
    pub fn absorbed(&self) -> u64 {
        self.absorbed.load(Ordering::Acquire)
    }

    pub(crate) fn bridge_opened(&self) {
        let cur = self.outstanding.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak.fetch_max(cur, Ordering::AcqRel);
    }

    pub(crate) fn bridge_resolved(&self) {
        self.outstanding.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn delivery_absorbed(&self) {
        self.absorbed.fetch_add(1, Ordering::AcqRel);
    }
}
