//! Global pool configuration.
//!
//! [`PoolConfig`] centralizes the knobs for the worker pool and its workers.
//!
//! ## Sentinel values
//! - `timeout = 0s` → no per-iteration timeout (workers block until the
//!   operation resolves)
//! - `report_every = 0` → progress reporting disabled
//!
//! Prefer the helper accessors over sprinkling sentinel checks across the
//! codebase.

use std::time::Duration;

use crate::policies::{BackoffPolicy, Reaction};

/// Configuration for a [`WorkerPool`](crate::WorkerPool).
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Number of worker threads. Each worker drives one operation at a time,
    /// which bounds total outstanding operations at this count.
    pub workers: usize,

    /// Emit a `Progress` event every this many completed iterations per
    /// worker (`0` = disabled).
    pub report_every: u64,

    /// Expected payload length; anything else is an integrity violation.
    pub expected_len: usize,

    /// Per-iteration timeout for the blocking wait.
    ///
    /// - `Duration::ZERO` = no timeout (wait until the operation resolves)
    /// - `> 0` = on expiry the bridge cancels the operation and the worker
    ///   treats the iteration as failed
    pub timeout: Duration,

    /// Maximum time `shutdown()` waits for workers to finish their current
    /// iteration before reporting them stuck.
    pub grace: Duration,

    /// Capacity of the diagnostics bus ring buffer (min 1, clamped by the bus).
    pub bus_capacity: usize,

    /// Delay policy applied between a failed iteration and the next attempt.
    pub backoff: BackoffPolicy,

    /// What a worker does after an operation failure or timeout.
    pub on_failure: Reaction,

    /// What a worker does after a payload integrity violation.
    pub on_integrity: Reaction,
}

impl PoolConfig {
    /// Returns the per-iteration timeout as an `Option` (`0s` → `None`).
    #[inline]
    pub fn iteration_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns the progress cadence as an `Option` (`0` → `None`).
    #[inline]
    pub fn progress_cadence(&self) -> Option<u64> {
        if self.report_every == 0 {
            None
        } else {
            Some(self.report_every)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for PoolConfig {
    /// Default configuration:
    ///
    /// - `workers = 8`
    /// - `report_every = 100`
    /// - `expected_len = 1024`
    /// - `timeout = 0s` (no timeout)
    /// - `grace = 30s`
    /// - `bus_capacity = 1024`
    /// - `on_failure = Reaction::Continue`, `on_integrity = Reaction::Continue`
    fn default() -> Self {
        Self {
            workers: 8,
            report_every: 100,
            expected_len: 1024,
            timeout: Duration::ZERO,
            grace: Duration::from_secs(30),
            bus_capacity: 1024,
            backoff: BackoffPolicy::default(),
            on_failure: Reaction::Continue,
            on_integrity: Reaction::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_means_none() {
        let cfg = PoolConfig::default();
        assert!(cfg.iteration_timeout().is_none());

        let cfg = PoolConfig {
            timeout: Duration::from_secs(2),
            ..PoolConfig::default()
        };
        assert_eq!(cfg.iteration_timeout(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn zero_cadence_disables_progress() {
        let cfg = PoolConfig {
            report_every: 0,
            ..PoolConfig::default()
        };
        assert!(cfg.progress_cadence().is_none());
        assert_eq!(PoolConfig::default().progress_cadence(), Some(100));
    }

    #[test]
    fn bus_capacity_is_clamped() {
        let cfg = PoolConfig {
            bus_capacity: 0,
            ..PoolConfig::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
