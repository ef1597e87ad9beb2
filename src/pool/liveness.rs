//! Alive-set for grace-bounded shutdown.
//!
//! Worker threads register on entry and deregister when their loop exits.
//! `shutdown()` waits on the set draining; whatever is left when the grace
//! period elapses is reported as stuck. The wait primitive is a plain
//! mutex/condvar pair because the waiter is a blocking caller, not a task.

use std::collections::BTreeSet;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

pub(crate) struct Liveness {
    alive: Mutex<BTreeSet<usize>>,
    drained: Condvar,
}

impl Liveness {
    pub(crate) fn new() -> Self {
        Self {
            alive: Mutex::new(BTreeSet::new()),
            drained: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<usize>> {
        self.alive.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn register(&self, worker: usize) {
        self.lock().insert(worker);
    }

    pub(crate) fn deregister(&self, worker: usize) {
        let mut alive = self.lock();
        alive.remove(&worker);
        if alive.is_empty() {
            self.drained.notify_all();
        }
    }

    /// Waits until every registered worker has deregistered, up to `grace`.
    ///
    /// Returns the still-alive worker indexes on timeout.
    pub(crate) fn wait_all_stopped(&self, grace: Duration) -> Result<(), Vec<usize>> {
        let deadline = Instant::now() + grace;
        let mut alive = self.lock();

        while !alive.is_empty() {
            let now = Instant::now();
            if now >= deadline {
                return Err(alive.iter().copied().collect());
            }
            let (guard, _timed_out) = self
                .drained
                .wait_timeout(alive, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            alive = guard;
        }
        Ok(())
    }
}
