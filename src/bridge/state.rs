//! Atomic resolution state for one bridge instance.
//!
//! A bridge resolves exactly once. [`ResolutionCell`] encodes the states
//! {pending, completed, timed-out} in one atomic byte and admits exactly one
//! winning transition out of `Pending` via compare-and-swap. Both the
//! completion path and the timeout path must win this CAS before they are
//! permitted to act, which is what makes cancel/complete mutually exclusive.

use std::sync::atomic::{AtomicU8, Ordering};

const PENDING: u8 = 0;
const COMPLETED: u8 = 1;
const TIMED_OUT: u8 = 2;

/// Final state of a resolved bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// The asynchronous side delivered a result.
    Completed,
    /// The caller-side timeout elapsed first.
    TimedOut,
}

impl Resolution {
    fn as_u8(self) -> u8 {
        match self {
            Resolution::Completed => COMPLETED,
            Resolution::TimedOut => TIMED_OUT,
        }
    }
}

/// Write-once state cell gating every resolution attempt.
#[derive(Debug)]
pub(crate) struct ResolutionCell {
    state: AtomicU8,
}

impl ResolutionCell {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(PENDING),
        }
    }

    /// Attempts the `Pending → to` transition.
    ///
    /// Returns `true` for exactly one caller per bridge; every later attempt
    /// (second delivery, timeout racing a completion) returns `false`.
    ///
    /// `AcqRel` on success orders the winner's subsequent slot write after
    /// the transition; `Acquire` on failure lets the loser observe the
    /// winner's state.
    pub(crate) fn try_resolve(&self, to: Resolution) -> bool {
        self.state
            .compare_exchange(PENDING, to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// True while no resolution has won.
    pub(crate) fn is_pending(&self) -> bool {
        self.state.load(Ordering::Acquire) == PENDING
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn first_transition_wins() {
        let cell = ResolutionCell::new();
        assert!(cell.is_pending());
        assert!(cell.try_resolve(Resolution::Completed));
        assert!(!cell.is_pending());
        assert!(!cell.try_resolve(Resolution::Completed));
        assert!(!cell.try_resolve(Resolution::TimedOut));
    }

    #[test]
    fn concurrent_transitions_admit_exactly_one_winner() {
        for _ in 0..100 {
            let cell = Arc::new(ResolutionCell::new());
            let c1 = Arc::clone(&cell);
            let c2 = Arc::clone(&cell);
            let t1 = std::thread::spawn(move || c1.try_resolve(Resolution::Completed));
            let t2 = std::thread::spawn(move || c2.try_resolve(Resolution::TimedOut));
            let wins = [t1.join().unwrap(), t2.join().unwrap()];
            assert_eq!(wins.iter().filter(|w| **w).count(), 1);
        }
    }
}
