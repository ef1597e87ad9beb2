//! The completion bridge itself.
//!
//! One bridge instance converts one asynchronous completion into one blocking
//! return on the calling thread. The protocol, from the caller's side:
//!
//! 1. create a fresh bridge (never reused);
//! 2. hand [`CompletionBridge::completion`] to `AsyncOperation::start`,
//!    keeping the returned cancellation token;
//! 3. block in [`CompletionBridge::wait`], optionally with a timeout;
//! 4. read the result; the token is released only after resolution has been
//!    observed on the caller side.
//!
//! The delivery handle writes the slot and notifies **under the same mutex**
//! after winning the resolution CAS, so the waking caller always observes a
//! fully written result. A delivery that loses the CAS (double signal, or a
//! completion racing a timeout) touches nothing and is counted on the
//! [`OpsMeter`].

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::bridge::meter::OpsMeter;
use crate::bridge::state::{Resolution, ResolutionCell};
use crate::error::{BridgeError, OperationError};

/// State shared between the blocked caller and the delivery handle.
struct Shared<T> {
    state: ResolutionCell,
    slot: Mutex<Option<Result<T, OperationError>>>,
    resolved: Condvar,
    meter: Option<Arc<OpsMeter>>,
}

impl<T> Shared<T> {
    fn lock_slot(&self) -> MutexGuard<'_, Option<Result<T, OperationError>>> {
        // A panicking waiter cannot leave the slot half-written: the winner
        // writes it in one assignment. Poison is therefore ignorable.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        // A bridge abandoned while pending still settles the gauge.
        if self.state.try_resolve(Resolution::TimedOut) {
            if let Some(m) = &self.meter {
                m.bridge_resolved();
            }
        }
    }
}

/// Delivery handle held by the asynchronous side.
///
/// Cloneable so that misbehaving operations which attempt a second delivery
/// are expressible; only the first delivery per bridge has any effect.
pub struct Completion<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Completion<T> {
    /// Delivers the operation's result.
    ///
    /// Returns `true` if this call resolved the bridge. Returns `false` if
    /// the bridge was already resolved (an earlier delivery or a timeout won
    /// the race); in that case nothing is written, the blocked caller is not
    /// touched, and the attempt is counted as absorbed.
    pub fn complete(&self, result: Result<T, OperationError>) -> bool {
        if !self.shared.state.try_resolve(Resolution::Completed) {
            if let Some(m) = &self.shared.meter {
                m.delivery_absorbed();
            }
            return false;
        }

        {
            let mut slot = self.shared.lock_slot();
            debug_assert!(slot.is_none(), "resolution winner found an occupied slot");
            *slot = Some(result);
        }
        self.shared.resolved.notify_one();

        if let Some(m) = &self.shared.meter {
            m.bridge_resolved();
        }
        true
    }

    /// Shorthand for `complete(Ok(value))`.
    pub fn succeed(&self, value: T) -> bool {
        self.complete(Ok(value))
    }

    /// Shorthand for `complete(Err(error))`.
    pub fn fail(&self, error: OperationError) -> bool {
        self.complete(Err(error))
    }

    /// True while the bridge is unresolved.
    ///
    /// Advisory only: a delivery may still lose the race after observing
    /// `true`. Useful for operations that want to skip expensive work once
    /// the caller has given up.
    pub fn is_pending(&self) -> bool {
        self.shared.state.is_pending()
    }
}

/// Short-lived synchronization object pairing a result slot with a wait
/// primitive, used for exactly one blocking call.
pub struct CompletionBridge<T> {
    shared: Arc<Shared<T>>,
}

impl<T> CompletionBridge<T> {
    /// Creates a fresh, unresolved bridge without bookkeeping.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Creates a fresh bridge whose lifecycle is tracked on `meter`.
    pub fn with_meter(meter: Arc<OpsMeter>) -> Self {
        Self::build(Some(meter))
    }

    fn build(meter: Option<Arc<OpsMeter>>) -> Self {
        if let Some(m) = &meter {
            m.bridge_opened();
        }
        Self {
            shared: Arc::new(Shared {
                state: ResolutionCell::new(),
                slot: Mutex::new(None),
                resolved: Condvar::new(),
                meter,
            }),
        }
    }

    /// Returns the delivery handle to pass to `AsyncOperation::start`.
    pub fn completion(&self) -> Completion<T> {
        Completion {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Blocks the calling thread until the bridge resolves.
    ///
    /// `cancel` is the handle returned by `AsyncOperation::start`. The bridge
    /// owns it for the whole wait and releases it only after resolution has
    /// been observed here, so the asynchronous side can never fire against a
    /// released handle.
    ///
    /// With `timeout = Some(d)`, expiry runs the resolution race: if the
    /// timeout wins, the operation is cancelled and `BridgeError::Timeout` is
    /// returned; if a completion wins at the last moment, its result is
    /// delivered normally and the timeout becomes a no-op. Exactly one of the
    /// two outcomes is observable, never both and never neither.
    pub fn wait(
        self,
        cancel: CancellationToken,
        timeout: Option<Duration>,
    ) -> Result<T, BridgeError> {
        let deadline = timeout.map(|d| (d, Instant::now() + d));
        let mut slot = self.shared.lock_slot();

        loop {
            if let Some(result) = slot.take() {
                drop(slot);
                // Resolution observed; only now may the handle be released.
                drop(cancel);
                return result.map_err(BridgeError::Failed);
            }

            match deadline {
                None => {
                    slot = self
                        .shared
                        .resolved
                        .wait(slot)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                Some((dur, at)) => {
                    let now = Instant::now();
                    if now >= at {
                        if self.shared.state.try_resolve(Resolution::TimedOut) {
                            drop(slot);
                            if let Some(m) = &self.shared.meter {
                                m.bridge_resolved();
                            }
                            cancel.cancel();
                            return Err(BridgeError::Timeout { timeout: dur });
                        }
                        // A completion won the race; its slot write is
                        // imminent, so wait for it without a deadline.
                        slot = self
                            .shared
                            .resolved
                            .wait(slot)
                            .unwrap_or_else(PoisonError::into_inner);
                    } else {
                        let (guard, _timed_out) = self
                            .shared
                            .resolved
                            .wait_timeout(slot, at - now)
                            .unwrap_or_else(PoisonError::into_inner);
                        slot = guard;
                    }
                }
            }
        }
    }
}

impl<T> Default for CompletionBridge<T> {
    fn default() -> Self {
        Self::new()
    }
}
