//! Worker reaction to a bad iteration.
//!
//! [`Reaction`] decides whether a worker keeps looping after an operation
//! failure, a timeout, or a payload integrity violation. Nothing here is ever
//! process-fatal: the strongest available reaction stops the one worker,
//! leaving its siblings untouched.

/// What a worker does after an iteration goes wrong.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reaction {
    /// Report the condition and keep looping (default).
    ///
    /// Operation failures and timeouts additionally apply the configured
    /// backoff before the next iteration.
    Continue,

    /// Report the condition and stop this worker.
    ///
    /// Other workers and the pool itself are unaffected; the pool observes
    /// the worker's `WorkerStopped` event.
    StopWorker,
}

impl Default for Reaction {
    /// Returns [`Reaction::Continue`].
    fn default() -> Self {
        Reaction::Continue
    }
}
