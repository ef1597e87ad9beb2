//! Error types used by the bridge, workers, and the pool.
//!
//! Three layers, matching who raises them:
//!
//! - [`OperationError`] — the asynchronous operation itself completed with a
//!   failure result.
//! - [`BridgeError`] — outcome of one blocking [`CompletionBridge::wait`]
//!   call (operation failure or timeout).
//! - [`PoolError`] — errors raised by the pool runtime (startup, shutdown).
//!
//! All types provide `as_label` for logs/metrics, in addition to their
//! `Display` impls.
//!
//! [`CompletionBridge::wait`]: crate::bridge::CompletionBridge::wait

use std::time::Duration;
use thiserror::Error;

/// Failure delivered by an asynchronous operation.
///
/// Operations report failures as messages; the bridge and worker never need
/// to look inside, only to carry them to the diagnostics side.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct OperationError {
    /// Human-readable failure description.
    pub message: String,
}

impl OperationError {
    /// Creates an operation failure from any displayable value.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outcome of one blocking bridge call that did not deliver a payload.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The operation completed with a failure result.
    #[error("operation failed: {0}")]
    Failed(#[source] OperationError),

    /// The caller-side timeout elapsed before the operation completed.
    ///
    /// The bridge has already cancelled the operation; a late completion
    /// (if the operation misbehaves and delivers anyway) is absorbed.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that elapsed.
        timeout: Duration,
    },
}

impl BridgeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use blockbridge::{BridgeError, OperationError};
    ///
    /// let err = BridgeError::Failed(OperationError::new("boom"));
    /// assert_eq!(err.as_label(), "operation_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BridgeError::Failed(_) => "operation_failed",
            BridgeError::Timeout { .. } => "bridge_timeout",
        }
    }

    /// Indicates whether the failed iteration is safe to retry.
    ///
    /// Both variants are retryable: the bridge guarantees the previous
    /// operation can no longer touch caller state, so the worker may start a
    /// fresh iteration immediately.
    pub fn is_retryable(&self) -> bool {
        true
    }
}

/// Errors produced by the pool runtime itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PoolError {
    /// Shutdown grace period was exceeded; some workers were still mid-iteration.
    #[error("shutdown grace {grace:?} exceeded; stuck workers: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Indexes of workers that did not finish their iteration in time.
        stuck: Vec<usize>,
    },

    /// The shared completion runtime failed to start.
    #[error("failed to start completion runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl PoolError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PoolError::GraceExceeded { .. } => "pool_grace_exceeded",
            PoolError::Runtime(_) => "pool_runtime",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            PoolError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck workers={stuck:?}")
            }
            PoolError::Runtime(e) => format!("runtime: {e}"),
        }
    }
}
