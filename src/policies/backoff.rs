//! Backoff policy for failed iterations.
//!
//! [`BackoffPolicy`] controls how the delay between a failure and the next
//! attempt grows across a streak of consecutive failures. The delay for
//! streak `n` (0-indexed) is `first × factor^n`, clamped to `max`, with
//! jitter applied last. The base is derived purely from the streak length, so
//! jitter output never feeds back into subsequent delays.

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Retry backoff policy.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use blockbridge::{BackoffPolicy, JitterPolicy};
///
/// let backoff = BackoffPolicy {
///     first: Duration::from_millis(100),
///     max: Duration::from_secs(10),
///     factor: 2.0,
///     jitter: JitterPolicy::None,
/// };
///
/// assert_eq!(backoff.next(0), Duration::from_millis(100));
/// assert_eq!(backoff.next(1), Duration::from_millis(200));
/// // 100ms × 2^10 overflows the cap → clamped
/// assert_eq!(backoff.next(10), Duration::from_secs(10));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay after the first failure in a streak.
    pub first: Duration,
    /// Maximum delay cap.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Jitter policy applied to the clamped base delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns a constant-delay policy: `first = 100ms`, `factor = 1.0`,
    /// `max = 30s`, no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay for the given consecutive-failure streak (0-indexed).
    ///
    /// Non-finite or overflowing intermediate values clamp to `max`.
    pub fn next(&self, streak: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let exp = streak.min(i32::MAX as u32) as i32;
        let unclamped = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !unclamped.is_finite() || unclamped < 0.0 || unclamped > max_secs {
            self.max
        } else {
            Duration::from_secs_f64(unclamped)
        };

        match self.jitter {
            JitterPolicy::Decorrelated => {
                self.jitter
                    .apply_decorrelated(self.first.min(self.max), base, self.max)
            }
            _ => self.jitter.apply(base),
        }
    }
}
