//! Jitter applied to retry delays.
//!
//! [`JitterPolicy`] adds randomness to backoff delays so that workers which
//! fail together do not retry in lockstep against the same collaborator.

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of retry delays.
///
/// ## Trade-offs
/// - **None**: predictable, fine when only one worker is retrying
/// - **Full**: maximum spreading, can shrink the delay to zero
/// - **Equal**: balanced, preserves at least half the base delay
/// - **Decorrelated**: stateful, grows from the previous delay
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JitterPolicy {
    /// No jitter: use the exact backoff delay.
    #[default]
    None,

    /// Full jitter: random delay in `[0, base]`.
    Full,

    /// Equal jitter: `base/2 + random[0, base/2]`.
    Equal,

    /// Decorrelated jitter: `random[first, prev * 3]`, capped at `max`.
    ///
    /// Requires context (first, prev, max) via
    /// [`apply_decorrelated`](Self::apply_decorrelated).
    Decorrelated,
}

impl JitterPolicy {
    /// Applies jitter to the given delay.
    ///
    /// For `Decorrelated` this returns the input unchanged; use
    /// [`apply_decorrelated`](Self::apply_decorrelated), which carries the
    /// extra context it needs.
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => self.full_jitter(delay),
            JitterPolicy::Equal => self.equal_jitter(delay),
            JitterPolicy::Decorrelated => delay,
        }
    }

    /// Applies decorrelated jitter with full context.
    ///
    /// Falls back to `apply(prev)` when called on a non-`Decorrelated` policy.
    pub fn apply_decorrelated(&self, first: Duration, prev: Duration, max: Duration) -> Duration {
        if !matches!(self, JitterPolicy::Decorrelated) {
            return self.apply(prev);
        }

        let mut rng = rand::rng();
        let first_ms = first.as_millis() as u64;
        let prev_ms = prev.as_millis() as u64;
        let max_ms = max.as_millis() as u64;

        let upper = prev_ms.saturating_mul(3).min(max_ms).max(first_ms);
        if first_ms >= upper {
            return first;
        }

        Duration::from_millis(rng.random_range(first_ms..=upper))
    }

    /// Full jitter: random[0, delay]
    fn full_jitter(&self, delay: Duration) -> Duration {
        let ms = delay.as_millis() as u64;
        if ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=ms))
    }

    /// Equal jitter: delay/2 + random[0, delay/2]
    fn equal_jitter(&self, delay: Duration) -> Duration {
        let ms = delay.as_millis() as u64;
        if ms == 0 {
            return Duration::ZERO;
        }
        let half = ms / 2;
        let jitter = if half == 0 {
            0
        } else {
            rand::rng().random_range(0..=half)
        };
        Duration::from_millis(half + jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_identity() {
        let d = Duration::from_millis(250);
        assert_eq!(JitterPolicy::None.apply(d), d);
    }

    #[test]
    fn full_stays_within_base() {
        let base = Duration::from_millis(1000);
        for _ in 0..100 {
            assert!(JitterPolicy::Full.apply(base) <= base);
        }
    }

    #[test]
    fn equal_keeps_at_least_half() {
        let base = Duration::from_millis(1000);
        for _ in 0..100 {
            let d = JitterPolicy::Equal.apply(base);
            assert!(d >= Duration::from_millis(500));
            assert!(d <= base);
        }
    }

    #[test]
    fn decorrelated_respects_floor_and_cap() {
        let first = Duration::from_millis(100);
        let prev = Duration::from_millis(400);
        let max = Duration::from_secs(1);
        for _ in 0..100 {
            let d = JitterPolicy::Decorrelated.apply_decorrelated(first, prev, max);
            assert!(d >= first);
            assert!(d <= max);
        }
    }

    #[test]
    fn zero_delay_stays_zero() {
        assert_eq!(JitterPolicy::Full.apply(Duration::ZERO), Duration::ZERO);
        assert_eq!(JitterPolicy::Equal.apply(Duration::ZERO), Duration::ZERO);
    }
}
