//! Reconnect back-off.

use std::time::Duration;

use crate::core::{MAX_RECONNECT_DELAY, RECONNECT_DELAY};

/// How long a client waits in `Error` before reconnecting.
///
/// The default is a fixed delay with no retry cap. With many clients failing
/// at once they all come back together; [`BackoffPolicy::Exponential`] is
/// there for runs where that matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// Same delay before every retry.
    Fixed(Duration),
    /// Delay doubles with every retry, starting at `base`, capped at `max`.
    Exponential {
        /// Delay before the first retry.
        base: Duration,
        /// Upper bound on any delay.
        max: Duration,
    },
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        BackoffPolicy::Fixed(RECONNECT_DELAY)
    }
}

impl BackoffPolicy {
    /// Exponential policy with the default base and ceiling.
    pub fn exponential() -> Self {
        BackoffPolicy::Exponential {
            base: RECONNECT_DELAY,
            max: MAX_RECONNECT_DELAY,
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay(&self, retry: u64) -> Duration {
        match *self {
            BackoffPolicy::Fixed(delay) => delay,
            BackoffPolicy::Exponential { base, max } => {
                let exponent = retry.saturating_sub(1).min(31) as u32;
                base.checked_mul(1u32 << exponent)
                    .map_or(max, |delay| delay.min(max))
            }
        }
    }
}
