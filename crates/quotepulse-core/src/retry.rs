//! Deterministic backoff schedules for the resilient fetcher.

use std::time::Duration;

/// Backoff strategy applied between failed fetch attempts.
///
/// Schedules are deterministic; the delay for a given attempt never varies
/// between runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Fixed delay between attempts.
    Fixed {
        /// Delay between attempts.
        delay: Duration,
    },
    /// Exponential delay, calculated as `base * (factor ^ attempt)`.
    Exponential {
        /// The base duration scaled by the exponential factor.
        base: Duration,
        /// The multiplicative factor for each subsequent attempt.
        factor: f64,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_secs(1),
            factor: 2.0,
        }
    }
}

impl Backoff {
    /// Calculate the delay following a given attempt.
    ///
    /// # Arguments
    ///
    /// * `attempt` - The attempt number (1-based)
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential { base, factor } => {
                let scale = factor.powi(attempt as i32);
                Duration::from_secs_f64(base.as_secs_f64() * scale)
            }
        }
    }
}
