//! Exponential backoff with jitter for notification redelivery.

use std::time::Duration;

use rand::Rng;

/// Redelivery delay policy owned by a notifier.
///
/// Retry `n` (1-based) waits `base * 2^(n-1)`, capped at `max`, stretched by a
/// random factor in `[1, 1 + jitter)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    pub base: Duration,
    pub max: Duration,
    pub jitter: f64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(250),
            max: Duration::from_secs(5),
            jitter: 0.1,
        }
    }
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            ..Self::default()
        }
    }

    /// Delay before retry `attempt`. Retry 0 waits nothing.
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        let capped = self.base.saturating_mul(factor).min(self.max);

        if self.jitter > 0.0 {
            capped.mul_f64(1.0 + rand::thread_rng().gen_range(0.0..self.jitter))
        } else {
            capped
        }
    }
}
