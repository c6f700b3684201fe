//! Throttled rate sampling for running transfers

use std::time::Duration;
use tokio::time::Instant;

/// Produces an instantaneous speed at most once per interval
pub struct RateSampler {
    interval: Duration,
    last_at: Instant,
    bytes_at_last: u64,
}

impl RateSampler {
    /// Create a sampler whose first sample point is `start`
    pub fn new(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            last_at: start,
            bytes_at_last: 0,
        }
    }

    /// Take a sample if at least one interval has passed since the last one.
    /// Returns the speed in bytes per second over that window.
    pub fn sample(&mut self, now: Instant, total_bytes: u64) -> Option<f64> {
        let window = now.saturating_duration_since(self.last_at);
        if window < self.interval || window.is_zero() {
            return None;
        }

        let bytes = total_bytes.saturating_sub(self.bytes_at_last);
        let speed = bytes as f64 / window.as_secs_f64();

        self.last_at = now;
        self.bytes_at_last = total_bytes;
        Some(speed)
    }
}
