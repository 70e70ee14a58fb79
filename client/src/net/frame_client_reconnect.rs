//! Reconnect policy: capped attempts with linearly growing delay.

#[cfg(test)]
#[path = "frame_client_reconnect_test.rs"]
mod frame_client_reconnect_test;

use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// After `k` consecutive failures the client waits `base_delay * k`; after
/// `max_attempts` consecutive failures it gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }
}

impl ReconnectPolicy {
    /// True once `failures` consecutive attempts have failed. A zero cap is
    /// treated as one attempt.
    #[must_use]
    pub fn is_exhausted(&self, failures: u32) -> bool {
        failures >= self.max_attempts.max(1)
    }

    /// Delay before the next attempt after `failures` consecutive failures.
    #[must_use]
    pub fn delay_for(&self, failures: u32) -> Duration {
        self.base_delay.saturating_mul(failures)
    }
}
