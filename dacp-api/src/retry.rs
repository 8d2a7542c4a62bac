//! Bounded retry policy

use std::time::Duration;

/// How many times, and how patiently, to retry a refused operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the first try
    pub max_retries: u32,
    /// Base delay between retries
    pub base_delay: Duration,
    /// Whether to double the delay on each attempt
    pub exponential_backoff: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            exponential_backoff: true,
        }
    }
}

impl RetryPolicy {
    /// Create a retry policy with no retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            exponential_backoff: false,
        }
    }

    /// Create a retry policy with fixed delays
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay: delay,
            exponential_backoff: false,
        }
    }

    /// Create a retry policy with exponential backoff
    pub fn exponential(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            exponential_backoff: true,
        }
    }

    /// Total attempts allowed, counting the first one
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Calculate the delay before retry number `attempt` (1-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 || attempt > self.max_retries {
            return Duration::ZERO;
        }

        if self.exponential_backoff {
            self.base_delay
                .saturating_mul(2_u32.saturating_pow(attempt - 1))
        } else {
            self.base_delay
        }
    }
}
