//! Batcher tuning

use std::time::Duration;

/// Exponential backoff applied to a failed bulk call
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(3),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn with_max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = backoff;
        self
    }

    /// Attempts actually made; at least one
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay before retry number `retry` (0-indexed)
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let delay = self.initial_backoff.as_millis() as f64 * self.multiplier.powi(retry as i32);
        let capped = delay.min(self.max_backoff.as_millis() as f64);

        Duration::from_millis(capped as u64)
    }
}

/// Coalescing window settings
#[derive(Debug, Clone, PartialEq)]
pub struct BatcherConfig {
    /// A window is dispatched as soon as it holds this many distinct keys
    pub max_batch_size: usize,
    /// Window length measured from the first request
    pub batch_delay: Duration,
    pub retry: RetryPolicy,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 50,
            batch_delay: Duration::from_millis(10),
            retry: RetryPolicy::default(),
        }
    }
}

impl BatcherConfig {
    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size.max(1);
        self
    }

    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
