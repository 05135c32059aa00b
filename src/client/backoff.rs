//! Exponential backoff between retry attempts
//!
//! Backoff is pure policy: given the retry state, `next_delay` computes how
//! long to wait, and the caller owns the actual sleep. Keeping the clock out
//! of this module makes the delay sequence trivially testable.

use crate::config::RetryConfig;
use std::time::Duration;

/// Tracks the retry progress of one logical fetch operation
///
/// Created at the start of each logical fetch and discarded on success or
/// exhaustion. `retry_count` never exceeds `max_retries`.
#[derive(Debug, Clone)]
pub struct BackoffState {
    retry_count: u32,
    max_retries: u32,
    initial_delay: Duration,
    max_delay: Option<Duration>,
}

impl BackoffState {
    /// Creates a fresh state with `retry_count` at zero
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            retry_count: 0,
            max_retries,
            initial_delay,
            max_delay: None,
        }
    }

    /// Caps every computed delay at the given maximum
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        let state = Self::new(config.max_retries, config.initial_delay());
        match config.max_delay() {
            Some(max) => state.with_max_delay(max),
            None => state,
        }
    }

    /// Computes the delay before the next retry, advancing the state
    ///
    /// Returns `None` when `retry_count` has reached `max_retries`, meaning
    /// the caller must give up. Otherwise returns
    /// `initial_delay * 2^retry_count` (so the first retry waits exactly
    /// `initial_delay`) and increments `retry_count`.
    ///
    /// The multiplication saturates rather than overflowing, and the result
    /// is clamped to `max_delay` when one is configured.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.retry_count >= self.max_retries {
            return None;
        }

        let multiplier = 2u32.checked_pow(self.retry_count).unwrap_or(u32::MAX);
        let mut delay = self.initial_delay.saturating_mul(multiplier);

        if let Some(max) = self.max_delay {
            delay = delay.min(max);
        }

        self.retry_count += 1;
        Some(delay)
    }

    /// Number of retries attempted so far
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Total attempts made, counting the initial request
    pub fn attempts(&self) -> u32 {
        self.retry_count + 1
    }

    pub fn is_exhausted(&self) -> bool {
        self.retry_count >= self.max_retries
    }
}
