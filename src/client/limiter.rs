//! Token-bucket rate limiter
//!
//! One `RateLimiter` instance gates the outbound request rate for every fetch
//! operation sharing it. Tokens refill continuously at `refill_rate` per
//! second up to `capacity`; each request consumes one token. The
//! refill-and-decrement step runs under a single mutex so two concurrent
//! callers can never consume the same fractional token.

use crate::config::RateLimitConfig;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Mutable bucket state, guarded by the limiter's mutex
#[derive(Debug)]
struct BucketInner {
    /// Available tokens; fractional so refill is smooth
    tokens: f64,
    /// When the token count was last brought up to date
    last_refill: Instant,
}

/// Token-bucket rate limiter shared across concurrent fetch operations
///
/// The bucket starts full, so a fresh limiter admits a burst of up to
/// `capacity` requests before any waiting happens. Over any window `T` the
/// number of admitted requests never exceeds `capacity + refill_rate * T`.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: u32,
    refill_rate: f64,
    inner: Mutex<BucketInner>,
}

impl RateLimiter {
    /// Creates a limiter with the given burst capacity and refill rate
    /// (tokens per second). The bucket starts full.
    pub fn new(capacity: u32, refill_rate: f64) -> Self {
        Self {
            capacity,
            refill_rate,
            inner: Mutex::new(BucketInner {
                tokens: f64::from(capacity),
                last_refill: Instant::now(),
            }),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.capacity, config.refill_rate)
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }

    /// Brings the token count up to date for the elapsed time
    fn refill(&self, inner: &mut BucketInner, now: Instant) {
        let elapsed = now.duration_since(inner.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            inner.tokens = (inner.tokens + elapsed * self.refill_rate).min(f64::from(self.capacity));
            inner.last_refill = now;
        }
    }

    /// Takes a token if one is available right now, without suspending
    pub async fn try_acquire(&self) -> bool {
        let mut inner = self.inner.lock().await;
        self.refill(&mut inner, Instant::now());

        if inner.tokens >= 1.0 {
            inner.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Suspends until a token is available, then consumes it
    ///
    /// When the bucket is empty this computes the time until the next whole
    /// token, releases the lock, and sleeps for that duration before trying
    /// again. Waiters are not queued; under contention the wait is
    /// re-derived from the bucket state on every pass.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut inner = self.inner.lock().await;
                self.refill(&mut inner, Instant::now());

                if inner.tokens >= 1.0 {
                    inner.tokens -= 1.0;
                    return;
                }

                let deficit = 1.0 - inner.tokens;
                Duration::from_secs_f64(deficit / self.refill_rate)
            };

            tracing::trace!("rate limiter empty, waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }
}
