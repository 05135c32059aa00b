//! Client module for rate-limited HTTP fetching
//!
//! This module contains the core fetch machinery, including:
//! - Single-shot HTTP execution with error classification
//! - Exponential backoff policy for retries
//! - Token-bucket rate limiting shared across concurrent operations
//! - Cursor-following pagination
//! - Cooperative cancellation and an explicit response cache

mod backoff;
mod cache;
mod cancel;
mod executor;
mod fetch;
mod limiter;
mod paginator;

pub use backoff::BackoffState;
pub use cache::ResponseCache;
pub use cancel::CancelToken;
pub use executor::{build_http_client, Request, RequestExecutor, Response};
pub use fetch::FetchClient;
pub use limiter::RateLimiter;
pub use paginator::{Page, Paginator};
