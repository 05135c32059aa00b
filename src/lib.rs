//! Fetchling: a rate-limited async HTTP fetch client
//!
//! This crate implements an asynchronous request/response client with
//! token-bucket rate limiting, exponential retry/backoff, cursor-based
//! pagination, and pluggable response parsing (JSON records, HTML links).

pub mod client;
pub mod config;
pub mod parse;

use std::time::Duration;
use thiserror::Error;

/// Errors produced by a single HTTP exchange
///
/// Variants carry enough context to decide whether the request is worth
/// retrying: timeouts, connection failures, 429 and 5xx are transient,
/// everything else is fatal for that request.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    ConnectionFailed { url: String, message: String },

    #[error("Rate limited by {url} (HTTP 429)")]
    RateLimited {
        url: String,
        /// Server-provided Retry-After hint, when present
        retry_after: Option<Duration>,
    },

    #[error("Server error {status} from {url}")]
    ServerError { url: String, status: u16 },

    #[error("Client error {status} from {url}")]
    ClientError { url: String, status: u16 },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },
}

impl NetworkError {
    /// Whether a retry with backoff can plausibly succeed
    ///
    /// Timeouts, connection failures, HTTP 429 and 5xx are transient;
    /// other 4xx responses are the caller's fault and are never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NetworkError::Timeout { .. }
                | NetworkError::ConnectionFailed { .. }
                | NetworkError::RateLimited { .. }
                | NetworkError::ServerError { .. }
        )
    }
}

/// Errors produced while extracting records from a response body
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed response body: {0}")]
    Malformed(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Top-level error type for fetch operations
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        attempts: u32,
        last_error: NetworkError,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Fetch operation cancelled")]
    Cancelled,
}

/// Result type alias for fetch operations
pub type Result<T> = std::result::Result<T, FetchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use client::{
    BackoffState, CancelToken, FetchClient, Page, Paginator, RateLimiter, Request, Response,
    ResponseCache,
};
pub use config::Config;
pub use parse::{Cursor, HtmlLinkParser, JsonRecordParser, ParserKind, Record, ResponseParser};
