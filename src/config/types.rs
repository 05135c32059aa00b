use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Fetchling
///
/// Every section is optional in the TOML file; missing sections fall back
/// to defaults so the CLI can run without a config file at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default, rename = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// HTTP client behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Overall request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: format!("fetchling/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Retry and backoff configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries per logical fetch (attempts = retries + 1)
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Delay before the first retry (milliseconds); doubles on each retry
    #[serde(rename = "initial-delay-ms")]
    pub initial_delay_ms: u64,

    /// Upper bound on any single backoff delay (milliseconds)
    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay_ms: 100,
            max_delay_ms: Some(30_000),
        }
    }
}

impl RetryConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay_ms.map(Duration::from_millis)
    }
}

/// Token-bucket rate limit configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum number of tokens the bucket can hold (burst size)
    pub capacity: u32,

    /// Tokens added per second
    #[serde(rename = "refill-rate")]
    pub refill_rate: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            refill_rate: 2.0,
        }
    }
}

/// Cursor pagination configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    /// Query parameter name the cursor is sent back under
    #[serde(rename = "cursor-param")]
    pub cursor_param: String,

    /// Query parameter name for the requested page size, if any
    #[serde(rename = "page-size-param")]
    pub page_size_param: Option<String>,

    /// Requested number of records per page
    #[serde(rename = "page-size")]
    pub page_size: Option<u32>,

    /// Top-level JSON key holding the record array
    #[serde(rename = "records-key")]
    pub records_key: String,

    /// Top-level JSON key holding the continuation cursor
    #[serde(rename = "cursor-key")]
    pub cursor_key: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            cursor_param: "cursor".to_string(),
            page_size_param: None,
            page_size: None,
            records_key: "items".to_string(),
            cursor_key: "next_cursor".to_string(),
        }
    }
}
