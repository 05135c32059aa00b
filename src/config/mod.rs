//! Configuration module for Fetchling
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use fetchling::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("fetchling.toml")).unwrap();
//! println!("Bucket capacity: {}", config.rate_limit.capacity);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ClientConfig, Config, PaginationConfig, RateLimitConfig, RetryConfig};

// Re-export parser functions
pub use parser::load_config;
