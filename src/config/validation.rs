use crate::config::types::{
    ClientConfig, Config, PaginationConfig, RateLimitConfig, RetryConfig,
};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_client_config(&config.client)?;
    validate_retry_config(&config.retry)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_pagination_config(&config.pagination)?;
    Ok(())
}

/// Validates HTTP client configuration
fn validate_client_config(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be > 0".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be > 0".to_string(),
        ));
    }

    if config.connect_timeout_secs > config.timeout_secs {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-secs ({}) must not exceed timeout-secs ({})",
            config.connect_timeout_secs, config.timeout_secs
        )));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates retry/backoff configuration
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.initial_delay_ms == 0 {
        return Err(ConfigError::Validation(
            "initial-delay-ms must be > 0".to_string(),
        ));
    }

    if let Some(max_delay) = config.max_delay_ms {
        if max_delay < config.initial_delay_ms {
            return Err(ConfigError::Validation(format!(
                "max-delay-ms ({}) must be >= initial-delay-ms ({})",
                max_delay, config.initial_delay_ms
            )));
        }
    }

    Ok(())
}

/// Validates rate limit configuration
fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    if config.capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "rate-limit capacity must be >= 1, got {}",
            config.capacity
        )));
    }

    if !config.refill_rate.is_finite() || config.refill_rate <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "rate-limit refill-rate must be a positive number, got {}",
            config.refill_rate
        )));
    }

    Ok(())
}

/// Validates pagination configuration
fn validate_pagination_config(config: &PaginationConfig) -> Result<(), ConfigError> {
    if config.cursor_param.is_empty() {
        return Err(ConfigError::Validation(
            "pagination cursor-param cannot be empty".to_string(),
        ));
    }

    if config.records_key.is_empty() {
        return Err(ConfigError::Validation(
            "pagination records-key cannot be empty".to_string(),
        ));
    }

    if config.cursor_key.is_empty() {
        return Err(ConfigError::Validation(
            "pagination cursor-key cannot be empty".to_string(),
        ));
    }

    if let Some(size) = config.page_size {
        if size == 0 {
            return Err(ConfigError::Validation(
                "pagination page-size must be > 0 when set".to_string(),
            ));
        }

        if config.page_size_param.is_none() {
            return Err(ConfigError::Validation(
                "pagination page-size requires page-size-param".to_string(),
            ));
        }
    }

    Ok(())
}
