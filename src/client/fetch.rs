//! Fetch client - retry orchestration around the executor
//!
//! This module ties the pieces together for one logical fetch operation:
//! rate-limiter admission, a single execute, and backoff-driven retries for
//! transient failures. Cancellation is checked at every suspension point.

use crate::client::backoff::BackoffState;
use crate::client::cache::ResponseCache;
use crate::client::cancel::CancelToken;
use crate::client::executor::{build_http_client, Request, RequestExecutor, Response};
use crate::client::limiter::RateLimiter;
use crate::config::{Config, RetryConfig};
use crate::{FetchError, NetworkError};
use reqwest::Method;
use std::sync::{Arc, Mutex};

/// Rate-limited, retrying HTTP fetch client
///
/// Cloning is cheap: clones share the underlying HTTP connection pool, the
/// rate limiter, and the cache, so concurrent fetch operations spawned from
/// clones all draw on one token budget.
#[derive(Debug, Clone)]
pub struct FetchClient {
    executor: RequestExecutor,
    limiter: Arc<RateLimiter>,
    retry: RetryConfig,
    cache: Option<Arc<Mutex<ResponseCache>>>,
}

impl FetchClient {
    /// Builds a client from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Client, retry and rate-limit configuration
    ///
    /// # Returns
    ///
    /// * `Ok(FetchClient)` - Ready-to-use client
    /// * `Err(FetchError)` - Underlying HTTP client could not be built
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = build_http_client(&config.client)?;

        Ok(Self {
            executor: RequestExecutor::new(client),
            limiter: Arc::new(RateLimiter::from_config(&config.rate_limit)),
            retry: config.retry.clone(),
            cache: None,
        })
    }

    /// Attaches an explicit response cache
    ///
    /// Only successful GET responses are cached. The cache is owned by this
    /// client (and its clones); it is never global state.
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(Arc::new(Mutex::new(cache)));
        self
    }

    /// Overrides the retry policy from the config
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// The rate limiter shared by all clones of this client
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Fetches one request, retrying transient failures with backoff
    ///
    /// # Flow
    ///
    /// 1. Cancellation check, then rate-limiter admission
    /// 2. Cancellation check, then one execute
    /// 3. On success, return (and cache GETs)
    /// 4. On a retryable error (timeout, connection failure, 429, 5xx),
    ///    compute the backoff delay; if retries remain, check cancellation,
    ///    sleep, and go to 1
    /// 5. On a fatal error (other 4xx, transport oddities), fail immediately
    ///
    /// A 429 carrying a `Retry-After` hint sleeps for the hint when it is
    /// longer than the computed backoff; the retry counter still advances.
    ///
    /// # Errors
    ///
    /// * `FetchError::RetriesExhausted` - transient failures outlasted the budget
    /// * `FetchError::Network` - fatal error on this request
    /// * `FetchError::Cancelled` - the token was cancelled at a checkpoint
    pub async fn fetch(
        &self,
        request: &Request,
        cancel: &CancelToken,
    ) -> Result<Response, FetchError> {
        if let Some(cached) = self.cache_lookup(request) {
            tracing::debug!("cache hit for {}", request.url());
            return Ok(cached);
        }

        let mut backoff = BackoffState::from_config(&self.retry);

        loop {
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }
            self.limiter.acquire().await;

            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }

            tracing::debug!(
                "issuing {} {} (attempt {})",
                request.method(),
                request.url(),
                backoff.attempts()
            );

            match self.executor.execute(request).await {
                Ok(response) => {
                    tracing::debug!("{} -> {}", request.url(), response.status());
                    self.cache_store(request, &response);
                    return Ok(response);
                }
                Err(error) if error.is_retryable() => match backoff.next_delay() {
                    Some(delay) => {
                        let delay = match &error {
                            NetworkError::RateLimited {
                                retry_after: Some(hint),
                                ..
                            } => delay.max(*hint),
                            _ => delay,
                        };

                        tracing::warn!(
                            "transient failure for {} ({}), retry {} in {:?}",
                            request.url(),
                            error,
                            backoff.retry_count(),
                            delay
                        );

                        if cancel.is_cancelled() {
                            return Err(FetchError::Cancelled);
                        }
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        tracing::error!(
                            "giving up on {} after {} attempts: {}",
                            request.url(),
                            backoff.attempts(),
                            error
                        );
                        return Err(FetchError::RetriesExhausted {
                            attempts: backoff.attempts(),
                            last_error: error,
                        });
                    }
                },
                Err(error) => {
                    tracing::error!("fatal error for {}: {}", request.url(), error);
                    return Err(error.into());
                }
            }
        }
    }

    /// Fetches many requests concurrently as independent tasks
    ///
    /// Tasks share this client's rate limiter, so the combined request rate
    /// stays within the token budget. Results arrive over a channel in
    /// completion order and are returned re-matched to input order; no
    /// cross-request ordering is guaranteed during execution.
    pub async fn fetch_many(
        &self,
        requests: Vec<Request>,
        cancel: &CancelToken,
    ) -> Vec<Result<Response, FetchError>> {
        let total = requests.len();
        let (tx, mut rx) = tokio::sync::mpsc::channel(total.max(1));

        for (index, request) in requests.into_iter().enumerate() {
            let client = self.clone();
            let cancel = cancel.clone();
            let tx = tx.clone();

            tokio::spawn(async move {
                let result = client.fetch(&request, &cancel).await;
                // Receiver only closes if the caller was dropped
                let _ = tx.send((index, result)).await;
            });
        }
        drop(tx);

        let mut results: Vec<Option<Result<Response, FetchError>>> =
            (0..total).map(|_| None).collect();

        while let Some((index, result)) = rx.recv().await {
            results[index] = Some(result);
        }

        results
            .into_iter()
            .map(|slot| slot.unwrap_or(Err(FetchError::Cancelled)))
            .collect()
    }

    fn cache_lookup(&self, request: &Request) -> Option<Response> {
        if request.method() != Method::GET {
            return None;
        }

        let cache = self.cache.as_ref()?;
        let mut cache = cache.lock().ok()?;
        cache.get(request.url().as_str()).cloned()
    }

    fn cache_store(&self, request: &Request, response: &Response) {
        if request.method() != Method::GET {
            return;
        }

        if let Some(cache) = &self.cache {
            if let Ok(mut cache) = cache.lock() {
                cache.insert(request.url().to_string(), response.clone());
            }
        }
    }
}
