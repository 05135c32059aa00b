//! HTTP request executor
//!
//! This module handles single HTTP exchanges for the fetch client, including:
//! - Building the shared HTTP client with proper user agent and timeouts
//! - Issuing one request and awaiting the response
//! - Classifying response statuses and transport failures into `NetworkError`
//!
//! Exactly one network call happens per `execute` invocation. Retries are the
//! retry loop's job, never the executor's.

use crate::config::ClientConfig;
use crate::NetworkError;
use reqwest::{Client, Method, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// A single outbound HTTP request
///
/// Immutable once issued: the executor only reads it, and the paginator
/// derives follow-up requests by cloning and rewriting the query string
/// rather than mutating an issued request.
#[derive(Debug, Clone)]
pub struct Request {
    url: Url,
    method: Method,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    body: Option<String>,
}

impl Request {
    /// Creates a GET request for the given URL
    pub fn get(url: Url) -> Self {
        Self {
            url,
            method: Method::GET,
            headers: Vec::new(),
            timeout: None,
            body: None,
        }
    }

    /// Creates a request with an explicit method
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            url,
            method,
            headers: Vec::new(),
            timeout: None,
            body: None,
        }
    }

    /// Adds a header (caller-supplied; no header names are fixed here)
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Overrides the client-level timeout for this request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the request body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns a copy with one query parameter set, replacing any existing
    /// pair with the same name
    pub fn with_query_param(&self, name: &str, value: &str) -> Self {
        let mut request = self.clone();
        let pairs: Vec<(String, String)> = request
            .url
            .query_pairs()
            .filter(|(k, _)| k != name)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        request.url.query_pairs_mut().clear().extend_pairs(pairs);
        request.url.query_pairs_mut().append_pair(name, value);
        request
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

/// A completed HTTP response
///
/// Owned exclusively by the caller that issued the request; created per call
/// and discarded after parsing.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: String,
    final_url: String,
}

impl Response {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Final URL after any redirects
    pub fn final_url(&self) -> &str {
        &self.final_url
    }
}

/// Builds the shared HTTP client
///
/// # Arguments
///
/// * `config` - Client behavior configuration (timeouts, user agent)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ClientConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues single HTTP requests and classifies their outcomes
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    client: Client,
}

impl RequestExecutor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Executes one request
    ///
    /// # Status Classification
    ///
    /// | Outcome | Result |
    /// |---------|--------|
    /// | 2xx | `Ok(Response)` |
    /// | 429 | `NetworkError::RateLimited` (with any `Retry-After` hint) |
    /// | 5xx | `NetworkError::ServerError` |
    /// | other 4xx | `NetworkError::ClientError` |
    /// | connect/read timeout | `NetworkError::Timeout` |
    /// | connection refused / TLS failure | `NetworkError::ConnectionFailed` |
    ///
    /// Redirects are followed by the underlying client (up to its hop limit);
    /// the classification above applies to the final response.
    pub async fn execute(&self, request: &Request) -> Result<Response, NetworkError> {
        let url = request.url().to_string();

        let mut builder = self
            .client
            .request(request.method().clone(), request.url().clone());

        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }

        if let Some(timeout) = request.timeout() {
            builder = builder.timeout(timeout);
        }

        if let Some(body) = request.body() {
            builder = builder.body(body.to_string());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return Err(classify_transport_error(&url, e)),
        };

        let status = response.status();
        let final_url = response.url().to_string();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);

            return Err(NetworkError::RateLimited { url, retry_after });
        }

        if status.is_server_error() {
            return Err(NetworkError::ServerError {
                url,
                status: status.as_u16(),
            });
        }

        if status.is_client_error() {
            return Err(NetworkError::ClientError {
                url,
                status: status.as_u16(),
            });
        }

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_ascii_lowercase(), value.to_string());
            }
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Err(classify_transport_error(&url, e)),
        };

        Ok(Response {
            status: status.as_u16(),
            headers,
            body,
            final_url,
        })
    }
}

/// Maps a reqwest transport failure onto the error taxonomy
fn classify_transport_error(url: &str, e: reqwest::Error) -> NetworkError {
    if e.is_timeout() {
        NetworkError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        NetworkError::ConnectionFailed {
            url: url.to_string(),
            message: e.to_string(),
        }
    } else {
        NetworkError::Http {
            url: url.to_string(),
            source: e,
        }
    }
}
