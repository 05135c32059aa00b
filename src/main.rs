//! Fetchling main entry point
//!
//! Command-line interface for the rate-limited fetch client. Exit codes:
//! 0 on success, 1 on fetch failure (including exhausted retries), 2 on
//! malformed input (bad URL, bad header, invalid configuration).

use clap::Parser;
use fetchling::client::{CancelToken, FetchClient, Paginator, Request};
use fetchling::config::{load_config, Config};
use fetchling::parse::ParserKind;
use fetchling::FetchError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Fetchling: a rate-limited async fetch client
///
/// Fetches a URL with token-bucket rate limiting and exponential retry for
/// transient failures (timeouts, connection errors, HTTP 429 and 5xx).
/// With --paginate it follows continuation cursors and emits every record.
#[derive(Parser, Debug)]
#[command(name = "fetchling")]
#[command(version)]
#[command(about = "A rate-limited async fetch client", long_about = None)]
struct Cli {
    /// URL to fetch
    #[arg(long)]
    url: String,

    /// Maximum number of retries for transient failures
    #[arg(long)]
    max_retries: Option<u32>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Follow continuation cursors and emit every record
    #[arg(long)]
    paginate: bool,

    /// Response parser to use: 'json' or 'html'
    #[arg(long, default_value = "json")]
    parser: ParserKind,

    /// Extra request header as 'Name: value' (repeatable)
    #[arg(long = "header", value_name = "NAME: VALUE")]
    headers: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    std::process::exit(run(cli).await);
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("fetchling=info,warn"),
            1 => EnvFilter::new("fetchling=debug,info"),
            2 => EnvFilter::new("fetchling=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the fetch and maps the outcome to an exit code
async fn run(cli: Cli) -> i32 {
    // Load and validate configuration
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config(path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return 2;
                }
            }
        }
        None => Config::default(),
    };

    // CLI flags override the config file
    if let Some(max_retries) = cli.max_retries {
        config.retry.max_retries = max_retries;
    }
    if let Some(timeout) = cli.timeout {
        if timeout == 0 {
            tracing::error!("--timeout must be > 0");
            return 2;
        }
        config.client.timeout_secs = timeout;
    }

    let url = match Url::parse(&cli.url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => url,
        Ok(url) => {
            tracing::error!("Unsupported URL scheme: {}", url.scheme());
            return 2;
        }
        Err(e) => {
            tracing::error!("Invalid URL '{}': {}", cli.url, e);
            return 2;
        }
    };

    let headers = match parse_headers(&cli.headers) {
        Ok(headers) => headers,
        Err(message) => {
            tracing::error!("{}", message);
            return 2;
        }
    };

    let client = match FetchClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to build HTTP client: {}", e);
            return 1;
        }
    };

    // Ctrl-C requests cooperative cancellation; it takes effect at the next
    // suspension point rather than mid-request
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, cancelling");
                cancel.cancel();
            }
        });
    }

    let mut request = Request::get(url.clone());
    for (name, value) in headers {
        request = request.with_header(name, value);
    }

    let result = if cli.paginate {
        handle_paginate(client, &config, cli.parser, &url, request, cancel).await
    } else {
        handle_fetch(&client, &request, &cancel).await
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("Fetch failed: {}", e);
            exit_code_for(&e)
        }
    }
}

/// Handles a single fetch: the response body goes to stdout
async fn handle_fetch(
    client: &FetchClient,
    request: &Request,
    cancel: &CancelToken,
) -> Result<(), FetchError> {
    let response = client.fetch(request, cancel).await?;

    tracing::info!(
        "{} {} ({} bytes)",
        response.status(),
        response.final_url(),
        response.body().len()
    );
    println!("{}", response.body());

    Ok(())
}

/// Handles --paginate: every extracted record goes to stdout as one JSON line
async fn handle_paginate(
    client: FetchClient,
    config: &Config,
    parser_kind: ParserKind,
    url: &Url,
    request: Request,
    cancel: CancelToken,
) -> Result<(), FetchError> {
    let parser = parser_kind.build(&config.pagination, url);
    let paginator = Paginator::new(client, parser, config.pagination.clone(), request, cancel);

    let records = paginator.collect_records().await?;
    tracing::info!("Collected {} records", records.len());

    for record in &records {
        match serde_json::to_string(record) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::warn!("Skipping unserializable record: {}", e),
        }
    }

    Ok(())
}

/// Parses repeated 'Name: value' header flags
fn parse_headers(raw: &[String]) -> Result<Vec<(String, String)>, String> {
    raw.iter()
        .map(|entry| {
            let (name, value) = entry
                .split_once(':')
                .ok_or_else(|| format!("Invalid header '{}', expected 'Name: value'", entry))?;

            let name = name.trim();
            if name.is_empty() {
                return Err(format!("Invalid header '{}': empty name", entry));
            }

            Ok((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Maps a fetch failure to the CLI exit code
fn exit_code_for(error: &FetchError) -> i32 {
    match error {
        FetchError::Config(_) | FetchError::UrlParse(_) => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fetchling::NetworkError;

    #[test]
    fn test_parse_headers() {
        let headers =
            parse_headers(&["Authorization: Bearer token".to_string(), "X-Id:42".to_string()])
                .unwrap();

        assert_eq!(headers[0], ("Authorization".to_string(), "Bearer token".to_string()));
        assert_eq!(headers[1], ("X-Id".to_string(), "42".to_string()));
    }

    #[test]
    fn test_parse_headers_rejects_missing_colon() {
        assert!(parse_headers(&["NoColonHere".to_string()]).is_err());
    }

    #[test]
    fn test_parse_headers_rejects_empty_name() {
        assert!(parse_headers(&[": value".to_string()]).is_err());
    }

    #[test]
    fn test_exhausted_retries_exit_code() {
        let error = FetchError::RetriesExhausted {
            attempts: 6,
            last_error: NetworkError::ServerError {
                url: "https://example.com/".to_string(),
                status: 500,
            },
        };
        assert_eq!(exit_code_for(&error), 1);
    }

    #[test]
    fn test_config_error_exit_code() {
        let error = FetchError::Config(fetchling::ConfigError::Validation("bad".to_string()));
        assert_eq!(exit_code_for(&error), 2);
    }
}
