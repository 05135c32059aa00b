//! Cursor-following paginator
//!
//! Produces a lazy, finite sequence of pages for an initial request,
//! re-issuing the request with the server's continuation cursor until no
//! cursor comes back. Cursors are single-use and position-dependent, so a
//! paginator is not restartable: construct a new one to re-fetch.

use crate::client::cancel::CancelToken;
use crate::client::executor::Request;
use crate::client::fetch::FetchClient;
use crate::config::PaginationConfig;
use crate::parse::{Cursor, Record, ResponseParser};
use crate::FetchError;

/// One page of extracted records plus the continuation cursor, if any
#[derive(Debug, Clone)]
pub struct Page {
    /// Records extracted from this page, in response order
    pub records: Vec<Record>,

    /// Opaque continuation marker; absent on the final page
    pub cursor: Option<Cursor>,
}

/// Paginator progress
#[derive(Debug)]
enum PaginatorState {
    /// First request not yet issued
    Start,
    /// Last page carried a cursor for the next request
    HasCursor(Cursor),
    /// Final page delivered; nothing further
    Done,
    /// Unrecoverable failure surfaced; nothing further
    Failed,
}

/// Lazily walks the pages behind an initial request
pub struct Paginator<P> {
    client: FetchClient,
    parser: P,
    config: PaginationConfig,
    base_request: Request,
    cancel: CancelToken,
    state: PaginatorState,
}

impl<P: ResponseParser> Paginator<P> {
    /// Creates a paginator over the given initial request
    ///
    /// The per-page size (when configured) and the cursor are applied to the
    /// request as query parameters named by `config`.
    pub fn new(
        client: FetchClient,
        parser: P,
        config: PaginationConfig,
        base_request: Request,
        cancel: CancelToken,
    ) -> Self {
        Self {
            client,
            parser,
            config,
            base_request,
            cancel,
            state: PaginatorState::Start,
        }
    }

    /// Fetches and yields the next page
    ///
    /// # Returns
    ///
    /// * `Some(Ok(Page))` - The next page of records
    /// * `Some(Err(FetchError))` - Unrecoverable failure (retries already
    ///   exhausted inside the client); the paginator stops here rather than
    ///   silently truncating the sequence
    /// * `None` - The sequence ended (after the final page or an error)
    pub async fn next_page(&mut self) -> Option<Result<Page, FetchError>> {
        let request = match &self.state {
            PaginatorState::Start => self.page_request(None),
            PaginatorState::HasCursor(cursor) => self.page_request(Some(cursor.as_str())),
            PaginatorState::Done | PaginatorState::Failed => return None,
        };

        let response = match self.client.fetch(&request, &self.cancel).await {
            Ok(response) => response,
            Err(error) => {
                self.state = PaginatorState::Failed;
                return Some(Err(error));
            }
        };

        let records = match self.parser.parse(response.body()) {
            Ok(records) => records,
            Err(error) => {
                self.state = PaginatorState::Failed;
                return Some(Err(error.into()));
            }
        };

        let cursor = match self.parser.next_cursor(response.body()) {
            Ok(cursor) => cursor,
            Err(error) => {
                self.state = PaginatorState::Failed;
                return Some(Err(error.into()));
            }
        };

        tracing::debug!(
            "page with {} records, cursor: {}",
            records.len(),
            cursor.is_some()
        );

        self.state = match &cursor {
            Some(cursor) => PaginatorState::HasCursor(cursor.clone()),
            None => PaginatorState::Done,
        };

        Some(Ok(Page { records, cursor }))
    }

    /// Drains the paginator and concatenates all records
    ///
    /// Consumes the paginator. On any failure the partial accumulation is
    /// discarded and the error returned, so callers either see the full
    /// record set or none of it.
    pub async fn collect_records(mut self) -> Result<Vec<Record>, FetchError> {
        let mut records = Vec::new();

        while let Some(page) = self.next_page().await {
            records.extend(page?.records);
        }

        Ok(records)
    }

    /// Builds the request for one page from the base request
    fn page_request(&self, cursor: Option<&str>) -> Request {
        let mut request = self.base_request.clone();

        if let (Some(param), Some(size)) = (&self.config.page_size_param, self.config.page_size) {
            request = request.with_query_param(param, &size.to_string());
        }

        if let Some(cursor) = cursor {
            request = request.with_query_param(&self.config.cursor_param, cursor);
        }

        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::parse::JsonRecordParser;
    use url::Url;

    fn test_paginator(page_size: Option<u32>) -> Paginator<JsonRecordParser> {
        let mut config = Config::default();
        config.pagination.page_size = page_size;
        config.pagination.page_size_param = page_size.map(|_| "limit".to_string());

        let client = FetchClient::new(&config).unwrap();
        let parser = JsonRecordParser::from_config(&config.pagination);
        let request = Request::get(Url::parse("https://example.com/api").unwrap());

        Paginator::new(
            client,
            parser,
            config.pagination,
            request,
            CancelToken::new(),
        )
    }

    #[test]
    fn test_first_page_request_has_no_cursor() {
        let paginator = test_paginator(None);
        let request = paginator.page_request(None);
        assert!(request.url().query().is_none());
    }

    #[test]
    fn test_cursor_applied_as_query_param() {
        let paginator = test_paginator(None);
        let request = paginator.page_request(Some("abc123"));
        assert_eq!(request.url().query(), Some("cursor=abc123"));
    }

    #[test]
    fn test_page_size_applied_when_configured() {
        let paginator = test_paginator(Some(50));
        let request = paginator.page_request(Some("abc"));

        let query = request.url().query().unwrap();
        assert!(query.contains("limit=50"));
        assert!(query.contains("cursor=abc"));
    }

    #[test]
    fn test_successive_cursors_replace_not_accumulate() {
        let paginator = test_paginator(None);
        let first = paginator.page_request(Some("first"));
        // Simulate rebuilding from the same base with a later cursor
        let second = paginator.page_request(Some("second"));

        assert_eq!(first.url().query(), Some("cursor=first"));
        assert_eq!(second.url().query(), Some("cursor=second"));
    }
}
