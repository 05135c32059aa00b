//! Integration tests for cursor pagination
//!
//! A wiremock server plays a cursor-paginated API: each page carries its
//! records under "items" and the next cursor under "next_cursor".

use fetchling::client::{CancelToken, FetchClient, Page, Paginator, Request};
use fetchling::config::Config;
use fetchling::parse::{JsonRecordParser, Record, ResponseParser};
use fetchling::FetchError;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config() -> Config {
    let mut config = Config::default();
    config.retry.max_retries = 2;
    config.retry.initial_delay_ms = 10;
    config.rate_limit.capacity = 100;
    config.rate_limit.refill_rate = 1000.0;
    config
}

fn paginator_for(server: &MockServer, config: &Config) -> Paginator<JsonRecordParser> {
    let client = FetchClient::new(config).expect("Failed to build client");
    let parser = JsonRecordParser::from_config(&config.pagination);
    let url = Url::parse(&format!("{}/records", server.uri())).expect("Failed to build URL");

    Paginator::new(
        client,
        parser,
        config.pagination.clone(),
        Request::get(url),
        CancelToken::new(),
    )
}

/// Mounts a three-page record sequence: [1, 2] -> [3, 4] -> [5]
async fn mount_three_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/records"))
        .and(query_param("cursor", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [3, 4],
            "next_cursor": "page3",
        })))
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/records"))
        .and(query_param("cursor", "page3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [5],
            "next_cursor": null,
        })))
        .with_priority(1)
        .mount(server)
        .await;

    // First request carries no cursor parameter
    Mock::given(method("GET"))
        .and(path("/records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [1, 2],
            "next_cursor": "page2",
        })))
        .mount(server)
        .await;
}

fn json_records(values: &[i64]) -> Vec<Record> {
    values.iter().map(|v| Record::Json(json!(v))).collect()
}

#[tokio::test]
async fn test_pages_follow_cursors_in_order() {
    let mock_server = MockServer::start().await;
    mount_three_pages(&mock_server).await;

    let config = create_test_config();
    let mut paginator = paginator_for(&mock_server, &config);

    let first: Page = paginator.next_page().await.unwrap().unwrap();
    assert_eq!(first.records, json_records(&[1, 2]));
    assert!(first.cursor.is_some());

    let second = paginator.next_page().await.unwrap().unwrap();
    assert_eq!(second.records, json_records(&[3, 4]));
    assert!(second.cursor.is_some());

    let third = paginator.next_page().await.unwrap().unwrap();
    assert_eq!(third.records, json_records(&[5]));
    assert!(third.cursor.is_none());

    // Terminal: further calls yield nothing
    assert!(paginator.next_page().await.is_none());
    assert!(paginator.next_page().await.is_none());
}

#[tokio::test]
async fn test_collect_records_round_trip() {
    let mock_server = MockServer::start().await;
    mount_three_pages(&mock_server).await;

    let config = create_test_config();
    let records = paginator_for(&mock_server, &config)
        .collect_records()
        .await
        .expect("Pagination failed");

    // Concatenating all pages equals the full record set
    assert_eq!(records, json_records(&[1, 2, 3, 4, 5]));
}

#[tokio::test]
async fn test_single_page_without_cursor() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": ["only"],
        })))
        .mount(&mock_server)
        .await;

    let config = create_test_config();
    let mut paginator = paginator_for(&mock_server, &config);

    let page = paginator.next_page().await.unwrap().unwrap();
    assert_eq!(page.records.len(), 1);
    assert!(page.cursor.is_none());

    assert!(paginator.next_page().await.is_none());
}

#[tokio::test]
async fn test_error_mid_sequence_stops_iteration() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/records"))
        .and(query_param("cursor", "page2"))
        .respond_with(ResponseTemplate::new(404))
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [1],
            "next_cursor": "page2",
        })))
        .mount(&mock_server)
        .await;

    let config = create_test_config();
    let mut paginator = paginator_for(&mock_server, &config);

    assert!(paginator.next_page().await.unwrap().is_ok());

    // The failure is surfaced, not swallowed into a truncated sequence
    let error = paginator.next_page().await.unwrap();
    assert!(matches!(error, Err(FetchError::Network(_))));

    assert!(paginator.next_page().await.is_none());
}

#[tokio::test]
async fn test_collect_records_discards_partial_output_on_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/records"))
        .and(query_param("cursor", "page2"))
        .respond_with(ResponseTemplate::new(404))
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [1, 2],
            "next_cursor": "page2",
        })))
        .mount(&mock_server)
        .await;

    let config = create_test_config();
    let result = paginator_for(&mock_server, &config).collect_records().await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_malformed_page_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/records"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&mock_server)
        .await;

    let config = create_test_config();
    let mut paginator = paginator_for(&mock_server, &config);

    let error = paginator.next_page().await.unwrap();
    assert!(matches!(error, Err(FetchError::Parse(_))));

    // Retrying cannot fix a malformed body: exactly one request went out
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_page_size_sent_as_query_param() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/records"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [1, 2],
        })))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.pagination.page_size = Some(2);
    config.pagination.page_size_param = Some("limit".to_string());

    let records = paginator_for(&mock_server, &config)
        .collect_records()
        .await
        .expect("Pagination failed");

    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_transient_failures_inside_pagination_are_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/records"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [1],
        })))
        .mount(&mock_server)
        .await;

    let config = create_test_config();
    let records = paginator_for(&mock_server, &config)
        .collect_records()
        .await
        .expect("Pagination should retry through the 503");

    assert_eq!(records, json_records(&[1]));
}

#[tokio::test]
async fn test_parse_idempotence_on_fetched_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": 1}, {"id": 2}],
            "next_cursor": "x",
        })))
        .mount(&mock_server)
        .await;

    let config = create_test_config();
    let client = FetchClient::new(&config).expect("Failed to build client");
    let url = Url::parse(&format!("{}/records", mock_server.uri())).unwrap();

    let response = client
        .fetch(&Request::get(url), &CancelToken::new())
        .await
        .expect("Fetch failed");

    let parser = JsonRecordParser::from_config(&config.pagination);
    let first = parser.parse(response.body()).unwrap();
    let second = parser.parse(response.body()).unwrap();

    assert_eq!(first, second);
}
