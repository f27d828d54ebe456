// MetricsFetcher tests against a mock HTTP server

use std::time::Duration;

use chrono::NaiveDate;
use flowmetrics::fetcher::MetricsFetcher;
use flowmetrics::windows::hourly_windows;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn first_window() -> flowmetrics::models::TimeWindow {
    let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    hourly_windows(day, day, 1).unwrap().remove(0)
}

fn fetcher(server: &MockServer) -> MetricsFetcher {
    MetricsFetcher::new(format!("{}/api/v1/metrics/test", server.uri()), TIMEOUT).unwrap()
}

#[tokio::test]
async fn sends_utc_millis_params_and_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/metrics/test"))
        .and(query_param("fromDatetimeInclusive", "2023-12-31T23:00:00.000Z"))
        .and(query_param("toDatetimeExclusive", "2024-01-01T00:00:00.000Z"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let payload = fetcher(&server)
        .fetch_window(&first_window(), "test-token")
        .await
        .unwrap();
    assert!(payload.into_entries().is_empty());
}

#[tokio::test]
async fn array_payload_decodes_to_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"flowDetails": {"flowId": "F1"}, "metrics": []},
            {"flowDetails": {"flowId": "F2"}, "metrics": []}
        ])))
        .mount(&server)
        .await;

    let payload = fetcher(&server)
        .fetch_window(&first_window(), "tok")
        .await
        .unwrap();
    assert_eq!(payload.into_entries().len(), 2);
}

#[tokio::test]
async fn single_object_payload_decodes_to_one_entry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(
            {"flowDetails": {"flowId": "F1"}, "metrics": []}
        )))
        .mount(&server)
        .await;

    let payload = fetcher(&server)
        .fetch_window(&first_window(), "tok")
        .await
        .unwrap();
    assert_eq!(payload.into_entries().len(), 1);
}

#[tokio::test]
async fn server_error_is_a_fetch_error_carrying_the_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let window = first_window();
    let err = fetcher(&server)
        .fetch_window(&window, "tok")
        .await
        .unwrap_err();
    assert_eq!(err.local_timestamp, window.local_timestamp);
}

#[tokio::test]
async fn malformed_json_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = fetcher(&server).fetch_window(&first_window(), "tok").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn unreachable_endpoint_is_a_fetch_error() {
    let fetcher = MetricsFetcher::new("http://127.0.0.1:1/metrics", TIMEOUT).unwrap();
    let result = fetcher.fetch_window(&first_window(), "tok").await;
    assert!(result.is_err());
}
