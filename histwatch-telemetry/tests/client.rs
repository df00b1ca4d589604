//! Integration tests for TelemetryClient.
//!
//! Uses wiremock for HTTP mocking. Covers the three endpoints, status
//! mapping, malformed payloads and the uniform retry policy.

use std::time::Duration;

use histwatch_telemetry::{TelemetryClient, TelemetryError, TelemetryService};
use histwatch_types::{HistogramKind, MetricName, VersionId};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, max_retries: u32) -> TelemetryClient {
    TelemetryClient::builder()
        .endpoint(server.uri())
        .max_retries(max_retries)
        .retry_backoff(Duration::from_millis(1))
        .timeout(Duration::from_secs(5))
        .build()
        .expect("failed to build client")
}

fn version(s: &str) -> VersionId {
    VersionId::parse(s).unwrap()
}

#[tokio::test]
async fn test_versions_skips_malformed_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/versions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!(["nightly/40", "bogus", "aurora/39"])),
        )
        .mount(&server)
        .await;

    let versions = client_for(&server, 0).versions().await.unwrap();
    assert_eq!(versions, vec![version("nightly/40"), version("aurora/39")]);
}

#[tokio::test]
async fn test_filter_options_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/filters/"))
        .and(query_param("channel", "nightly"))
        .and(query_param("version", "41"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metric": ["GC_MS", "CYCLE_COLLECTOR"],
            "os": ["Linux", "Windows_NT"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options = client_for(&server, 0)
        .filter_options(&version("nightly/41"))
        .await
        .unwrap();
    assert_eq!(options.metrics(), ["GC_MS", "CYCLE_COLLECTOR"]);
}

#[tokio::test]
async fn test_evolution_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/evolution/nightly/41/GC_MS"))
        .and(query_param("aggregated", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "measure": "GC_MS",
            "kind": "exponential",
            "buckets": [0, 1, 2, 5],
            "data": [
                {"date": "2015-06-01", "submissions": 3, "count": 100, "histogram": [10, 40, 30, 20]},
                {"date": "2015-06-02", "submissions": 4, "count": 100, "histogram": [20, 30, 30, 20]}
            ]
        })))
        .mount(&server)
        .await;

    let metric = MetricName::new("GC_MS").unwrap();
    let evolution = client_for(&server, 0)
        .evolution(&version("nightly/41"), &metric)
        .await
        .unwrap();

    assert_eq!(evolution.kind, Some(HistogramKind::Exponential));
    assert_eq!(evolution.leaf_sample_count(), 2);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/evolution/nightly/41/MISSING"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let metric = MetricName::new("MISSING").unwrap();
    let err = client_for(&server, 3)
        .evolution(&version("nightly/41"), &metric)
        .await
        .unwrap_err();

    assert!(matches!(err, TelemetryError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_server_errors_are_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/versions"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/versions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["nightly/42"])))
        .expect(1)
        .mount(&server)
        .await;

    let versions = client_for(&server, 5).versions().await.unwrap();
    assert_eq!(versions, vec![version("nightly/42")]);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/versions"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let err = client_for(&server, 2).versions().await.unwrap_err();
    assert!(matches!(err, TelemetryError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/versions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server, 5).versions().await.unwrap_err();
    assert!(matches!(err, TelemetryError::Parse { .. }));
}
