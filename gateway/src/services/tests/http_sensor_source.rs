//! Tests for the HttpSensorSource service

use super::fixtures::*;
use crate::error::GatewayError;
use crate::services::HttpSensorSource;
use crate::traits::SensorSource;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn source_for(server: &MockServer, require_timestamp: bool) -> HttpSensorSource {
    HttpSensorSource::new(format!("{}/sensors", server.uri()), Duration::from_millis(200), require_timestamp).unwrap()
}

#[tokio::test]
async fn test_fetch_canonical_reading() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sensors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(canonical_sensor_body(1001)))
        .mount(&server)
        .await;

    let source = source_for(&server, false).await;
    let reading = source.fetch().await.unwrap();

    assert_eq!(reading, create_test_reading(Some(1001)));
}

#[tokio::test]
async fn test_fetch_legacy_reading() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sensors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(legacy_sensor_body()))
        .mount(&server)
        .await;

    let lenient = source_for(&server, false).await;
    assert_eq!(lenient.fetch().await.unwrap().source_timestamp, None);

    let strict = source_for(&server, true).await;
    assert!(matches!(strict.fetch().await, Err(GatewayError::UpstreamFetch { .. })));
}

#[tokio::test]
async fn test_non_success_status_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sensors"))
        .respond_with(ResponseTemplate::new(503).set_body_json(canonical_sensor_body(1)))
        .mount(&server)
        .await;

    let source = source_for(&server, false).await;
    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, GatewayError::UpstreamFetch { .. }));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_malformed_body_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sensors"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"distance_cm\": \"far\"}"))
        .mount(&server)
        .await;

    let source = source_for(&server, false).await;
    assert!(matches!(source.fetch().await, Err(GatewayError::UpstreamFetch { .. })));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sensors"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(canonical_sensor_body(1))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let source = source_for(&server, false).await;
    let started = std::time::Instant::now();
    assert!(matches!(source.fetch().await, Err(GatewayError::UpstreamFetch { .. })));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_unreachable_upstream_is_fetch_error() {
    // Port 9 (discard) is not expected to have an HTTP listener
    let source = HttpSensorSource::new("http://127.0.0.1:9/sensors", Duration::from_millis(200), false).unwrap();
    assert!(matches!(source.fetch().await, Err(GatewayError::UpstreamFetch { .. })));
}
