//! Test helper utilities for gateway integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use gateway::GatewayConfig;
use gateway::config::LogSinkConfig;
use serde_json::{Value, json};

pub const TEST_LOG_TOKEN: &str = "integration-token";

/// Dashboard page shipped with the repository
pub fn static_page() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../static/index.html"))
}

/// Config pointed at mock upstream/log servers, polling every 50ms
pub fn create_test_config(sensor_url: String, log_endpoint: Option<String>) -> GatewayConfig {
    GatewayConfig {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        sensor_url,
        poll_interval: Duration::from_millis(50),
        fetch_timeout: Duration::from_millis(40),
        log_sink: log_endpoint.map(|endpoint| LogSinkConfig {
            endpoint,
            token: TEST_LOG_TOKEN.to_string(),
        }),
        log_interval: Duration::from_millis(5000),
        angle_threshold_deg: 1.0,
        require_source_timestamp: false,
        static_file: static_page(),
        max_pin: 53,
    }
    .validate()
    .unwrap()
}

/// Upstream body in the canonical (timestamped) shape
pub fn sensor_body(timestamp: u64, angle_x_deg: f64) -> Value {
    json!({
        "timestamp": timestamp,
        "distance_cm": 42.0,
        "raw_data": {
            "accel_x": 0.0, "accel_y": 0.0, "accel_z": 9.81,
            "gyro_x": 0.0, "gyro_y": 0.0, "gyro_z": 0.0
        },
        "fused_data": {"angle_x_deg": angle_x_deg, "angle_y_deg": 0.0}
    })
}

pub fn http_url(addr: SocketAddr, path: &str) -> String {
    format!("http://{addr}{path}")
}

pub fn ws_url(addr: SocketAddr) -> String {
    format!("ws://{addr}/ws")
}

/// Helper to wait for async conditions with timeout
pub async fn wait_for_condition<F, Fut>(mut condition: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    loop {
        if condition().await {
            return true;
        }

        if start.elapsed() > timeout {
            return false;
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
