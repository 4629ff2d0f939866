//! HTTP client for the upstream sensor-fusion service

use std::time::Duration;

use async_trait::async_trait;
use shared::SensorReading;

use crate::error::{GatewayError, GatewayResult};
use crate::traits::SensorSource;

/// Fetches readings with `GET <url>`
#[derive(Clone)]
pub struct HttpSensorSource {
    client: reqwest::Client,
    url: String,
    require_timestamp: bool,
}

impl HttpSensorSource {
    /// Create a source whose requests give up after `timeout`
    pub fn new(url: impl Into<String>, timeout: Duration, require_timestamp: bool) -> GatewayResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::config(format!("Failed to build sensor HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            require_timestamp,
        })
    }
}

#[async_trait]
impl SensorSource for HttpSensorSource {
    async fn fetch(&self) -> GatewayResult<SensorReading> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| GatewayError::upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::upstream(format!("HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::upstream(format!("Failed to read body: {e}")))?;

        SensorReading::from_json(&body, self.require_timestamp)
            .map_err(|e| GatewayError::upstream(format!("Invalid reading: {e}")))
    }
}
