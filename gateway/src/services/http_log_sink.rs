//! HTTP client for the remote log sink
//!
//! Each record is posted as `multipart/form-data` with a `token` part and a
//! JSON `payload` part. A request is a single attempt bounded by the
//! client timeout.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use shared::LogRecord;

use crate::error::{GatewayError, GatewayResult};
use crate::traits::LogSink;

#[derive(Clone)]
pub struct HttpLogSink {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl HttpLogSink {
    /// Create a sink whose requests give up after `timeout`
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>, timeout: Duration) -> GatewayResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::config(format!("Failed to build log sink HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    fn build_form(&self, record: &LogRecord) -> GatewayResult<Form> {
        let payload = serde_json::to_string(record)?;
        let payload_part = Part::text(payload)
            .mime_str("application/json")
            .map_err(|e| GatewayError::log_sink(format!("Invalid payload part: {e}")))?;

        Ok(Form::new()
            .text("token", self.token.clone())
            .part("payload", payload_part))
    }
}

#[async_trait]
impl LogSink for HttpLogSink {
    async fn send(&self, record: &LogRecord) -> GatewayResult<()> {
        let form = self.build_form(record)?;

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| GatewayError::log_sink(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::log_sink(format!("HTTP {status}")));
        }

        Ok(())
    }
}
