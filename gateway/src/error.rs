//! Gateway error types
//!
//! The first four variants are the runtime failure kinds the core handles.
//! Each is terminal where it is detected: nothing here is allowed to unwind
//! into the poll loop or the connection accept loop.

use thiserror::Error;
use shared::{PinId, SharedError};

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Upstream sensor fetch failed: {message}")]
    UpstreamFetch { message: String },

    #[error("Actuator error on pin {pin}: {message}")]
    Actuator { pin: PinId, message: String },

    #[error("Log sink dispatch failed: {message}")]
    LogSink { message: String },

    #[error("Malformed control request: {details}")]
    MalformedControlRequest { details: String },

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Server startup error: {0}")]
    ServerStartup(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GatewayError {
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::UpstreamFetch { message: message.into() }
    }

    pub fn actuator(pin: PinId, message: impl Into<String>) -> Self {
        Self::Actuator { pin, message: message.into() }
    }

    pub fn log_sink(message: impl Into<String>) -> Self {
        Self::LogSink { message: message.into() }
    }

    pub fn malformed(details: impl Into<String>) -> Self {
        Self::MalformedControlRequest { details: details.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn websocket(message: impl Into<String>) -> Self {
        Self::WebSocket(message.into())
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
