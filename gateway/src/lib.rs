//! Sensor gateway library
//!
//! Bridges a local sensor-fusion service to WebSocket subscribers and an
//! optional remote log sink, and exposes digital output pins for control.

pub mod config;
pub mod core;
pub mod error;
pub mod gateway_impl;
pub mod services;
pub mod state;
pub mod traits;
pub mod types;
pub mod web;

// Re-export main types
pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use gateway_impl::{Gateway, ShutdownHandle};
pub use state::GatewayState;
pub use types::*;

// Re-export trait definitions
pub use traits::{Broadcaster, LogSink, OutputPin, PinDriver, SensorSource};

// Re-export service implementations
pub use services::{HttpLogSink, HttpSensorSource, RealBroadcaster, SimulatedPinDriver};
