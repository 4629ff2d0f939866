//! Service implementations
//!
//! Real implementations of the collaborator traits for production use

pub mod broadcaster;
pub mod http_log_sink;
pub mod http_sensor_source;
pub mod simulated_pins;

#[cfg(test)]
mod tests;

pub use broadcaster::RealBroadcaster;
pub use http_log_sink::HttpLogSink;
pub use http_sensor_source::HttpSensorSource;
pub use simulated_pins::SimulatedPinDriver;
