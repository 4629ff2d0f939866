//! Service tests for the gateway
//!
//! This module contains tests for all real service implementations.

pub mod broadcaster;
pub mod http_sensor_source;
