//! Shared types for the sensor gateway
//!
//! Contains the wire types exchanged with the upstream sensor service and the
//! remote log sink, plus the value types and logging helpers every gateway
//! component uses.

pub mod errors;
pub mod logging;
pub mod messages;
pub mod types;

pub use errors::*;
pub use types::*;

pub use messages::{FusedAngles, LogRecord, RawMotion, SensorReading, WireVariant};
