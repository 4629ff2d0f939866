//! Message types exchanged with the gateway's external collaborators
//!
//! - `sensor`: readings served by the upstream sensor-fusion service
//! - `log_record`: payload posted to the remote log sink

pub mod log_record;
pub mod sensor;

pub use log_record::LogRecord;
pub use sensor::{FusedAngles, RawMotion, SensorReading, WireVariant};
