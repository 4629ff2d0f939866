//! Sensor readings served by the upstream sensor-fusion service
//!
//! The canonical wire shape carries a `timestamp` stamped by the sensor
//! service. An older variant without it is still accepted but deprecated;
//! callers can refuse it with `require_timestamp`.

use serde::{Deserialize, Serialize};

use crate::errors::{SharedError, SharedResult};

/// Raw inertial measurements
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawMotion {
    pub accel_x: f64,
    pub accel_y: f64,
    pub accel_z: f64,
    pub gyro_x: f64,
    pub gyro_y: f64,
    pub gyro_z: f64,
}

/// Tilt angles produced by the fusion filter
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FusedAngles {
    pub angle_x_deg: f64,
    pub angle_y_deg: f64,
}

/// One snapshot of the sensor service state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(
        rename = "timestamp",
        alias = "source_timestamp",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_timestamp: Option<u64>,
    pub distance_cm: f64,
    pub raw_data: RawMotion,
    pub fused_data: FusedAngles,
}

/// Which protocol variant a reading arrived in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireVariant {
    Timestamped,
    /// Deprecated: no source timestamp
    Legacy,
}

impl SensorReading {
    /// Parse a response body from the sensor service
    pub fn from_json(body: &[u8], require_timestamp: bool) -> SharedResult<Self> {
        let reading: SensorReading = serde_json::from_slice(body).map_err(|e| SharedError::DeserializationError {
            message: e.to_string(),
        })?;

        if require_timestamp && reading.source_timestamp.is_none() {
            return Err(SharedError::MissingSourceTimestamp);
        }

        Ok(reading)
    }

    pub fn variant(&self) -> WireVariant {
        match self.source_timestamp {
            Some(_) => WireVariant::Timestamped,
            None => WireVariant::Legacy,
        }
    }

    pub fn angle_x_deg(&self) -> f64 {
        self.fused_data.angle_x_deg
    }

    pub fn angle_y_deg(&self) -> f64 {
        self.fused_data.angle_y_deg
    }
}
