//! Payload posted to the remote log sink

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sensor::SensorReading;

/// A reading selected for remote logging, stamped with the dispatch time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(flatten)]
    pub reading: SensorReading,
    pub logged_at: DateTime<Utc>,
}

impl LogRecord {
    pub fn new(reading: SensorReading) -> Self {
        Self::at(reading, Utc::now())
    }

    pub fn at(reading: SensorReading, logged_at: DateTime<Utc>) -> Self {
        Self { reading, logged_at }
    }
}
