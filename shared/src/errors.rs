//! Shared error types for the sensor gateway

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Deserialization failed: {message}")]
    DeserializationError { message: String },

    #[error("Sensor reading has no source timestamp")]
    MissingSourceTimestamp,

    #[error("Pin id out of range: {value}")]
    InvalidPinId { value: i64 },

    #[error("Invalid pin level: {value} (expected 0 or 1)")]
    InvalidPinLevel { value: i64 },
}

pub type SharedResult<T> = Result<T, SharedError>;
