//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::SharedError;

/// Gateway component emitting a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Gateway,
    Poller,
    LogGate,
    PinCache,
    Broadcaster,
    Control,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Gateway => write!(f, "gateway"),
            Component::Poller => write!(f, "poller"),
            Component::LogGate => write!(f, "log_gate"),
            Component::PinCache => write!(f, "pin_cache"),
            Component::Broadcaster => write!(f, "broadcaster"),
            Component::Control => write!(f, "control"),
        }
    }
}

/// Logical actuator line identifier (0-255). The numbering scheme belongs to
/// the pin driver; BCM numbering on a Raspberry Pi, for example.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinId(pub u8);

impl PinId {
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for PinId {
    type Error = SharedError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map(PinId)
            .map_err(|_| SharedError::InvalidPinId { value })
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Digital output level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinLevel {
    Low,
    High,
}

impl PinLevel {
    pub fn as_u8(self) -> u8 {
        match self {
            PinLevel::Low => 0,
            PinLevel::High => 1,
        }
    }
}

impl TryFrom<i64> for PinLevel {
    type Error = SharedError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PinLevel::Low),
            1 => Ok(PinLevel::High),
            _ => Err(SharedError::InvalidPinLevel { value }),
        }
    }
}

impl fmt::Display for PinLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl Serialize for PinLevel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for PinLevel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        PinLevel::try_from(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_display() {
        assert_eq!(Component::Poller.to_string(), "poller");
        assert_eq!(Component::LogGate.to_string(), "log_gate");
        assert_eq!(Component::PinCache.to_string(), "pin_cache");
    }

    #[test]
    fn test_pin_id_range() {
        assert_eq!(PinId::try_from(0).unwrap(), PinId(0));
        assert_eq!(PinId::try_from(255).unwrap(), PinId(255));
        assert!(matches!(PinId::try_from(256), Err(SharedError::InvalidPinId { value: 256 })));
        assert!(matches!(PinId::try_from(-1), Err(SharedError::InvalidPinId { value: -1 })));
    }

    #[test]
    fn test_pin_level_accepts_only_zero_and_one() {
        assert_eq!(PinLevel::try_from(0).unwrap(), PinLevel::Low);
        assert_eq!(PinLevel::try_from(1).unwrap(), PinLevel::High);
        assert!(PinLevel::try_from(2).is_err());
        assert!(PinLevel::try_from(-1).is_err());

        assert!(serde_json::from_str::<PinLevel>("1").is_ok());
        assert!(serde_json::from_str::<PinLevel>("7").is_err());
        assert_eq!(serde_json::to_string(&PinLevel::High).unwrap(), "1");
    }
}
