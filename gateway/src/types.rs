//! Type definitions for the subscriber protocol
//!
//! Messages between browser clients and the gateway, framed as
//! `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};
use shared::SensorReading;
use uuid::Uuid;

/// Messages pushed from the gateway to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    ConnectionAck { session_id: Uuid, server_time: u64 },
    SensorData(SensorReading),
    Pong { server_time: u64 },
}

/// Messages sent by subscribers to the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientRequest {
    GpioWrite(ControlRequest),
    Ping,
}

/// Unvalidated pin write request as it arrives on the wire
///
/// Fields are kept as plain integers so out-of-range values reach
/// validation instead of failing inside serde with a less useful message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRequest {
    pub pin: i64,
    pub value: i64,
}
