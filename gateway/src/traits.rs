//! Service trait definitions for dependency injection
//!
//! Every external collaborator of the gateway core sits behind one of these
//! traits so the core can be exercised against mocks.

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use shared::{LogRecord, PinId, PinLevel, SensorReading};
use crate::error::GatewayResult;
use crate::types::ServerMessage;

/// Upstream sensor-fusion service
#[mockall::automock]
#[async_trait]
pub trait SensorSource: Send + Sync {
    /// Fetch the latest reading. Network errors, timeouts, non-2xx statuses
    /// and unparsable bodies all surface as `GatewayError::UpstreamFetch`.
    async fn fetch(&self) -> GatewayResult<SensorReading>;
}

/// Fan-out of readings to connected subscribers
#[mockall::automock]
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Register a subscriber; it only sees events published after this call
    async fn add_subscriber(&self, subscriber_id: Uuid, sender: mpsc::Sender<ServerMessage>) -> GatewayResult<()>;

    /// Remove a subscriber (no-op when unknown)
    async fn remove_subscriber(&self, subscriber_id: Uuid) -> GatewayResult<()>;

    /// Push a reading to every current subscriber, returning how many accepted it
    async fn publish(&self, reading: &SensorReading) -> GatewayResult<usize>;

    /// Send a message to one subscriber
    async fn send_to(&self, subscriber_id: Uuid, message: ServerMessage) -> GatewayResult<()>;

    /// Number of currently registered subscribers
    async fn subscriber_count(&self) -> usize;
}

/// Remote log sink
#[mockall::automock]
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Deliver one record. Single attempt; the caller never retries.
    async fn send(&self, record: &LogRecord) -> GatewayResult<()>;
}

/// Hardware (or simulated) digital output driver
#[mockall::automock]
pub trait PinDriver: Send + Sync {
    /// Open `pin` as an output line. Fails for identifiers the driver does
    /// not recognise or on hardware error.
    fn open_output(&self, pin: PinId) -> GatewayResult<Box<dyn OutputPin>>;
}

/// One opened output line
#[mockall::automock]
pub trait OutputPin: Send {
    fn write(&mut self, level: PinLevel) -> GatewayResult<()>;
}
