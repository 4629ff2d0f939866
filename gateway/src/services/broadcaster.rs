//! Subscriber fan-out
//!
//! Each subscriber owns a bounded queue drained by its WebSocket task.
//! Publishing never waits on a subscriber: a full queue drops that event for
//! that subscriber, a closed queue removes the subscriber.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use shared::{Component, SensorReading, component_debug, component_info, component_warn};

use crate::error::{GatewayError, GatewayResult};
use crate::traits::Broadcaster;
use crate::types::ServerMessage;

/// Outgoing queue depth per subscriber
pub const SUBSCRIBER_QUEUE_DEPTH: usize = 100;

/// Real broadcaster backed by per-subscriber channels
#[derive(Clone, Default)]
pub struct RealBroadcaster {
    subscribers: Arc<RwLock<HashMap<Uuid, mpsc::Sender<ServerMessage>>>>,
}

impl RealBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    async fn drop_subscribers(&self, subscriber_ids: Vec<Uuid>) {
        if subscriber_ids.is_empty() {
            return;
        }

        let mut subscribers = self.subscribers.write().await;
        for subscriber_id in subscriber_ids {
            if subscribers.remove(&subscriber_id).is_some() {
                component_info!(Component::Broadcaster, "🗑️ Dropped disconnected subscriber {}", subscriber_id);
            }
        }
    }
}

#[async_trait]
impl Broadcaster for RealBroadcaster {
    async fn add_subscriber(&self, subscriber_id: Uuid, sender: mpsc::Sender<ServerMessage>) -> GatewayResult<()> {
        // Ack goes out before registration so it always precedes the first reading
        let ack = ServerMessage::ConnectionAck {
            session_id: subscriber_id,
            server_time: Utc::now().timestamp() as u64,
        };
        sender
            .try_send(ack)
            .map_err(|e| GatewayError::websocket(format!("Failed to acknowledge {subscriber_id}: {e}")))?;

        self.subscribers.write().await.insert(subscriber_id, sender);

        component_info!(Component::Broadcaster, "👋 Added subscriber {}", subscriber_id);
        Ok(())
    }

    async fn remove_subscriber(&self, subscriber_id: Uuid) -> GatewayResult<()> {
        let mut subscribers = self.subscribers.write().await;
        if subscribers.remove(&subscriber_id).is_some() {
            component_info!(Component::Broadcaster, "👋 Removed subscriber {}", subscriber_id);
        }
        Ok(())
    }

    async fn publish(&self, reading: &SensorReading) -> GatewayResult<usize> {
        // Snapshot the senders so the lock is not held while sending
        let senders = {
            let subscribers = self.subscribers.read().await;
            subscribers
                .iter()
                .map(|(subscriber_id, sender)| (*subscriber_id, sender.clone()))
                .collect::<Vec<_>>()
        };

        if senders.is_empty() {
            return Ok(0);
        }

        let message = ServerMessage::SensorData(reading.clone());
        let mut closed = Vec::new();
        let mut delivered = 0;

        for (subscriber_id, sender) in senders {
            match sender.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    component_warn!(
                        Component::Broadcaster,
                        "Subscriber {} queue full, dropping reading",
                        subscriber_id
                    );
                }
                Err(TrySendError::Closed(_)) => closed.push(subscriber_id),
            }
        }

        self.drop_subscribers(closed).await;

        component_debug!(Component::Broadcaster, "📡 Reading delivered to {} subscriber(s)", delivered);
        Ok(delivered)
    }

    async fn send_to(&self, subscriber_id: Uuid, message: ServerMessage) -> GatewayResult<()> {
        let sender = {
            let subscribers = self.subscribers.read().await;
            subscribers.get(&subscriber_id).cloned()
        };

        let Some(sender) = sender else {
            return Err(GatewayError::websocket(format!("Subscriber {subscriber_id} not found")));
        };

        match sender.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(GatewayError::websocket("Subscriber queue full")),
            Err(TrySendError::Closed(_)) => {
                self.drop_subscribers(vec![subscriber_id]).await;
                Err(GatewayError::websocket("Subscriber disconnected"))
            }
        }
    }

    async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}
