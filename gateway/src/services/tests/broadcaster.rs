//! Tests for the RealBroadcaster service

use super::fixtures::*;
use crate::services::RealBroadcaster;
use crate::traits::Broadcaster;
use crate::types::ServerMessage;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Register a subscriber and consume its connection ack
async fn subscribe(broadcaster: &RealBroadcaster, depth: usize) -> (Uuid, mpsc::Receiver<ServerMessage>) {
    let id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::channel(depth);
    broadcaster.add_subscriber(id, tx).await.unwrap();

    match rx.recv().await {
        Some(ServerMessage::ConnectionAck { session_id, .. }) => assert_eq!(session_id, id),
        other => panic!("expected connection ack, got {other:?}"),
    }
    (id, rx)
}

#[tokio::test]
async fn test_publish_with_no_subscribers() {
    let broadcaster = RealBroadcaster::new();
    let delivered = broadcaster.publish(&create_test_reading(Some(1))).await.unwrap();
    assert_eq!(delivered, 0);
    assert_eq!(broadcaster.subscriber_count().await, 0);
}

#[tokio::test]
async fn test_publish_reaches_every_subscriber_in_order() {
    let broadcaster = RealBroadcaster::new();
    let (_a, mut rx_a) = subscribe(&broadcaster, 16).await;
    let (_b, mut rx_b) = subscribe(&broadcaster, 16).await;

    for ts in 1..=3 {
        let delivered = broadcaster.publish(&create_test_reading(Some(ts))).await.unwrap();
        assert_eq!(delivered, 2);
    }

    for rx in [&mut rx_a, &mut rx_b] {
        for expected in 1..=3 {
            match rx.recv().await {
                Some(ServerMessage::SensorData(reading)) => assert_eq!(reading.source_timestamp, Some(expected)),
                other => panic!("expected sensor data, got {other:?}"),
            }
        }
    }
}

#[tokio::test]
async fn test_new_subscriber_gets_no_history() {
    let broadcaster = RealBroadcaster::new();
    broadcaster.publish(&create_test_reading(Some(1))).await.unwrap();

    let (_id, mut rx) = subscribe(&broadcaster, 16).await;
    broadcaster.publish(&create_test_reading(Some(2))).await.unwrap();

    match rx.recv().await {
        Some(ServerMessage::SensorData(reading)) => assert_eq!(reading.source_timestamp, Some(2)),
        other => panic!("expected sensor data, got {other:?}"),
    }
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_disconnected_subscriber_is_dropped() {
    let broadcaster = RealBroadcaster::new();
    let (_kept, mut kept_rx) = subscribe(&broadcaster, 16).await;
    let (_gone, gone_rx) = subscribe(&broadcaster, 16).await;
    assert_eq!(broadcaster.subscriber_count().await, 2);

    drop(gone_rx);
    let delivered = broadcaster.publish(&create_test_reading(Some(5))).await.unwrap();

    assert_eq!(delivered, 1);
    assert_eq!(broadcaster.subscriber_count().await, 1);
    assert!(matches!(kept_rx.recv().await, Some(ServerMessage::SensorData(_))));
}

#[tokio::test]
async fn test_full_queue_drops_event_but_keeps_subscriber() {
    let broadcaster = RealBroadcaster::new();
    let (_slow, mut slow_rx) = subscribe(&broadcaster, 1).await;

    assert_eq!(broadcaster.publish(&create_test_reading(Some(1))).await.unwrap(), 1);
    // Queue of one is now full
    assert_eq!(broadcaster.publish(&create_test_reading(Some(2))).await.unwrap(), 0);
    assert_eq!(broadcaster.subscriber_count().await, 1);

    match slow_rx.recv().await {
        Some(ServerMessage::SensorData(reading)) => assert_eq!(reading.source_timestamp, Some(1)),
        other => panic!("expected sensor data, got {other:?}"),
    }
    assert_eq!(broadcaster.publish(&create_test_reading(Some(3))).await.unwrap(), 1);
}

#[tokio::test]
async fn test_remove_subscriber() {
    let broadcaster = RealBroadcaster::new();
    let (id, _rx) = subscribe(&broadcaster, 16).await;

    broadcaster.remove_subscriber(id).await.unwrap();
    assert_eq!(broadcaster.subscriber_count().await, 0);

    // Removing again is a no-op
    assert!(broadcaster.remove_subscriber(id).await.is_ok());
}

#[tokio::test]
async fn test_send_to_unknown_subscriber_fails() {
    let broadcaster = RealBroadcaster::new();
    let result = broadcaster.send_to(Uuid::new_v4(), ServerMessage::Pong { server_time: 0 }).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_send_to_single_subscriber() {
    let broadcaster = RealBroadcaster::new();
    let (a, mut rx_a) = subscribe(&broadcaster, 16).await;
    let (_b, mut rx_b) = subscribe(&broadcaster, 16).await;

    broadcaster.send_to(a, ServerMessage::Pong { server_time: 42 }).await.unwrap();

    assert_eq!(rx_a.recv().await, Some(ServerMessage::Pong { server_time: 42 }));
    assert!(rx_b.try_recv().is_err());
}

#[tokio::test]
async fn test_concurrent_publish_and_churn() {
    let broadcaster = RealBroadcaster::new();
    let mut tasks = Vec::new();

    for i in 0..10u64 {
        let broadcaster = broadcaster.clone();
        tasks.push(tokio::spawn(async move {
            let id = Uuid::new_v4();
            let (tx, rx) = mpsc::channel(4);
            broadcaster.add_subscriber(id, tx).await.unwrap();
            broadcaster.publish(&create_test_reading(Some(i))).await.unwrap();
            drop(rx);
            broadcaster.remove_subscriber(id).await.unwrap();
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(broadcaster.subscriber_count().await, 0);
}
