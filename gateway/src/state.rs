//! Gateway state
//!
//! The single context object shared by the poller, the control path and the
//! HTTP handlers. Each piece of mutable state carries its own lock.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::SensorReading;
use tokio::sync::RwLock;

use crate::core::{LogGate, PinCache};

/// Last successfully fetched reading and when it arrived
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestReading {
    pub reading: SensorReading,
    pub received_at: DateTime<Utc>,
}

/// Poll loop counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickStats {
    pub published: u64,
    pub skipped: u64,
}

/// Core gateway state
pub struct GatewayState {
    pub pin_cache: PinCache,
    pub log_gate: Option<LogGate>,

    last_reading: RwLock<Option<LatestReading>>,
    ticks_published: AtomicU64,
    ticks_skipped: AtomicU64,

    is_running: AtomicBool,
    start_time: Instant,
}

impl GatewayState {
    pub fn new(pin_cache: PinCache, log_gate: Option<LogGate>) -> Self {
        Self {
            pin_cache,
            log_gate,
            last_reading: RwLock::new(None),
            ticks_published: AtomicU64::new(0),
            ticks_skipped: AtomicU64::new(0),
            is_running: AtomicBool::new(true),
            start_time: Instant::now(),
        }
    }

    /// Replace the last known reading
    pub async fn set_last_reading(&self, reading: SensorReading) {
        let mut last = self.last_reading.write().await;
        *last = Some(LatestReading {
            reading,
            received_at: Utc::now(),
        });
    }

    pub async fn last_reading(&self) -> Option<LatestReading> {
        self.last_reading.read().await.clone()
    }

    pub fn record_published(&self) {
        self.ticks_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.ticks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn tick_stats(&self) -> TickStats {
        TickStats {
            published: self.ticks_published.load(Ordering::Relaxed),
            skipped: self.ticks_skipped.load(Ordering::Relaxed),
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    pub fn set_running(&self, running: bool) {
        self.is_running.store(running, Ordering::Relaxed);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
