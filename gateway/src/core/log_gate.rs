//! Remote-log throttling
//!
//! Decides, reading by reading, whether a sample is worth sending to the
//! remote log sink. A reading is dispatched when its source timestamp is new
//! (or absent) and either the log interval has passed or one of the fused
//! angles moved by more than the threshold.
//!
//! Throttle state advances before the sink call is made, and the call runs
//! on its own task, so a slow or failing sink can neither delay the poll
//! loop nor cause repeat dispatches. A sink call that has not finished
//! within one log interval is abandoned and counted as a failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use shared::{Component, LogRecord, SensorReading, component_debug, component_warn};
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::config::GatewayConfig;
use crate::traits::LogSink;

/// Thresholds for the dispatch decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogPolicy {
    pub interval: Duration,
    pub angle_threshold_deg: f64,
}

impl LogPolicy {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            interval: config.log_interval,
            angle_threshold_deg: config.angle_threshold_deg,
        }
    }
}

impl Default for LogPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(crate::config::DEFAULT_LOG_INTERVAL_MS),
            angle_threshold_deg: crate::config::DEFAULT_ANGLE_THRESHOLD_DEG,
        }
    }
}

/// What the gate remembers about the last dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct LogThrottleState {
    /// `None` until the first dispatch
    pub last_log_at: Option<Instant>,
    pub last_angle_x_deg: f64,
    pub last_angle_y_deg: f64,
    /// Source timestamp of the last dispatched reading; `None` means never
    pub last_source_timestamp: Option<u64>,
}

impl Default for LogThrottleState {
    fn default() -> Self {
        Self {
            last_log_at: None,
            last_angle_x_deg: 0.0,
            last_angle_y_deg: 0.0,
            last_source_timestamp: None,
        }
    }
}

/// Individual terms of a dispatch decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogDecision {
    pub data_updated: bool,
    pub time_elapsed: bool,
    pub significant_change: bool,
}

impl LogDecision {
    pub fn should_dispatch(&self) -> bool {
        self.data_updated && (self.time_elapsed || self.significant_change)
    }
}

impl LogThrottleState {
    /// Evaluate `reading` against this state at time `now`
    pub fn decide(&self, reading: &SensorReading, now: Instant, policy: &LogPolicy) -> LogDecision {
        let data_updated = match reading.source_timestamp {
            None => true,
            Some(ts) => self.last_source_timestamp != Some(ts),
        };

        let time_elapsed = match self.last_log_at {
            None => true,
            Some(last) => now.saturating_duration_since(last) > policy.interval,
        };

        let significant_change = (reading.angle_x_deg() - self.last_angle_x_deg).abs() > policy.angle_threshold_deg
            || (reading.angle_y_deg() - self.last_angle_y_deg).abs() > policy.angle_threshold_deg;

        LogDecision {
            data_updated,
            time_elapsed,
            significant_change,
        }
    }

    /// Advance the state for a dispatched reading
    pub fn record(&mut self, reading: &SensorReading, now: Instant) {
        self.last_log_at = Some(now);
        self.last_angle_x_deg = reading.angle_x_deg();
        self.last_angle_y_deg = reading.angle_y_deg();
        if let Some(ts) = reading.source_timestamp {
            self.last_source_timestamp = Some(ts);
        }
    }
}

/// Dispatch counters exposed on the status endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct LogGateStats {
    pub dispatched: u64,
    pub sink_failures: u64,
}

/// Throttled, fire-and-forget forwarder to the remote log sink
pub struct LogGate {
    policy: LogPolicy,
    throttle: Mutex<LogThrottleState>,
    sink: Arc<dyn LogSink>,
    dispatched: AtomicU64,
    sink_failures: Arc<AtomicU64>,
}

impl LogGate {
    pub fn new(policy: LogPolicy, sink: Arc<dyn LogSink>) -> Self {
        Self::with_state(policy, sink, LogThrottleState::default())
    }

    /// Create a gate starting from a known throttle state
    pub fn with_state(policy: LogPolicy, sink: Arc<dyn LogSink>, state: LogThrottleState) -> Self {
        Self {
            policy,
            throttle: Mutex::new(state),
            sink,
            dispatched: AtomicU64::new(0),
            sink_failures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Evaluate a fresh reading now. Returns whether a dispatch was started.
    pub async fn evaluate(&self, reading: &SensorReading) -> bool {
        self.evaluate_at(reading, Instant::now()).await
    }

    /// Evaluate a reading as of `now`
    pub async fn evaluate_at(&self, reading: &SensorReading, now: Instant) -> bool {
        // Decide and advance under one lock so concurrent evaluations cannot
        // both see the same reading as new.
        let decision = {
            let mut throttle = self.throttle.lock().await;
            let decision = throttle.decide(reading, now, &self.policy);
            if decision.should_dispatch() {
                throttle.record(reading, now);
            }
            decision
        };

        if !decision.should_dispatch() {
            return false;
        }

        component_debug!(
            Component::LogGate,
            "Dispatching reading (timestamp {:?}, elapsed={}, changed={})",
            reading.source_timestamp,
            decision.time_elapsed,
            decision.significant_change
        );

        self.dispatched.fetch_add(1, Ordering::Relaxed);
        self.dispatch(LogRecord::new(reading.clone()));
        true
    }

    fn dispatch(&self, record: LogRecord) {
        let sink = self.sink.clone();
        let failures = self.sink_failures.clone();
        let deadline = self.policy.interval;

        tokio::spawn(async move {
            match timeout(deadline, sink.send(&record)).await {
                Ok(Ok(())) => {
                    component_debug!(Component::LogGate, "📝 Log record delivered");
                }
                Ok(Err(e)) => {
                    failures.fetch_add(1, Ordering::Relaxed);
                    component_warn!(Component::LogGate, "Log sink dispatch failed (not retried): {}", e);
                }
                Err(_) => {
                    failures.fetch_add(1, Ordering::Relaxed);
                    component_warn!(
                        Component::LogGate,
                        "Log sink gave no answer within {}ms; record dropped",
                        deadline.as_millis()
                    );
                }
            }
        });
    }

    /// Copy of the current throttle state
    pub async fn snapshot(&self) -> LogThrottleState {
        self.throttle.lock().await.clone()
    }

    pub fn stats(&self) -> LogGateStats {
        LogGateStats {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
        }
    }
}
