//! Fixed-period sensor polling
//!
//! Each tick fetches one reading from the upstream service. A successful
//! reading becomes the last known reading, is published to subscribers and
//! is then offered to the log gate, in that order, before the tick returns.
//! A failed fetch contributes nothing and the next tick tries again.
//!
//! Ticks never overlap: the loop awaits each tick before waiting for the
//! next one, and a tick that overruns the period delays the schedule
//! instead of bunching up missed ticks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use shared::{Component, SensorReading, WireVariant, component_debug, component_info, component_warn};
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval, timeout};

use crate::error::GatewayError;
use crate::state::GatewayState;
use crate::traits::{Broadcaster, SensorSource};

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Published { delivered: usize, logged: bool },
    Skipped,
}

pub struct SensorPoller<S, B>
where
    S: SensorSource,
    B: Broadcaster,
{
    source: S,
    broadcaster: Arc<B>,
    state: Arc<GatewayState>,
    period: Duration,
    fetch_timeout: Duration,
    legacy_warned: AtomicBool,
}

impl<S, B> SensorPoller<S, B>
where
    S: SensorSource,
    B: Broadcaster,
{
    pub fn new(
        source: S,
        broadcaster: Arc<B>,
        state: Arc<GatewayState>,
        period: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            source,
            broadcaster,
            state,
            period,
            fetch_timeout,
            legacy_warned: AtomicBool::new(false),
        }
    }

    /// Run a single poll cycle
    pub async fn tick(&self) -> TickOutcome {
        let fetched = match timeout(self.fetch_timeout, self.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::upstream(format!(
                "no response within {}ms",
                self.fetch_timeout.as_millis()
            ))),
        };

        let reading = match fetched {
            Ok(reading) => reading,
            Err(e) => {
                // Expected during upstream outages; keep it out of the default log level
                component_debug!(Component::Poller, "Skipping tick: {}", e);
                self.state.record_skipped();
                return TickOutcome::Skipped;
            }
        };

        self.warn_if_legacy(&reading);

        self.state.set_last_reading(reading.clone()).await;

        let delivered = match self.broadcaster.publish(&reading).await {
            Ok(count) => count,
            Err(e) => {
                component_warn!(Component::Poller, "Publish failed: {}", e);
                0
            }
        };

        let logged = match &self.state.log_gate {
            Some(gate) => gate.evaluate(&reading).await,
            None => false,
        };

        self.state.record_published();
        TickOutcome::Published { delivered, logged }
    }

    /// Warn about the deprecated timestamp-less format, once per poller.
    /// Returns whether this call emitted the warning.
    fn warn_if_legacy(&self, reading: &SensorReading) -> bool {
        if reading.variant() != WireVariant::Legacy || self.legacy_warned.swap(true, Ordering::Relaxed) {
            return false;
        }

        component_warn!(
            Component::Poller,
            "⚠️ Sensor service is sending readings without a timestamp; this format is deprecated"
        );
        true
    }

    /// Tick every period until `shutdown` flips to true or its sender drops
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        component_info!(
            Component::Poller,
            "📡 Polling sensor service every {}ms (fetch timeout {}ms)",
            self.period.as_millis(),
            self.fetch_timeout.as_millis()
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        component_info!(Component::Poller, "Polling stopped");
    }
}
