//! Lazily populated table of opened output lines
//!
//! At most one handle exists per pin id for the life of the process. A
//! failed open is not remembered, so the next request for that id retries.
//! A failed write leaves the handle in place. Handles are only released at
//! teardown through [`PinCache::release_all`]; after that the cache refuses
//! to open lines again.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use shared::{Component, PinId, PinLevel, component_info, component_warn};
use tokio::sync::Mutex;

use crate::error::{GatewayError, GatewayResult};
use crate::traits::{OutputPin, PinDriver};

/// One opened output line owned by the cache
pub struct PinHandle {
    pin: PinId,
    line: StdMutex<Box<dyn OutputPin>>,
}

impl PinHandle {
    fn new(pin: PinId, line: Box<dyn OutputPin>) -> Self {
        Self {
            pin,
            line: StdMutex::new(line),
        }
    }

    pub fn pin(&self) -> PinId {
        self.pin
    }

    fn write(&self, level: PinLevel) -> GatewayResult<()> {
        let mut line = self
            .line
            .lock()
            .map_err(|_| GatewayError::actuator(self.pin, "output line lock poisoned"))?;
        line.write(level)
    }
}

impl std::fmt::Debug for PinHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinHandle").field("pin", &self.pin).finish_non_exhaustive()
    }
}

/// Get-or-create cache of pin handles keyed by pin id
pub struct PinCache {
    driver: Arc<dyn PinDriver>,
    handles: Mutex<HashMap<PinId, Arc<PinHandle>>>,
    /// Set by `release_all`, only while the handle lock is held
    released: AtomicBool,
}

impl PinCache {
    pub fn new(driver: Arc<dyn PinDriver>) -> Self {
        Self {
            driver,
            handles: Mutex::new(HashMap::new()),
            released: AtomicBool::new(false),
        }
    }

    /// Return the cached handle for `pin`, opening the line on first use
    pub async fn get_or_create(&self, pin: PinId) -> GatewayResult<Arc<PinHandle>> {
        // The lock is held across the open so two concurrent requests for the
        // same id cannot both reach the driver.
        let mut handles = self.handles.lock().await;

        if let Some(handle) = handles.get(&pin) {
            return Ok(handle.clone());
        }

        if self.released.load(Ordering::Acquire) {
            return Err(GatewayError::actuator(pin, "pin cache already released for shutdown"));
        }

        let line = self.driver.open_output(pin)?;
        let handle = Arc::new(PinHandle::new(pin, line));
        handles.insert(pin, handle.clone());

        component_info!(Component::PinCache, "🔌 Pin {} initialized", pin);
        Ok(handle)
    }

    /// Drive a cached line. Failure does not evict the handle.
    pub fn set_level(&self, handle: &PinHandle, level: PinLevel) -> GatewayResult<()> {
        handle.write(level)?;
        component_info!(Component::PinCache, "Pin {} set to {}", handle.pin(), level);
        Ok(())
    }

    /// Get-or-create followed by a write
    pub async fn write(&self, pin: PinId, level: PinLevel) -> GatewayResult<()> {
        let handle = self.get_or_create(pin).await?;
        self.set_level(&handle, level)
    }

    /// Number of cached handles
    pub async fn len(&self) -> usize {
        self.handles.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.handles.lock().await.is_empty()
    }

    /// Pin ids with an open handle, ascending
    pub async fn cached_pins(&self) -> Vec<PinId> {
        let handles = self.handles.lock().await;
        let mut pins: Vec<PinId> = handles.keys().copied().collect();
        pins.sort();
        pins
    }

    /// Teardown: drive every cached line low and drop the handles
    pub async fn release_all(&self) -> usize {
        let drained: Vec<Arc<PinHandle>> = {
            let mut handles = self.handles.lock().await;
            self.released.store(true, Ordering::Release);
            handles.drain().map(|(_, handle)| handle).collect()
        };

        for handle in &drained {
            if let Err(e) = handle.write(PinLevel::Low) {
                component_warn!(Component::PinCache, "Failed to reset pin {} during release: {}", handle.pin(), e);
            }
        }

        let released = drained.len();
        component_info!(Component::PinCache, "🧹 Released {} pin handle(s)", released);
        released
    }
}
