//! In-process pin driver
//!
//! Stands in for real GPIO hardware: accepts pin ids up to a configured
//! maximum and records the last level written to each line.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use shared::{Component, PinId, PinLevel, component_debug};

use crate::error::{GatewayError, GatewayResult};
use crate::traits::{OutputPin, PinDriver};

#[derive(Clone)]
pub struct SimulatedPinDriver {
    max_pin: u8,
    levels: Arc<RwLock<HashMap<PinId, PinLevel>>>,
    opened: Arc<AtomicUsize>,
}

impl SimulatedPinDriver {
    pub fn new(max_pin: u8) -> Self {
        Self {
            max_pin,
            levels: Arc::new(RwLock::new(HashMap::new())),
            opened: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Last level written to `pin`, if any
    pub fn level(&self, pin: PinId) -> Option<PinLevel> {
        self.levels.read().ok().and_then(|levels| levels.get(&pin).copied())
    }

    /// How many lines have been opened over the driver's lifetime
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::Relaxed)
    }
}

impl PinDriver for SimulatedPinDriver {
    fn open_output(&self, pin: PinId) -> GatewayResult<Box<dyn OutputPin>> {
        if pin.value() > self.max_pin {
            return Err(GatewayError::actuator(
                pin,
                format!("no such output line (highest is {})", self.max_pin),
            ));
        }

        self.opened.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(SimulatedLine {
            pin,
            levels: self.levels.clone(),
        }))
    }
}

struct SimulatedLine {
    pin: PinId,
    levels: Arc<RwLock<HashMap<PinId, PinLevel>>>,
}

impl OutputPin for SimulatedLine {
    fn write(&mut self, level: PinLevel) -> GatewayResult<()> {
        let mut levels = self
            .levels
            .write()
            .map_err(|_| GatewayError::actuator(self.pin, "simulated line state poisoned"))?;
        levels.insert(self.pin, level);
        component_debug!(Component::PinCache, "[sim] pin {} <- {}", self.pin, level);
        Ok(())
    }
}
