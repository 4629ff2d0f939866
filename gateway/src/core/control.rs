//! Control-plane pin writes
//!
//! Requests are validated before anything touches the pin cache. Whatever
//! happens after that is reported through local diagnostics only; the
//! requester never sees an actuator error.

use shared::{Component, PinId, PinLevel, component_error, component_warn};

use crate::core::PinCache;
use crate::error::GatewayError;
use crate::types::ControlRequest;

/// A control request that passed boundary validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinCommand {
    pub pin: PinId,
    pub level: PinLevel,
}

impl TryFrom<ControlRequest> for PinCommand {
    type Error = GatewayError;

    fn try_from(request: ControlRequest) -> Result<Self, Self::Error> {
        let pin = PinId::try_from(request.pin).map_err(|e| GatewayError::malformed(e.to_string()))?;
        let level = PinLevel::try_from(request.value).map_err(|e| GatewayError::malformed(e.to_string()))?;
        Ok(Self { pin, level })
    }
}

/// Outcome of a control request, for local reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    Applied,
    Rejected,
    ActuatorFailed,
}

/// Validate and apply a pin write. Errors are logged here and not returned.
pub async fn handle_control_request(pin_cache: &PinCache, request: ControlRequest) -> ControlOutcome {
    match PinCommand::try_from(request) {
        Ok(command) => apply_command(pin_cache, command).await,
        Err(e) => {
            component_warn!(Component::Control, "Rejected control request {:?}: {}", request, e);
            ControlOutcome::Rejected
        }
    }
}

/// Apply an already validated command, logging any actuator failure
pub async fn apply_command(pin_cache: &PinCache, command: PinCommand) -> ControlOutcome {
    match pin_cache.write(command.pin, command.level).await {
        Ok(()) => ControlOutcome::Applied,
        Err(e) => {
            component_error!(Component::Control, "❌ Failed to write to pin {}: {}", command.pin, e);
            ControlOutcome::ActuatorFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockOutputPin, MockPinDriver, OutputPin};
    use std::sync::Arc;

    #[test]
    fn test_valid_request_converts() {
        let command = PinCommand::try_from(ControlRequest { pin: 18, value: 1 }).unwrap();
        assert_eq!(command, PinCommand { pin: PinId(18), level: PinLevel::High });
    }

    #[test]
    fn test_invalid_level_rejected() {
        for value in [2, -1, 255] {
            let result = PinCommand::try_from(ControlRequest { pin: 18, value });
            assert!(matches!(result, Err(GatewayError::MalformedControlRequest { .. })));
        }
    }

    #[test]
    fn test_invalid_pin_rejected() {
        for pin in [-1, 256, 10_000] {
            let result = PinCommand::try_from(ControlRequest { pin, value: 0 });
            assert!(matches!(result, Err(GatewayError::MalformedControlRequest { .. })));
        }
    }

    #[tokio::test]
    async fn test_malformed_request_never_touches_cache() {
        let mut driver = MockPinDriver::new();
        driver.expect_open_output().never();
        let cache = PinCache::new(Arc::new(driver));

        let outcome = handle_control_request(&cache, ControlRequest { pin: 4, value: 3 }).await;
        assert_eq!(outcome, ControlOutcome::Rejected);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_valid_request_writes_pin() {
        let mut driver = MockPinDriver::new();
        driver
            .expect_open_output()
            .withf(|pin| *pin == PinId(4))
            .times(1)
            .returning(|_| {
                let mut line = MockOutputPin::new();
                line.expect_write()
                    .withf(|level| *level == PinLevel::High)
                    .times(1)
                    .returning(|_| Ok(()));
                Ok(Box::new(line) as Box<dyn OutputPin>)
            });
        let cache = PinCache::new(Arc::new(driver));

        let outcome = handle_control_request(&cache, ControlRequest { pin: 4, value: 1 }).await;
        assert_eq!(outcome, ControlOutcome::Applied);
    }

    #[tokio::test]
    async fn test_actuator_failure_is_contained() {
        let mut driver = MockPinDriver::new();
        driver
            .expect_open_output()
            .returning(|pin| Err(GatewayError::actuator(pin, "no such line")));
        let cache = PinCache::new(Arc::new(driver));

        let outcome = handle_control_request(&cache, ControlRequest { pin: 200, value: 0 }).await;
        assert_eq!(outcome, ControlOutcome::ActuatorFailed);
        assert!(cache.is_empty().await);
    }
}
