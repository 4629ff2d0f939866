//! Core runtime behaviour
//!
//! Pin handle caching, the poll loop, log throttling and control-request
//! handling. I/O happens only through the traits in `crate::traits`.

pub mod control;
pub mod log_gate;
pub mod pin_cache;
pub mod poller;

pub use control::{ControlOutcome, PinCommand, apply_command, handle_control_request};
pub use log_gate::{LogDecision, LogGate, LogGateStats, LogPolicy, LogThrottleState};
pub use pin_cache::{PinCache, PinHandle};
pub use poller::{SensorPoller, TickOutcome};
