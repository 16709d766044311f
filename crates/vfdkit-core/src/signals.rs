//! Shared signal surface between the control loop and its supervisor
//!
//! The supervisor (operator UI, HAL layer, stdin shim) writes the commanded
//! state at any time; the control loop takes exactly one consistent snapshot
//! per cycle and publishes telemetry back after the cycle completes. Both
//! sides hold the surface behind an `Arc`; locks are short-held and guard a
//! small fixed-size record, never iteration.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Commanded spindle state, written by the supervisor
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpindleCommand {
    /// Commanded speed in RPM
    pub speed_rpm: f64,
    /// Spindle enable flag
    pub enabled: bool,
}

/// Telemetry published by the control loop after each cycle
///
/// On a failed read the affected fields retain their last successfully read
/// values; only `error_count` moves.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Output voltage reported by the drive
    pub output_volts: f64,
    /// Output current reported by the drive
    pub output_amps: f64,
    /// Raw spindle speed reported by the drive
    pub speed_rpm: f64,
    /// Derived speed feedback (raw speed / feedback divisor)
    pub speed_feedback: f64,
    /// Last successfully read fault code
    pub fault_code: u32,
    /// Cumulative communication error count (monotonic, saturating)
    pub error_count: u32,
}

/// The HAL-style signal surface
#[derive(Debug, Default)]
pub struct SignalSurface {
    command: Mutex<SpindleCommand>,
    telemetry: RwLock<TelemetrySnapshot>,
}

impl SignalSurface {
    /// Create a new surface with everything zeroed and the spindle disabled.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Set the commanded speed in RPM.
    pub fn set_speed_command(&self, speed_rpm: f64) {
        self.command.lock().speed_rpm = speed_rpm;
    }

    /// Set the spindle-enable flag.
    pub fn set_spindle_enable(&self, enabled: bool) {
        self.command.lock().enabled = enabled;
    }

    /// Take one consistent snapshot of the commanded state.
    ///
    /// The control loop calls this exactly once per cycle so the speed and
    /// enable sub-steps always act on the same command.
    pub fn commanded(&self) -> SpindleCommand {
        *self.command.lock()
    }

    /// Publish the telemetry produced by a completed cycle.
    pub fn publish(&self, snapshot: TelemetrySnapshot) {
        *self.telemetry.write() = snapshot;
    }

    /// Read the most recently published telemetry.
    pub fn telemetry(&self) -> TelemetrySnapshot {
        *self.telemetry.read()
    }
}
