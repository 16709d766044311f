//! Holding register map for the GT-series device family
//!
//! The map is static per device family: one control register, one speed
//! command register, a contiguous telemetry block, and a fault register.
//! All addresses are 16-bit Modbus holding register addresses.

use serde::{Deserialize, Serialize};

/// Control register value commanding the motor to run.
pub const CONTROL_RUN: u16 = 1;

/// Control register value commanding the motor to stop.
///
/// The GT series uses a command word, not a boolean: 5 is the "decelerate
/// and stop" command.
pub const CONTROL_STOP: u16 = 5;

/// Full-scale value of the speed command register (100.00% of max speed).
pub const SPEED_SCALE_FULL: u16 = 10_000;

/// Logical-field to register-address map for one device family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterMap {
    /// Control (run/stop) register address
    pub control: u16,
    /// Speed command register address (scaled 0..=10000)
    pub speed_command: u16,
    /// Base address of the telemetry block (volts, amps, raw speed)
    pub telemetry_base: u16,
    /// Number of registers in the telemetry block
    pub telemetry_count: u16,
    /// Fault code register address
    pub fault: u16,
}

impl RegisterMap {
    /// Register map for Huanyang GT-series drives.
    pub const GT_SERIES: RegisterMap = RegisterMap {
        control: 0x1000,
        speed_command: 0x2000,
        telemetry_base: 0x3003,
        telemetry_count: 3,
        fault: 0x5000,
    };
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self::GT_SERIES
    }
}
