//! Transport and speed-limit configuration
//!
//! Both structures are built once at startup from CLI input and are
//! immutable afterwards. Every override is validated against its enumerated
//! legal set; an invalid value keeps the current (default) value and emits a
//! warning. Configuration can therefore never fail — only the transport open
//! itself is fatal.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Baud rates accepted by the device family.
pub const BAUD_RATES: [u32; 6] = [1200, 2400, 4800, 9600, 19200, 38400];

/// Legal data-bit counts.
pub const DATA_BITS: [u8; 4] = [5, 6, 7, 8];

/// Legal stop-bit counts.
pub const STOP_BITS: [u8; 2] = [1, 2];

/// Serial parity setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerialParity {
    /// No parity bit
    None,
    /// Even parity
    Even,
    /// Odd parity
    Odd,
}

impl SerialParity {
    /// Parse the single-letter form used on the command line ("N", "E", "O").
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "N" | "n" | "none" => Some(Self::None),
            "E" | "e" | "even" => Some(Self::Even),
            "O" | "o" | "odd" => Some(Self::Odd),
            _ => None,
        }
    }
}

impl std::fmt::Display for SerialParity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "N"),
            Self::Even => write!(f, "E"),
            Self::Odd => write!(f, "O"),
        }
    }
}

/// Serial/Modbus transport configuration
///
/// Immutable after startup. Defaults match the GT-series factory
/// communication settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Serial device path
    pub device: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Parity setting
    pub parity: SerialParity,
    /// Stop bits (1 or 2)
    pub stop_bits: u8,
    /// Data bits (5-8)
    pub data_bits: u8,
    /// Modbus slave address (1-127)
    pub slave: u8,
    /// Per-transaction timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".to_string(),
            baud_rate: 38400,
            parity: SerialParity::None,
            stop_bits: 1,
            data_bits: 8,
            slave: 1,
            timeout_ms: 1000,
        }
    }
}

impl TransportConfig {
    /// Override the serial device path.
    pub fn set_device(&mut self, device: impl Into<String>) {
        self.device = device.into();
    }

    /// Override the baud rate, keeping the current value if it is not one of
    /// the rates the device supports.
    pub fn set_baud_rate(&mut self, baud: u32) {
        if BAUD_RATES.contains(&baud) {
            self.baud_rate = baud;
        } else {
            tracing::warn!(
                baud,
                "Invalid baud rate - using {} (must be one of {:?})",
                self.baud_rate,
                BAUD_RATES
            );
        }
    }

    /// Override the parity setting from its single-letter form.
    pub fn set_parity(&mut self, raw: &str) {
        match SerialParity::parse(raw) {
            Some(parity) => self.parity = parity,
            None => tracing::warn!(
                value = raw,
                "Invalid parity setting - using {} (must be N, E, or O)",
                self.parity
            ),
        }
    }

    /// Override the stop-bit count, keeping the current value on 0/3+.
    pub fn set_stop_bits(&mut self, stop_bits: u8) {
        if STOP_BITS.contains(&stop_bits) {
            self.stop_bits = stop_bits;
        } else {
            tracing::warn!(
                stop_bits,
                "Invalid stop bits - using {} (must be 1 or 2)",
                self.stop_bits
            );
        }
    }

    /// Override the data-bit count, keeping the current value outside 5-8.
    pub fn set_data_bits(&mut self, data_bits: u8) {
        if DATA_BITS.contains(&data_bits) {
            self.data_bits = data_bits;
        } else {
            tracing::warn!(
                data_bits,
                "Invalid byte size - using {} (must be one of {:?})",
                self.data_bits,
                DATA_BITS
            );
        }
    }

    /// Override the Modbus slave address, keeping the current value when the
    /// address falls outside 1-127.
    pub fn set_slave(&mut self, slave: u8) {
        if (1..=127).contains(&slave) {
            self.slave = slave;
        } else {
            tracing::warn!(slave, "Slave address must be between 1 and 127");
        }
    }

    /// Per-transaction timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Spindle speed limits in RPM
///
/// Invariant: `max_rpm > min_rpm`, enforced at configuration time. An
/// override that would break the invariant is rejected and the prior value
/// retained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedLimits {
    max_rpm: f64,
    min_rpm: f64,
}

impl Default for SpeedLimits {
    fn default() -> Self {
        Self {
            max_rpm: 24000.0,
            min_rpm: 7200.0,
        }
    }
}

impl SpeedLimits {
    /// Build limits from explicit values, falling back to defaults when the
    /// pair is inconsistent.
    pub fn new(max_rpm: f64, min_rpm: f64) -> Self {
        let mut limits = Self::default();
        limits.set_min_rpm(min_rpm);
        limits.set_max_rpm(max_rpm);
        limits
    }

    /// Maximum spindle speed in RPM.
    pub fn max_rpm(&self) -> f64 {
        self.max_rpm
    }

    /// Minimum spindle speed in RPM.
    pub fn min_rpm(&self) -> f64 {
        self.min_rpm
    }

    /// Override the maximum speed; rejected unless it stays above the
    /// current minimum.
    pub fn set_max_rpm(&mut self, max_rpm: f64) {
        if max_rpm > self.min_rpm {
            self.max_rpm = max_rpm;
        } else {
            tracing::warn!(
                max_rpm,
                min_rpm = self.min_rpm,
                "Max RPM must be greater than Min RPM - keeping {}",
                self.max_rpm
            );
        }
    }

    /// Override the minimum speed; rejected unless it stays below the
    /// current maximum.
    pub fn set_min_rpm(&mut self, min_rpm: f64) {
        if min_rpm < self.max_rpm {
            self.min_rpm = min_rpm;
        } else {
            tracing::warn!(
                min_rpm,
                max_rpm = self.max_rpm,
                "Min RPM must be less than Max RPM - keeping {}",
                self.min_rpm
            );
        }
    }
}
