//! # VFDKit Core
//!
//! Core types, transition logic, and the shared signal surface for the
//! VFDKit spindle driver. Everything in this crate is pure state and
//! arithmetic — no serial or Modbus I/O — so the control-loop logic can be
//! unit tested without a device on the bench.

pub mod config;
pub mod error;
pub mod registers;
pub mod signals;
pub mod tracker;

pub use config::{SerialParity, SpeedLimits, TransportConfig};
pub use error::{Error, Result, SessionError, TransactionError};
pub use registers::{RegisterMap, CONTROL_RUN, CONTROL_STOP, SPEED_SCALE_FULL};
pub use signals::{SignalSurface, SpindleCommand, TelemetrySnapshot};
pub use tracker::{
    detect_enable_edge, scale_speed, should_write_speed, EnableEdge, MotionTracker,
};
