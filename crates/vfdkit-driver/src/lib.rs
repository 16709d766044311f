//! # VFDKit Driver
//!
//! The device-facing half of VFDKit: the Modbus RTU session, the per-cycle
//! register exchange engine, and the fixed-period polling loop.
//!
//! Design rules carried through every cycle:
//! - Telemetry and fault reads always run, even when writes fail
//! - Writes are edge-triggered: one run write per enable transition, one
//!   speed write per changed command
//! - A failed transaction increments the error counter and never terminates
//!   the loop

pub mod bus;
pub mod engine;
pub mod poller;
pub mod session;

pub use bus::RegisterBus;
pub use engine::ExchangeEngine;
pub use poller::Poller;
pub use session::Session;
