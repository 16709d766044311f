//! # VFDKit
//!
//! A userspace spindle driver for Huanyang GT-series variable-frequency
//! drives. Polls the drive over Modbus RTU on a fixed period and exposes its
//! state as HAL-style signals to an external supervisor:
//!
//! - Inputs consumed: speed command (RPM), spindle enable
//! - Outputs produced: speed feedback, raw speed, output volts/amps, fault
//!   code, cumulative communication error count
//!
//! ## Architecture
//!
//! VFDKit is organized as a workspace:
//!
//! 1. **vfdkit-core** - Configuration, register map, scaling, edge-triggered
//!    transition logic, the shared signal surface
//! 2. **vfdkit-driver** - Modbus RTU session, register exchange engine,
//!    polling loop
//! 3. **vfdkit** - The binary: CLI, logging, supervisor command channel

pub use vfdkit_core::{
    scale_speed, EnableEdge, Error, RegisterMap, Result, SerialParity, SessionError,
    SignalSurface, SpeedLimits, SpindleCommand, TelemetrySnapshot, TransactionError,
    TransportConfig, CONTROL_RUN, CONTROL_STOP,
};

pub use vfdkit_driver::{ExchangeEngine, Poller, RegisterBus, Session};

/// Initialize the tracing subscriber for console diagnostics.
///
/// Honors `RUST_LOG`; defaults to `info` so configuration fallbacks and
/// transaction failures are visible without extra setup.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_level(true))
        .init();

    Ok(())
}
