//! Register exchange engine
//!
//! Executes one polling cycle against the device in a fixed order:
//! telemetry block read, fault register read, then the conditional write
//! phase (speed, then enable edge). Reads always run, even when a previous
//! step failed; a failed transaction increments the cumulative error counter
//! and leaves the last-known-good value in place.

use crate::bus::RegisterBus;
use vfdkit_core::{
    EnableEdge, MotionTracker, RegisterMap, SpeedLimits, SpindleCommand, TelemetrySnapshot,
    TransactionError, CONTROL_RUN, CONTROL_STOP,
};

/// Per-cycle register exchange against one drive
pub struct ExchangeEngine {
    map: RegisterMap,
    limits: SpeedLimits,
    fb_divisor: f64,
    tracker: MotionTracker,
    telemetry: TelemetrySnapshot,
}

impl ExchangeEngine {
    /// Create an engine for the given register map and speed limits.
    ///
    /// `fb_divisor` converts the raw speed register to the feedback value;
    /// it is device-specific (60.0 for the GT series).
    pub fn new(map: RegisterMap, limits: SpeedLimits, fb_divisor: f64) -> Self {
        Self {
            map,
            limits,
            fb_divisor,
            tracker: MotionTracker::new(),
            telemetry: TelemetrySnapshot::default(),
        }
    }

    /// The telemetry as of the last completed cycle.
    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.telemetry
    }

    /// Run one full cycle and return the telemetry to publish.
    ///
    /// `command` is the single consistent snapshot taken for this cycle;
    /// the engine never re-reads the commanded state mid-cycle.
    pub async fn run_cycle(
        &mut self,
        bus: &mut dyn RegisterBus,
        command: SpindleCommand,
    ) -> TelemetrySnapshot {
        self.read_telemetry(bus).await;
        self.read_fault(bus).await;
        if command.enabled {
            self.write_speed(bus, command.speed_rpm).await;
        }
        self.apply_enable(bus, command.enabled).await;
        self.telemetry
    }

    /// Best-effort stop on shutdown.
    ///
    /// Issued only when a run write is outstanding; a failure is logged and
    /// otherwise ignored since the process is exiting.
    pub async fn shutdown(&mut self, bus: &mut dyn RegisterBus) {
        if !self.tracker.motor_is_on() {
            return;
        }
        if let Err(err) = bus.write_register(self.map.control, CONTROL_STOP).await {
            tracing::warn!(%err, "could not stop spindle on shutdown");
        } else {
            tracing::info!("spindle stopped");
        }
        self.tracker.mark_stopped();
    }

    async fn read_telemetry(&mut self, bus: &mut dyn RegisterBus) {
        match bus
            .read_holding(self.map.telemetry_base, self.map.telemetry_count)
            .await
        {
            Ok(words) if words.len() >= self.map.telemetry_count as usize => {
                self.telemetry.output_volts = words[0] as f64;
                self.telemetry.output_amps = words[1] as f64;
                self.telemetry.speed_rpm = words[2] as f64;
                self.telemetry.speed_feedback = words[2] as f64 / self.fb_divisor;
            }
            Ok(words) => {
                self.record_error(&TransactionError::ShortResponse {
                    expected: self.map.telemetry_count,
                    actual: words.len(),
                });
            }
            Err(err) => {
                tracing::warn!(%err, "Error reading VFD telemetry registers");
                self.telemetry.error_count = self.telemetry.error_count.saturating_add(1);
            }
        }
    }

    async fn read_fault(&mut self, bus: &mut dyn RegisterBus) {
        match bus.read_holding(self.map.fault, 1).await {
            Ok(words) if !words.is_empty() => {
                let fault = words[0] as u32;
                if fault != 0 && fault != self.telemetry.fault_code {
                    tracing::warn!(fault, "VFD reporting fault");
                }
                self.telemetry.fault_code = fault;
            }
            Ok(words) => {
                self.record_error(&TransactionError::ShortResponse {
                    expected: 1,
                    actual: words.len(),
                });
            }
            Err(err) => {
                tracing::warn!(%err, addr = self.map.fault, "Error reading fault register");
                self.telemetry.error_count = self.telemetry.error_count.saturating_add(1);
            }
        }
    }

    async fn write_speed(&mut self, bus: &mut dyn RegisterBus, commanded: f64) {
        if !self.tracker.speed_needs_write(commanded) {
            return;
        }
        let value = vfdkit_core::scale_speed(commanded, &self.limits);
        match bus.write_register(self.map.speed_command, value).await {
            Ok(()) => tracing::debug!(commanded, value, "speed command written"),
            Err(err) => self.record_error(&err),
        }
    }

    async fn apply_enable(&mut self, bus: &mut dyn RegisterBus, enabled: bool) {
        let (value, label) = match self.tracker.enable_edge(enabled) {
            EnableEdge::Rising => (CONTROL_RUN, "run"),
            EnableEdge::Falling => (CONTROL_STOP, "stop"),
            EnableEdge::NoChange => return,
        };
        match bus.write_register(self.map.control, value).await {
            Ok(()) => tracing::info!(command = label, "spindle control written"),
            Err(err) => self.record_error(&err),
        }
    }

    fn record_error(&mut self, err: &TransactionError) {
        tracing::warn!(%err, "VFD transaction failed");
        self.telemetry.error_count = self.telemetry.error_count.saturating_add(1);
    }
}
