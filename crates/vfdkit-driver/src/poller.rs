//! Fixed-period polling loop
//!
//! Single logical task: tick, snapshot the commanded state once, run one
//! exchange cycle, publish telemetry, sleep. Terminates on Ctrl-C or an
//! explicit shutdown notification, attempting one best-effort stop write on
//! the way out.

use crate::engine::ExchangeEngine;
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::{interval, Duration, MissedTickBehavior};
use vfdkit_core::SignalSurface;

/// The driver's control loop
pub struct Poller {
    surface: Arc<SignalSurface>,
    session: Session,
    engine: ExchangeEngine,
    period: Duration,
    shutdown: Arc<Notify>,
}

impl Poller {
    /// Build a poller over an open session.
    ///
    /// `shutdown` lets an embedding supervisor stop the loop without a
    /// process signal; Ctrl-C is always honored as well.
    pub fn new(
        surface: Arc<SignalSurface>,
        session: Session,
        engine: ExchangeEngine,
        period: Duration,
        shutdown: Arc<Notify>,
    ) -> Self {
        Self {
            surface,
            session,
            engine,
            period,
            shutdown,
        }
    }

    /// Run until interrupted.
    pub async fn run(mut self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(
            period_ms = self.period.as_millis() as u64,
            device = self.session.device(),
            "polling loop started"
        );
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let command = self.surface.commanded();
                    let snapshot = self.engine.run_cycle(&mut self.session, command).await;
                    self.surface.publish(snapshot);
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("interrupt received");
                    break;
                }
                _ = self.shutdown.notified() => {
                    tracing::info!("shutdown requested");
                    break;
                }
            }
        }
        // Every transaction is already bounded by the transport timeout, so
        // this cannot stall the exit path.
        self.engine.shutdown(&mut self.session).await;
    }
}
