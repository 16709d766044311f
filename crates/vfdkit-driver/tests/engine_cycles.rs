//! Exchange-engine cycle tests against a scripted mock bus.
//!
//! The mock answers telemetry and fault reads from per-address queues and
//! records every write, so each test can assert the exact register write
//! sequence a command sequence produces.

use async_trait::async_trait;
use std::collections::VecDeque;
use vfdkit_core::{
    RegisterMap, SpeedLimits, SpindleCommand, TransactionError, CONTROL_RUN, CONTROL_STOP,
};
use vfdkit_driver::{ExchangeEngine, RegisterBus};

const TELEMETRY: u16 = RegisterMap::GT_SERIES.telemetry_base;
const FAULT: u16 = RegisterMap::GT_SERIES.fault;
const SPEED: u16 = RegisterMap::GT_SERIES.speed_command;
const CONTROL: u16 = RegisterMap::GT_SERIES.control;

type ReadResult = Result<Vec<u16>, TransactionError>;

/// Mock register bus with scripted read responses and recorded writes.
struct MockBus {
    telemetry_reads: VecDeque<ReadResult>,
    fault_reads: VecDeque<ReadResult>,
    writes: Vec<(u16, u16)>,
    fail_writes: bool,
}

impl MockBus {
    fn new() -> Self {
        Self {
            telemetry_reads: VecDeque::new(),
            fault_reads: VecDeque::new(),
            writes: Vec::new(),
            fail_writes: false,
        }
    }

    fn push_telemetry(&mut self, result: ReadResult) {
        self.telemetry_reads.push_back(result);
    }

    fn push_fault(&mut self, result: ReadResult) {
        self.fault_reads.push_back(result);
    }

    fn speed_writes(&self) -> Vec<u16> {
        self.writes
            .iter()
            .filter(|(addr, _)| *addr == SPEED)
            .map(|(_, value)| *value)
            .collect()
    }

    fn control_writes(&self) -> Vec<u16> {
        self.writes
            .iter()
            .filter(|(addr, _)| *addr == CONTROL)
            .map(|(_, value)| *value)
            .collect()
    }
}

fn transport_error() -> TransactionError {
    TransactionError::Transport {
        reason: "device did not respond".to_string(),
    }
}

#[async_trait]
impl RegisterBus for MockBus {
    async fn read_holding(
        &mut self,
        addr: u16,
        _count: u16,
    ) -> Result<Vec<u16>, TransactionError> {
        // Unscripted reads answer zeros so tests only script what they check.
        match addr {
            TELEMETRY => self
                .telemetry_reads
                .pop_front()
                .unwrap_or_else(|| Ok(vec![0, 0, 0])),
            FAULT => self.fault_reads.pop_front().unwrap_or_else(|| Ok(vec![0])),
            other => panic!("unexpected read at {:#06x}", other),
        }
    }

    async fn write_register(&mut self, addr: u16, value: u16) -> Result<(), TransactionError> {
        if self.fail_writes {
            return Err(transport_error());
        }
        self.writes.push((addr, value));
        Ok(())
    }
}

fn engine() -> ExchangeEngine {
    ExchangeEngine::new(RegisterMap::GT_SERIES, SpeedLimits::default(), 60.0)
}

fn on(speed_rpm: f64) -> SpindleCommand {
    SpindleCommand {
        speed_rpm,
        enabled: true,
    }
}

fn off(speed_rpm: f64) -> SpindleCommand {
    SpindleCommand {
        speed_rpm,
        enabled: false,
    }
}

#[tokio::test]
async fn commanded_sequence_produces_expected_write_sequence() {
    // max 24000 / min 7200: [0 off, 12000 on, 12000 on, 30000 on, 3000 on, off]
    let mut bus = MockBus::new();
    let mut engine = engine();

    for command in [off(0.0), on(12000.0), on(12000.0), on(30000.0), on(3000.0), off(3000.0)] {
        engine.run_cycle(&mut bus, command).await;
    }

    // 12000 -> 5000, repeat suppressed, 30000 clamps to full scale,
    // 3000 clamps to the minimum floor.
    assert_eq!(bus.speed_writes(), vec![5000, 10000, 3000]);
    assert_eq!(bus.control_writes(), vec![CONTROL_RUN, CONTROL_STOP]);
}

#[tokio::test]
async fn speed_precedes_run_on_the_enabling_cycle() {
    let mut bus = MockBus::new();
    let mut engine = engine();

    engine.run_cycle(&mut bus, on(12000.0)).await;

    assert_eq!(bus.writes, vec![(SPEED, 5000), (CONTROL, CONTROL_RUN)]);
}

#[tokio::test]
async fn held_enable_writes_run_exactly_once() {
    let mut bus = MockBus::new();
    let mut engine = engine();

    for _ in 0..8 {
        engine.run_cycle(&mut bus, on(12000.0)).await;
    }
    engine.run_cycle(&mut bus, off(12000.0)).await;

    assert_eq!(bus.control_writes(), vec![CONTROL_RUN, CONTROL_STOP]);
    assert_eq!(bus.speed_writes(), vec![5000]);
}

#[tokio::test]
async fn telemetry_retained_across_a_failed_read() {
    let mut bus = MockBus::new();
    bus.push_telemetry(Ok(vec![230, 7, 12000]));
    bus.push_telemetry(Err(transport_error()));
    let mut engine = engine();

    let first = engine.run_cycle(&mut bus, off(0.0)).await;
    assert_eq!(first.output_volts, 230.0);
    assert_eq!(first.output_amps, 7.0);
    assert_eq!(first.speed_rpm, 12000.0);
    assert_eq!(first.speed_feedback, 200.0);
    assert_eq!(first.error_count, 0);

    let second = engine.run_cycle(&mut bus, off(0.0)).await;
    assert_eq!(second.output_volts, 230.0);
    assert_eq!(second.speed_rpm, 12000.0);
    assert_eq!(second.error_count, 1);
}

#[tokio::test]
async fn fault_code_survives_a_failing_cycle_and_updates_on_the_next_success() {
    let mut bus = MockBus::new();
    bus.push_fault(Ok(vec![3]));
    bus.push_fault(Err(transport_error()));
    bus.push_fault(Ok(vec![9]));
    let mut engine = engine();

    let first = engine.run_cycle(&mut bus, off(0.0)).await;
    assert_eq!(first.fault_code, 3);

    let second = engine.run_cycle(&mut bus, off(0.0)).await;
    assert_eq!(second.fault_code, 3);
    assert_eq!(second.error_count, 1);

    let third = engine.run_cycle(&mut bus, off(0.0)).await;
    assert_eq!(third.fault_code, 9);
    assert_eq!(third.error_count, 1);
}

#[tokio::test]
async fn error_count_accumulates_one_per_failed_transaction() {
    let mut bus = MockBus::new();
    for _ in 0..3 {
        bus.push_telemetry(Err(transport_error()));
        bus.push_fault(Err(transport_error()));
    }
    let mut engine = engine();

    let mut last = 0;
    for _ in 0..3 {
        let snapshot = engine.run_cycle(&mut bus, off(0.0)).await;
        assert!(snapshot.error_count >= last);
        last = snapshot.error_count;
    }
    // Two failed transactions per cycle, three cycles.
    assert_eq!(last, 6);
}

#[tokio::test]
async fn failed_writes_count_but_reads_still_run() {
    let mut bus = MockBus::new();
    bus.fail_writes = true;
    bus.push_telemetry(Ok(vec![230, 7, 12000]));
    let mut engine = engine();

    // Speed and run writes both fail on the enabling cycle.
    let snapshot = engine.run_cycle(&mut bus, on(12000.0)).await;
    assert_eq!(snapshot.error_count, 2);
    assert_eq!(snapshot.output_volts, 230.0);
}

#[tokio::test]
async fn short_telemetry_response_counts_as_an_error() {
    let mut bus = MockBus::new();
    bus.push_telemetry(Ok(vec![230, 7, 12000]));
    bus.push_telemetry(Ok(vec![230]));
    let mut engine = engine();

    engine.run_cycle(&mut bus, off(0.0)).await;
    let snapshot = engine.run_cycle(&mut bus, off(0.0)).await;
    assert_eq!(snapshot.error_count, 1);
    assert_eq!(snapshot.speed_rpm, 12000.0);
}

#[tokio::test]
async fn shutdown_stops_a_running_spindle_once() {
    let mut bus = MockBus::new();
    let mut engine = engine();

    engine.run_cycle(&mut bus, on(12000.0)).await;
    engine.shutdown(&mut bus).await;
    engine.shutdown(&mut bus).await;

    assert_eq!(bus.control_writes(), vec![CONTROL_RUN, CONTROL_STOP]);
}

#[tokio::test]
async fn shutdown_is_a_no_op_when_the_spindle_never_ran() {
    let mut bus = MockBus::new();
    let mut engine = engine();

    engine.run_cycle(&mut bus, off(0.0)).await;
    engine.shutdown(&mut bus).await;

    assert!(bus.control_writes().is_empty());
}
