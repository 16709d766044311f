//! Edge-triggered state tracking and speed scaling
//!
//! Pure functions plus a small tracker struct, no I/O. The register exchange
//! engine consults these to decide which writes a cycle actually needs, so a
//! held spindle-enable or an unchanged speed command never floods the device
//! with redundant writes.

use crate::config::SpeedLimits;
use crate::registers::SPEED_SCALE_FULL;

/// Outcome of comparing the spindle-enable flag across two cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnableEdge {
    /// Flag unchanged since the previous cycle
    NoChange,
    /// Flag transitioned false -> true; issue one run write
    Rising,
    /// Flag transitioned true -> false; issue one stop write
    Falling,
}

/// Classify the spindle-enable transition between two cycles.
pub fn detect_enable_edge(prev_enabled: bool, curr_enabled: bool) -> EnableEdge {
    match (prev_enabled, curr_enabled) {
        (false, true) => EnableEdge::Rising,
        (true, false) => EnableEdge::Falling,
        _ => EnableEdge::NoChange,
    }
}

/// True iff the commanded speed differs from the last value written.
pub fn should_write_speed(new: f64, last: f64) -> bool {
    new != last
}

/// Scale a commanded speed to the device's 0..=10000 register range.
///
/// Commands above the maximum clamp to full scale; commands below the
/// minimum clamp to the minimum's proportional value — a floor, not a
/// cutoff, so an under-range command never stops the motor.
pub fn scale_speed(commanded: f64, limits: &SpeedLimits) -> u16 {
    let full = SPEED_SCALE_FULL as f64;
    let scaled = if commanded > limits.max_rpm() {
        full
    } else if commanded < limits.min_rpm() {
        (limits.min_rpm() / limits.max_rpm() * full).round()
    } else {
        (commanded / limits.max_rpm() * full).round()
    };
    scaled as u16
}

/// Last-applied command state, owned by the control loop
///
/// Used only for change detection; never exposed on the signal surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct MotionTracker {
    last_speed_cmd: f64,
    motor_is_on: bool,
}

impl MotionTracker {
    /// Create a tracker with the motor stopped and no speed applied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a run write has been issued without a matching stop.
    pub fn motor_is_on(&self) -> bool {
        self.motor_is_on
    }

    /// Record a commanded speed and report whether it needs a device write.
    ///
    /// The command is recorded before the write happens, so a failed write is
    /// not retried on the next cycle; the failure shows up in the error
    /// counter instead.
    pub fn speed_needs_write(&mut self, commanded: f64) -> bool {
        if should_write_speed(commanded, self.last_speed_cmd) {
            self.last_speed_cmd = commanded;
            true
        } else {
            false
        }
    }

    /// Record the commanded enable flag and classify the transition.
    pub fn enable_edge(&mut self, enabled: bool) -> EnableEdge {
        let edge = detect_enable_edge(self.motor_is_on, enabled);
        match edge {
            EnableEdge::Rising => self.motor_is_on = true,
            EnableEdge::Falling => self.motor_is_on = false,
            EnableEdge::NoChange => {}
        }
        edge
    }

    /// Force the motor-running flag off (used by the shutdown path).
    pub fn mark_stopped(&mut self) {
        self.motor_is_on = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn edges_fire_only_on_transitions() {
        assert_eq!(detect_enable_edge(false, true), EnableEdge::Rising);
        assert_eq!(detect_enable_edge(true, false), EnableEdge::Falling);
        assert_eq!(detect_enable_edge(true, true), EnableEdge::NoChange);
        assert_eq!(detect_enable_edge(false, false), EnableEdge::NoChange);
    }

    #[test]
    fn held_enable_reports_a_single_rising_edge() {
        let mut tracker = MotionTracker::new();
        assert_eq!(tracker.enable_edge(true), EnableEdge::Rising);
        for _ in 0..10 {
            assert_eq!(tracker.enable_edge(true), EnableEdge::NoChange);
        }
        assert_eq!(tracker.enable_edge(false), EnableEdge::Falling);
        assert_eq!(tracker.enable_edge(false), EnableEdge::NoChange);
    }

    #[test]
    fn repeated_speed_command_is_suppressed() {
        let mut tracker = MotionTracker::new();
        assert!(tracker.speed_needs_write(12000.0));
        assert!(!tracker.speed_needs_write(12000.0));
        assert!(tracker.speed_needs_write(18000.0));
    }

    #[test]
    fn in_range_speed_scales_proportionally() {
        let limits = SpeedLimits::default(); // 24000 / 7200
        assert_eq!(scale_speed(12000.0, &limits), 5000);
        assert_eq!(scale_speed(24000.0, &limits), 10000);
        assert_eq!(scale_speed(7200.0, &limits), 3000);
    }

    #[test]
    fn over_range_speed_clamps_to_full_scale() {
        let limits = SpeedLimits::default();
        assert_eq!(scale_speed(30000.0, &limits), 10000);
        assert_eq!(scale_speed(1.0e9, &limits), 10000);
    }

    #[test]
    fn under_range_speed_clamps_to_minimum_floor() {
        let limits = SpeedLimits::default();
        assert_eq!(scale_speed(3000.0, &limits), 3000);
        assert_eq!(scale_speed(0.0, &limits), 3000);
        assert_ne!(scale_speed(1.0, &limits), 0);
    }

    proptest! {
        #[test]
        fn scaled_value_stays_within_floor_and_full_scale(cmd in -1.0e6f64..1.0e6) {
            let limits = SpeedLimits::default();
            let floor = (limits.min_rpm() / limits.max_rpm() * 10000.0).round() as u16;
            let value = scale_speed(cmd, &limits);
            prop_assert!(value >= floor);
            prop_assert!(value <= 10000);
        }
    }
}
