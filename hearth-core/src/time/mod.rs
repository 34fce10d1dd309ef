//! ## hearth-core::time
//! **Virtual clock and hour/tick conversions**
//!
//! Virtual time is stored as integer nanoseconds ("ticks") so that event ordering is
//! exact, while every public API speaks hours, the canonical unit of the simulator
//! (one day is 24 hours).

use crate::SimulationError;

/// Ticks in one virtual hour.
pub const NANOS_PER_HOUR: u64 = 3_600_000_000_000;

/// Length of a simulated day in hours.
pub const HOURS_PER_DAY: f64 = 24.0;

/// Converts a non-negative duration in hours to ticks.
///
/// Negative, NaN, infinite or unrepresentably large values are rejected with
/// [`SimulationError::InvalidDelay`].
pub fn hours_to_ticks(hours: f64) -> Result<u64, SimulationError> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(SimulationError::InvalidDelay(hours));
    }
    let ticks = (hours * NANOS_PER_HOUR as f64).round();
    if ticks >= u64::MAX as f64 {
        return Err(SimulationError::InvalidDelay(hours));
    }
    Ok(ticks as u64)
}

/// Converts ticks back to hours.
#[inline]
pub fn ticks_to_hours(ticks: u64) -> f64 {
    ticks as f64 / NANOS_PER_HOUR as f64
}

/// Monotonic virtual clock owned by the scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VirtualClock {
    now_ns: u64,
}

impl VirtualClock {
    /// Creates a clock starting at `start_ns`.
    pub fn new(start_ns: u64) -> Self {
        Self { now_ns: start_ns }
    }

    #[inline]
    pub fn now_ns(&self) -> u64 {
        self.now_ns
    }

    #[inline]
    pub fn now_hours(&self) -> f64 {
        ticks_to_hours(self.now_ns)
    }

    /// Advances the clock by the given number of ticks.
    #[inline]
    pub fn advance(&mut self, ns: u64) {
        self.now_ns = self.now_ns.saturating_add(ns);
    }

    /// Moves the clock forward to `ns`. Earlier targets leave the clock untouched.
    #[inline]
    pub fn advance_to(&mut self, ns: u64) {
        debug_assert!(
            ns >= self.now_ns,
            "Cannot move clock backwards: current={}ns, target={}ns",
            self.now_ns,
            ns
        );
        self.now_ns = self.now_ns.max(ns);
    }
}
