//! ## hearth-core::network::latency
//! **Propagation delay models for the communication relay**
//!
//! ### Available Models:
//! - `DistanceLatencyModel`: delay proportional to Euclidean distance.
//! - `NoLatencyModel`: instantaneous delivery (for baseline runs and tests).

use super::Location;

/// Trait for propagation delay models.
pub trait PropagationModel {
    /// Delay in hours for a signal travelling from `from` to `to`. Never negative.
    fn delay(&self, from: &Location, to: &Location) -> f64;
}

/// Delay = distance × a fixed distance-to-time ratio (hours per distance unit).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceLatencyModel {
    hours_per_unit: f64,
}

impl DistanceLatencyModel {
    /// Creates a new distance latency model.
    ///
    /// # Arguments
    /// * `hours_per_unit` - Signal slowness; negative or non-finite ratios act as 0.
    pub fn new(hours_per_unit: f64) -> Self {
        let hours_per_unit = if hours_per_unit.is_finite() {
            hours_per_unit.max(0.0)
        } else {
            0.0
        };
        Self { hours_per_unit }
    }

    pub fn hours_per_unit(&self) -> f64 {
        self.hours_per_unit
    }
}

impl PropagationModel for DistanceLatencyModel {
    #[inline]
    fn delay(&self, from: &Location, to: &Location) -> f64 {
        let delay = from.distance_to(to) * self.hours_per_unit;
        if delay.is_finite() {
            delay.max(0.0)
        } else {
            0.0
        }
    }
}

/// A no-latency model: every hop is instantaneous.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLatencyModel;

impl PropagationModel for NoLatencyModel {
    #[inline]
    fn delay(&self, _from: &Location, _to: &Location) -> f64 {
        0.0
    }
}
