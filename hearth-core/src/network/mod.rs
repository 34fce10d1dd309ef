//! ## hearth-core::network
//! **Node addressing, planar placement and propagation models**
//!
//! ### Key Submodules:
//! - `latency`: distance-based propagation delay models

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod latency;

pub use latency::{DistanceLatencyModel, NoLatencyModel, PropagationModel};

/// Unique, immutable identifier of a node in the device graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub u64);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Fixed 2-D position of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub const ORIGIN: Location = Location { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`. Never negative; non-finite results collapse to 0.
    pub fn distance_to(&self, other: &Location) -> f64 {
        let d = (self.x - other.x).hypot(self.y - other.y);
        if d.is_finite() {
            d.max(0.0)
        } else {
            0.0
        }
    }
}
