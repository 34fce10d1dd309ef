//! # hearth-core
//!
//! Discrete-event engine underneath the hearth home-automation latency simulator.
//! Everything here runs on a single logical thread over virtual time.
//!
//! ### Key Submodules:
//! - `time`: virtual clock and hour/tick conversions
//! - `scheduler`: deterministic event queue (`run_until`, `schedule`)
//! - `resource`: FIFO capacity resource used to throttle servers
//! - `distribution`: bounded rejection samplers over normal distributions
//! - `network`: node addresses, planar locations and propagation models

pub mod distribution;
pub mod error;
pub mod network;
pub mod resource;
pub mod scheduler;
pub mod time;

pub mod prelude {
    pub use crate::distribution::*;
    pub use crate::error::*;
    pub use crate::network::*;
    pub use crate::resource::*;
    pub use crate::scheduler::*;
    pub use crate::time::*;
}

pub use error::SimulationError;
