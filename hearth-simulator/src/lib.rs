// hearth-simulator/src/lib.rs

/*!
# Hearth Simulator

Deterministic discrete-event model of a home-automation network. Users press manual
controllers; each press travels through one or more capacity-limited servers to a
toggle device, and the round-trip wait is recorded in virtual time.

## Key Components:
- **Nodes and Network:** toggle devices, controllers and servers linked into pipelines.
- **Relay:** distance-based propagation delay between hops.
- **Activity Profile:** time-of-day weighting of interactions.
- **Simulation:** the run driver, dispatching continuations from the scheduler.
- **Report:** wait series, server load series and summary statistics.
*/

pub mod activity;
pub mod network;
pub mod node;
pub mod process;
pub mod relay;
pub mod report;
pub mod simulation;
pub mod topology;
pub mod user;

pub use activity::ActivityProfile;
pub use network::Network;
pub use node::{LoadSample, Node, Reception};
pub use relay::Relay;
pub use report::{SimulationReport, WaitStats};
pub use simulation::{RunSettings, Simulation};
pub use user::{User, UserPhase, WaitSample};
