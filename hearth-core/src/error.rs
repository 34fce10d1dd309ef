use thiserror::Error;

use crate::network::Address;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("Invalid scheduling delay: {0} hours")]
    InvalidDelay(f64),

    #[error(
        "Degenerate distribution (mean {mean}, stdev {stdev}): \
         no acceptable sample after {attempts} attempts"
    )]
    DegenerateDistribution { mean: f64, stdev: f64, attempts: u32 },

    #[error("Server {server} has no route registered for sender {sender}")]
    UnroutedSender { server: Address, sender: Address },

    #[error("Simulation run already completed")]
    RunAlreadyCompleted,

    #[error("Pipeline of controller {0} contains a cycle")]
    CyclicPipeline(Address),

    #[error("Pipeline of controller {controller} ends at {at}, which is not a toggle device")]
    DeadEndPipeline { controller: Address, at: Address },

    #[error("Controller {controller} does not reach device {device}")]
    MismatchedPair { controller: Address, device: Address },

    #[error("Unknown node address: {0}")]
    UnknownAddress(Address),

    #[error("Node {0} has the wrong kind for this operation")]
    WrongNodeKind(Address),

    #[error("Unknown user: {0}")]
    UnknownUser(usize),

    #[error("Invalid capacity: {0} (must be at least 1)")]
    InvalidCapacity(usize),

    #[error("Grant was issued by resource {issuer}, not {resource}")]
    ForeignGrant { issuer: u64, resource: u64 },

    #[error("Configuration error: {0}")]
    Config(String),
}
