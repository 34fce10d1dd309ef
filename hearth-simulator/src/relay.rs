//! ## hearth-simulator::relay
//! **Latency-aware message relay between nodes**
//!
//! A relay computes the propagation delay between two nodes and schedules the
//! arrival at the receiver. Multi-hop latency composes from successive relays.

use tracing::trace;

use hearth_core::network::{Address, DistanceLatencyModel, PropagationModel};
use hearth_core::scheduler::{EventHandle, Scheduler};
use hearth_core::SimulationError;

use crate::network::Network;
use crate::process::Process;

pub struct Relay {
    model: Box<dyn PropagationModel>,
}

impl Relay {
    pub fn new(model: impl PropagationModel + 'static) -> Self {
        Self {
            model: Box::new(model),
        }
    }

    /// Relay whose delay is distance times `hours_per_unit`.
    pub fn with_signal_slowness(hours_per_unit: f64) -> Self {
        Self::new(DistanceLatencyModel::new(hours_per_unit))
    }

    /// Propagation delay (hours) between two nodes.
    pub fn delay(
        &self,
        network: &Network,
        from: Address,
        to: Address,
    ) -> Result<f64, SimulationError> {
        let from = network.node(from)?.location();
        let to = network.node(to)?.location();
        Ok(self.model.delay(&from, &to))
    }

    /// Schedules delivery of `interaction` from `from` to `to`.
    pub fn send(
        &self,
        scheduler: &mut Scheduler<Process>,
        network: &Network,
        interaction: usize,
        sender: Address,
        from: Address,
        to: Address,
    ) -> Result<EventHandle, SimulationError> {
        let delay = self.delay(network, from, to)?;
        trace!(interaction, %from, %to, delay, "Relaying");
        scheduler.schedule(
            delay,
            Process::Deliver {
                interaction,
                sender,
                from,
                to,
            },
        )
    }
}
