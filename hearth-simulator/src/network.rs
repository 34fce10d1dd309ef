//! ## hearth-simulator::network
//! **Device graph: node storage, connections and pipeline checks**
//!
//! Addresses are handed out sequentially and double as indices into the node table,
//! so lookups never hash and iteration order is deterministic.

use std::collections::BTreeSet;

use hearth_core::distribution::PositiveNormal;
use hearth_core::network::{Address, Location};
use hearth_core::SimulationError;

use crate::node::{Controller, Node, Server, ToggleDevice};

#[derive(Debug, Default)]
pub struct Network {
    nodes: Vec<Node>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn next_address(&self) -> Address {
        Address(self.nodes.len() as u64)
    }

    pub fn add_toggle_device(&mut self, location: Location) -> Address {
        let address = self.next_address();
        self.nodes
            .push(Node::ToggleDevice(ToggleDevice::new(address, location)));
        address
    }

    /// Adds a controller bound to `server`, which must already exist.
    pub fn add_controller(
        &mut self,
        location: Location,
        server: Address,
    ) -> Result<Address, SimulationError> {
        self.server(server)?;
        let address = self.next_address();
        self.nodes
            .push(Node::Controller(Controller::new(address, location, server)));
        Ok(address)
    }

    pub fn add_server(
        &mut self,
        location: Location,
        capacity: usize,
        response: PositiveNormal,
    ) -> Result<Address, SimulationError> {
        let address = self.next_address();
        let server = Server::new(address, location, capacity, response)?;
        self.nodes.push(Node::Server(server));
        Ok(address)
    }

    /// Routes communications that `server` receives on behalf of `sender` to
    /// `destination`. Connections are fixed once the run starts.
    pub fn connect(
        &mut self,
        server: Address,
        sender: Address,
        destination: Address,
    ) -> Result<(), SimulationError> {
        self.node(destination)?;
        self.node(sender)?;
        self.server_mut(server)?.register(sender, destination);
        Ok(())
    }

    pub fn node(&self, address: Address) -> Result<&Node, SimulationError> {
        self.nodes
            .get(address.0 as usize)
            .ok_or(SimulationError::UnknownAddress(address))
    }

    pub fn node_mut(&mut self, address: Address) -> Result<&mut Node, SimulationError> {
        self.nodes
            .get_mut(address.0 as usize)
            .ok_or(SimulationError::UnknownAddress(address))
    }

    pub fn server(&self, address: Address) -> Result<&Server, SimulationError> {
        match self.node(address)? {
            Node::Server(server) => Ok(server),
            _ => Err(SimulationError::WrongNodeKind(address)),
        }
    }

    pub fn server_mut(&mut self, address: Address) -> Result<&mut Server, SimulationError> {
        match self.node_mut(address)? {
            Node::Server(server) => Ok(server),
            _ => Err(SimulationError::WrongNodeKind(address)),
        }
    }

    pub fn controller(&self, address: Address) -> Result<&Controller, SimulationError> {
        match self.node(address)? {
            Node::Controller(controller) => Ok(controller),
            _ => Err(SimulationError::WrongNodeKind(address)),
        }
    }

    pub fn device(&self, address: Address) -> Result<&ToggleDevice, SimulationError> {
        match self.node(address)? {
            Node::ToggleDevice(device) => Ok(device),
            _ => Err(SimulationError::WrongNodeKind(address)),
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn servers(&self) -> impl Iterator<Item = &Server> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Server(server) => Some(server),
            _ => None,
        })
    }

    pub fn devices(&self) -> impl Iterator<Item = &ToggleDevice> {
        self.nodes.iter().filter_map(|node| match node {
            Node::ToggleDevice(device) => Some(device),
            _ => None,
        })
    }

    pub fn controllers(&self) -> impl Iterator<Item = (Address, &Controller)> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Controller(controller) => Some((node.address(), controller)),
            _ => None,
        })
    }

    /// Follows the pipeline of `controller` hop by hop and returns every address on
    /// it, controller first and toggle device last.
    pub fn pipeline(&self, controller: Address) -> Result<Vec<Address>, SimulationError> {
        let mut path = vec![controller];
        let mut visited = BTreeSet::new();
        let mut current = self.controller(controller)?.server();

        loop {
            path.push(current);
            match self.node(current)? {
                Node::ToggleDevice(_) => return Ok(path),
                Node::Controller(_) => {
                    return Err(SimulationError::DeadEndPipeline {
                        controller,
                        at: current,
                    })
                }
                Node::Server(server) => {
                    if !visited.insert(current) {
                        return Err(SimulationError::CyclicPipeline(controller));
                    }
                    current = server.route(controller)?;
                }
            }
        }
    }

    /// Checks that every controller's pipeline is a simple chain ending at a device.
    pub fn validate(&self) -> Result<(), SimulationError> {
        for (address, _) in self.controllers() {
            self.pipeline(address)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> PositiveNormal {
        PositiveNormal::new(1.0, 0.0).unwrap()
    }

    #[test]
    fn two_hop_pipeline() {
        let mut network = Network::new();
        let first = network.add_server(Location::new(1.0, 0.0), 1, response()).unwrap();
        let second = network.add_server(Location::new(2.0, 0.0), 1, response()).unwrap();
        let device = network.add_toggle_device(Location::ORIGIN);
        let controller = network.add_controller(Location::ORIGIN, first).unwrap();
        network.connect(first, controller, second).unwrap();
        network.connect(second, controller, device).unwrap();

        assert_eq!(
            network.pipeline(controller).unwrap(),
            vec![controller, first, second, device]
        );
        assert!(network.validate().is_ok());
        assert_eq!(network.servers().count(), 2);
        assert_eq!(network.devices().count(), 1);
    }

    #[test]
    fn detects_cycles() {
        let mut network = Network::new();
        let a = network.add_server(Location::ORIGIN, 1, response()).unwrap();
        let b = network.add_server(Location::ORIGIN, 1, response()).unwrap();
        let controller = network.add_controller(Location::ORIGIN, a).unwrap();
        network.connect(a, controller, b).unwrap();
        network.connect(b, controller, a).unwrap();

        assert_eq!(
            network.validate(),
            Err(SimulationError::CyclicPipeline(controller))
        );
    }

    #[test]
    fn missing_route_is_reported() {
        let mut network = Network::new();
        let server = network.add_server(Location::ORIGIN, 1, response()).unwrap();
        let controller = network.add_controller(Location::ORIGIN, server).unwrap();
        assert_eq!(
            network.validate(),
            Err(SimulationError::UnroutedSender {
                server,
                sender: controller
            })
        );
    }

    #[test]
    fn pipeline_ending_at_controller_is_a_dead_end() {
        let mut network = Network::new();
        let server = network.add_server(Location::ORIGIN, 1, response()).unwrap();
        let controller = network.add_controller(Location::ORIGIN, server).unwrap();
        network.connect(server, controller, controller).unwrap();
        assert_eq!(
            network.pipeline(controller),
            Err(SimulationError::DeadEndPipeline {
                controller,
                at: controller
            })
        );
    }

    #[test]
    fn rejects_bad_addresses_and_kinds() {
        let mut network = Network::new();
        let device = network.add_toggle_device(Location::ORIGIN);
        assert_eq!(
            network.add_controller(Location::ORIGIN, device).unwrap_err(),
            SimulationError::WrongNodeKind(device)
        );
        assert_eq!(
            network.add_controller(Location::ORIGIN, Address(42)).unwrap_err(),
            SimulationError::UnknownAddress(Address(42))
        );
        assert_eq!(
            network.add_server(Location::ORIGIN, 0, response()).unwrap_err(),
            SimulationError::InvalidCapacity(0)
        );
    }
}
