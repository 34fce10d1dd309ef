//! ## hearth-simulator::node
//! **Typed network nodes and their reaction to an incoming communication**
//!
//! A node is one of three closed kinds. All of them share a single entry point,
//! [`Node::receive`], whose [`Reception`] tells the driver what to schedule next.

use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;

use hearth_core::distribution::PositiveNormal;
use hearth_core::network::{Address, Location};
use hearth_core::resource::{Acquisition, CapacityResource, Grant};
use hearth_core::SimulationError;

/// Occupancy of a server at one instant (hours).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadSample {
    pub time: f64,
    pub occupancy: usize,
}

/// A request parked on, or being served by, a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceRequest {
    /// Key of the interaction in flight.
    pub interaction: usize,
    /// Controller on whose behalf the communication travels.
    pub sender: Address,
    /// Slots held when the request arrived, before it was admitted or queued.
    pub occupancy_at_request: usize,
}

/// What a node did with an incoming communication.
#[derive(Debug, PartialEq)]
pub enum Reception {
    /// A toggle device flipped; `on` is its new state.
    Toggled { on: bool },
    /// A controller received a communication. Controllers only send.
    Ignored,
    /// A server admitted the request; service can start now.
    Granted(ServiceRequest, Grant),
    /// A server is saturated; the request waits in line.
    Queued { position: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToggleDevice {
    address: Address,
    location: Location,
    on: bool,
    toggles: u64,
}

impl ToggleDevice {
    pub fn new(address: Address, location: Location) -> Self {
        Self {
            address,
            location,
            on: false,
            toggles: 0,
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Number of times this device has been flipped.
    pub fn toggles(&self) -> u64 {
        self.toggles
    }

    fn toggle(&mut self) -> bool {
        self.on = !self.on;
        self.toggles += 1;
        self.on
    }
}

/// Manual controller bound to the first server of its pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Controller {
    address: Address,
    location: Location,
    server: Address,
}

impl Controller {
    pub fn new(address: Address, location: Location, server: Address) -> Self {
        Self {
            address,
            location,
            server,
        }
    }

    /// Server every communication from this controller is sent to.
    pub fn server(&self) -> Address {
        self.server
    }
}

#[derive(Debug)]
pub struct Server {
    address: Address,
    location: Location,
    slots: CapacityResource<ServiceRequest>,
    response: PositiveNormal,
    routes: BTreeMap<Address, Address>,
    load: Vec<LoadSample>,
    served: u64,
}

impl Server {
    pub fn new(
        address: Address,
        location: Location,
        capacity: usize,
        response: PositiveNormal,
    ) -> Result<Self, SimulationError> {
        Ok(Self {
            address,
            location,
            slots: CapacityResource::new(address.0, capacity)?,
            response,
            routes: BTreeMap::new(),
            load: Vec::new(),
            served: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn occupancy(&self) -> usize {
        self.slots.occupancy()
    }

    pub fn queue_len(&self) -> usize {
        self.slots.queue_len()
    }

    /// Occupancy samples in the order they were taken.
    pub fn load(&self) -> &[LoadSample] {
        &self.load
    }

    /// Requests that finished service.
    pub fn served(&self) -> u64 {
        self.served
    }

    pub fn peak_occupancy(&self) -> usize {
        self.load.iter().map(|s| s.occupancy).max().unwrap_or(0)
    }

    pub fn routes(&self) -> &BTreeMap<Address, Address> {
        &self.routes
    }

    /// Registers the next hop for communications sent on behalf of `sender`.
    /// Returns the previous hop, if any.
    pub(crate) fn register(&mut self, sender: Address, next: Address) -> Option<Address> {
        self.routes.insert(sender, next)
    }

    /// Next hop for `sender`.
    pub fn route(&self, sender: Address) -> Result<Address, SimulationError> {
        self.routes
            .get(&sender)
            .copied()
            .ok_or(SimulationError::UnroutedSender {
                server: self.address,
                sender,
            })
    }

    fn receive(&mut self, now: f64, interaction: usize, sender: Address) -> Reception {
        let occupancy_at_request = self.slots.occupancy();
        self.sample_load(now);

        let request = ServiceRequest {
            interaction,
            sender,
            occupancy_at_request,
        };
        match self.slots.acquire(request) {
            Acquisition::Granted(request, grant) => {
                self.sample_load(now);
                Reception::Granted(request, grant)
            }
            Acquisition::Queued { position } => Reception::Queued { position },
        }
    }

    /// Frees the slot held by `grant`. When a request was waiting, it is admitted and
    /// returned so its service can start.
    pub fn release(
        &mut self,
        now: f64,
        grant: Grant,
    ) -> Result<Option<(ServiceRequest, Grant)>, SimulationError> {
        let next = self.slots.release(grant)?;
        self.served += 1;
        if next.is_some() {
            self.sample_load(now);
        }
        Ok(next)
    }

    /// Samples a service time (hours) for `request`, scaled by
    /// `1 + occupancy_at_request / capacity` when `congestion_scaling` is set.
    pub fn service_time<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        request: &ServiceRequest,
        congestion_scaling: bool,
    ) -> Result<f64, SimulationError> {
        let base = self.response.sample(rng)?;
        if !congestion_scaling {
            return Ok(base);
        }
        let factor = 1.0 + request.occupancy_at_request as f64 / self.capacity() as f64;
        Ok(base * factor)
    }

    fn sample_load(&mut self, time: f64) {
        self.load.push(LoadSample {
            time,
            occupancy: self.slots.occupancy(),
        });
    }
}

/// A node of the device graph.
#[derive(Debug)]
pub enum Node {
    ToggleDevice(ToggleDevice),
    Controller(Controller),
    Server(Server),
}

impl Node {
    pub fn address(&self) -> Address {
        match self {
            Node::ToggleDevice(d) => d.address,
            Node::Controller(c) => c.address,
            Node::Server(s) => s.address,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Node::ToggleDevice(d) => d.location,
            Node::Controller(c) => c.location,
            Node::Server(s) => s.location,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Node::ToggleDevice(_) => "toggle_device",
            Node::Controller(_) => "controller",
            Node::Server(_) => "server",
        }
    }

    /// Handles a communication arriving at `now` (hours) for `interaction`, sent on
    /// behalf of controller `sender`.
    pub fn receive(&mut self, now: f64, interaction: usize, sender: Address) -> Reception {
        match self {
            Node::ToggleDevice(device) => Reception::Toggled {
                on: device.toggle(),
            },
            Node::Controller(_) => Reception::Ignored,
            Node::Server(server) => server.receive(now, interaction, sender),
        }
    }
}
