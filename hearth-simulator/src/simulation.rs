//! ## hearth-simulator::simulation
//! **Run driver: dispatches continuations over the device graph**
//!
//! The scheduler owns virtual time; the [`World`] owns everything the continuations
//! touch. One run drains every continuation due before the horizon, then anything
//! still in flight is discarded and counted as truncated.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use slab::Slab;
use tracing::{debug, info, instrument, trace, warn};

use hearth_config::SimulationConfig;
use hearth_core::network::Address;
use hearth_core::resource::Grant;
use hearth_core::scheduler::{EventHandle, Scheduler};
use hearth_core::time::{ticks_to_hours, HOURS_PER_DAY};
use hearth_core::SimulationError;
use hearth_telemetry::EventLogger;

use crate::activity::ActivityProfile;
use crate::network::Network;
use crate::node::{Node, Reception, ServiceRequest};
use crate::process::Process;
use crate::relay::Relay;
use crate::report::{ServerReport, SimulationReport, UserReport, WaitStats};
use crate::topology;
use crate::user::User;

/// Run-wide parameters that are not part of the topology.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSettings {
    pub seed: u64,
    pub horizon_hours: f64,
    pub congestion_scaling: bool,
}

impl From<&SimulationConfig> for RunSettings {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            seed: config.seed,
            horizon_hours: config.horizon_hours,
            congestion_scaling: config.congestion_scaling,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Ready,
    Completed,
}

/// An interaction between issue and completion.
#[derive(Debug, Clone, Copy)]
struct Interaction {
    user: usize,
    issued_ns: u64,
}

struct World {
    network: Network,
    users: Vec<User>,
    interactions: Slab<Interaction>,
    relay: Relay,
    activity: ActivityProfile,
    rng: ChaCha8Rng,
    congestion_scaling: bool,
    issued: u64,
    completed: u64,
}

impl World {
    fn handle(
        &mut self,
        scheduler: &mut Scheduler<Process>,
        process: Process,
    ) -> Result<(), SimulationError> {
        match process {
            Process::PlanDay { user } => self.plan_day(scheduler, user),
            Process::Interact { user } => self.interact(scheduler, user),
            Process::Deliver {
                interaction,
                sender,
                from,
                to,
            } => self.deliver(scheduler, interaction, sender, from, to),
            Process::ServiceComplete {
                interaction,
                sender,
                server,
                grant,
            } => self.complete_service(scheduler, interaction, sender, server, grant),
        }
    }

    fn user_mut(&mut self, user: usize) -> Result<&mut User, SimulationError> {
        self.users
            .get_mut(user)
            .ok_or(SimulationError::UnknownUser(user))
    }

    fn plan_day(
        &mut self,
        scheduler: &mut Scheduler<Process>,
        user: usize,
    ) -> Result<(), SimulationError> {
        let day_start = scheduler.now();
        let count = {
            let rng = &mut self.rng;
            let entry = self
                .users
                .get_mut(user)
                .ok_or(SimulationError::UnknownUser(user))?;
            entry.begin_day(rng)?
        };
        let instants = self.activity.sample_day(&mut self.rng, count)?;
        trace!(user, day_start, interactions = count, "Planning day");

        for instant in instants {
            let delay = (day_start + instant - scheduler.now()).max(0.0);
            scheduler.schedule(delay, Process::Interact { user })?;
        }

        self.user_mut(user)?.end_day();
        scheduler.schedule(HOURS_PER_DAY, Process::PlanDay { user })?;
        Ok(())
    }

    fn interact(
        &mut self,
        scheduler: &mut Scheduler<Process>,
        user: usize,
    ) -> Result<(), SimulationError> {
        let pair = {
            let rng = &mut self.rng;
            let entry = self
                .users
                .get(user)
                .ok_or(SimulationError::UnknownUser(user))?;
            entry.choose_pair(rng)
        };
        let Some(pair) = pair else {
            debug!(user, "User has no controllers, skipping interaction");
            return Ok(());
        };

        let interaction = self.interactions.insert(Interaction {
            user,
            issued_ns: scheduler.now_ns(),
        });
        self.issued += 1;

        let server = self.network.controller(pair.controller)?.server();
        self.relay.send(
            scheduler,
            &self.network,
            interaction,
            pair.controller,
            pair.controller,
            server,
        )?;
        Ok(())
    }

    fn deliver(
        &mut self,
        scheduler: &mut Scheduler<Process>,
        interaction: usize,
        sender: Address,
        from: Address,
        to: Address,
    ) -> Result<(), SimulationError> {
        let now = scheduler.now();
        match self.network.node_mut(to)?.receive(now, interaction, sender) {
            Reception::Toggled { on } => {
                trace!(interaction, device = %to, on, "Device toggled");
                self.finish(scheduler, interaction)
            }
            Reception::Ignored => {
                warn!(interaction, controller = %to, %from, "Controller received a communication");
                self.interactions.try_remove(interaction);
                Ok(())
            }
            Reception::Granted(request, grant) => {
                trace!(interaction, server = %to, "Slot granted");
                self.start_service(scheduler, to, request, grant)
            }
            Reception::Queued { position } => {
                trace!(interaction, server = %to, position, "Server saturated, queued");
                Ok(())
            }
        }
    }

    fn start_service(
        &mut self,
        scheduler: &mut Scheduler<Process>,
        server: Address,
        request: ServiceRequest,
        grant: Grant,
    ) -> Result<(), SimulationError> {
        let hold = self.network.server(server)?.service_time(
            &mut self.rng,
            &request,
            self.congestion_scaling,
        )?;
        scheduler.schedule(
            hold,
            Process::ServiceComplete {
                interaction: request.interaction,
                sender: request.sender,
                server,
                grant,
            },
        )?;
        Ok(())
    }

    fn complete_service(
        &mut self,
        scheduler: &mut Scheduler<Process>,
        interaction: usize,
        sender: Address,
        server: Address,
        grant: Grant,
    ) -> Result<(), SimulationError> {
        let now = scheduler.now();
        let (admitted, next) = {
            let entry = self.network.server_mut(server)?;
            (entry.release(now, grant)?, entry.route(sender)?)
        };
        if let Some((request, grant)) = admitted {
            trace!(interaction = request.interaction, server = %server, "Slot handed to waiter");
            self.start_service(scheduler, server, request, grant)?;
        }
        self.relay
            .send(scheduler, &self.network, interaction, sender, server, next)?;
        Ok(())
    }

    fn finish(
        &mut self,
        scheduler: &mut Scheduler<Process>,
        interaction: usize,
    ) -> Result<(), SimulationError> {
        let Some(done) = self.interactions.try_remove(interaction) else {
            warn!(interaction, "Completion for an unknown interaction");
            return Ok(());
        };
        let elapsed = scheduler.now_ns().saturating_sub(done.issued_ns);
        let wait = ticks_to_hours(elapsed);
        self.user_mut(done.user)?
            .record(ticks_to_hours(done.issued_ns), wait);
        self.completed += 1;
        Ok(())
    }
}

/// A configured, runnable simulation.
pub struct Simulation {
    settings: RunSettings,
    scheduler: Scheduler<Process>,
    world: World,
    state: RunState,
}

impl Simulation {
    /// Assembles the network and population described by `config`.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        let settings = RunSettings::from(config);
        let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);
        let (network, users) = topology::assemble(config, &mut rng)?;
        let relay = Relay::with_signal_slowness(config.signal_slowness);
        let activity = ActivityProfile::new(&config.activity)?;
        Self::build(network, users, relay, activity, settings, rng)
    }

    /// Runs a hand-built network. The pipelines are checked before anything is
    /// scheduled.
    pub fn from_parts(
        network: Network,
        users: Vec<User>,
        relay: Relay,
        activity: ActivityProfile,
        settings: RunSettings,
    ) -> Result<Self, SimulationError> {
        let rng = ChaCha8Rng::seed_from_u64(settings.seed);
        Self::build(network, users, relay, activity, settings, rng)
    }

    fn build(
        network: Network,
        users: Vec<User>,
        relay: Relay,
        activity: ActivityProfile,
        settings: RunSettings,
        rng: ChaCha8Rng,
    ) -> Result<Self, SimulationError> {
        network.validate()?;
        for pair in users.iter().flat_map(|u| u.pairs()) {
            network.device(pair.device)?;
            let path = network.pipeline(pair.controller)?;
            if path.last() != Some(&pair.device) {
                return Err(SimulationError::MismatchedPair {
                    controller: pair.controller,
                    device: pair.device,
                });
            }
        }

        // Continuations address users by position; `User::id` is only a label.
        let mut scheduler = Scheduler::new();
        for (index, user) in users.iter().enumerate() {
            if !user.pairs().is_empty() {
                scheduler.schedule(0.0, Process::PlanDay { user: index })?;
            }
        }

        Ok(Self {
            settings,
            scheduler,
            world: World {
                network,
                users,
                interactions: Slab::new(),
                relay,
                activity,
                rng,
                congestion_scaling: settings.congestion_scaling,
                issued: 0,
                completed: 0,
            },
            state: RunState::Ready,
        })
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Current virtual time in hours.
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    pub fn network(&self) -> &Network {
        &self.world.network
    }

    pub fn users(&self) -> &[User] {
        &self.world.users
    }

    /// Interactions currently in flight.
    pub fn in_flight(&self) -> usize {
        self.world.interactions.len()
    }

    /// Schedules an extra interaction for `user` at absolute time `at_hours`, on top
    /// of those drawn from the activity profile.
    pub fn schedule_interaction(
        &mut self,
        user: usize,
        at_hours: f64,
    ) -> Result<EventHandle, SimulationError> {
        if self.state == RunState::Completed {
            return Err(SimulationError::RunAlreadyCompleted);
        }
        if user >= self.world.users.len() {
            return Err(SimulationError::UnknownUser(user));
        }
        let delay = at_hours - self.scheduler.now();
        self.scheduler.schedule(delay, Process::Interact { user })
    }

    /// Drains every continuation due up to the horizon and reports the outcome.
    /// A simulation runs once; later calls fail with
    /// [`SimulationError::RunAlreadyCompleted`].
    #[instrument(skip(self), fields(seed = self.settings.seed, horizon = self.settings.horizon_hours))]
    pub fn run(&mut self) -> Result<SimulationReport, SimulationError> {
        if self.state == RunState::Completed {
            return Err(SimulationError::RunAlreadyCompleted);
        }
        self.state = RunState::Completed;

        info!(
            users = self.world.users.len(),
            nodes = self.world.network.len(),
            "Starting simulation"
        );
        let world = &mut self.world;
        let handled = self
            .scheduler
            .run_until(self.settings.horizon_hours, |scheduler, process| {
                world.handle(scheduler, process)
            })?;
        debug!(handled, pending = self.scheduler.pending(), "Horizon reached");

        let report = self.report();
        EventLogger::log_run_summary(
            report.completed,
            report.truncated_interactions,
            report.stats.max,
            report.stats.mean,
        );
        Ok(report)
    }

    /// Snapshot of the outputs collected so far.
    pub fn report(&self) -> SimulationReport {
        let world = &self.world;
        let users: Vec<UserReport> = world
            .users
            .iter()
            .map(|u| UserReport {
                id: u.id(),
                devices: u.pairs().len(),
                waits: u.waits().to_vec(),
            })
            .collect();
        let servers = world
            .network
            .nodes()
            .filter_map(|node| match node {
                Node::Server(server) => Some(ServerReport {
                    address: node.address(),
                    capacity: server.capacity(),
                    served: server.served(),
                    peak_occupancy: server.peak_occupancy(),
                    load: server.load().to_vec(),
                }),
                _ => None,
            })
            .collect();

        SimulationReport {
            seed: self.settings.seed,
            horizon_hours: self.settings.horizon_hours,
            issued: world.issued,
            completed: world.completed,
            truncated_interactions: world.interactions.len() as u64,
            events_processed: self.scheduler.processed(),
            devices_on: world.network.devices().filter(|d| d.is_on()).count(),
            stats: WaitStats::from_waits(users.iter().flat_map(|u| u.waits.iter().map(|w| w.wait))),
            users,
            servers,
        }
    }
}
