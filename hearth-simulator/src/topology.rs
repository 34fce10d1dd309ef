//! ## hearth-simulator::topology
//! **Network assembly from configuration**
//!
//! Servers are scattered uniformly over the placement bounds. Each user gets a home,
//! also placed uniformly, where all of their controller/device pairs live. Every
//! pair is wired through `hops` distinct servers drawn from the pool.

use rand::seq::index;
use rand::Rng;
use tracing::debug;
use validator::Validate;

use hearth_config::{PlacementBounds, SimulationConfig};
use hearth_core::distribution::{NonNegativeNormal, PositiveNormal};
use hearth_core::network::{Address, Location};
use hearth_core::SimulationError;

use crate::network::Network;
use crate::user::User;

fn place<R: Rng + ?Sized>(rng: &mut R, bounds: &PlacementBounds) -> Location {
    Location::new(
        rng.random_range(bounds.min_x..=bounds.max_x),
        rng.random_range(bounds.min_y..=bounds.max_y),
    )
}

/// Builds the device graph and user population described by `config`.
pub fn assemble<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<(Network, Vec<User>), SimulationError> {
    config
        .validate()
        .map_err(|errors| SimulationError::Config(errors.to_string()))?;

    let response = PositiveNormal::new(config.response_time_mean, config.response_time_stdev)?;
    let devices_per_user =
        NonNegativeNormal::new(config.devices_per_user_mean, config.devices_per_user_stdev)?;
    let daily =
        NonNegativeNormal::new(config.daily_interactions_mean, config.daily_interactions_stdev)?;

    let mut network = Network::new();
    let servers = (0..config.num_servers)
        .map(|_| {
            let location = place(rng, &config.bounds);
            network.add_server(location, config.server_capacity, response)
        })
        .collect::<Result<Vec<Address>, _>>()?;

    let mut users = Vec::with_capacity(config.num_users);
    for id in 0..config.num_users {
        let mut user = User::new(id, daily);
        let home = place(rng, &config.bounds);
        let pairs = devices_per_user.sample_count(rng)?;

        for _ in 0..pairs {
            let device = network.add_toggle_device(home);
            let chain: Vec<Address> = index::sample(rng, servers.len(), config.hops)
                .iter()
                .map(|i| servers[i])
                .collect();
            let controller = network.add_controller(home, chain[0])?;

            for (i, &server) in chain.iter().enumerate() {
                let next = chain.get(i + 1).copied().unwrap_or(device);
                network.connect(server, controller, next)?;
            }
            user.add_pair(controller, device);
        }
        users.push(user);
    }

    debug!(
        nodes = network.len(),
        servers = servers.len(),
        users = users.len(),
        "Assembled network"
    );
    Ok((network, users))
}
