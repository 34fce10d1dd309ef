//! End-to-end latency scenarios with hand-built networks.

use hearth_config::ActivityConfig;
use hearth_core::distribution::{NonNegativeNormal, PositiveNormal};
use hearth_core::network::{Address, Location};
use hearth_core::SimulationError;
use hearth_simulator::{ActivityProfile, Network, Relay, RunSettings, Simulation, User};

const SECOND: f64 = 1.0 / 3600.0;

fn quiet_user(id: usize) -> User {
    User::new(id, NonNegativeNormal::new(0.0, 0.0).unwrap())
}

fn activity() -> ActivityProfile {
    ActivityProfile::new(&ActivityConfig::default()).unwrap()
}

fn settings(horizon_hours: f64, congestion_scaling: bool) -> RunSettings {
    RunSettings {
        seed: 7,
        horizon_hours,
        congestion_scaling,
    }
}

/// Controller and device at the origin, wired through servers at `hops`.
fn chain(hops: &[Location], capacity: usize, response: f64) -> (Network, User) {
    let mut network = Network::new();
    let servers: Vec<Address> = hops
        .iter()
        .map(|&location| {
            network
                .add_server(location, capacity, PositiveNormal::new(response, 0.0).unwrap())
                .unwrap()
        })
        .collect();
    let device = network.add_toggle_device(Location::ORIGIN);
    let controller = network.add_controller(Location::ORIGIN, servers[0]).unwrap();
    for (i, &server) in servers.iter().enumerate() {
        let next = servers.get(i + 1).copied().unwrap_or(device);
        network.connect(server, controller, next).unwrap();
    }
    let mut user = quiet_user(0);
    user.add_pair(controller, device);
    (network, user)
}

fn waits(sim: &mut Simulation) -> Vec<f64> {
    let report = sim.run().unwrap();
    report.users[0].waits.iter().map(|w| w.wait).collect()
}

#[test]
fn zero_variance_round_trip() {
    let ratio = 0.001;
    let response = 0.01;
    let (network, user) = chain(&[Location::new(3.0, 4.0)], 1, response);
    let mut sim = Simulation::from_parts(
        network,
        vec![user],
        Relay::with_signal_slowness(ratio),
        activity(),
        settings(24.0, true),
    )
    .unwrap();
    sim.schedule_interaction(0, 1.0).unwrap();

    let waits = waits(&mut sim);
    assert_eq!(waits.len(), 1);
    let expected = 2.0 * 5.0 * ratio + response;
    assert!((waits[0] - expected).abs() < 1e-9, "wait {}", waits[0]);
}

#[test]
fn multi_hop_delays_compose() {
    let ratio = 0.001;
    let response = 0.01;
    // origin -> (0,3) -> (4,3) -> origin: 3 + 4 + 5 distance units.
    let (network, user) = chain(
        &[Location::new(0.0, 3.0), Location::new(4.0, 3.0)],
        1,
        response,
    );
    let mut sim = Simulation::from_parts(
        network,
        vec![user],
        Relay::with_signal_slowness(ratio),
        activity(),
        settings(24.0, true),
    )
    .unwrap();
    sim.schedule_interaction(0, 2.0).unwrap();

    let waits = waits(&mut sim);
    let expected = 12.0 * ratio + 2.0 * response;
    assert!((waits[0] - expected).abs() < 1e-9, "wait {}", waits[0]);

    let report = sim.report();
    assert!(report.servers.iter().all(|s| s.served == 1));
    assert_eq!(report.devices_on, 1);
}

#[test]
fn queued_request_waits_for_the_slot() {
    let service = 0.1;
    let (network, user) = chain(&[Location::ORIGIN], 1, service);
    let mut sim = Simulation::from_parts(
        network,
        vec![user],
        Relay::with_signal_slowness(0.0),
        activity(),
        settings(24.0, false),
    )
    .unwrap();
    sim.schedule_interaction(0, 1.0).unwrap();
    sim.schedule_interaction(0, 1.0).unwrap();

    let waits = waits(&mut sim);
    assert_eq!(waits.len(), 2);
    assert!((waits[0] - service).abs() < 1e-9);
    assert!((waits[1] - (waits[0] + service)).abs() < 1e-9);
}

#[test]
fn congestion_scaling_stretches_queued_service() {
    let service = 0.1;
    let (network, user) = chain(&[Location::ORIGIN], 1, service);
    let mut sim = Simulation::from_parts(
        network,
        vec![user],
        Relay::with_signal_slowness(0.0),
        activity(),
        settings(24.0, true),
    )
    .unwrap();
    sim.schedule_interaction(0, 1.0).unwrap();
    sim.schedule_interaction(0, 1.0).unwrap();

    let waits = waits(&mut sim);
    // The second request saw one busy slot out of one, so it holds for 2s.
    assert!((waits[0] - service).abs() < 1e-9);
    assert!((waits[1] - (waits[0] + 2.0 * service)).abs() < 1e-9);

    let report = sim.report();
    let load = &report.servers[0].load;
    assert!(load.iter().all(|s| s.occupancy <= 1));
    assert!(load.windows(2).all(|w| w[0].time <= w[1].time));
}

#[test]
fn fifo_service_order() {
    let service = 0.05;
    let (network, user) = chain(&[Location::ORIGIN], 1, service);
    let mut sim = Simulation::from_parts(
        network,
        vec![user],
        Relay::with_signal_slowness(0.0),
        activity(),
        settings(24.0, false),
    )
    .unwrap();
    for _ in 0..5 {
        sim.schedule_interaction(0, 3.0).unwrap();
    }

    let report = sim.run().unwrap();
    let samples = &report.users[0].waits;
    assert_eq!(samples.len(), 5);
    for (i, sample) in samples.iter().enumerate() {
        assert!((sample.wait - service * (i + 1) as f64).abs() < 1e-9);
    }
    // Five toggles leave the device on.
    assert_eq!(report.devices_on, 1);
}

#[test]
fn one_second_server_is_exact() {
    let (network, user) = chain(&[Location::ORIGIN], 1, SECOND);
    let mut sim = Simulation::from_parts(
        network,
        vec![user],
        Relay::with_signal_slowness(0.5),
        activity(),
        settings(48.0, true),
    )
    .unwrap();
    for at in [0.5, 1.0, 7.25, 19.0, 30.0] {
        sim.schedule_interaction(0, at).unwrap();
    }

    let waits = waits(&mut sim);
    assert_eq!(waits.len(), 5);
    assert!(waits.iter().all(|&w| w == SECOND));
}

#[test]
fn unrouted_sender_fails_assembly() {
    let mut network = Network::new();
    let server = network
        .add_server(Location::ORIGIN, 1, PositiveNormal::new(1.0, 0.0).unwrap())
        .unwrap();
    let device = network.add_toggle_device(Location::ORIGIN);
    let controller = network.add_controller(Location::ORIGIN, server).unwrap();
    let mut user = quiet_user(0);
    user.add_pair(controller, device);

    let err = Simulation::from_parts(
        network,
        vec![user],
        Relay::with_signal_slowness(0.0),
        activity(),
        settings(1.0, true),
    )
    .err();
    assert_eq!(
        err,
        Some(SimulationError::UnroutedSender {
            server,
            sender: controller
        })
    );
}

#[test]
fn cyclic_pipeline_fails_assembly() {
    let mut network = Network::new();
    let response = PositiveNormal::new(1.0, 0.0).unwrap();
    let a = network.add_server(Location::ORIGIN, 1, response).unwrap();
    let b = network.add_server(Location::ORIGIN, 1, response).unwrap();
    let controller = network.add_controller(Location::ORIGIN, a).unwrap();
    network.connect(a, controller, b).unwrap();
    network.connect(b, controller, a).unwrap();

    let err = Simulation::from_parts(
        network,
        Vec::new(),
        Relay::with_signal_slowness(0.0),
        activity(),
        settings(1.0, true),
    )
    .err();
    assert_eq!(err, Some(SimulationError::CyclicPipeline(controller)));
}
