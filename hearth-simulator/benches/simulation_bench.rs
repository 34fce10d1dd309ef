#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};
use hearth_config::SimulationConfig;
use hearth_simulator::Simulation;

/// Benchmark a full day of a mid-sized neighbourhood.
fn benchmark_simulation_throughput(c: &mut Criterion) {
    let config = SimulationConfig {
        num_users: 200,
        num_servers: 8,
        hops: 2,
        horizon_hours: 24.0,
        ..Default::default()
    };

    c.bench_function("simulation_one_day_200_users", |b| {
        b.iter(|| {
            let mut simulation = Simulation::new(black_box(&config)).unwrap();
            black_box(simulation.run().unwrap());
        })
    });
}

/// Saturated single server: every request queues.
fn benchmark_contended_server(c: &mut Criterion) {
    let config = SimulationConfig {
        num_users: 100,
        num_servers: 1,
        hops: 1,
        server_capacity: 1,
        daily_interactions_mean: 50.0,
        daily_interactions_stdev: 5.0,
        response_time_mean: 60.0 / 3600.0,
        response_time_stdev: 10.0 / 3600.0,
        horizon_hours: 24.0,
        ..Default::default()
    };

    c.bench_function("simulation_contended_server", |b| {
        b.iter(|| {
            let mut simulation = Simulation::new(&config).unwrap();
            black_box(simulation.run().unwrap());
        })
    });
}

criterion_group!(
    benches,
    benchmark_simulation_throughput,
    benchmark_contended_server
);
criterion_main!(benches);
