//! ## hearth-cli
//! **Command-line entry point for latency experiments**
//!
//! Loads layered configuration, runs one simulation and prints its summary.

use clap::Parser;

mod commands;

use commands::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(sim_args) => commands::run_simulate(sim_args),
        Commands::Validate(validate_args) => commands::run_validate(validate_args),
    }
}
