use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use validator::Validate;

use hearth_config::HearthConfig;
use hearth_simulator::{Simulation, SimulationReport};
use hearth_telemetry::logging::EventLogger;
use hearth_telemetry::metrics::MetricsRecorder;

type CliResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

const SECONDS_PER_HOUR: f64 = 3600.0;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one simulation and print its summary
    Simulate(SimulateArgs),
    /// Load and validate configuration without running
    Validate(ValidateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Configuration file; defaults to config/hearth.yaml plus HEARTH_* overrides.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Override the configured random seed.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Override the configured horizon (hours).
    #[arg(long)]
    pub horizon_hours: Option<f64>,
    /// Write the full report (wait and load series) as YAML.
    #[arg(short, long)]
    pub report: Option<PathBuf>,
    /// Print Prometheus metrics after the run.
    #[arg(long)]
    pub metrics: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Configuration file; defaults to config/hearth.yaml plus HEARTH_* overrides.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<HearthConfig, hearth_config::ConfigError> {
    match path {
        Some(path) => HearthConfig::load_from_path(path),
        None => HearthConfig::load(),
    }
}

/// Applies command-line overrides and re-checks the result.
fn apply_overrides(config: &mut HearthConfig, args: &SimulateArgs) -> CliResult {
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(horizon) = args.horizon_hours {
        config.simulation.horizon_hours = horizon;
    }
    config.validate()?;
    Ok(())
}

pub fn run_simulate(args: SimulateArgs) -> CliResult {
    let mut config = load_config(args.config.as_ref())?;
    apply_overrides(&mut config, &args)?;
    EventLogger::init(&config.telemetry.log_level);

    info!(
        seed = config.simulation.seed,
        users = config.simulation.num_users,
        servers = config.simulation.num_servers,
        "Assembling simulation"
    );
    let mut simulation = Simulation::new(&config.simulation)?;
    let report = simulation.run()?;

    print_summary(&report);

    if let Some(path) = &args.report {
        fs::write(path, serde_yaml::to_string(&report)?)?;
        info!(path = %path.display(), "Report written");
    }

    if args.metrics || config.telemetry.metrics {
        let metrics = MetricsRecorder::new()?;
        report.record_metrics(&metrics);
        println!("{}", metrics.gather_metrics()?);
    }
    Ok(())
}

pub fn run_validate(args: ValidateArgs) -> CliResult {
    let config = load_config(args.config.as_ref())?;
    EventLogger::init(&config.telemetry.log_level);
    println!(
        "Configuration valid: {} users, {} servers, {} hop(s), horizon {} h",
        config.simulation.num_users,
        config.simulation.num_servers,
        config.simulation.hops,
        config.simulation.horizon_hours
    );
    Ok(())
}

fn print_summary(report: &SimulationReport) {
    let stats = &report.stats;
    println!("seed:        {}", report.seed);
    println!("horizon:     {} h", report.horizon_hours);
    println!("issued:      {}", report.issued);
    println!("completed:   {}", report.completed);
    println!("truncated:   {}", report.truncated_interactions);
    println!("events:      {}", report.events_processed);
    println!("max wait:    {:.3} s", stats.max * SECONDS_PER_HOUR);
    println!("mean wait:   {:.3} s", stats.mean * SECONDS_PER_HOUR);
    println!("p50 wait:    {:.3} s", stats.p50 * SECONDS_PER_HOUR);
    println!("p95 wait:    {:.3} s", stats.p95 * SECONDS_PER_HOUR);
}
