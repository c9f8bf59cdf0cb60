//! Vectorsim - Entry Point
//!
//! Runs an outbreak scenario from the default parameterization, printing one
//! metrics line per simulated day and optionally dumping the full history as
//! JSON for downstream analysis.

use clap::Parser;

use vectorsim::climate::{ClimateTable, SyntheticClimate};
use vectorsim::core::config::SimulationConfig;
use vectorsim::core::error::Result;
use vectorsim::simulation::Simulation;

/// Host-vector epidemic simulation runner
#[derive(Parser, Debug)]
#[command(name = "vectorsim")]
#[command(about = "Run an agent-based host-vector outbreak simulation")]
struct Args {
    /// Number of days to simulate
    #[arg(long, default_value_t = 365)]
    days: u32,

    /// Random seed for deterministic runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Host population size
    #[arg(long, default_value_t = 1000)]
    hosts: u32,

    /// Initial adult vector population size
    #[arg(long, default_value_t = 2000)]
    vectors: u32,

    /// Enable larval source management on its configured cadence
    #[arg(long)]
    lsm: bool,

    /// Enable ITN/IRS home protection from day one
    #[arg(long)]
    itn_irs: bool,

    /// Use constant weather (temperature C, precipitation mm) instead of the
    /// seasonal synthetic cycle, e.g. --constant-climate 25,10
    #[arg(long, value_delimiter = ',', num_args = 2)]
    constant_climate: Option<Vec<f64>>,

    /// Write the full daily metrics history to this file as JSON
    #[arg(long)]
    output: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vectorsim=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = SimulationConfig::default();
    config.seed = args.seed;
    config.population.hosts = args.hosts;
    config.population.vectors = args.vectors;
    config.control.lsm.enabled = args.lsm;
    config.control.itn_irs.enabled = args.itn_irs;

    let mut simulation = Simulation::new(config)?;

    let history = match &args.constant_climate {
        Some(values) => {
            let table = ClimateTable::constant(values[0], values[1], args.days as usize);
            simulation.run(args.days, &table)?
        }
        None => simulation.run(args.days, &SyntheticClimate::default())?,
    };

    println!("day  S     E     I     R     | vectors S/I   | larvae  sites");
    for m in &history {
        println!(
            "{:<4} {:<5} {:<5} {:<5} {:<5} | {:<6} {:<6} | {:<7} {}",
            m.day,
            m.hosts_susceptible,
            m.hosts_exposed,
            m.hosts_infectious,
            m.hosts_recovered,
            m.vectors_susceptible,
            m.vectors_infected,
            m.larval_count,
            m.active_breeding_sites,
        );
    }

    let peak = history.iter().max_by_key(|m| m.hosts_infectious);
    if let Some(peak) = peak {
        println!(
            "\nPeak: {} infectious hosts on day {}",
            peak.hosts_infectious, peak.day
        );
    }

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&history)?;
        std::fs::write(path, json)?;
        println!("Full history written to {path}");
    }

    Ok(())
}
