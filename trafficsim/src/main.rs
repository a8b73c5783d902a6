use anyhow::{Context as _, Result, ensure};
use clap::{Parser, ValueEnum};
use std::{fs, path::PathBuf};
use tracing::{Level, info};
use trafficsim::{
    DrainPolicy, Report, Scenario, Simulation,
    defaults::{DEFAULT_SEED, DEFAULT_STEPS},
};

/// Simulate packet traffic over a capacity limited network, one time slot
/// at a time, and print the link loads and node queues.
#[derive(Parser)]
#[command(version)]
struct Command {
    /// Scenario file (nodes, links and slots). Defaults to the demo network.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Number of time slots to simulate.
    #[arg(long, default_value_t = DEFAULT_STEPS)]
    steps: u64,

    /// Seed of the random destination picker.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// What to do with queued packets at the start of every slot.
    #[arg(long, value_enum, default_value_t = Drain::Retain)]
    drain: Drain,

    /// Print a report every `every` slots (the last slot is always printed).
    #[arg(long, default_value_t = 1)]
    every: u64,

    /// Increase logging verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Drain {
    /// Queued packets stay where they are.
    Retain,
    /// Queued packets are sent again before the new traffic.
    Retry,
}

impl From<Drain> for DrainPolicy {
    fn from(drain: Drain) -> Self {
        match drain {
            Drain::Retain => DrainPolicy::Retain,
            Drain::Retry => DrainPolicy::Retry,
        }
    }
}

fn main() -> Result<()> {
    let cmd = Command::parse();

    let level = match cmd.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    ensure!(cmd.every > 0, "--every must be at least 1");

    let scenario = match &cmd.scenario {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?
            .parse::<Scenario>()
            .with_context(|| format!("Invalid scenario {}", path.display()))?,
        None => Scenario::demo(),
    };
    info!(
        nodes = scenario.topology().len(),
        links = scenario.topology().links().len(),
        slots = scenario.schedule().len(),
        seed = cmd.seed,
        drain = ?cmd.drain,
        "starting simulation"
    );

    let mut simulation = Simulation::from_scenario(scenario);
    simulation.set_seed(cmd.seed);
    simulation.set_drain_policy(cmd.drain.into());

    for step in 1..=cmd.steps {
        simulation.step();
        if step % cmd.every == 0 || step == cmd.steps {
            println!("{}\n", Report::new(&simulation.stats()));
        }
    }

    let packets = simulation.packets();
    info!(
        generated = packets.generated,
        delivered = packets.delivered,
        queued = packets.queued,
        dropped = packets.dropped,
        "simulation finished"
    );

    Ok(())
}
