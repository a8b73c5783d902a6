//! Run the demo network with its traffic multiplied until links saturate,
//! and watch the backlogs grow.
//!
//! Run with:
//!   cargo run --example saturation -p trafficsim-core

use indicatif::ProgressBar;
use trafficsim_core::{DrainPolicy, Scenario, Simulation, defaults::DEMO_SCENARIO};

const STEPS: u64 = 1_000;

fn main() -> anyhow::Result<()> {
    // same network, three times the traffic
    let heavy = DEMO_SCENARIO
        .lines()
        .map(|line| {
            if line.starts_with("slot") {
                line.split_whitespace()
                    .map(|word| match word.split_once('=') {
                        Some((node, rate)) => rate
                            .parse::<u64>()
                            .map(|rate| format!("{node}={}", rate * 3))
                            .unwrap_or_else(|_| word.to_owned()),
                        None => word.to_owned(),
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            } else {
                line.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    let scenario: Scenario = heavy.parse()?;

    for policy in [DrainPolicy::Retain, DrainPolicy::Retry] {
        let mut simulation = Simulation::from_scenario(scenario.clone());
        simulation.set_drain_policy(policy);

        let pb = ProgressBar::new(STEPS);
        for _ in 0..STEPS {
            simulation.step();
            pb.inc(1);
        }
        pb.finish_with_message(format!("{policy:?} done"));

        let stats = simulation.stats();
        println!("{policy:?}: {:?}", stats.packets);
        for node in &stats.nodes {
            println!("  {} queue: {}", node.name, node.queue_length);
        }
        for link in stats.saturated_links() {
            println!("  {}-{} saturated", link.names.0, link.names.1);
        }
    }

    Ok(())
}
