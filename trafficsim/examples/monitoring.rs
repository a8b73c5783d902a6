//! Monitoring example: use Simulation::stats() to inspect the network state.
//!
//! Runs one full cycle of the demo network and prints, after every slot,
//! the busiest link and the node with the longest queue.
//!
//! Run with:
//!   cargo run --example monitoring -p trafficsim

use anyhow::Result;
use trafficsim::{Scenario, Simulation};

fn main() -> Result<()> {
    let mut simulation = Simulation::from_scenario(Scenario::demo());
    simulation.set_seed(2024);

    for _ in 0..simulation.schedule().len() {
        let slot = simulation.step();
        let stats = simulation.stats();

        println!("=== {slot} ===");
        if let Some(link) = stats
            .links
            .iter()
            .max_by(|a, b| a.utilisation().total_cmp(&b.utilisation()))
        {
            println!(
                "  busiest link {}-{}: {}/{} ({:.0}%)",
                link.names.0,
                link.names.1,
                link.load,
                link.capacity,
                link.utilisation() * 100.0
            );
        }
        if let Some(node) = stats.nodes.iter().max_by_key(|node| node.queue_length) {
            println!("  longest queue at {}: {}", node.name, node.queue_length);
        }
        println!("  total waiting: {}", stats.queued());
    }

    println!();
    println!("{:?}", simulation.packets());

    Ok(())
}
