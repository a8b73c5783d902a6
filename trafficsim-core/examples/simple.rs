use trafficsim_core::{LinkId, schedule::Schedule, simulation::Simulation, topology::Topology};

fn main() -> anyhow::Result<()> {
    // A small triangle with one narrow link.
    let topology = Topology::builder()
        .node("A")
        .node("B")
        .node("C")
        .link("A", "B", 20)
        .link("B", "C", 5)
        .link("C", "A", 20)
        .build()?;

    let schedule = Schedule::builder(&topology)
        .slot("morning")
        .rate("A", 10)
        .rate("B", 30)
        .slot("night")
        .rate("C", 2)
        .build()?;

    let mut simulation = Simulation::new(topology, schedule)?;
    simulation.set_seed(7);

    for _ in 0..4 {
        let slot = simulation.step();
        println!("== {slot}");

        let topology = simulation.topology();
        let name = |id| topology.name(id).unwrap_or("?");
        for (link, load) in simulation.link_loads() {
            let (a, b) = LinkId::into_nodes(link);
            println!("  {}-{}: {load}", name(a), name(b));
        }
        for (node, queued) in simulation.queue_lengths() {
            println!("  {} queue: {queued}", name(node));
        }
    }

    Ok(())
}
