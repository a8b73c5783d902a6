/*!
# Traffic simulation core

Deterministic, slot based simulation of packet traffic over a small static
network. Every time slot, the nodes originate packets according to a
[`Schedule`], each packet follows the shortest path to a random
destination, and links carry at most their capacity per slot. Packets
blocked by a saturated link wait in the backlog of the node they were
blocked at.

```
use trafficsim_core::{Scenario, Simulation};

let mut simulation = Simulation::from_scenario(Scenario::demo());
simulation.set_seed(42);

for _ in 0..4 {
    let slot = simulation.step();
    let stats = simulation.stats();
    println!("{slot}: {} packets waiting", stats.queued());
}
```

The simulation is single threaded and fully reproducible: the only source
of randomness is the seedable random source given to the [`Simulation`].
*/

pub mod accountant;
pub mod defaults;
pub mod link;
pub mod node;
pub mod path;
pub mod route;
pub mod scenario;
pub mod schedule;
pub mod simulation;
pub mod stats;
pub mod topology;

pub use self::{
    accountant::{Accountant, DrainPolicy, Transmission},
    link::{Link, LinkId},
    node::{Node, NodeId},
    path::Path,
    route::{RouteError, Router},
    scenario::{Scenario, ScenarioError},
    schedule::{Schedule, ScheduleError, TimeSlot},
    simulation::Simulation,
    stats::{LinkStats, NodeStats, PacketCounters, SimStats},
    topology::{Topology, TopologyError},
};
