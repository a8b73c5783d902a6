/*!
# Traffic Simulator

Run slot based traffic simulations and render their state as text. The
simulation itself lives in [`trafficsim_core`]; this crate re-exports it
and adds [`Report`], a plain text rendering of a [`SimStats`] snapshot.

*/

pub mod report;

// convenient re-export of `trafficsim_core` core objects
pub use trafficsim_core::{
    DrainPolicy, Link, LinkId, LinkStats, Node, NodeId, NodeStats, PacketCounters, Scenario,
    ScenarioError, Schedule, SimStats, Simulation, Topology, defaults,
};

pub use self::report::Report;
