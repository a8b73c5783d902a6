//! Simulation statistics and observability types.
//!
//! [`SimStats`] provides a point-in-time snapshot of the simulation state,
//! in a form a presentation layer can render without touching the
//! simulation itself. Obtain one via [`Simulation::stats`].
//!
//! [`Simulation::stats`]: crate::simulation::Simulation::stats

use crate::{link::LinkId, node::NodeId};

/// Snapshot of statistics for a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStats {
    /// The node's identifier.
    pub id: NodeId,
    /// The name the node was declared with.
    pub name: String,
    /// Number of undelivered packets waiting at the node.
    pub queue_length: usize,
}

/// Snapshot of statistics for a single link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStats {
    /// The link identifier (ordered pair of node IDs).
    pub id: LinkId,
    /// Names of the two ends, in the order of [`LinkId::into_nodes`].
    pub names: (String, String),
    /// Maximum number of packets per slot.
    pub capacity: u64,
    /// Packets that crossed the link during the last processed slot.
    pub load: u64,
}

impl LinkStats {
    /// Fraction of the capacity used during the last processed slot,
    /// between `0.0` and `1.0`.
    pub fn utilisation(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.load as f64 / self.capacity as f64
        }
    }

    pub fn is_saturated(&self) -> bool {
        self.load >= self.capacity
    }
}

/// Packet counters accumulated since the simulation started.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PacketCounters {
    /// Packets originated by the schedule.
    pub generated: u64,
    /// Packets that reached their destination, retried ones included.
    pub delivered: u64,
    /// Newly generated packets that ended up in a backlog.
    pub queued: u64,
    /// Packets dropped because no route led to their destination.
    pub dropped: u64,
    /// Queued packets transmitted again by the drain policy.
    pub retried: u64,
}

/// Point-in-time snapshot of the entire simulation state.
#[derive(Debug, Clone, PartialEq)]
pub struct SimStats {
    /// Label of the last processed slot, `None` before the first step.
    pub slot: Option<String>,
    /// Number of steps taken so far.
    pub steps: u64,
    /// Per-node statistics, in [`NodeId`] order.
    pub nodes: Vec<NodeStats>,
    /// Per-link statistics, in [`LinkId`] order.
    pub links: Vec<LinkStats>,
    /// Counters over the whole run.
    pub packets: PacketCounters,
}

impl SimStats {
    /// Total number of packets waiting in every backlog.
    pub fn queued(&self) -> usize {
        self.nodes.iter().map(|node| node.queue_length).sum()
    }

    /// Links that reached their capacity during the last processed slot.
    pub fn saturated_links(&self) -> impl Iterator<Item = &LinkStats> {
        self.links.iter().filter(|link| link.is_saturated())
    }
}
