use crate::{
    link::{LinkId, LinkLoad},
    node::NodeId,
    path::Path,
    topology::Topology,
};
use std::collections::{BTreeMap, VecDeque};
use tracing::trace;

/// Outcome of [`Accountant::transmit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transmission {
    /// Every link of the path had spare capacity: the packet reached its
    /// destination within the slot.
    Delivered,
    /// The packet crossed `hops` links and was then blocked by a saturated
    /// link leaving `at`. What remained of its path is now in `at`'s backlog.
    Queued { at: NodeId, hops: usize },
    /// The packet crossed `hops` links and was then blocked at `at`, a node
    /// the topology does not know. It has no backlog to wait in and is lost.
    Dropped { at: NodeId, hops: usize },
}

/// What to do with the backlogs at the start of a new time slot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DrainPolicy {
    /// Keep every queued path where it is. Backlogs only ever grow.
    #[default]
    Retain,
    /// Transmit every queued path again, oldest first, before the slot's
    /// new traffic. Paths blocked again are queued at their new blocking
    /// node.
    Retry,
}

/// Summary of [`Accountant::drain`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Drained {
    /// number of queued paths transmitted again
    pub retried: u64,
    /// how many of them reached their destination
    pub delivered: u64,
}

/// Undelivered packets waiting at a node.
///
/// Every entry is the remainder of a packet's path, starting at the node
/// owning the backlog. Entries are kept in arrival order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Backlog {
    paths: VecDeque<Path>,
}

impl Backlog {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// queued paths, oldest first
    pub fn paths(&self) -> impl ExactSizeIterator<Item = &Path> {
        self.paths.iter()
    }

    fn push(&mut self, path: Path) {
        self.paths.push_back(path);
    }

    fn take(&mut self) -> VecDeque<Path> {
        std::mem::take(&mut self.paths)
    }
}

/// Keeps the books of the simulation: how loaded every link is during the
/// current slot and how many packets are stuck at every node.
///
/// Link loads are per slot and must be [`reset`](Accountant::reset_loads)
/// at the start of each one. Backlogs span the whole simulation and are
/// only emptied according to the [`DrainPolicy`].
#[derive(Debug, Clone)]
pub struct Accountant {
    loads: BTreeMap<LinkId, LinkLoad>,

    /// indexed by [`NodeId`]
    backlogs: Vec<Backlog>,
}

impl Accountant {
    /// Create the books for `topology`: every link unloaded, every backlog
    /// empty.
    pub fn new(topology: &Topology) -> Self {
        let loads = topology
            .links()
            .map(|link| (link.id(), LinkLoad::with_capacity(link.capacity())))
            .collect();
        let backlogs = vec![Backlog::default(); topology.len()];

        Self { loads, backlogs }
    }

    /// Start of a new slot: every link goes back to a zero load.
    ///
    /// Backlogs are not affected.
    pub fn reset_loads(&mut self) {
        self.loads.values_mut().for_each(LinkLoad::reset);
    }

    /// Walk `path` hop by hop, loading every link it crosses, until the
    /// destination or the first saturated link.
    ///
    /// When a link is saturated the remainder of the path, starting at the
    /// node the blocked hop leaves from, is appended to that node's backlog
    /// and the walk stops: links further down the path are not loaded even
    /// if they have spare capacity.
    ///
    /// A hop over a link unknown to the topology is treated as saturated.
    /// If the node it leaves from is unknown too, the packet is dropped and
    /// no backlog is created for it.
    ///
    /// # Example
    ///
    /// ```
    /// use trafficsim_core::{
    ///     accountant::{Accountant, Transmission},
    ///     route::Router,
    ///     topology::Topology,
    /// };
    ///
    /// let topology = Topology::builder()
    ///     .node("A")
    ///     .node("B")
    ///     .link("A", "B", 1)
    ///     .build()
    ///     .unwrap();
    /// let a = topology.node_id("A").unwrap();
    /// let b = topology.node_id("B").unwrap();
    /// let path = Router::new(&topology).route(a, b).unwrap();
    ///
    /// let mut accountant = Accountant::new(&topology);
    /// assert_eq!(accountant.transmit(&path), Transmission::Delivered);
    /// assert_eq!(
    ///     accountant.transmit(&path),
    ///     Transmission::Queued { at: a, hops: 0 },
    /// );
    /// assert_eq!(accountant.queue_lengths()[&a], 1);
    /// ```
    pub fn transmit(&mut self, path: &Path) -> Transmission {
        for (hop, (from, link)) in path.links().enumerate() {
            let crossed = match self.loads.get_mut(&link) {
                Some(load) => load.reserve(),
                None => false,
            };
            if crossed {
                continue;
            }

            let Some(backlog) = self.backlogs.get_mut(from.index()) else {
                trace!(%from, %path, "unknown node, packet dropped");
                return Transmission::Dropped { at: from, hops: hop };
            };
            trace!(%link, %from, %path, "link saturated, packet queued");
            backlog.push(path.remaining(hop));
            return Transmission::Queued { at: from, hops: hop };
        }

        Transmission::Delivered
    }

    /// Apply the drain `policy` to every backlog.
    ///
    /// Meant to be called at the start of a slot, after
    /// [`reset_loads`](Accountant::reset_loads) and before any new traffic
    /// is transmitted.
    pub fn drain(&mut self, policy: DrainPolicy) -> Drained {
        match policy {
            DrainPolicy::Retain => Drained::default(),
            DrainPolicy::Retry => {
                let mut queued = Vec::with_capacity(self.queued());
                for backlog in &mut self.backlogs {
                    queued.extend(backlog.take());
                }

                let mut drained = Drained::default();
                for path in queued {
                    drained.retried += 1;
                    if self.transmit(&path) == Transmission::Delivered {
                        drained.delivered += 1;
                    }
                }
                drained
            }
        }
    }

    /// Load of every link for the current slot, unloaded links included.
    pub fn link_loads(&self) -> BTreeMap<LinkId, u64> {
        self.loads
            .iter()
            .map(|(id, load)| (*id, load.used()))
            .collect()
    }

    pub fn link_load(&self, link: LinkId) -> Option<&LinkLoad> {
        self.loads.get(&link)
    }

    /// Number of queued paths at every node, empty backlogs included.
    pub fn queue_lengths(&self) -> BTreeMap<NodeId, usize> {
        self.backlogs
            .iter()
            .enumerate()
            .map(|(index, backlog)| (NodeId::new(index as u64), backlog.len()))
            .collect()
    }

    pub fn backlog(&self, node: NodeId) -> Option<&Backlog> {
        self.backlogs.get(node.index())
    }

    /// Total number of queued paths over every node.
    pub fn queued(&self) -> usize {
        self.backlogs.iter().map(Backlog::len).sum()
    }
}
