mod id;
mod load;

use crate::node::NodeId;

pub use self::{id::LinkId, load::LinkLoad};

/// An undirected connection between two distinct [`Node`]s.
///
/// The `capacity` is the maximum number of packets the link carries
/// during a single time slot, regardless of the direction they are
/// travelling in. It is fixed once the [`Topology`] is built.
///
/// [`Node`]: crate::node::Node
/// [`Topology`]: crate::topology::Topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    id: LinkId,
    capacity: u64,
}

impl Link {
    pub(crate) fn new(id: LinkId, capacity: u64) -> Self {
        Self { id, capacity }
    }

    #[inline]
    pub fn id(&self) -> LinkId {
        self.id
    }

    /// Returns the two ends of the link, smaller [`NodeId`] first.
    #[inline]
    pub fn nodes(&self) -> (NodeId, NodeId) {
        self.id.into_nodes()
    }

    /// Maximum number of packets per time slot.
    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }
}
