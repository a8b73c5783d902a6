use crate::{link::LinkId, node::NodeId};
use std::fmt;

/// The ordered list of nodes a packet travels through.
///
/// A path always has at least one node: the origin. Consecutive nodes are
/// connected by a link of the topology the path was computed on. Paths are
/// produced by the [`Router`] for every packet and, when the packet gets
/// blocked, what remains of them is kept in a node's backlog.
///
/// [`Router`]: crate::route::Router
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path(pub(crate) Vec<NodeId>);

impl Path {
    /// Returns `None` if `nodes` is empty.
    pub fn new(nodes: Vec<NodeId>) -> Option<Self> {
        if nodes.is_empty() {
            None
        } else {
            Some(Self(nodes))
        }
    }

    #[inline]
    pub fn origin(&self) -> NodeId {
        self.0[0]
    }

    #[inline]
    pub fn destination(&self) -> NodeId {
        self.0[self.0.len() - 1]
    }

    /// Number of links crossed by the path.
    #[inline]
    pub fn hops(&self) -> usize {
        self.0.len() - 1
    }

    #[inline]
    pub fn nodes(&self) -> &[NodeId] {
        &self.0
    }

    /// Iterate over the links of the path, from the origin to the
    /// destination, along with the node each hop starts from.
    pub fn links(&self) -> impl ExactSizeIterator<Item = (NodeId, LinkId)> + '_ {
        self.0
            .windows(2)
            .map(|pair| (pair[0], LinkId::new((pair[0], pair[1]))))
    }

    /// The remainder of the path starting at the `hop`-th node.
    ///
    /// `hop` is clamped so the remainder always holds the destination.
    pub fn remaining(&self, hop: usize) -> Self {
        let start = hop.min(self.hops());
        Self(self.0[start..].to_vec())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut nodes = self.0.iter();
        if let Some(first) = nodes.next() {
            write!(f, "{first}")?;
        }
        for node in nodes {
            write!(f, "->{node}")?;
        }
        Ok(())
    }
}
