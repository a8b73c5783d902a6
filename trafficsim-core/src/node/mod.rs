mod id;

pub use self::id::NodeId;

/// A node of the [`Topology`].
///
/// Nodes have no attribute beyond their identity: the [`NodeId`] used
/// throughout the simulation and the unique name they were declared with.
///
/// [`Topology`]: crate::topology::Topology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    name: String,
}

impl Node {
    pub(crate) fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let node = Node::new(NodeId::ONE, "B");
        assert_eq!(node.id(), NodeId::ONE);
        assert_eq!(node.name(), "B");
    }
}
