use crate::node::NodeId;
use std::fmt;

/// Unique identifier of the link between two nodes
///
/// The link is undirected and is unique for two nodes. I.e.
/// For all nodes `n1` and `n2` the identifier `(n1, n2)` is the
/// same as the identifier `(n2, n1)`.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkId {
    smaller_id: NodeId,
    larger_id: NodeId,
}

impl LinkId {
    /// create the link identifier from the given node tuple.
    ///
    /// ```
    /// # use trafficsim_core::{link::LinkId, node::NodeId};
    /// # let n1 = NodeId::ZERO;
    /// # let n2 = NodeId::ONE;
    /// assert_eq!(LinkId::new((n1, n2)), LinkId::new((n2, n1)));
    /// ```
    pub fn new((a, b): (NodeId, NodeId)) -> Self {
        if a < b {
            Self {
                smaller_id: a,
                larger_id: b,
            }
        } else {
            Self {
                smaller_id: b,
                larger_id: a,
            }
        }
    }

    /// get the [`NodeId`]s that compose this link identifier
    ///
    /// # Note
    ///
    /// The smaller identifier always comes first, regardless of the
    /// order used at construction.
    ///
    /// ```
    /// # use trafficsim_core::{link::LinkId, node::NodeId};
    /// let (a, b) = LinkId::new((NodeId::ONE, NodeId::ZERO)).into_nodes();
    /// assert_eq!(a, NodeId::ZERO);
    /// assert_eq!(b, NodeId::ONE);
    /// ```
    #[inline]
    pub fn into_nodes(self) -> (NodeId, NodeId) {
        (self.smaller_id, self.larger_id)
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.smaller_id, self.larger_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn n1n2_eq_n2n1() {
        let n1 = NodeId::ZERO;
        let n2 = NodeId::ONE;

        assert_eq!(
            LinkId::new((n1, n2)),
            // ==
            LinkId::new((n2, n1)),
        );
    }

    #[test]
    fn print() {
        assert_eq!(LinkId::new((NodeId::ONE, NodeId::ZERO)).to_string(), "0-1");
    }
}
