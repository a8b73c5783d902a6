use std::fmt;

/// The identifier of a node in the [`Topology`].
///
/// Identifiers are handed out sequentially by the [`TopologyBuilder`] in the
/// order the nodes were declared, starting at [`NodeId::ZERO`]. They are
/// stable for the lifetime of the topology and can be used as indices.
///
/// [`Topology`]: crate::topology::Topology
/// [`TopologyBuilder`]: crate::topology::TopologyBuilder
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(C)]
pub struct NodeId(u64);

impl NodeId {
    pub const ZERO: Self = NodeId::new(0);
    pub const ONE: Self = NodeId::new(1);

    pub(crate) const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use = "function does not modify the current value"]
    pub(crate) fn next(self) -> Self {
        Self::new(self.0 + 1)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn into_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential() {
        assert_eq!(NodeId::ZERO.next(), NodeId::ONE);
        assert!(NodeId::ZERO < NodeId::ONE);
    }

    #[test]
    fn index_matches_value() {
        assert_eq!(NodeId::new(3).index(), 3);
    }

    #[test]
    fn print() {
        assert_eq!(format!("{}", NodeId(42)), "42")
    }
}
