use crate::{
    link::{Link, LinkId},
    node::{Node, NodeId},
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;

/// Error returned when a [`Topology`] cannot be built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    /// Two nodes were declared with the same name.
    #[error("Node ({name}) declared more than once")]
    DuplicateNode { name: String },
    /// A link references a node that was never declared.
    #[error("Link ({a}-{b}) references unknown node ({name})")]
    UnknownNode { a: String, b: String, name: String },
    /// A link connects a node to itself.
    #[error("Link ({name}-{name}) connects a node to itself")]
    SelfLoop { name: String },
    /// Two links were declared for the same unordered pair of nodes.
    #[error("Link ({a}-{b}) declared more than once")]
    DuplicateLink { a: String, b: String },
    /// A link was declared with a capacity of zero (or less).
    #[error("Link ({a}-{b}) must have a positive capacity")]
    NonPositiveCapacity { a: String, b: String },
}

/// The static graph the traffic flows over.
///
/// A [`Topology`] is an undirected graph of named [`Node`]s connected by
/// capacity-weighted [`Link`]s. It is built once with a [`TopologyBuilder`]
/// and never modified afterward: the simulation, the router and the
/// accountant only ever read it.
///
/// # Example
///
/// ```
/// use trafficsim_core::topology::Topology;
///
/// let topology = Topology::builder()
///     .node("A")
///     .node("B")
///     .node("C")
///     .link("A", "B", 100)
///     .link("B", "C", 60)
///     .build()
///     .unwrap();
///
/// let b = topology.node_id("B").unwrap();
/// assert_eq!(topology.neighbors(b).count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Topology {
    nodes: Vec<Node>,

    names: HashMap<String, NodeId>,

    links: BTreeMap<LinkId, Link>,

    /// neighbours of every node, indexed by [`NodeId`]
    ///
    /// kept sorted so any traversal of the graph is deterministic
    adjacency: Vec<BTreeSet<NodeId>>,
}

/// Builder for a [`Topology`].
///
/// Obtained via [`Topology::builder`]. Nodes are referenced by name and
/// receive their [`NodeId`] in declaration order. All validation happens
/// in [`build`](TopologyBuilder::build), so declarations can be chained
/// freely.
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    nodes: Vec<String>,
    links: Vec<(String, String, u64)>,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a new node.
    pub fn node(mut self, name: impl Into<String>) -> Self {
        self.nodes.push(name.into());
        self
    }

    /// Declare a link between two nodes, carrying up to `capacity` packets
    /// per time slot.
    pub fn link(mut self, a: impl Into<String>, b: impl Into<String>, capacity: u64) -> Self {
        self.links.push((a.into(), b.into(), capacity));
        self
    }

    /// Validate the declarations and build the [`Topology`].
    ///
    /// # Errors
    ///
    /// - [`TopologyError::DuplicateNode`] if two nodes share a name.
    /// - [`TopologyError::UnknownNode`] if a link references an undeclared node.
    /// - [`TopologyError::SelfLoop`] if a link connects a node to itself.
    /// - [`TopologyError::DuplicateLink`] if an unordered pair is linked twice.
    /// - [`TopologyError::NonPositiveCapacity`] if a link has a zero capacity.
    pub fn build(self) -> Result<Topology, TopologyError> {
        let Self {
            nodes: declared,
            links: declared_links,
        } = self;

        let mut nodes = Vec::with_capacity(declared.len());
        let mut names = HashMap::with_capacity(declared.len());
        let mut id = NodeId::ZERO;
        for name in declared {
            if names.contains_key(&name) {
                return Err(TopologyError::DuplicateNode { name });
            }
            names.insert(name.clone(), id);
            nodes.push(Node::new(id, name));
            id = id.next();
        }

        let mut adjacency = vec![BTreeSet::new(); nodes.len()];
        let mut links = BTreeMap::new();
        for (a, b, capacity) in declared_links {
            let lookup = |name: &String| {
                names
                    .get(name)
                    .copied()
                    .ok_or_else(|| TopologyError::UnknownNode {
                        a: a.clone(),
                        b: b.clone(),
                        name: name.clone(),
                    })
            };
            let from = lookup(&a)?;
            let to = lookup(&b)?;

            if from == to {
                return Err(TopologyError::SelfLoop { name: a });
            }
            if capacity == 0 {
                return Err(TopologyError::NonPositiveCapacity { a, b });
            }

            let link_id = LinkId::new((from, to));
            if links.contains_key(&link_id) {
                return Err(TopologyError::DuplicateLink { a, b });
            }

            links.insert(link_id, Link::new(link_id, capacity));
            adjacency[from.index()].insert(to);
            adjacency[to.index()].insert(from);
        }

        Ok(Topology {
            nodes,
            names,
            links,
            adjacency,
        })
    }
}

impl Topology {
    /// Start declaring a new topology.
    pub fn builder() -> TopologyBuilder {
        TopologyBuilder::new()
    }

    /// All the nodes, in declaration order (i.e. ascending [`NodeId`]).
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &Node> {
        self.nodes.iter()
    }

    /// All the links, ordered by [`LinkId`].
    pub fn links(&self) -> impl ExactSizeIterator<Item = &Link> {
        self.links.values()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Look a node up by the name it was declared with.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Name of the given node, if it belongs to this topology.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(Node::name)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(&id)
    }

    /// Neighbours of `node`, in ascending [`NodeId`] order.
    ///
    /// Unknown nodes have no neighbours.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency
            .get(node.index())
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
