use crate::{node::NodeId, path::Path, topology::Topology};
use std::collections::VecDeque;
use thiserror::Error;

/// Error returned when a route between two nodes cannot be established.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    /// One of the nodes does not belong to the topology.
    #[error("Node ({node}) Not Found")]
    UnknownNode { node: NodeId },
    /// The origin and the destination are the same node.
    #[error("Origin and destination are the same node ({node})")]
    SameNode { node: NodeId },
    /// The topology is disconnected between the two nodes.
    ///
    /// The simulation treats this as a per-packet condition: the packet
    /// is dropped and the slot carries on.
    #[error("No path from ({origin}) to ({destination})")]
    NoPath {
        origin: NodeId,
        destination: NodeId,
    },
}

/// Shortest path routing over a [`Topology`].
///
/// Paths are the shortest in number of hops; link capacities play no part
/// in the choice. When several shortest paths exist the router always
/// returns the same one: neighbours are explored in ascending [`NodeId`]
/// order, so the first shortest path found in that order wins.
///
/// # Example
///
/// ```
/// use trafficsim_core::{route::Router, topology::Topology};
///
/// let topology = Topology::builder()
///     .node("A")
///     .node("B")
///     .node("C")
///     .link("A", "B", 1)
///     .link("B", "C", 1)
///     .build()
///     .unwrap();
/// let a = topology.node_id("A").unwrap();
/// let c = topology.node_id("C").unwrap();
///
/// let path = Router::new(&topology).route(a, c).unwrap();
/// assert_eq!(path.hops(), 2);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Router<'a> {
    topology: &'a Topology,
}

impl<'a> Router<'a> {
    pub fn new(topology: &'a Topology) -> Self {
        Self { topology }
    }

    /// Compute the path a packet takes from `origin` to `destination`.
    ///
    /// # Errors
    ///
    /// - [`RouteError::UnknownNode`] if either node is not in the topology.
    /// - [`RouteError::SameNode`] if `origin == destination`.
    /// - [`RouteError::NoPath`] if no sequence of links joins the two nodes.
    pub fn route(&self, origin: NodeId, destination: NodeId) -> Result<Path, RouteError> {
        for node in [origin, destination] {
            if !self.topology.contains(node) {
                return Err(RouteError::UnknownNode { node });
            }
        }
        if origin == destination {
            return Err(RouteError::SameNode { node: origin });
        }

        // predecessor of every visited node on its shortest path from `origin`
        let mut previous: Vec<Option<NodeId>> = vec![None; self.topology.len()];
        previous[origin.index()] = Some(origin);

        let mut frontier = VecDeque::from([origin]);
        while let Some(node) = frontier.pop_front() {
            for neighbor in self.topology.neighbors(node) {
                if previous[neighbor.index()].is_some() {
                    continue;
                }
                previous[neighbor.index()] = Some(node);

                if neighbor == destination {
                    return Ok(backtrack(&previous, origin, destination));
                }
                frontier.push_back(neighbor);
            }
        }

        Err(RouteError::NoPath {
            origin,
            destination,
        })
    }
}

fn backtrack(previous: &[Option<NodeId>], origin: NodeId, destination: NodeId) -> Path {
    let mut nodes = vec![destination];
    let mut current = destination;
    while current != origin {
        match previous[current.index()] {
            Some(node) => {
                nodes.push(node);
                current = node;
            }
            None => break,
        }
    }
    nodes.reverse();

    // `nodes` always holds at least the destination
    Path(nodes)
}
