//! Directed network topology the protocol runs on.
//!
//! A [`Topology`] is an index-addressed adjacency list: vertex ids are the
//! contiguous range `0..n` and each vertex owns an ordered list of outgoing
//! neighbours. The neighbour order is the order in which a node emits
//! messages, so it determines simulation traversal order.
//!
//! Every constructor validates the provider contract: neighbour ids are in
//! range, there are no self-loops and no duplicate neighbours. The node
//! automaton relies on all three.
//!
//! Topologies come from four sources:
//!
//! | Source                        | Constructor                    |
//! |-------------------------------|--------------------------------|
//! | Explicit adjacency            | [`Topology::from_adjacency`]   |
//! | Uniform random out-degree     | [`Topology::uniform`]          |
//! | Barabási–Albert preferential  | [`Topology::scale_free`]       |
//! | `u,v` edge list               | [`Topology::read_edge_list`]   |

mod edge_list;
mod generate;

use std::collections::HashSet;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::{Result, SimError};

pub use generate::GeneratedTopology;

/// Vertex identifier, an index into the topology.
pub type NodeId = usize;

/// Validated directed adjacency list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Topology {
    adjacency: Vec<Vec<NodeId>>,
}

impl Topology {
    /// Build a topology from per-vertex outgoing neighbour lists.
    pub fn from_adjacency(adjacency: Vec<Vec<NodeId>>) -> Result<Self> {
        let n = adjacency.len();
        for (id, neighbours) in adjacency.iter().enumerate() {
            let mut seen = HashSet::with_capacity(neighbours.len());
            for &target in neighbours {
                if target >= n {
                    return Err(SimError::Config(format!(
                        "vertex {id} has neighbour {target} outside 0..{n}"
                    )));
                }
                if target == id {
                    return Err(SimError::Config(format!("vertex {id} has a self-loop")));
                }
                if !seen.insert(target) {
                    return Err(SimError::Config(format!(
                        "vertex {id} lists neighbour {target} twice"
                    )));
                }
            }
        }
        Ok(Self { adjacency })
    }

    /// Build a topology from a petgraph digraph, keeping edge insertion order.
    pub fn from_digraph<N, E>(graph: &DiGraph<N, E>) -> Result<Self> {
        let mut adjacency = vec![Vec::new(); graph.node_count()];
        for edge in graph.raw_edges() {
            adjacency[edge.source().index()].push(edge.target().index());
        }
        Self::from_adjacency(adjacency)
    }

    /// Convert to a petgraph digraph whose node weights are the vertex ids.
    pub fn to_digraph(&self) -> DiGraph<NodeId, ()> {
        let mut graph = DiGraph::with_capacity(self.len(), self.edge_count());
        let nodes: Vec<NodeIndex> = (0..self.len()).map(|id| graph.add_node(id)).collect();
        for (source, neighbours) in self.adjacency.iter().enumerate() {
            for &target in neighbours {
                graph.add_edge(nodes[source], nodes[target], ());
            }
        }
        graph
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Whether the topology has no vertices.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Outgoing neighbours of `id`, in emission order.
    pub fn neighbours(&self, id: NodeId) -> &[NodeId] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Mean out-degree (0.0 for an empty topology).
    pub fn average_degree(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.edge_count() as f64 / self.len() as f64
        }
    }

    /// Largest out-degree.
    pub fn max_out_degree(&self) -> usize {
        self.adjacency.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Whether any directed cycle exists. Without one no handshake can reconverge.
    pub fn has_directed_cycle(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.to_digraph())
    }

    /// Iterate over `(id, neighbours)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &[NodeId])> {
        self.adjacency
            .iter()
            .enumerate()
            .map(|(id, n)| (id, n.as_slice()))
    }

    /// Consume into the raw adjacency list.
    pub fn into_adjacency(self) -> Vec<Vec<NodeId>> {
        self.adjacency
    }
}
