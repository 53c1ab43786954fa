//! Arbitrary directed topologies backed by petgraph.
//!
//! [`NetworkTopology`] lets callers describe any network (not just the
//! three-tier [`RelayerGraph`](crate::RelayerGraph)) edge by edge. Name
//! uniqueness is checked at construction, since the LP builder keys every
//! variable by name and a collision would silently merge two variables.

use crate::graph::Graph;
use crate::{Edge, NcoError, NcoResult, Node};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// Edge payload stored in the petgraph arena.
#[derive(Debug, Clone, Copy)]
struct Link {
    edge: Edge,
    cost: f64,
}

/// A directed network with explicit per-edge costs.
#[derive(Debug, Clone, Default)]
pub struct NetworkTopology {
    graph: StableDiGraph<Node, Link>,
    node_index: HashMap<Node, NodeIndex>,
    edge_index: HashMap<Edge, EdgeIndex>,
    names: HashSet<String>,
}

impl NetworkTopology {
    pub fn new() -> Self {
        Self::default()
    }

    fn claim_name(&mut self, name: String) -> NcoResult<()> {
        if !self.names.insert(name.clone()) {
            return Err(NcoError::InvalidTopology(format!(
                "name '{name}' is already in use"
            )));
        }
        Ok(())
    }

    /// Add a node. Fails if its name is already taken.
    pub fn add_node(&mut self, node: Node) -> NcoResult<NodeIndex> {
        self.claim_name(node.name())?;
        let idx = self.graph.add_node(node);
        self.node_index.insert(node, idx);
        Ok(idx)
    }

    /// Add a directed edge between two existing nodes.
    ///
    /// Fails if either endpoint is missing, if no [`Edge`] variant joins the
    /// two tiers, if the edge already exists, or if the cost is not finite.
    pub fn add_edge(&mut self, from: Node, to: Node, cost: f64) -> NcoResult<Edge> {
        let edge = Edge::between(from, to).ok_or_else(|| {
            NcoError::InvalidTopology(format!("no edge kind joins {from} to {to}"))
        })?;
        if !cost.is_finite() {
            return Err(NcoError::InvalidTopology(format!(
                "edge {edge} has non-finite cost {cost}"
            )));
        }
        let a = self.index_of(from)?;
        let b = self.index_of(to)?;
        self.claim_name(edge.name())?;
        let idx = self.graph.add_edge(a, b, Link { edge, cost });
        self.edge_index.insert(edge, idx);
        Ok(edge)
    }

    fn index_of(&self, node: Node) -> NcoResult<NodeIndex> {
        self.node_index
            .get(&node)
            .copied()
            .ok_or_else(|| NcoError::InvalidTopology(format!("node {node} has not been added")))
    }

    pub fn contains_node(&self, node: Node) -> bool {
        self.node_index.contains_key(&node)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Incident edges in insertion order.
    fn incident(&self, node: Node, direction: Direction) -> Vec<Edge> {
        let Some(&idx) = self.node_index.get(&node) else {
            return Vec::new();
        };
        let mut links: Vec<(EdgeIndex, Edge)> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| (e.id(), e.weight().edge))
            .collect();
        links.sort_by_key(|(id, _)| *id);
        links.into_iter().map(|(_, edge)| edge).collect()
    }
}

impl Graph for NetworkTopology {
    fn nodes(&self) -> Vec<Node> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph.node_weight(idx))
            .copied()
            .collect()
    }

    fn edges(&self) -> Vec<Edge> {
        self.graph
            .edge_indices()
            .filter_map(|idx| self.graph.edge_weight(idx))
            .map(|link| link.edge)
            .collect()
    }

    fn edges_from(&self, node: Node) -> Vec<Edge> {
        self.incident(node, Direction::Outgoing)
    }

    fn edges_to(&self, node: Node) -> Vec<Edge> {
        self.incident(node, Direction::Incoming)
    }

    fn edge_cost(&self, edge: &Edge) -> NcoResult<f64> {
        self.edge_index
            .get(edge)
            .and_then(|&idx| self.graph.edge_weight(idx))
            .map(|link| link.cost)
            .ok_or_else(|| NcoError::UnsupportedEdge(format!("{edge} is not in this topology")))
    }
}
