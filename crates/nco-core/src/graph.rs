//! The graph capability set and the three-tier reference topology.

use crate::{Edge, NcoError, NcoResult, Node, ReceiverId, RelayerId, SenderId};
use crate::topology::NetworkTopology;
use tracing::warn;

/// Minimal capability set the LP builder needs from a topology.
///
/// `edges_from`/`edges_to` must agree with `edges`: every edge `e` appears
/// in `edges_from(e.from())` and in `edges_to(e.to())`. The builder trusts
/// this and does not re-validate it. Both adjacency queries should run in
/// time proportional to the node's degree.
pub trait Graph {
    /// Every node, in a stable order.
    fn nodes(&self) -> Vec<Node>;

    /// Every edge, in a stable order.
    fn edges(&self) -> Vec<Edge>;

    /// Edges leaving `node` (empty for sinks or unknown nodes).
    fn edges_from(&self, node: Node) -> Vec<Edge>;

    /// Edges entering `node` (empty for sources or unknown nodes).
    fn edges_to(&self, node: Node) -> Vec<Edge>;

    /// Objective cost per unit of capacity on `edge`.
    ///
    /// Returns [`NcoError::UnsupportedEdge`] for edges this graph never produces.
    fn edge_cost(&self, edge: &Edge) -> NcoResult<f64>;
}

/// Senders → relayers → receivers, plus relayer i → relayer j for j > i.
///
/// There are no direct sender → receiver edges, so every message passes
/// through at least one relayer. The relayer-to-relayer edges only point
/// "upwards", which keeps that layer acyclic.
///
/// Costs are 1 per hop plus `epsilon` times the index of every relayer the
/// edge touches. The perturbation steers the optimizer toward low-indexed
/// relayers among otherwise equal-cost routes, giving reproducible optima.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelayerGraph {
    pub num_sender: usize,
    pub num_relayer: usize,
    pub num_receiver: usize,
    pub epsilon: f64,
}

impl RelayerGraph {
    pub fn new(num_sender: usize, num_relayer: usize, num_receiver: usize, epsilon: f64) -> Self {
        let graph = Self {
            num_sender,
            num_relayer,
            num_receiver,
            epsilon,
        };
        if !graph.epsilon_is_tie_breaker() {
            warn!(
                epsilon,
                num_relayer,
                "relayer epsilon is large enough to outweigh a whole hop; \
                 it may change routing structure instead of only breaking ties"
            );
        }
        graph
    }

    /// Whether the largest perturbation on any route stays below the cost of one hop.
    ///
    /// A route touches each relayer at most twice (in and out), and there
    /// are at most `num_relayer` of them, so the bound is `eps * n * (n - 1)`.
    pub fn epsilon_is_tie_breaker(&self) -> bool {
        let n = self.num_relayer as f64;
        self.epsilon >= 0.0 && self.epsilon * n * (n - 1.0).max(1.0) < 1.0
    }

    fn relayer_penalty(&self, relayer: RelayerId) -> f64 {
        relayer.value() as f64 * self.epsilon
    }

    fn has_sender(&self, id: SenderId) -> bool {
        id.value() < self.num_sender
    }

    fn has_relayer(&self, id: RelayerId) -> bool {
        id.value() < self.num_relayer
    }

    fn has_receiver(&self, id: ReceiverId) -> bool {
        id.value() < self.num_receiver
    }

    fn sender_to_relayers(&self, sender: SenderId) -> impl Iterator<Item = Edge> + '_ {
        (0..self.num_relayer).map(move |j| Edge::SenderRelayer(sender, RelayerId::new(j)))
    }

    fn relayer_to_receivers(&self, relayer: RelayerId) -> impl Iterator<Item = Edge> + '_ {
        (0..self.num_receiver).map(move |j| Edge::RelayerReceiver(relayer, ReceiverId::new(j)))
    }

    /// Only higher-indexed relayers are reachable.
    fn relayer_to_relayers(&self, relayer: RelayerId) -> impl Iterator<Item = Edge> + '_ {
        (relayer.value() + 1..self.num_relayer)
            .map(move |j| Edge::RelayerRelayer(relayer, RelayerId::new(j)))
    }

    /// Materialize this topology as an explicit [`NetworkTopology`].
    pub fn to_topology(&self) -> NcoResult<NetworkTopology> {
        let mut topology = NetworkTopology::new();
        for node in self.nodes() {
            topology.add_node(node)?;
        }
        for edge in self.edges() {
            topology.add_edge(edge.from(), edge.to(), self.edge_cost(&edge)?)?;
        }
        Ok(topology)
    }
}

impl Graph for RelayerGraph {
    fn nodes(&self) -> Vec<Node> {
        let senders = (0..self.num_sender).map(Node::sender);
        let relayers = (0..self.num_relayer).map(Node::relayer);
        let receivers = (0..self.num_receiver).map(Node::receiver);
        senders.chain(relayers).chain(receivers).collect()
    }

    fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::new();
        for i in 0..self.num_sender {
            edges.extend(self.sender_to_relayers(SenderId::new(i)));
        }
        for i in 0..self.num_relayer {
            edges.extend(self.relayer_to_receivers(RelayerId::new(i)));
        }
        for i in 0..self.num_relayer {
            edges.extend(self.relayer_to_relayers(RelayerId::new(i)));
        }
        edges
    }

    fn edges_from(&self, node: Node) -> Vec<Edge> {
        match node {
            Node::Sender(s) if self.has_sender(s) => self.sender_to_relayers(s).collect(),
            Node::Relayer(r) if self.has_relayer(r) => self
                .relayer_to_receivers(r)
                .chain(self.relayer_to_relayers(r))
                .collect(),
            Node::Sender(_) | Node::Relayer(_) | Node::Receiver(_) => Vec::new(),
        }
    }

    fn edges_to(&self, node: Node) -> Vec<Edge> {
        match node {
            // Fed by every sender and by every lower-indexed relayer.
            Node::Relayer(r) if self.has_relayer(r) => (0..self.num_sender)
                .map(|i| Edge::SenderRelayer(SenderId::new(i), r))
                .chain((0..r.value()).map(|i| Edge::RelayerRelayer(RelayerId::new(i), r)))
                .collect(),
            Node::Receiver(t) if self.has_receiver(t) => (0..self.num_relayer)
                .map(|i| Edge::RelayerReceiver(RelayerId::new(i), t))
                .collect(),
            Node::Sender(_) | Node::Relayer(_) | Node::Receiver(_) => Vec::new(),
        }
    }

    fn edge_cost(&self, edge: &Edge) -> NcoResult<f64> {
        let unsupported = || NcoError::UnsupportedEdge(format!("{edge} is not in {self:?}"));
        match *edge {
            Edge::SenderReceiver(s, t) if self.has_sender(s) && self.has_receiver(t) => Ok(1.0),
            Edge::SenderRelayer(s, r) if self.has_sender(s) && self.has_relayer(r) => {
                Ok(1.0 + self.relayer_penalty(r))
            }
            Edge::RelayerReceiver(r, t) if self.has_relayer(r) && self.has_receiver(t) => {
                Ok(1.0 + self.relayer_penalty(r))
            }
            Edge::RelayerRelayer(a, b) if a < b && self.has_relayer(b) => {
                Ok(1.0 + self.relayer_penalty(a) + self.relayer_penalty(b))
            }
            _ => Err(unsupported()),
        }
    }
}
