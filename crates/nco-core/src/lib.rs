//! # nco-core: Relay Network and Demand Modeling Core
//!
//! Provides the node/edge vocabulary, the [`Graph`] capability set and the
//! multicast demand model consumed by the `nco-lp` formulation.
//!
//! ## Design Philosophy
//!
//! Networks are **directed** graphs over three tiers of node:
//! - **Senders** originate messages
//! - **Relayers** forward (and may attenuate) traffic
//! - **Receivers** consume messages
//!
//! Nodes and edges are closed enums so every consumer (cost lookup,
//! adjacency, variable naming) matches on them exhaustively. Every node
//! and edge has a deterministic name that doubles as the LP variable
//! addressing scheme:
//!
//! | Element | Name |
//! |---------|------|
//! | `Node::Sender(3)` | `s3` |
//! | `Node::Relayer(1)` | `r1` |
//! | `Node::Receiver(5)` | `t5` |
//! | `Edge::SenderRelayer(0, 2)` | `es0r2` |
//!
//! ## Quick Start
//!
//! ```rust
//! use nco_core::*;
//!
//! let graph = RelayerGraph::new(2, 1, 2, 1e-2);
//! assert_eq!(graph.edges().len(), 4);
//!
//! let message = Message::new(
//!     Node::sender(0),
//!     vec![Node::receiver(0), Node::receiver(1)],
//!     5.0,
//! );
//! let broadcasts = vec![Broadcast::from(vec![message])];
//! assert!(validate_broadcasts(&broadcasts, &graph).is_ok());
//! ```
//!
//! ## Modules
//!
//! - [`graph`] - The [`Graph`] trait and the three-tier [`RelayerGraph`]
//! - [`topology`] - [`NetworkTopology`], an arbitrary petgraph-backed graph
//! - [`demand`] - [`Message`], [`Broadcast`], generators and JSON readers
//! - [`error`] - [`NcoError`] and [`NcoResult`]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod demand;
pub mod error;
pub mod graph;
pub mod topology;

pub use demand::{
    all_to_all, load_broadcasts, read_broadcasts, sender_receiver_pairs, validate_broadcasts,
    Broadcast, Message,
};
pub use error::{NcoError, NcoResult};
pub use graph::{Graph, RelayerGraph};
pub use topology::NetworkTopology;

// Newtype wrappers for IDs for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SenderId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelayerId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiverId(usize);

impl SenderId {
    #[inline]
    pub fn new(value: usize) -> Self {
        SenderId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl RelayerId {
    #[inline]
    pub fn new(value: usize) -> Self {
        RelayerId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl ReceiverId {
    #[inline]
    pub fn new(value: usize) -> Self {
        ReceiverId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

/// A vertex of the relay network.
///
/// Identity is exactly (variant, index); the name is derived from both and
/// is unique across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Node {
    Sender(SenderId),
    Relayer(RelayerId),
    Receiver(ReceiverId),
}

impl Node {
    pub fn sender(index: usize) -> Self {
        Node::Sender(SenderId::new(index))
    }

    pub fn relayer(index: usize) -> Self {
        Node::Relayer(RelayerId::new(index))
    }

    pub fn receiver(index: usize) -> Self {
        Node::Receiver(ReceiverId::new(index))
    }

    /// Index within the node's own tier.
    pub fn index(&self) -> usize {
        match self {
            Node::Sender(id) => id.value(),
            Node::Relayer(id) => id.value(),
            Node::Receiver(id) => id.value(),
        }
    }

    fn tag(&self) -> char {
        match self {
            Node::Sender(_) => 's',
            Node::Relayer(_) => 'r',
            Node::Receiver(_) => 't',
        }
    }

    /// Deterministic name, e.g. `s3`, `r1`, `t5`.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.tag(), self.index())
    }
}

impl FromStr for Node {
    type Err = NcoError;

    /// Parses a name produced by [`Node::name`]. Signs and leading zeros are
    /// rejected so that parsing and naming stay exact inverses.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let tag = chars
            .next()
            .ok_or_else(|| NcoError::Parse("empty node name".to_string()))?;
        let digits = chars.as_str();
        let canonical = !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && (digits.len() == 1 || !digits.starts_with('0'));
        if !canonical {
            return Err(NcoError::Parse(format!("malformed node name '{s}'")));
        }
        let index: usize = digits
            .parse()
            .map_err(|e| NcoError::Parse(format!("node name '{s}': {e}")))?;
        match tag {
            's' => Ok(Node::sender(index)),
            'r' => Ok(Node::relayer(index)),
            't' => Ok(Node::receiver(index)),
            other => Err(NcoError::Parse(format!(
                "unknown node tag '{other}' in '{s}'"
            ))),
        }
    }
}

impl From<Node> for String {
    fn from(node: Node) -> Self {
        node.to_string()
    }
}

impl TryFrom<String> for Node {
    type Error = NcoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A directed link between two nodes.
///
/// Only the four tier combinations below exist; anything else (e.g. into a
/// sender, out of a receiver) is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Edge {
    SenderRelayer(SenderId, RelayerId),
    SenderReceiver(SenderId, ReceiverId),
    RelayerReceiver(RelayerId, ReceiverId),
    RelayerRelayer(RelayerId, RelayerId),
}

impl Edge {
    /// Build the edge variant joining `from` to `to`, if one exists.
    pub fn between(from: Node, to: Node) -> Option<Edge> {
        match (from, to) {
            (Node::Sender(s), Node::Relayer(r)) => Some(Edge::SenderRelayer(s, r)),
            (Node::Sender(s), Node::Receiver(t)) => Some(Edge::SenderReceiver(s, t)),
            (Node::Relayer(r), Node::Receiver(t)) => Some(Edge::RelayerReceiver(r, t)),
            (Node::Relayer(a), Node::Relayer(b)) => Some(Edge::RelayerRelayer(a, b)),
            _ => None,
        }
    }

    pub fn from(&self) -> Node {
        match *self {
            Edge::SenderRelayer(s, _) | Edge::SenderReceiver(s, _) => Node::Sender(s),
            Edge::RelayerReceiver(r, _) | Edge::RelayerRelayer(r, _) => Node::Relayer(r),
        }
    }

    pub fn to(&self) -> Node {
        match *self {
            Edge::SenderRelayer(_, r) | Edge::RelayerRelayer(_, r) => Node::Relayer(r),
            Edge::SenderReceiver(_, t) | Edge::RelayerReceiver(_, t) => Node::Receiver(t),
        }
    }

    /// Deterministic name: `e` followed by both endpoint names.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}{}", self.from(), self.to())
    }
}

impl FromStr for Edge {
    type Err = NcoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix('e')
            .ok_or_else(|| NcoError::Parse(format!("edge name '{s}' must start with 'e'")))?;
        // The destination tag is the first letter after the source tag.
        let split = body
            .char_indices()
            .skip(1)
            .find(|(_, c)| c.is_ascii_alphabetic())
            .map(|(i, _)| i)
            .ok_or_else(|| NcoError::Parse(format!("edge name '{s}' has no destination")))?;
        let from: Node = body[..split].parse()?;
        let to: Node = body[split..].parse()?;
        Edge::between(from, to)
            .ok_or_else(|| NcoError::Parse(format!("no edge kind joins {from} to {to}")))
    }
}

impl From<Edge> for String {
    fn from(edge: Edge) -> Self {
        edge.to_string()
    }
}

impl TryFrom<String> for Edge {
    type Error = NcoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
