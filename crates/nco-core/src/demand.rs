//! Multicast demand: messages, broadcasts, generators and JSON readers.

use crate::graph::Graph;
use crate::{NcoError, NcoResult, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// One sender delivering `weight` units of a single demand to every
/// receiver, concurrently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Node,
    /// Ordered; position does not enter variable names but iteration order does.
    pub receivers: Vec<Node>,
    pub weight: f64,
}

impl Message {
    pub fn new(sender: Node, receivers: Vec<Node>, weight: f64) -> Self {
        Self {
            sender,
            receivers,
            weight,
        }
    }

    /// Check the message is meaningful on its own (independent of any graph).
    pub fn validate(&self) -> NcoResult<()> {
        if self.receivers.is_empty() {
            return Err(NcoError::InvalidInput(format!(
                "message from {} has no receivers",
                self.sender
            )));
        }
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(NcoError::InvalidInput(format!(
                "message from {} has non-positive weight {}",
                self.sender, self.weight
            )));
        }
        let mut seen = HashSet::with_capacity(self.receivers.len());
        for receiver in &self.receivers {
            if !seen.insert(receiver) {
                return Err(NcoError::InvalidInput(format!(
                    "message from {} lists receiver {} twice",
                    self.sender, receiver
                )));
            }
        }
        Ok(())
    }
}

/// Messages that share a delivery event.
///
/// Order is significant: the position of a message becomes part of every
/// variable name derived from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Broadcast(Vec<Message>);

impl Broadcast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.0.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Message>> for Broadcast {
    fn from(messages: Vec<Message>) -> Self {
        Broadcast(messages)
    }
}

impl FromIterator<Message> for Broadcast {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Broadcast(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Broadcast {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Reject malformed demand before any constraint is generated.
///
/// Beyond [`Message::validate`], every sender needs at least one outgoing
/// edge and every receiver at least one incoming edge in `graph`; otherwise
/// the per-receiver equalities would have no variables at all.
pub fn validate_broadcasts<G: Graph + ?Sized>(broadcasts: &[Broadcast], graph: &G) -> NcoResult<()> {
    let nodes: HashSet<Node> = graph.nodes().into_iter().collect();
    for (i, bcast) in broadcasts.iter().enumerate() {
        for (j, mess) in bcast.iter().enumerate() {
            let at = |e: NcoError| match e {
                NcoError::InvalidInput(msg) => {
                    NcoError::InvalidInput(format!("broadcast {i}, message {j}: {msg}"))
                }
                other => other,
            };
            mess.validate().map_err(at)?;
            for node in std::iter::once(&mess.sender).chain(&mess.receivers) {
                if !nodes.contains(node) {
                    return Err(at(NcoError::InvalidInput(format!(
                        "{node} is not a node of the graph"
                    ))));
                }
            }
            if graph.edges_from(mess.sender).is_empty() {
                return Err(at(NcoError::InvalidInput(format!(
                    "sender {} has no outgoing edges",
                    mess.sender
                ))));
            }
            for receiver in &mess.receivers {
                if graph.edges_to(*receiver).is_empty() {
                    return Err(at(NcoError::InvalidInput(format!(
                        "receiver {receiver} has no incoming edges"
                    ))));
                }
            }
        }
    }
    Ok(())
}

/// Every sender must reach every receiver individually: one single-message
/// broadcast of weight 1 per (sender, receiver) pair.
pub fn sender_receiver_pairs(num_sender: usize, num_receiver: usize) -> Vec<Broadcast> {
    let mut broadcasts = Vec::with_capacity(num_sender * num_receiver);
    for i in 0..num_sender {
        for j in 0..num_receiver {
            let mess = Message::new(Node::sender(i), vec![Node::receiver(j)], 1.0);
            broadcasts.push(Broadcast::from(vec![mess]));
        }
    }
    broadcasts
}

/// One broadcast per sender, multicasting `weight` to every receiver.
pub fn all_to_all(num_sender: usize, num_receiver: usize, weight: f64) -> Vec<Broadcast> {
    let receivers: Vec<Node> = (0..num_receiver).map(Node::receiver).collect();
    (0..num_sender)
        .map(|i| Broadcast::from(vec![Message::new(Node::sender(i), receivers.clone(), weight)]))
        .collect()
}

/// Read a JSON array of broadcasts (each an array of messages).
pub fn read_broadcasts<R: Read>(reader: R) -> NcoResult<Vec<Broadcast>> {
    let broadcasts: Vec<Broadcast> = serde_json::from_reader(reader)?;
    debug!(count = broadcasts.len(), "read broadcasts");
    Ok(broadcasts)
}

pub fn load_broadcasts(path: impl AsRef<Path>) -> NcoResult<Vec<Broadcast>> {
    let file = File::open(path.as_ref())?;
    read_broadcasts(BufReader::new(file))
}
