//! Multicommodity-flow formulation for multicast capacity planning.
//!
//! ## Problem Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  MULTICAST NETWORK DESIGN                                                │
//! │  ────────────────────────                                                │
//! │                                                                          │
//! │  Given:                                                                  │
//! │    • A directed graph with a cost per unit of edge capacity             │
//! │    • Broadcasts: groups of messages (sender → receivers, weight)        │
//! │                                                                          │
//! │  Decide:                                                                 │
//! │    • Capacity c_e on every edge                                         │
//! │                                                                          │
//! │  Minimize:                                                               │
//! │    Σ_e cost_e · c_e                                                     │
//! │                                                                          │
//! │  Such that every broadcast fits in c on its own, with receivers of the  │
//! │  same message sharing trunk capacity.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Variables
//!
//! | Key | Name | Meaning |
//! |-----|------|---------|
//! | `c_e` | `e…` | capacity on edge e |
//! | `f_bme` | `b{b}m{m}e…` | trunk flow of message m of broadcast b on e |
//! | `g_bmre` | `b{b}m{m}e…_{r}` | share of that flow serving receiver r |
//!
//! ## Constraint families
//!
//! ```text
//!   c_e ≥ 0,  f_bme ≥ 0                                   non-negativity
//!   Σ_{e→r} f_bme = w_bm                 ∀ r ∈ R_bm        demand satisfaction
//!   f_bme ≤ w_bm                         ∀ e leaving s_bm  source cap
//!   f_bme = 0                            ∀ e leaving a parentless n ≠ s_bm
//!   f_bme ≤ Σ_{e'→n} f_bme'              ∀ e leaving n     (attenuating) conservation
//!   Σ_m f_bme ≤ c_e                      ∀ e, b            shared capacity
//!   0 ≤ g_bmre ≤ f_bme                                     receiver-flow bounds
//!   Σ_{e leaving s_bm} g_bmre = w_bm                       per-receiver source
//!   Σ_{e→r} g_bmre = w_bm                                  per-receiver sink
//!   Σ_{e→n} g_bmre = Σ_{e leaving n} g_bmre                per-receiver conservation
//! ```
//!
//! The trunk flow `f` may be smaller than the sum of the receiver flows it
//! bounds: that gap is the multicast saving. The receiver flows `g` are a
//! true flow per receiver and certify that a full-weight path exists.
//!
//! Capacity is sized per broadcast, not summed across broadcasts: each
//! broadcast is a separate provisioning scenario sharing one allocation.
//!
//! Each family is an independent function returning its own constraints;
//! [`basic_lp`] concatenates them.

use crate::model::{
    Comparison, Constraint, ConstraintFamily, LpModel, Objective, Rhs, Sense, Term, VarKey,
};
use nco_core::{validate_broadcasts, Broadcast, Edge, Graph, Message, NcoResult, Node};
use std::collections::HashMap;
use tracing::{debug, info};

/// Node, edge and adjacency lists queried once from a [`Graph`].
pub struct GraphIndex<'a, G: Graph + ?Sized> {
    graph: &'a G,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    incoming: HashMap<Node, Vec<Edge>>,
    outgoing: HashMap<Node, Vec<Edge>>,
}

impl<'a, G: Graph + ?Sized> GraphIndex<'a, G> {
    pub fn new(graph: &'a G) -> Self {
        let nodes = graph.nodes();
        let edges = graph.edges();
        let mut incoming = HashMap::with_capacity(nodes.len());
        let mut outgoing = HashMap::with_capacity(nodes.len());
        for &node in &nodes {
            incoming.insert(node, graph.edges_to(node));
            outgoing.insert(node, graph.edges_from(node));
        }
        Self {
            graph,
            nodes,
            edges,
            incoming,
            outgoing,
        }
    }

    pub fn graph(&self) -> &G {
        self.graph
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edges_to(&self, node: Node) -> &[Edge] {
        self.incoming.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edges_from(&self, node: Node) -> &[Edge] {
        self.outgoing.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// (broadcast index, message index, message) over every broadcast.
fn messages(broadcasts: &[Broadcast]) -> impl Iterator<Item = (usize, usize, &Message)> {
    broadcasts
        .iter()
        .enumerate()
        .flat_map(|(i, bcast)| bcast.iter().enumerate().map(move |(j, mess)| (i, j, mess)))
}

fn unit_sum(vars: impl IntoIterator<Item = VarKey>) -> Vec<Term> {
    vars.into_iter().map(Term::unit).collect()
}

/// Minimize Σ cost(e) · capacity(e).
pub fn objective<G: Graph + ?Sized>(index: &GraphIndex<'_, G>) -> NcoResult<Objective> {
    let terms = index
        .edges()
        .iter()
        .map(|&edge| Ok(Term::new(VarKey::capacity(edge), index.graph().edge_cost(&edge)?)))
        .collect::<NcoResult<Vec<_>>>()?;
    Ok(Objective {
        sense: Sense::Minimize,
        terms,
    })
}

pub fn capacity_non_negativity<G: Graph + ?Sized>(index: &GraphIndex<'_, G>) -> Vec<Constraint> {
    index
        .edges()
        .iter()
        .map(|&edge| {
            Constraint::non_negative(
                ConstraintFamily::CapacityNonNegativity,
                VarKey::capacity(edge),
            )
        })
        .collect()
}

pub fn message_flow_non_negativity<G: Graph + ?Sized>(
    index: &GraphIndex<'_, G>,
    broadcasts: &[Broadcast],
) -> Vec<Constraint> {
    let mut cons = Vec::new();
    for (i, j, _) in messages(broadcasts) {
        for &edge in index.edges() {
            cons.push(Constraint::non_negative(
                ConstraintFamily::MessageFlowNonNegativity,
                VarKey::message_flow(i, j, edge),
            ));
        }
    }
    cons
}

/// Inflow of every receiver equals the message weight.
pub fn demand_satisfaction<G: Graph + ?Sized>(
    index: &GraphIndex<'_, G>,
    broadcasts: &[Broadcast],
) -> Vec<Constraint> {
    let mut cons = Vec::new();
    for (i, j, mess) in messages(broadcasts) {
        for &receiver in &mess.receivers {
            let lhs = unit_sum(
                index
                    .edges_to(receiver)
                    .iter()
                    .map(|&edge| VarKey::message_flow(i, j, edge)),
            );
            cons.push(Constraint::new(
                ConstraintFamily::DemandSatisfaction,
                lhs,
                Comparison::Eq,
                Rhs::Constant(mess.weight),
            ));
        }
    }
    cons
}

/// No single edge out of the sender carries more than the message weight.
pub fn source_cap<G: Graph + ?Sized>(
    index: &GraphIndex<'_, G>,
    broadcasts: &[Broadcast],
) -> Vec<Constraint> {
    let mut cons = Vec::new();
    for (i, j, mess) in messages(broadcasts) {
        for &edge in index.edges_from(mess.sender) {
            cons.push(Constraint::new(
                ConstraintFamily::SourceCap,
                vec![Term::unit(VarKey::message_flow(i, j, edge))],
                Comparison::Le,
                Rhs::Constant(mess.weight),
            ));
        }
    }
    cons
}

/// Trunk flow cannot be manufactured, only attenuated.
///
/// Nodes without children are skipped. A node without parents may only
/// emit flow for messages it sends; any other node bounds each outgoing
/// trunk flow by its total inflow.
pub fn message_conservation<G: Graph + ?Sized>(
    index: &GraphIndex<'_, G>,
    broadcasts: &[Broadcast],
) -> Vec<Constraint> {
    let mut cons = Vec::new();
    for &node in index.nodes() {
        let parents = index.edges_to(node);
        let children = index.edges_from(node);
        if children.is_empty() {
            continue;
        }
        for (i, j, mess) in messages(broadcasts) {
            if parents.is_empty() {
                if node == mess.sender {
                    continue;
                }
                for &child in children {
                    cons.push(Constraint::new(
                        ConstraintFamily::MessageConservation,
                        vec![Term::unit(VarKey::message_flow(i, j, child))],
                        Comparison::Eq,
                        Rhs::Constant(0.0),
                    ));
                }
                continue;
            }
            let inflow = unit_sum(parents.iter().map(|&edge| VarKey::message_flow(i, j, edge)));
            for &child in children {
                cons.push(Constraint::new(
                    ConstraintFamily::MessageConservation,
                    vec![Term::unit(VarKey::message_flow(i, j, child))],
                    Comparison::Le,
                    Rhs::Terms(inflow.clone()),
                ));
            }
        }
    }
    cons
}

/// Per edge and per broadcast, the summed trunk flows fit in the capacity.
///
/// Empty broadcasts contribute nothing and are skipped.
pub fn shared_capacity<G: Graph + ?Sized>(
    index: &GraphIndex<'_, G>,
    broadcasts: &[Broadcast],
) -> Vec<Constraint> {
    let mut cons = Vec::new();
    for &edge in index.edges() {
        for (i, bcast) in broadcasts.iter().enumerate() {
            if bcast.is_empty() {
                continue;
            }
            let lhs = unit_sum((0..bcast.len()).map(|j| VarKey::message_flow(i, j, edge)));
            cons.push(Constraint::new(
                ConstraintFamily::SharedCapacity,
                lhs,
                Comparison::Le,
                Rhs::Terms(vec![Term::unit(VarKey::capacity(edge))]),
            ));
        }
    }
    cons
}

/// `g ≤ f` and `g ≥ 0` for every (message, receiver, edge), interleaved.
pub fn receiver_flow_bounds<G: Graph + ?Sized>(
    index: &GraphIndex<'_, G>,
    broadcasts: &[Broadcast],
) -> Vec<Constraint> {
    let mut cons = Vec::new();
    for (i, j, mess) in messages(broadcasts) {
        for &edge in index.edges() {
            let trunk = VarKey::message_flow(i, j, edge);
            for &receiver in &mess.receivers {
                let share = VarKey::receiver_flow(i, j, receiver, edge);
                cons.push(Constraint::new(
                    ConstraintFamily::ReceiverFlowTrunkBound,
                    vec![Term::unit(share)],
                    Comparison::Le,
                    Rhs::Terms(vec![Term::unit(trunk)]),
                ));
                cons.push(Constraint::non_negative(
                    ConstraintFamily::ReceiverFlowNonNegativity,
                    share,
                ));
            }
        }
    }
    cons
}

/// For every receiver, its share leaving the sender sums to the weight.
pub fn receiver_source<G: Graph + ?Sized>(
    index: &GraphIndex<'_, G>,
    broadcasts: &[Broadcast],
) -> Vec<Constraint> {
    let mut cons = Vec::new();
    for (i, j, mess) in messages(broadcasts) {
        let children = index.edges_from(mess.sender);
        for &receiver in &mess.receivers {
            let lhs = unit_sum(
                children
                    .iter()
                    .map(|&edge| VarKey::receiver_flow(i, j, receiver, edge)),
            );
            cons.push(Constraint::new(
                ConstraintFamily::ReceiverSource,
                lhs,
                Comparison::Eq,
                Rhs::Constant(mess.weight),
            ));
        }
    }
    cons
}

/// For every receiver, its share entering it sums to the weight.
pub fn receiver_sink<G: Graph + ?Sized>(
    index: &GraphIndex<'_, G>,
    broadcasts: &[Broadcast],
) -> Vec<Constraint> {
    let mut cons = Vec::new();
    for (i, j, mess) in messages(broadcasts) {
        for &receiver in &mess.receivers {
            let lhs = unit_sum(
                index
                    .edges_to(receiver)
                    .iter()
                    .map(|&edge| VarKey::receiver_flow(i, j, receiver, edge)),
            );
            cons.push(Constraint::new(
                ConstraintFamily::ReceiverSink,
                lhs,
                Comparison::Eq,
                Rhs::Constant(mess.weight),
            ));
        }
    }
    cons
}

/// Exact conservation of every receiver's share at nodes with both parents
/// and children.
pub fn receiver_conservation<G: Graph + ?Sized>(
    index: &GraphIndex<'_, G>,
    broadcasts: &[Broadcast],
) -> Vec<Constraint> {
    let mut cons = Vec::new();
    for (i, j, mess) in messages(broadcasts) {
        for &receiver in &mess.receivers {
            for &node in index.nodes() {
                let parents = index.edges_to(node);
                let children = index.edges_from(node);
                if parents.is_empty() || children.is_empty() {
                    continue;
                }
                let share = |edge: &Edge| VarKey::receiver_flow(i, j, receiver, *edge);
                cons.push(Constraint::new(
                    ConstraintFamily::ReceiverConservation,
                    unit_sum(parents.iter().map(share)),
                    Comparison::Eq,
                    Rhs::Terms(unit_sum(children.iter().map(share))),
                ));
            }
        }
    }
    cons
}

/// Build the complete model: objective plus every constraint family.
///
/// Broadcasts are validated first; nothing is generated for malformed input.
///
/// # Example
///
/// ```
/// use nco_core::{Broadcast, Message, Node, RelayerGraph};
/// use nco_lp::basic_lp;
///
/// let graph = RelayerGraph::new(2, 1, 2, 1e-2);
/// let message = Message::new(Node::sender(0), vec![Node::receiver(0), Node::receiver(1)], 5.0);
/// let model = basic_lp(&[Broadcast::from(vec![message])], &graph)?;
/// assert_eq!(model.objective.terms.len(), 4);
/// # Ok::<(), nco_core::NcoError>(())
/// ```
pub fn basic_lp<G: Graph + ?Sized>(broadcasts: &[Broadcast], graph: &G) -> NcoResult<LpModel> {
    validate_broadcasts(broadcasts, graph)?;

    let index = GraphIndex::new(graph);
    let objective = objective(&index)?;

    let families = [
        capacity_non_negativity(&index),
        message_flow_non_negativity(&index, broadcasts),
        demand_satisfaction(&index, broadcasts),
        source_cap(&index, broadcasts),
        message_conservation(&index, broadcasts),
        shared_capacity(&index, broadcasts),
        receiver_flow_bounds(&index, broadcasts),
        receiver_source(&index, broadcasts),
        receiver_sink(&index, broadcasts),
        receiver_conservation(&index, broadcasts),
    ];

    let total = families.iter().map(Vec::len).sum();
    let mut constraints = Vec::with_capacity(total);
    for family in families {
        if let Some(first) = family.first() {
            debug!(family = %first.family, count = family.len(), "generated constraints");
        }
        constraints.extend(family);
    }

    info!(
        broadcasts = broadcasts.len(),
        nodes = index.nodes().len(),
        edges = index.edges().len(),
        constraints = constraints.len(),
        "built LP model"
    );

    Ok(LpModel::new(objective, constraints))
}
