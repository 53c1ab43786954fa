//! Structural tests of the generated LP (no solver involved)

use nco_core::{
    all_to_all, sender_receiver_pairs, Broadcast, Edge, Graph, Message, NcoError, NetworkTopology,
    Node, RelayerGraph,
};
use nco_lp::{
    basic_lp, message_flow_name, receiver_flow_name, responsibility_constraints, Comparison,
    Constraint, ConstraintFamily, LpModel, Rhs, Term, VarKey,
};
use std::collections::HashSet;

/// 2 senders, 1 relayer, 2 receivers; s0 multicasts 5 units to t0 and t1.
fn two_receiver_case() -> (RelayerGraph, Vec<Broadcast>) {
    let graph = RelayerGraph::new(2, 1, 2, 1e-2);
    let message = Message::new(
        Node::sender(0),
        vec![Node::receiver(0), Node::receiver(1)],
        5.0,
    );
    (graph, vec![Broadcast::from(vec![message])])
}

fn names(terms: &[Term]) -> Vec<String> {
    terms.iter().map(|t| t.var.name()).collect()
}

fn family(model: &LpModel, family: ConstraintFamily) -> Vec<&Constraint> {
    model.constraints_in(family).collect()
}

#[test]
fn two_receiver_case_edges() {
    let (graph, _) = two_receiver_case();
    let edges = graph.edges();
    let count = |pred: fn(&Edge) -> bool| edges.iter().filter(|e| pred(e)).count();
    assert_eq!(count(|e| matches!(e, Edge::SenderRelayer(..))), 2);
    assert_eq!(count(|e| matches!(e, Edge::RelayerReceiver(..))), 2);
    assert_eq!(count(|e| matches!(e, Edge::RelayerRelayer(..))), 0);
}

#[test]
fn two_receiver_case_capacity_non_negativity() {
    let (graph, broadcasts) = two_receiver_case();
    let model = basic_lp(&broadcasts, &graph).unwrap();
    let caps: Vec<String> = family(&model, ConstraintFamily::CapacityNonNegativity)
        .iter()
        .map(|c| c.lhs[0].var.name())
        .collect();
    assert_eq!(caps, vec!["es0r0", "es1r0", "er0t0", "er0t1"]);
}

#[test]
fn two_receiver_case_demand_satisfaction() {
    let (graph, broadcasts) = two_receiver_case();
    let model = basic_lp(&broadcasts, &graph).unwrap();
    let demand = family(&model, ConstraintFamily::DemandSatisfaction);
    assert_eq!(demand.len(), 2);
    assert_eq!(names(&demand[0].lhs), vec!["b0m0er0t0"]);
    assert_eq!(names(&demand[1].lhs), vec!["b0m0er0t1"]);
    for c in demand {
        assert_eq!(c.cmp, Comparison::Eq);
        assert_eq!(c.rhs, Rhs::Constant(5.0));
    }
}

#[test]
fn two_receiver_case_receiver_source() {
    let (graph, broadcasts) = two_receiver_case();
    let model = basic_lp(&broadcasts, &graph).unwrap();
    let source = family(&model, ConstraintFamily::ReceiverSource);
    assert_eq!(source.len(), 2);
    assert_eq!(names(&source[0].lhs), vec!["b0m0es0r0_t0"]);
    assert_eq!(names(&source[1].lhs), vec!["b0m0es0r0_t1"]);
    for c in source {
        assert_eq!(c.cmp, Comparison::Eq);
        assert_eq!(c.rhs, Rhs::Constant(5.0));
    }
}

#[test]
fn two_receiver_case_family_sizes() {
    let (graph, broadcasts) = two_receiver_case();
    let stats = basic_lp(&broadcasts, &graph).unwrap().stats();
    let n = |f: ConstraintFamily| stats.by_family.get(&f).copied().unwrap_or(0);
    assert_eq!(n(ConstraintFamily::CapacityNonNegativity), 4);
    assert_eq!(n(ConstraintFamily::MessageFlowNonNegativity), 4);
    assert_eq!(n(ConstraintFamily::DemandSatisfaction), 2);
    assert_eq!(n(ConstraintFamily::SourceCap), 1);
    // s1 is parentless and not the sender (1), r0 bounds two children (2).
    assert_eq!(n(ConstraintFamily::MessageConservation), 3);
    assert_eq!(n(ConstraintFamily::SharedCapacity), 4);
    assert_eq!(n(ConstraintFamily::ReceiverFlowTrunkBound), 8);
    assert_eq!(n(ConstraintFamily::ReceiverFlowNonNegativity), 8);
    assert_eq!(n(ConstraintFamily::ReceiverSource), 2);
    assert_eq!(n(ConstraintFamily::ReceiverSink), 2);
    assert_eq!(n(ConstraintFamily::ReceiverConservation), 2);
    assert_eq!(stats.constraints, 40);
    // 4 capacities + 4 trunk flows + 8 receiver flows
    assert_eq!(stats.variables, 16);
}

#[test]
fn every_variable_has_a_non_negativity_row() {
    let graph = RelayerGraph::new(3, 3, 3, 1e-2);
    let mut broadcasts = sender_receiver_pairs(2, 2);
    broadcasts.extend(all_to_all(3, 3, 2.0));
    let model = basic_lp(&broadcasts, &graph).unwrap();

    let non_negative: HashSet<VarKey> = model
        .constraints
        .iter()
        .filter(|c| {
            c.cmp == Comparison::Ge && c.rhs == Rhs::Constant(0.0) && c.lhs.len() == 1
        })
        .map(|c| c.lhs[0].var)
        .collect();
    for key in model.variable_keys() {
        assert!(non_negative.contains(&key), "{key} lacks a non-negativity row");
    }
}

#[test]
fn names_are_unique_and_deterministic() {
    let graph = RelayerGraph::new(2, 3, 2, 1e-2);
    let broadcasts = all_to_all(2, 2, 1.0);
    let first = basic_lp(&broadcasts, &graph).unwrap();
    let second = basic_lp(&broadcasts, &graph).unwrap();
    assert_eq!(first, second);

    let keys = first.variable_keys();
    let names: HashSet<String> = keys.iter().map(VarKey::name).collect();
    assert_eq!(names.len(), keys.len(), "two keys flattened to one name");

    for key in keys {
        let rebuilt = match key {
            VarKey::Capacity(edge) => edge.name(),
            VarKey::MessageFlow {
                broadcast,
                message,
                edge,
            } => message_flow_name(broadcast, message, &edge),
            VarKey::ReceiverFlow {
                broadcast,
                message,
                receiver,
                edge,
            } => receiver_flow_name(broadcast, message, &receiver, &edge),
        };
        assert_eq!(rebuilt, key.name());
    }
}

#[test]
fn trunk_bounds_every_receiver_share() {
    // Both receivers of one message share the s0 → r0 trunk.
    let (graph, broadcasts) = two_receiver_case();
    let model = basic_lp(&broadcasts, &graph).unwrap();
    let trunk = VarKey::message_flow(0, 0, Edge::between(Node::sender(0), Node::relayer(0)).unwrap());
    let bounded: Vec<String> = family(&model, ConstraintFamily::ReceiverFlowTrunkBound)
        .into_iter()
        .filter(|c| c.rhs == Rhs::Terms(vec![Term::unit(trunk)]))
        .map(|c| c.lhs[0].var.name())
        .collect();
    assert_eq!(bounded, vec!["b0m0es0r0_t0", "b0m0es0r0_t1"]);
}

#[test]
fn empty_receiver_list_rejected_before_generation() {
    let graph = RelayerGraph::new(1, 1, 1, 1e-2);
    let broadcasts = vec![Broadcast::from(vec![Message::new(Node::sender(0), vec![], 1.0)])];
    let err = basic_lp(&broadcasts, &graph).unwrap_err();
    assert!(matches!(err, NcoError::InvalidInput(_)));
    assert!(err.to_string().contains("no receivers"));
}

#[test]
fn responsibility_counts_match_degrees() {
    let graph = RelayerGraph::new(2, 2, 3, 0.0);
    let cons = responsibility_constraints(&graph, 10.0, 10.0).unwrap();
    for node in graph.nodes() {
        let incoming = graph.edges_to(node);
        let listens: Vec<&Constraint> = cons
            .iter()
            .filter(|c| c.family == ConstraintFamily::ListenBudget)
            .filter(|c| c.lhs.iter().any(|t| t.var.edge().to() == node))
            .collect();
        if incoming.is_empty() {
            assert!(listens.is_empty(), "{node} has no parents but a listen row");
        } else {
            assert_eq!(listens.len(), 1);
            assert_eq!(listens[0].lhs.len(), incoming.len());
        }
    }
}

#[test]
fn custom_topology_with_direct_edge() {
    let mut topology = NetworkTopology::new();
    for node in [Node::sender(0), Node::relayer(0), Node::receiver(0)] {
        topology.add_node(node).unwrap();
    }
    topology.add_edge(Node::sender(0), Node::receiver(0), 3.0).unwrap();
    topology.add_edge(Node::sender(0), Node::relayer(0), 1.0).unwrap();
    topology.add_edge(Node::relayer(0), Node::receiver(0), 1.0).unwrap();

    let broadcasts = vec![Broadcast::from(vec![Message::new(
        Node::sender(0),
        vec![Node::receiver(0)],
        2.0,
    )])];
    let model = basic_lp(&broadcasts, &topology).unwrap();
    let costs: Vec<f64> = model.objective.terms.iter().map(|t| t.coef).collect();
    assert_eq!(costs, vec![3.0, 1.0, 1.0]);
    let demand = family(&model, ConstraintFamily::DemandSatisfaction);
    assert_eq!(names(&demand[0].lhs), vec!["b0m0es0t0", "b0m0er0t0"]);
}
