//! Solver-backed tests through the Clarabel adapter
#![cfg(feature = "solver-clarabel")]

use nco_core::{Broadcast, Edge, Message, NcoError, NetworkTopology, Node, RelayerGraph};
use nco_lp::{basic_lp, responsibility_constraints, solve, LpModel, LpSolution, VarKey};

const TOL: f64 = 1e-4;

fn unicast(sender: usize, receiver: usize, weight: f64) -> Broadcast {
    Broadcast::from(vec![Message::new(
        Node::sender(sender),
        vec![Node::receiver(receiver)],
        weight,
    )])
}

fn edge(from: Node, to: Node) -> Edge {
    Edge::between(from, to).unwrap()
}

fn assert_feasible(model: &LpModel, solution: &LpSolution) {
    for (row, c) in model.constraints.iter().enumerate() {
        let value = |key: &VarKey| solution.value_of(key).unwrap_or(0.0);
        assert!(c.is_satisfied(value, 1e-5), "row {row} ({}) violated", c.family);
    }
}

#[test]
fn single_path_costs_two_hops() {
    let graph = RelayerGraph::new(1, 1, 1, 0.0);
    let model = basic_lp(&[unicast(0, 0, 1.0)], &graph).unwrap();
    let solution = solve(&model).unwrap();
    assert!((solution.objective - 2.0).abs() < TOL, "objective {}", solution.objective);
    assert_feasible(&model, &solution);
}

#[test]
fn epsilon_prefers_lower_relayer() {
    let graph = RelayerGraph::new(1, 2, 1, 1e-2);
    let model = basic_lp(&[unicast(0, 0, 1.0)], &graph).unwrap();
    let solution = solve(&model).unwrap();
    let caps = solution.capacities(&graph);
    let cap = |e: Edge| caps.iter().find(|(x, _)| *x == e).map(|(_, v)| *v).unwrap();
    assert!((cap(edge(Node::sender(0), Node::relayer(0))) - 1.0).abs() < TOL);
    assert!(cap(edge(Node::sender(0), Node::relayer(1))).abs() < TOL);
    assert!((solution.objective - 2.0).abs() < TOL);
}

#[test]
fn receivers_share_trunk_capacity() {
    let graph = RelayerGraph::new(1, 1, 2, 0.0);
    let message = Message::new(
        Node::sender(0),
        vec![Node::receiver(0), Node::receiver(1)],
        1.0,
    );
    let model = basic_lp(&[Broadcast::from(vec![message])], &graph).unwrap();
    let solution = solve(&model).unwrap();
    assert_feasible(&model, &solution);

    // One unit on the shared trunk plus one per receiver leg, not 2 + 2.
    assert!((solution.objective - 3.0).abs() < TOL, "objective {}", solution.objective);

    let trunk = edge(Node::sender(0), Node::relayer(0));
    let f = solution.value_of(&VarKey::message_flow(0, 0, trunk)).unwrap();
    let g0 = solution
        .value_of(&VarKey::receiver_flow(0, 0, Node::receiver(0), trunk))
        .unwrap();
    let g1 = solution
        .value_of(&VarKey::receiver_flow(0, 0, Node::receiver(1), trunk))
        .unwrap();
    assert!(f + TOL >= g0 && f + TOL >= g1);
    assert!(f < g0 + g1 - 0.5, "trunk {f} not shared by {g0} + {g1}");
}

#[test]
fn broadcasts_size_capacity_independently() {
    // Two separate broadcasts over the same path need max(w), not the sum.
    let graph = RelayerGraph::new(1, 1, 1, 0.0);
    let model = basic_lp(&[unicast(0, 0, 2.0), unicast(0, 0, 3.0)], &graph).unwrap();
    let solution = solve(&model).unwrap();
    assert!((solution.objective - 6.0).abs() < TOL, "objective {}", solution.objective);
}

fn budgeted(weight: f64, budget: f64) -> LpModel {
    let graph = RelayerGraph::new(1, 2, 1, 0.0);
    let mut model = basic_lp(&[unicast(0, 0, weight)], &graph).unwrap();
    model.extend(responsibility_constraints(&graph, budget, budget).unwrap());
    model
}

#[test]
fn routable_weight_is_bounded_by_the_cut() {
    // The sender's tell budget (4) is the min cut between s0 and t0.
    let model = budgeted(3.0, 4.0);
    let solution = solve(&model).unwrap();
    assert_feasible(&model, &solution);

    let at_cut = budgeted(4.0, 4.0);
    let solution = solve(&at_cut).unwrap();
    assert_feasible(&at_cut, &solution);
    // Four units over two hops each.
    assert!((solution.objective - 8.0).abs() < TOL, "objective {}", solution.objective);

    assert!(matches!(
        solve(&budgeted(5.0, 4.0)),
        Err(NcoError::Infeasible(_))
    ));
}

#[test]
fn empty_network_has_zero_cost() {
    let model = basic_lp(&[], &NetworkTopology::new()).unwrap();
    let solution = solve(&model).unwrap();
    assert_eq!(solution.objective, 0.0);
    assert!(solution.values.is_empty());

    let graph = RelayerGraph::new(0, 0, 0, 0.0);
    let mut model = basic_lp(&[], &graph).unwrap();
    model.extend(responsibility_constraints(&graph, 1.0, 1.0).unwrap());
    assert!(solve(&model).unwrap().capacities(&graph).is_empty());
}
