//! Solver-agnostic LP representation.
//!
//! Variables are identified by structured [`VarKey`]s and only flattened to
//! strings at the solver boundary. There is no declaration step: any key
//! appearing in a term is a real decision variable.

use nco_core::{Edge, Node};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Structured identity of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VarKey {
    /// Capacity provisioned on an edge.
    Capacity(Edge),
    /// Aggregate (trunk) flow of one message on one edge.
    MessageFlow {
        broadcast: usize,
        message: usize,
        edge: Edge,
    },
    /// Share of a message's flow attributed to one receiver.
    ReceiverFlow {
        broadcast: usize,
        message: usize,
        receiver: Node,
        edge: Edge,
    },
}

impl VarKey {
    pub fn capacity(edge: Edge) -> Self {
        VarKey::Capacity(edge)
    }

    pub fn message_flow(broadcast: usize, message: usize, edge: Edge) -> Self {
        VarKey::MessageFlow {
            broadcast,
            message,
            edge,
        }
    }

    pub fn receiver_flow(broadcast: usize, message: usize, receiver: Node, edge: Edge) -> Self {
        VarKey::ReceiverFlow {
            broadcast,
            message,
            receiver,
            edge,
        }
    }

    pub fn edge(&self) -> Edge {
        match *self {
            VarKey::Capacity(edge)
            | VarKey::MessageFlow { edge, .. }
            | VarKey::ReceiverFlow { edge, .. } => edge,
        }
    }

    /// Flattened name used by solvers and LP files.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for VarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarKey::Capacity(edge) => write!(f, "{edge}"),
            VarKey::MessageFlow {
                broadcast,
                message,
                edge,
            } => write!(f, "b{broadcast}m{message}{edge}"),
            VarKey::ReceiverFlow {
                broadcast,
                message,
                receiver,
                edge,
            } => write!(f, "b{broadcast}m{message}{edge}_{receiver}"),
        }
    }
}

/// Name of the trunk flow variable for message `message` of broadcast `broadcast`.
pub fn message_flow_name(broadcast: usize, message: usize, edge: &Edge) -> String {
    VarKey::message_flow(broadcast, message, *edge).name()
}

/// Name of the per-receiver flow variable.
pub fn receiver_flow_name(broadcast: usize, message: usize, receiver: &Node, edge: &Edge) -> String {
    VarKey::receiver_flow(broadcast, message, *receiver, *edge).name()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    pub var: VarKey,
    pub coef: f64,
}

impl Term {
    pub fn new(var: VarKey, coef: f64) -> Self {
        Self { var, coef }
    }

    /// Coefficient 1.
    pub fn unit(var: VarKey) -> Self {
        Self::new(var, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Comparison {
    Le,
    Eq,
    Ge,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Comparison::Le => "<=",
            Comparison::Eq => "=",
            Comparison::Ge => ">=",
        })
    }
}

/// Right-hand side of a constraint: a constant or a sum of terms.
#[derive(Debug, Clone, PartialEq)]
pub enum Rhs {
    Constant(f64),
    Terms(Vec<Term>),
}

/// Which formulation rule produced a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintFamily {
    CapacityNonNegativity,
    MessageFlowNonNegativity,
    DemandSatisfaction,
    SourceCap,
    MessageConservation,
    SharedCapacity,
    ReceiverFlowNonNegativity,
    ReceiverFlowTrunkBound,
    ReceiverSource,
    ReceiverSink,
    ReceiverConservation,
    ListenBudget,
    TellBudget,
}

impl ConstraintFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintFamily::CapacityNonNegativity => "capacity_non_negativity",
            ConstraintFamily::MessageFlowNonNegativity => "message_flow_non_negativity",
            ConstraintFamily::DemandSatisfaction => "demand_satisfaction",
            ConstraintFamily::SourceCap => "source_cap",
            ConstraintFamily::MessageConservation => "message_conservation",
            ConstraintFamily::SharedCapacity => "shared_capacity",
            ConstraintFamily::ReceiverFlowNonNegativity => "receiver_flow_non_negativity",
            ConstraintFamily::ReceiverFlowTrunkBound => "receiver_flow_trunk_bound",
            ConstraintFamily::ReceiverSource => "receiver_source",
            ConstraintFamily::ReceiverSink => "receiver_sink",
            ConstraintFamily::ReceiverConservation => "receiver_conservation",
            ConstraintFamily::ListenBudget => "listen_budget",
            ConstraintFamily::TellBudget => "tell_budget",
        }
    }
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `lhs cmp rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub family: ConstraintFamily,
    pub lhs: Vec<Term>,
    pub cmp: Comparison,
    pub rhs: Rhs,
}

impl Constraint {
    pub fn new(family: ConstraintFamily, lhs: Vec<Term>, cmp: Comparison, rhs: Rhs) -> Self {
        Self {
            family,
            lhs,
            cmp,
            rhs,
        }
    }

    /// `var >= 0`
    pub fn non_negative(family: ConstraintFamily, var: VarKey) -> Self {
        Self::new(family, vec![Term::unit(var)], Comparison::Ge, Rhs::Constant(0.0))
    }

    /// Every term on either side, left first.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        let right: &[Term] = match &self.rhs {
            Rhs::Terms(terms) => terms,
            Rhs::Constant(_) => &[],
        };
        self.lhs.iter().chain(right)
    }

    /// Whether `values` satisfies this constraint within `tol`.
    pub fn is_satisfied(&self, value: impl Fn(&VarKey) -> f64, tol: f64) -> bool {
        let eval = |terms: &[Term]| terms.iter().map(|t| t.coef * value(&t.var)).sum::<f64>();
        let left = eval(&self.lhs);
        let right = match &self.rhs {
            Rhs::Constant(c) => *c,
            Rhs::Terms(terms) => eval(terms),
        };
        match self.cmp {
            Comparison::Le => left <= right + tol,
            Comparison::Eq => (left - right).abs() <= tol,
            Comparison::Ge => left + tol >= right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sense {
    Minimize,
    Maximize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub sense: Sense,
    pub terms: Vec<Term>,
}

/// Counts reported by [`LpModel::stats`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelStats {
    pub constraints: usize,
    pub variables: usize,
    pub by_family: BTreeMap<ConstraintFamily, usize>,
}

/// Objective plus an ordered list of linear constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct LpModel {
    pub objective: Objective,
    pub constraints: Vec<Constraint>,
}

impl LpModel {
    pub fn new(objective: Objective, constraints: Vec<Constraint>) -> Self {
        Self {
            objective,
            constraints,
        }
    }

    /// Append caller constraints, e.g. responsibility budgets.
    pub fn extend(&mut self, constraints: impl IntoIterator<Item = Constraint>) {
        self.constraints.extend(constraints);
    }

    /// Distinct variables in order of first appearance (objective first).
    pub fn variable_keys(&self) -> Vec<VarKey> {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        let all = self
            .objective
            .terms
            .iter()
            .chain(self.constraints.iter().flat_map(|c| c.terms()));
        for term in all {
            if seen.insert(term.var) {
                keys.push(term.var);
            }
        }
        keys
    }

    /// Flattened names of [`variable_keys`](Self::variable_keys).
    pub fn variables(&self) -> Vec<String> {
        self.variable_keys().iter().map(VarKey::name).collect()
    }

    pub fn constraints_in(&self, family: ConstraintFamily) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(move |c| c.family == family)
    }

    pub fn stats(&self) -> ModelStats {
        let mut by_family = BTreeMap::new();
        for c in &self.constraints {
            *by_family.entry(c.family).or_insert(0) += 1;
        }
        ModelStats {
            constraints: self.constraints.len(),
            variables: self.variable_keys().len(),
            by_family,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: Node, to: Node) -> Edge {
        Edge::between(from, to).unwrap()
    }

    #[test]
    fn names_follow_wire_format() {
        let e = edge(Node::relayer(0), Node::receiver(3));
        assert_eq!(VarKey::capacity(e).name(), "er0t3");
        assert_eq!(message_flow_name(2, 7, &e), "b2m7er0t3");
        assert_eq!(receiver_flow_name(2, 7, &Node::receiver(3), &e), "b2m7er0t3_t3");
    }

    #[test]
    fn variable_keys_are_deduplicated_in_order() {
        let a = VarKey::capacity(edge(Node::sender(0), Node::relayer(0)));
        let b = VarKey::message_flow(0, 0, edge(Node::sender(0), Node::relayer(0)));
        let model = LpModel::new(
            Objective {
                sense: Sense::Minimize,
                terms: vec![Term::new(a, 2.0)],
            },
            vec![
                Constraint::non_negative(ConstraintFamily::MessageFlowNonNegativity, b),
                Constraint::new(
                    ConstraintFamily::SharedCapacity,
                    vec![Term::unit(b)],
                    Comparison::Le,
                    Rhs::Terms(vec![Term::unit(a)]),
                ),
            ],
        );
        assert_eq!(model.variables(), vec!["es0r0", "b0m0es0r0"]);
        let stats = model.stats();
        assert_eq!(stats.constraints, 2);
        assert_eq!(stats.variables, 2);
        assert_eq!(stats.by_family[&ConstraintFamily::SharedCapacity], 1);
    }

    #[test]
    fn satisfaction_respects_comparison() {
        let a = VarKey::capacity(edge(Node::sender(0), Node::relayer(0)));
        let c = Constraint::new(
            ConstraintFamily::SourceCap,
            vec![Term::unit(a)],
            Comparison::Le,
            Rhs::Constant(5.0),
        );
        assert!(c.is_satisfied(|_| 5.0, 1e-9));
        assert!(!c.is_satisfied(|_| 5.1, 1e-9));
        let eq = Constraint { cmp: Comparison::Eq, ..c.clone() };
        assert!(eq.is_satisfied(|_| 5.0, 1e-9));
        assert!(!eq.is_satisfied(|_| 4.0, 1e-9));
    }
}
