//! Per-node fan-in / fan-out budgets.
//!
//! Each node may listen to at most `listen` units of provisioned incoming
//! capacity and tell at most `tell` units of outgoing capacity, regardless
//! of which broadcast uses it. Nodes without incoming (outgoing) edges get
//! no listen (tell) constraint.

use crate::model::{Comparison, Constraint, ConstraintFamily, Rhs, Term, VarKey};
use nco_core::{Graph, NcoError, NcoResult};
use tracing::debug;

fn check_budget(kind: &str, value: f64) -> NcoResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(NcoError::InvalidInput(format!(
            "{kind} budget must be finite and non-negative, got {value}"
        )));
    }
    Ok(())
}

pub fn responsibility_constraints<G: Graph + ?Sized>(
    graph: &G,
    listen: f64,
    tell: f64,
) -> NcoResult<Vec<Constraint>> {
    check_budget("listen", listen)?;
    check_budget("tell", tell)?;

    let mut cons = Vec::new();
    for node in graph.nodes() {
        let parents = graph.edges_to(node);
        if !parents.is_empty() {
            cons.push(Constraint::new(
                ConstraintFamily::ListenBudget,
                parents.into_iter().map(|e| Term::unit(VarKey::capacity(e))).collect(),
                Comparison::Le,
                Rhs::Constant(listen),
            ));
        }

        let children = graph.edges_from(node);
        if !children.is_empty() {
            cons.push(Constraint::new(
                ConstraintFamily::TellBudget,
                children.into_iter().map(|e| Term::unit(VarKey::capacity(e))).collect(),
                Comparison::Le,
                Rhs::Constant(tell),
            ));
        }
    }
    debug!(count = cons.len(), listen, tell, "generated responsibility constraints");
    Ok(cons)
}
