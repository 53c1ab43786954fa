//! Solver adapter: hands an [`LpModel`] to good_lp and reads values back.
//!
//! Every distinct variable name becomes one free continuous variable;
//! bounds come only from the model's own constraints.

use crate::model::{Comparison, LpModel, Rhs, Sense, Term, VarKey};
use crate::DEFAULT_ZERO_TOL;
use good_lp::solvers::clarabel::clarabel;
use good_lp::{
    constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel, Variable,
};
use nco_core::{Edge, Graph, NcoError, NcoResult};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Solved variable values keyed by flattened name.
#[derive(Debug, Clone, Serialize)]
pub struct LpSolution {
    pub objective: f64,
    pub values: BTreeMap<String, f64>,
    #[serde(skip)]
    pub solve_time: Duration,
}

impl LpSolution {
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn value_of(&self, key: &VarKey) -> Option<f64> {
        self.value(&key.name())
    }

    /// Provisioned capacity per edge of `graph`, in edge order.
    pub fn capacities<G: Graph + ?Sized>(&self, graph: &G) -> Vec<(Edge, f64)> {
        graph
            .edges()
            .into_iter()
            .map(|edge| {
                let value = self.value_of(&VarKey::capacity(edge)).unwrap_or(0.0);
                (edge, value)
            })
            .collect()
    }

    /// Edges whose capacity exceeds `tol`, in edge order.
    pub fn provisioned<G: Graph + ?Sized>(&self, graph: &G, tol: f64) -> Vec<(Edge, f64)> {
        self.capacities(graph)
            .into_iter()
            .filter(|(_, value)| *value > tol)
            .collect()
    }
}

fn expression(terms: &[Term], lookup: &HashMap<VarKey, Variable>) -> NcoResult<Expression> {
    let mut expr = Expression::from(0.0);
    for term in terms {
        let var = lookup
            .get(&term.var)
            .copied()
            .ok_or_else(|| NcoError::Solver(format!("variable {} was not declared", term.var)))?;
        expr += term.coef * var;
    }
    Ok(expr)
}

/// Solve `model` with Clarabel.
///
/// Returns [`NcoError::Infeasible`] when the solver proves infeasibility and
/// [`NcoError::Solver`] for any other failure.
pub fn solve(model: &LpModel) -> NcoResult<LpSolution> {
    let start = Instant::now();

    let keys = model.variable_keys();
    if keys.is_empty() {
        // Clarabel cannot factor an empty system; rows are constants only.
        if let Some(c) = model
            .constraints
            .iter()
            .find(|c| !c.is_satisfied(|_| 0.0, DEFAULT_ZERO_TOL))
        {
            return Err(NcoError::Infeasible(format!(
                "constant {} row cannot hold",
                c.family
            )));
        }
        debug!("model has no variables; skipping solver");
        return Ok(LpSolution {
            objective: 0.0,
            values: BTreeMap::new(),
            solve_time: start.elapsed(),
        });
    }

    let mut vars = variables!();
    let mut lookup: HashMap<VarKey, Variable> = HashMap::with_capacity(keys.len());
    for key in &keys {
        lookup.insert(*key, vars.add(variable()));
    }

    let objective = expression(&model.objective.terms, &lookup)?;
    let unsolved = match model.objective.sense {
        Sense::Minimize => vars.minimise(objective),
        Sense::Maximize => vars.maximise(objective),
    };
    let mut problem = unsolved.using(clarabel);

    for c in &model.constraints {
        let lhs = expression(&c.lhs, &lookup)?;
        let rhs = match &c.rhs {
            Rhs::Constant(value) => Expression::from(*value),
            Rhs::Terms(terms) => expression(terms, &lookup)?,
        };
        problem = match c.cmp {
            Comparison::Le => problem.with(constraint!(lhs <= rhs)),
            Comparison::Eq => problem.with(constraint!(lhs == rhs)),
            Comparison::Ge => problem.with(constraint!(lhs >= rhs)),
        };
    }
    debug!(
        variables = keys.len(),
        constraints = model.constraints.len(),
        "handing model to clarabel"
    );

    let solution = match problem.solve() {
        Ok(solution) => solution,
        Err(ResolutionError::Infeasible) => {
            return Err(NcoError::Infeasible(
                "no capacity assignment satisfies every broadcast".to_string(),
            ))
        }
        Err(e) => return Err(NcoError::Solver(e.to_string())),
    };

    let values: BTreeMap<String, f64> = keys
        .iter()
        .map(|key| (key.name(), solution.value(lookup[key])))
        .collect();
    let objective_value: f64 = model
        .objective
        .terms
        .iter()
        .map(|t| t.coef * values.get(&t.var.name()).copied().unwrap_or(0.0))
        .sum();

    let solve_time = start.elapsed();
    info!(
        objective = objective_value,
        elapsed_ms = solve_time.as_millis() as u64,
        "solved LP model"
    );

    Ok(LpSolution {
        objective: objective_value,
        values,
        solve_time,
    })
}
