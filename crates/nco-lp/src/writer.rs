//! CPLEX LP text output (also read by Gurobi, HiGHS and CBC).
//!
//! Right-hand terms are moved to the left so every row reads
//! `name: Σ coef·var  cmp  constant`. Variables default to a lower bound of
//! zero in this format, which matches the explicit non-negativity rows.

use crate::model::{Constraint, LpModel, Rhs, Sense, Term, VarKey};
use nco_core::{NcoError, NcoResult};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Terms per physical line; keeps rows under the 510 character LP limit.
const TERMS_PER_LINE: usize = 8;

/// Collapse `lhs - rhs` into one coefficient per variable, in first-seen order.
fn normalize(constraint: &Constraint) -> (Vec<(VarKey, f64)>, f64) {
    let mut order: Vec<VarKey> = Vec::new();
    let mut coefs: HashMap<VarKey, f64> = HashMap::new();
    let mut push = |term: &Term, sign: f64| {
        let entry = coefs.entry(term.var).or_insert_with(|| {
            order.push(term.var);
            0.0
        });
        *entry += sign * term.coef;
    };
    for term in &constraint.lhs {
        push(term, 1.0);
    }
    let constant = match &constraint.rhs {
        Rhs::Constant(c) => *c,
        Rhs::Terms(terms) => {
            for term in terms {
                push(term, -1.0);
            }
            0.0
        }
    };
    let merged = order.into_iter().map(|v| (v, coefs[&v])).collect();
    (merged, constant)
}

fn write_expr<W: Write>(out: &mut W, terms: &[(VarKey, f64)]) -> std::io::Result<()> {
    for (k, (var, coef)) in terms.iter().enumerate() {
        if k > 0 && k % TERMS_PER_LINE == 0 {
            write!(out, "\n   ")?;
        }
        let sign = if *coef < 0.0 { '-' } else { '+' };
        if k == 0 && sign == '+' {
            write!(out, " {} {}", coef.abs(), var)?;
        } else {
            write!(out, " {} {} {}", sign, coef.abs(), var)?;
        }
    }
    Ok(())
}

/// Write `model` in LP format.
///
/// Fails with [`NcoError::InvalidInput`] if a row has no variables, which
/// the format cannot express.
pub fn write_lp<W: Write>(model: &LpModel, mut out: W) -> NcoResult<()> {
    writeln!(out, "\\ multicast capacity model")?;
    writeln!(
        out,
        "{}",
        match model.objective.sense {
            Sense::Minimize => "Minimize",
            Sense::Maximize => "Maximize",
        }
    )?;
    let objective: Vec<(VarKey, f64)> = model
        .objective
        .terms
        .iter()
        .map(|t| (t.var, t.coef))
        .collect();
    write!(out, " obj:")?;
    write_expr(&mut out, &objective)?;
    writeln!(out)?;

    writeln!(out, "Subject To")?;
    for (row, constraint) in model.constraints.iter().enumerate() {
        let (terms, constant) = normalize(constraint);
        if terms.is_empty() {
            return Err(NcoError::InvalidInput(format!(
                "constraint c{row} ({}) has no variables",
                constraint.family
            )));
        }
        write!(out, " c{row}:")?;
        write_expr(&mut out, &terms)?;
        writeln!(out, " {} {}", constraint.cmp, constant)?;
    }
    writeln!(out, "End")?;
    out.flush()?;
    Ok(())
}

pub fn write_lp_file(model: &LpModel, path: impl AsRef<Path>) -> NcoResult<()> {
    let file = File::create(path.as_ref())?;
    write_lp(model, BufWriter::new(file))
}
