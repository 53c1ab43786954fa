//! # nco-lp: LP Formulation for Multicast Network Design
//!
//! Expands a [`Graph`](nco_core::Graph) and a list of
//! [`Broadcast`](nco_core::Broadcast)s into a complete sparse linear
//! program: an objective over edge capacities and nine families of
//! constraints over capacity, trunk-flow and per-receiver flow variables.
//!
//! ## Architecture
//!
//! - **[`model`]**: solver-agnostic IR ([`LpModel`], [`Constraint`],
//!   structured [`VarKey`]s flattened to names only at the boundary)
//! - **[`formulation`]**: one pure function per constraint family, and
//!   [`basic_lp`] which validates input and concatenates them
//! - **[`responsibility`]**: per-node listen/tell budgets, appended by callers
//! - **[`writer`]**: CPLEX LP text output
//! - **`solve`**: good_lp/Clarabel adapter (feature `solver-clarabel`)
//!
//! ## Variable naming
//!
//! | Variable | Name |
//! |----------|------|
//! | capacity on edge `e` | edge name, e.g. `es0r1` |
//! | trunk flow | `b{broadcast}m{message}{edge}` |
//! | receiver flow | `b{broadcast}m{message}{edge}_{receiver}` |
//!
//! ## Example
//!
//! ```no_run
//! use nco_core::{sender_receiver_pairs, RelayerGraph};
//! use nco_lp::{basic_lp, responsibility_constraints, write_lp_file};
//!
//! let graph = RelayerGraph::new(10, 8, 10, 1e-2);
//! let broadcasts = sender_receiver_pairs(10, 10);
//!
//! let mut model = basic_lp(&broadcasts, &graph)?;
//! model.extend(responsibility_constraints(&graph, 10.0, 10.0)?);
//! println!("num constraints {}", model.constraints.len());
//! write_lp_file(&model, "problem.lp")?;
//! # Ok::<(), nco_core::NcoError>(())
//! ```

pub mod formulation;
pub mod model;
pub mod responsibility;
#[cfg(feature = "solver-clarabel")]
pub mod solve;
pub mod writer;

pub use formulation::{basic_lp, GraphIndex};
pub use model::{
    message_flow_name, receiver_flow_name, Comparison, Constraint, ConstraintFamily, LpModel,
    ModelStats, Objective, Rhs, Sense, Term, VarKey,
};
pub use responsibility::responsibility_constraints;
#[cfg(feature = "solver-clarabel")]
pub use solve::{solve, LpSolution};
pub use writer::{write_lp, write_lp_file};

/// Solved values at or below this magnitude are treated as zero.
pub const DEFAULT_ZERO_TOL: f64 = 1e-6;
