//! Unified error types for the NCO crates
//!
//! [`NcoError`] covers every failure the model builder, the demand readers
//! and the solver adapter can surface. Construction is deterministic, so
//! none of these are retryable: callers either fix their input or stop.
//!
//! # Example
//!
//! ```ignore
//! use nco_core::{NcoError, NcoResult};
//!
//! fn build(path: &str) -> NcoResult<()> {
//!     let broadcasts = nco_core::load_broadcasts(path)?;
//!     let model = nco_lp::basic_lp(&broadcasts, &graph)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for all NCO operations.
#[derive(Error, Debug)]
pub enum NcoError {
    /// An edge (or node) the graph never produces was handed to a graph query.
    #[error("Unsupported edge: {0}")]
    UnsupportedEdge(String),

    /// Malformed demand data (empty receivers, bad weight, duplicates, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A user-built topology with colliding names or impossible edges
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// I/O errors (demand files, LP output)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Solver backend failures other than infeasibility
    #[error("Solver error: {0}")]
    Solver(String),

    /// The solver proved the model has no feasible point
    #[error("Problem infeasible: {0}")]
    Infeasible(String),
}

/// Convenience type alias for Results using NcoError.
pub type NcoResult<T> = Result<T, NcoError>;

impl From<serde_json::Error> for NcoError {
    fn from(err: serde_json::Error) -> Self {
        NcoError::Parse(err.to_string())
    }
}
