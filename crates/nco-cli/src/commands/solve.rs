//! `solve`: run the Clarabel adapter and report capacities

use anyhow::{Context, Result};
use nco_cli::ModelArgs;
use nco_lp::solve;
use serde::Serialize;
use std::io;
use std::io::Write;

use super::prepare;

#[derive(Debug, Serialize)]
struct SolveOutput {
    status: String,
    objective: f64,
    broadcasts: usize,
    constraints: usize,
    capacities: Vec<CapacityOutput>,
    solve_time_ms: u64,
}

#[derive(Debug, Serialize)]
struct CapacityOutput {
    edge: String,
    from: String,
    to: String,
    capacity: f64,
}

pub fn handle(args: &ModelArgs, json: bool, tol: f64) -> Result<()> {
    let prepared = prepare(args)?;
    let solution = solve(&prepared.model).context("solving LP model")?;

    let capacities: Vec<CapacityOutput> = solution
        .provisioned(&prepared.graph, tol)
        .into_iter()
        .map(|(edge, capacity)| CapacityOutput {
            edge: edge.name(),
            from: edge.from().name(),
            to: edge.to().name(),
            capacity,
        })
        .collect();

    let output = SolveOutput {
        status: "optimal".to_string(),
        objective: solution.objective,
        broadcasts: prepared.broadcasts.len(),
        constraints: prepared.model.constraints.len(),
        capacities,
        solve_time_ms: solution.solve_time.as_millis() as u64,
    };

    if json {
        serde_json::to_writer_pretty(io::stdout(), &output)
            .map_err(|err| anyhow::anyhow!("serializing solution to JSON: {err}"))?;
        println!();
        return Ok(());
    }

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "Optimal value is: {:.6}", output.objective)?;
    for cap in &output.capacities {
        writeln!(stdout, "{} = {:.6}", cap.edge, cap.capacity)?;
    }
    Ok(())
}
