pub mod build;
pub mod names;
#[cfg(feature = "solver-clarabel")]
pub mod solve;

use anyhow::{Context, Result};
use nco_cli::{DemandConfig, ModelArgs, RunConfig};
use nco_core::{all_to_all, load_broadcasts, sender_receiver_pairs, Broadcast, RelayerGraph};
use nco_lp::{basic_lp, responsibility_constraints, LpModel};
use tracing::info;

/// Graph, demand and the assembled model for one run.
pub struct Prepared {
    pub graph: RelayerGraph,
    pub broadcasts: Vec<Broadcast>,
    pub model: LpModel,
}

pub fn prepare(args: &ModelArgs) -> Result<Prepared> {
    let config = RunConfig::from_args(args)?;
    let topo = &config.topology;
    let graph = RelayerGraph::new(topo.senders, topo.relayers, topo.receivers, topo.epsilon);

    let broadcasts = match &config.demand {
        DemandConfig::Pairs => sender_receiver_pairs(topo.senders, topo.receivers),
        DemandConfig::AllToAll { weight } => all_to_all(topo.senders, topo.receivers, *weight),
        DemandConfig::File { path } => load_broadcasts(path)
            .with_context(|| format!("loading broadcasts from {}", path.display()))?,
    };
    info!(
        senders = topo.senders,
        relayers = topo.relayers,
        receivers = topo.receivers,
        broadcasts = broadcasts.len(),
        "preparing model"
    );

    let mut model = basic_lp(&broadcasts, &graph).context("building LP model")?;
    if config.budget.enabled {
        let budget = &config.budget;
        let cons = responsibility_constraints(&graph, budget.listen, budget.tell)
            .context("building responsibility constraints")?;
        model.extend(cons);
    }

    Ok(Prepared {
        graph,
        broadcasts,
        model,
    })
}
