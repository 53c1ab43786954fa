use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Multicast network capacity planning via LP", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the LP model and write it in LP format
    Build {
        #[command(flatten)]
        model: ModelArgs,
        /// Output LP file
        #[arg(short, long, default_value = "problem.lp")]
        out: PathBuf,
    },
    /// Solve the LP model and report provisioned capacities
    Solve {
        #[command(flatten)]
        model: ModelArgs,
        /// Print the solution as JSON
        #[arg(long)]
        json: bool,
        /// Capacities at or below this are not reported
        #[arg(long, default_value_t = nco_lp::DEFAULT_ZERO_TOL)]
        tol: f64,
    },
    /// Print the variable name of a (broadcast, message, [receiver], edge) tuple
    Names {
        #[arg(long)]
        broadcast: usize,
        #[arg(long)]
        message: usize,
        /// Edge name, e.g. es0r1
        #[arg(long)]
        edge: String,
        /// Receiver name, e.g. t3 (selects the per-receiver flow variable)
        #[arg(long)]
        receiver: Option<String>,
    },
}

/// Topology, demand and budget inputs shared by `build` and `solve`.
///
/// Every flag overrides the matching entry of the `--config` file.
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// TOML run file with [topology], [budget] and [demand] tables
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Number of senders
    #[arg(long)]
    pub senders: Option<usize>,
    /// Number of relayers
    #[arg(long)]
    pub relayers: Option<usize>,
    /// Number of receivers
    #[arg(long)]
    pub receivers: Option<usize>,
    /// Per-relayer-index cost perturbation
    #[arg(long)]
    pub epsilon: Option<f64>,
    /// Per-node incoming capacity budget
    #[arg(long)]
    pub listen: Option<f64>,
    /// Per-node outgoing capacity budget
    #[arg(long)]
    pub tell: Option<f64>,
    /// Do not add listen/tell budget constraints
    #[arg(long)]
    pub no_budget: bool,
    /// Demand: "pairs", "all-to-all", or a path to a JSON broadcast file
    #[arg(long)]
    pub demand: Option<String>,
    /// Message weight for all-to-all demand
    #[arg(long)]
    pub weight: Option<f64>,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
