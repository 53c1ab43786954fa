pub mod cli;
pub mod config;

pub use cli::{build_cli_command, Cli, Commands, ModelArgs};
pub use config::{load_run_config, BudgetConfig, DemandConfig, RunConfig, TopologyConfig};
