//! Run configuration: TOML file merged with command-line overrides.

use crate::cli::ModelArgs;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub topology: TopologyConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub demand: DemandConfig,
}

/// Size of the three-tier relay graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyConfig {
    #[serde(default = "default_senders")]
    pub senders: usize,
    #[serde(default = "default_relayers")]
    pub relayers: usize,
    #[serde(default = "default_receivers")]
    pub receivers: usize,
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            senders: default_senders(),
            relayers: default_relayers(),
            receivers: default_receivers(),
            epsilon: default_epsilon(),
        }
    }
}

fn default_senders() -> usize {
    10
}

fn default_relayers() -> usize {
    8
}

fn default_receivers() -> usize {
    10
}

fn default_epsilon() -> f64 {
    1e-2
}

/// Per-node listen/tell budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_budget")]
    pub listen: f64,
    #[serde(default = "default_budget")]
    pub tell: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            listen: default_budget(),
            tell: default_budget(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_budget() -> f64 {
    10.0
}

/// Where broadcasts come from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DemandConfig {
    /// One unit-weight broadcast per (sender, receiver) pair
    #[default]
    Pairs,
    /// One broadcast per sender reaching every receiver
    AllToAll {
        #[serde(default = "default_weight")]
        weight: f64,
    },
    /// JSON broadcast file
    File { path: PathBuf },
}

fn default_weight() -> f64 {
    1.0
}

pub fn load_run_config(path: &Path) -> Result<RunConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading run config {}", path.display()))?;
    let config: RunConfig =
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

impl RunConfig {
    /// Load `--config` (if any) and apply every flag on top of it.
    pub fn from_args(args: &ModelArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => load_run_config(path)?,
            None => RunConfig::default(),
        };
        config.apply(args)?;
        Ok(config)
    }

    /// Fails if `--weight` is given for a demand other than all-to-all.
    pub fn apply(&mut self, args: &ModelArgs) -> Result<()> {
        let topology = &mut self.topology;
        if let Some(n) = args.senders {
            topology.senders = n;
        }
        if let Some(n) = args.relayers {
            topology.relayers = n;
        }
        if let Some(n) = args.receivers {
            topology.receivers = n;
        }
        if let Some(eps) = args.epsilon {
            topology.epsilon = eps;
        }

        if let Some(listen) = args.listen {
            self.budget.listen = listen;
        }
        if let Some(tell) = args.tell {
            self.budget.tell = tell;
        }
        if args.no_budget {
            self.budget.enabled = false;
        }

        if let Some(demand) = &args.demand {
            self.demand = match demand.as_str() {
                "pairs" => DemandConfig::Pairs,
                "all-to-all" => DemandConfig::AllToAll {
                    weight: default_weight(),
                },
                path => DemandConfig::File {
                    path: PathBuf::from(path),
                },
            };
        }
        match (args.weight, &mut self.demand) {
            (None, _) => {}
            (Some(w), DemandConfig::AllToAll { weight }) => *weight = w,
            (Some(_), other) => bail!("--weight only applies to all-to-all demand, not {other:?}"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_exploration_run() {
        let config = RunConfig::default();
        assert_eq!(config.topology.senders, 10);
        assert_eq!(config.topology.relayers, 8);
        assert_eq!(config.topology.receivers, 10);
        assert_eq!(config.topology.epsilon, 1e-2);
        assert!(config.budget.enabled);
        assert_eq!(config.budget.listen, 10.0);
        assert_eq!(config.demand, DemandConfig::Pairs);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: RunConfig = toml::from_str(
            r#"
            [topology]
            relayers = 3

            [demand]
            kind = "all-to-all"
            weight = 2.5
            "#,
        )
        .unwrap();
        assert_eq!(config.topology.relayers, 3);
        assert_eq!(config.topology.senders, 10);
        assert_eq!(config.demand, DemandConfig::AllToAll { weight: 2.5 });
    }

    #[test]
    fn flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[topology]\nsenders = 4\n[budget]\nlisten = 3.0").unwrap();
        let args = ModelArgs {
            config: Some(file.path().to_path_buf()),
            senders: Some(2),
            demand: Some("all-to-all".into()),
            weight: Some(7.0),
            ..ModelArgs::default()
        };
        let config = RunConfig::from_args(&args).unwrap();
        assert_eq!(config.topology.senders, 2);
        assert_eq!(config.budget.listen, 3.0);
        assert_eq!(config.demand, DemandConfig::AllToAll { weight: 7.0 });
    }

    #[test]
    fn other_demand_values_are_paths() {
        let mut config = RunConfig::default();
        config
            .apply(&ModelArgs {
                demand: Some("demand.json".into()),
                no_budget: true,
                ..ModelArgs::default()
            })
            .unwrap();
        assert_eq!(
            config.demand,
            DemandConfig::File {
                path: PathBuf::from("demand.json")
            }
        );
        assert!(!config.budget.enabled);
    }

    #[test]
    fn weight_without_all_to_all_is_rejected() {
        let args = ModelArgs {
            weight: Some(2.0),
            ..ModelArgs::default()
        };
        let err = RunConfig::from_args(&args).unwrap_err();
        assert!(err.to_string().contains("--weight"));

        let mut config: RunConfig = toml::from_str("[demand]\nkind = \"all-to-all\"\n").unwrap();
        config.apply(&args).unwrap();
        assert_eq!(config.demand, DemandConfig::AllToAll { weight: 2.0 });
    }
}
