//! `build`: write the model as an LP file

use anyhow::{Context, Result};
use nco_cli::ModelArgs;
use nco_lp::write_lp_file;
use std::path::Path;
use tracing::{debug, info};

use super::prepare;

pub fn handle(args: &ModelArgs, out: &Path) -> Result<()> {
    let prepared = prepare(args)?;
    let stats = prepared.model.stats();
    for (family, count) in &stats.by_family {
        debug!(%family, count, "constraint family");
    }

    write_lp_file(&prepared.model, out)
        .with_context(|| format!("writing LP file {}", out.display()))?;
    info!(path = %out.display(), "wrote LP file");

    println!("num Constraints {}", stats.constraints);
    println!("num Variables {}", stats.variables);
    println!("Wrote {}", out.display());
    Ok(())
}
