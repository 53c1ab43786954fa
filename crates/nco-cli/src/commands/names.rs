//! `names`: resolve a tuple to its variable name

use anyhow::{Context, Result};
use nco_core::{Edge, Node};
use nco_lp::VarKey;

pub fn handle(broadcast: usize, message: usize, edge: &str, receiver: Option<&str>) -> Result<()> {
    let edge: Edge = edge
        .parse()
        .with_context(|| format!("parsing edge name '{edge}'"))?;
    let key = match receiver {
        Some(name) => {
            let receiver: Node = name
                .parse()
                .with_context(|| format!("parsing receiver name '{name}'"))?;
            VarKey::receiver_flow(broadcast, message, receiver, edge)
        }
        None => VarKey::message_flow(broadcast, message, edge),
    };
    println!("{key}");
    Ok(())
}
