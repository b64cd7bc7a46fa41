// file: src/cli/commands.rs
// version: 2.0.0
// guid: g7h8i9j0-k1l2-3456-7890-123456ghijkl

//! Command implementations for the CLI

use crate::{
    grains::GrainMap,
    logging::Log,
    store::DeviceConfigStore,
    Result,
};
use std::io::Write;

/// Print grains as JSON, raw or projected onto the device fields
pub fn grains_command(
    store: &DeviceConfigStore,
    structured: bool,
    log: &dyn Log,
    out: &mut dyn Write,
) -> Result<()> {
    let json = if structured {
        serde_json::to_string_pretty(&store.read_device_grains(log)?)?
    } else {
        serde_json::to_string_pretty(&store.read_grains(log)?)?
    };

    writeln!(out, "{}", json)?;
    Ok(())
}

/// Set grains through the salt agent
pub async fn set_grains_command(
    store: &DeviceConfigStore,
    pairs: Vec<(String, String)>,
    log: &dyn Log,
) -> Result<()> {
    let grains: GrainMap = pairs.into_iter().collect();
    log.info(&format!("Setting {} grain(s)", grains.len()));

    store.write_grains(&grains, log).await?;

    log.info("Grains updated");
    Ok(())
}

/// Print the nodegroup
pub fn nodegroup_command(store: &DeviceConfigStore, out: &mut dyn Write) -> Result<()> {
    let nodegroup = store.read_nodegroup()?;
    writeln!(out, "{}", nodegroup)?;
    Ok(())
}

/// Print the minion ID
pub fn minion_id_command(
    store: &DeviceConfigStore,
    log: &dyn Log,
    out: &mut dyn Write,
) -> Result<()> {
    let id = store.read_minion_id(log)?;
    writeln!(out, "{}", id)?;
    Ok(())
}
