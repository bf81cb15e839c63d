pub mod cleanup;
pub mod init;
pub mod prepare;
pub mod run;

use std::time::Duration;

use libmeshperf_core::MeshError;

use crate::cli::{Cli, Selection};
use crate::inventory::{load_inventory, Inventory};
use crate::ssh::SshMachine;

/// Load the inventory and open SSH handles for the selected machines
pub fn connect(cli: &Cli, selection: &Selection) -> Result<(Inventory, Vec<SshMachine>), MeshError> {
    let inventory = load_inventory(&cli.inventory)?;
    let machines = inventory
        .select(selection.machines)?
        .iter()
        .cloned()
        .map(|entry| {
            SshMachine::new(entry).with_connect_timeout(Duration::from_secs(cli.connect_timeout))
        })
        .collect();
    Ok((inventory, machines))
}
