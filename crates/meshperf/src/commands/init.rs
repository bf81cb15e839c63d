use libmeshperf_core::{BenchmarkConfig, MeshError};
use serde_json::json;

use crate::cli::Cli;
use crate::inventory::{save_inventory, Inventory, MachineEntry};
use crate::output::{output_success, print_human};

pub fn run(cli: &Cli, hosts: &[String], user: Option<&str>, force: bool) -> Result<(), MeshError> {
    if cli.inventory.exists() && !force {
        return Err(MeshError::InvalidArgs(format!(
            "{} already exists (use --force to overwrite)",
            cli.inventory.display()
        )));
    }

    let inventory = starter_inventory(hosts, user);
    inventory.validate()?;
    save_inventory(&cli.inventory, &inventory)?;

    print_human(
        cli,
        &format!(
            "Wrote {} machines to {}",
            inventory.machines.len(),
            cli.inventory.display()
        ),
    );
    output_success(
        cli,
        json!({
            "inventory": cli.inventory.display().to_string(),
            "machines": inventory.machines.len(),
        }),
    )
}

fn starter_inventory(hosts: &[String], user: Option<&str>) -> Inventory {
    Inventory {
        benchmark: BenchmarkConfig::default(),
        machines: hosts
            .iter()
            .enumerate()
            .map(|(i, host)| MachineEntry {
                name: format!("vm-{}", i),
                host: host.clone(),
                user: user.map(str::to_string),
                port: None,
                identity_file: None,
                internal_address: None,
            })
            .collect(),
    }
}
