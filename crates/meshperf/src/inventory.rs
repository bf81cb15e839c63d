//! Machine inventory loaded from TOML
//!
//! ```toml
//! [benchmark]
//! connections = 2
//! duration_seconds = 30
//!
//! [[machines]]
//! name = "vm-0"
//! host = "203.0.113.10"
//! user = "perf"
//! internal_address = "10.128.0.2"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use libmeshperf_core::{required_machine_count, BenchmarkConfig, MeshError};
use serde::{Deserialize, Serialize};

/// A provisioned machine reachable over SSH
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineEntry {
    pub name: String,
    /// Address used for SSH from this host
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_file: Option<PathBuf>,
    /// Address the other machines use; defaults to `host`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_address: Option<String>,
}

impl MachineEntry {
    pub fn internal_address(&self) -> &str {
        self.internal_address.as_deref().unwrap_or(&self.host)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
    #[serde(default)]
    pub machines: Vec<MachineEntry>,
}

impl Inventory {
    pub fn validate(&self) -> Result<(), MeshError> {
        self.benchmark.validate()?;

        let mut names = HashSet::new();
        for machine in &self.machines {
            if machine.name.is_empty() || machine.host.is_empty() {
                return Err(MeshError::InvalidArgs(
                    "every inventory machine needs a name and a host".to_string(),
                ));
            }
            if !names.insert(machine.name.as_str()) {
                return Err(MeshError::InvalidArgs(format!(
                    "duplicate machine name in inventory: {}",
                    machine.name
                )));
            }
        }
        Ok(())
    }

    /// The first `requested` machines, raised to the mesh minimum.
    ///
    /// With no request every machine in the inventory is used.
    pub fn select(&self, requested: Option<usize>) -> Result<&[MachineEntry], MeshError> {
        let count = required_machine_count(requested.unwrap_or(self.machines.len()));
        if count > self.machines.len() {
            return Err(MeshError::InvalidArgs(format!(
                "need {} machines but the inventory lists {}",
                count,
                self.machines.len()
            )));
        }
        Ok(&self.machines[..count])
    }
}

/// Load and validate an inventory file
pub fn load_inventory(path: &Path) -> Result<Inventory, MeshError> {
    if !path.exists() {
        return Err(MeshError::NotFound(format!(
            "inventory file {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    let inventory: Inventory = toml::from_str(&content)?;
    inventory.validate()?;
    Ok(inventory)
}

/// Save an inventory file
pub fn save_inventory(path: &Path, inventory: &Inventory) -> Result<(), MeshError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = toml::to_string_pretty(inventory)?;
    std::fs::write(path, content)?;
    Ok(())
}
