//! netperf install and teardown on the mesh machines
//!
//! Every machine needs netperf installed and a `netserver` listening before
//! the benchmark runs. The archive is fetched once and copied across the
//! mesh, then each machine builds it in parallel.

use std::thread;

use tracing::{debug, info};

use crate::error::{MeshError, Result};
use crate::machine::{CommandOutput, Machine};

pub const NETPERF_VERSION: &str = "2.6.0";
pub const NETPERF_ARCHIVE: &str = "netperf-2.6.0.tar.gz";
pub const NETPERF_URL: &str = "ftp://ftp.netperf.org/netperf/netperf-2.6.0.tar.gz";
pub const NETPERF_DIR: &str = "netperf-2.6.0";
/// Where `make install` puts the client binary
pub const NETPERF_BIN: &str = "/usr/local/bin/netperf";
/// Toolchain needed to build netperf from source
pub const BUILD_PACKAGE: &str = "build-essential";

/// Download netperf once, copy it to every machine, then build it and start
/// `netserver` on all machines concurrently.
pub fn prepare<M: Machine>(machines: &[M]) -> Result<()> {
    let first = machines
        .first()
        .ok_or_else(|| MeshError::InvalidArgs("no machines to prepare".to_string()))?;

    info!(machine = %first.name(), url = NETPERF_URL, "Downloading netperf");
    run_checked(first, &format!("/usr/bin/wget {}", NETPERF_URL))?;

    for machine in &machines[1..] {
        debug!(from = %first.name(), to = %machine.name(), "Copying netperf archive");
        first.move_file(machine, NETPERF_ARCHIVE)?;
    }

    thread::scope(|scope| -> Result<()> {
        let mut handles = Vec::with_capacity(machines.len());
        for machine in machines {
            let handle = thread::Builder::new()
                .name(format!("prepare-{}", machine.name()))
                .spawn_scoped(scope, move || prepare_machine(machine))?;
            handles.push((machine.name(), handle));
        }

        let mut first_error = None;
        for (name, handle) in handles {
            let outcome = handle
                .join()
                .unwrap_or_else(|_| Err(MeshError::WorkerPanicked(name.to_string())));
            if let Err(e) = outcome {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    })
}

/// Build and install netperf on one machine and start its listener
pub fn prepare_machine<M: Machine + ?Sized>(machine: &M) -> Result<()> {
    info!(machine = %machine.name(), "Preparing netperf");
    machine.install_package(BUILD_PACKAGE)?;
    run_checked(machine, &format!("tar xvfz {}", NETPERF_ARCHIVE))?;
    run_checked(
        machine,
        &format!("cd {};./configure;make;sudo make install", NETPERF_DIR),
    )?;
    run_checked(machine, "netserver")?;
    Ok(())
}

/// Stop `netserver`, uninstall netperf and remove its files from every machine
pub fn cleanup<M: Machine>(machines: &[M]) -> Result<()> {
    for machine in machines {
        cleanup_machine(machine)?;
    }
    Ok(())
}

pub fn cleanup_machine<M: Machine + ?Sized>(machine: &M) -> Result<()> {
    info!(machine = %machine.name(), "Uninstalling netperf");

    // pkill exits 1 when no netserver is running
    let killed = machine.remote_command("pkill -9 netserver")?;
    if !killed.success() {
        debug!(machine = %machine.name(), exit_code = killed.exit_code, "No netserver to stop");
    }

    run_checked(machine, &format!("cd {};sudo make uninstall", NETPERF_DIR))?;
    run_checked(machine, &format!("rm -rf {}", NETPERF_DIR))?;
    run_checked(machine, &format!("rm -f {}", NETPERF_ARCHIVE))?;
    machine.uninstall_package(BUILD_PACKAGE)?;
    Ok(())
}

fn run_checked<M: Machine + ?Sized>(machine: &M, cmd: &str) -> Result<CommandOutput> {
    Ok(machine.remote_command(cmd)?.check(machine.name(), cmd)?)
}
