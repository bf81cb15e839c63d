use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "meshperf",
    about = "Measure cross-sectional throughput and latency across a mesh of machines",
    version
)]
pub struct Cli {
    /// Machine inventory (TOML)
    #[arg(long, short, global = true, default_value = "meshperf.toml")]
    pub inventory: PathBuf,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress human-readable output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// SSH connection timeout in seconds
    #[arg(long, global = true, default_value_t = crate::ssh::DEFAULT_CONNECT_TIMEOUT_SECS)]
    pub connect_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Clone)]
pub enum Command {
    /// Write a starter inventory listing the given hosts
    Init {
        /// SSH host of a machine, repeat once per machine
        #[arg(long = "host", required = true)]
        hosts: Vec<String>,

        /// SSH user for every machine
        #[arg(long)]
        user: Option<String>,

        /// Overwrite an existing inventory
        #[arg(long)]
        force: bool,
    },

    /// Install netperf on the machines and start netserver
    Prepare {
        #[command(flatten)]
        selection: Selection,
    },

    /// Run the throughput and latency benchmarks across the mesh
    Run(RunArgs),

    /// Stop netserver and uninstall netperf from the machines
    Cleanup {
        #[command(flatten)]
        selection: Selection,
    },
}

#[derive(Args, Clone, Debug, Default)]
pub struct Selection {
    /// Number of machines from the inventory to use (at least 2)
    #[arg(long, short = 'n')]
    pub machines: Option<usize>,
}

#[derive(Args, Clone, Debug, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub selection: Selection,

    /// Connections between each pair of machines
    #[arg(long, short = 'c')]
    pub connections: Option<usize>,

    /// Iterations for each netperf run
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Length of each netperf run in seconds
    #[arg(long, short = 'd')]
    pub duration: Option<u64>,

    /// Write a JSON report to this file
    #[arg(long, short = 'r')]
    pub report: Option<PathBuf>,

    /// Install netperf before running
    #[arg(long)]
    pub prepare: bool,

    /// Uninstall netperf after running, even if the run failed
    #[arg(long)]
    pub cleanup: bool,
}
