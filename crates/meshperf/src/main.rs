//! meshperf - mesh network benchmark over SSH
//!
//! Runs netperf from every machine in an inventory to every other machine
//! and reports total throughput and average latency.

mod cli;
mod commands;
mod inventory;
mod output;
mod report;
mod ssh;

use std::sync::Arc;

use clap::Parser;
use libmeshperf_core::MeshError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Command};

/// Exit code used when interrupted by a signal
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    let cli = Arc::new(Cli::parse());

    init_logging(&cli.log_level);

    // Remote calls block, so the command runs on the blocking pool while this
    // task waits for either completion or a shutdown signal.
    let worker = tokio::task::spawn_blocking({
        let cli = Arc::clone(&cli);
        move || run_command(&cli)
    });

    let result = tokio::select! {
        joined = worker => joined.unwrap_or_else(|e| Err(MeshError::Internal(e.to_string()))),
        _ = shutdown_signal() => {
            warn!("Interrupted; netperf processes already started on remote machines keep running");
            std::process::exit(EXIT_INTERRUPTED);
        }
    };

    if let Err(e) = result {
        output::output_error(&cli, &e);
        std::process::exit(e.exit_code());
    }
}

fn run_command(cli: &Cli) -> Result<(), MeshError> {
    info!(inventory = %cli.inventory.display(), "meshperf starting");

    match &cli.command {
        Command::Init { hosts, user, force } => commands::init::run(cli, hosts, user.as_deref(), *force),
        Command::Prepare { selection } => commands::prepare::run(cli, selection),
        Command::Run(args) => commands::run::run(cli, args),
        Command::Cleanup { selection } => commands::cleanup::run(cli, selection),
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
