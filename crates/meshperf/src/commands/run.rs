use libmeshperf_core::{netperf, BenchmarkConfig, Machine, MeshBenchmark, MeshError};
use tracing::{info, warn};

use crate::cli::{Cli, RunArgs};
use crate::commands::connect;
use crate::output::{output_results, print_human};
use crate::report::RunReport;

pub fn run(cli: &Cli, args: &RunArgs) -> Result<(), MeshError> {
    let (inventory, machines) = connect(cli, &args.selection)?;
    let config = effective_config(&inventory.benchmark, args)?;
    let bench = MeshBenchmark::new(config)?;

    info!(
        machines = machines.len(),
        connections = bench.config().connections,
        iterations = bench.config().iterations,
        "Running mesh benchmark"
    );

    if args.prepare {
        netperf::prepare(&machines)?;
    }

    let outcome = bench.run(&machines);

    if args.cleanup {
        if let Err(e) = netperf::cleanup(&machines) {
            warn!(error = %e, "Cleanup after benchmark failed");
        }
    }

    let results = outcome?;

    if let Some(ref path) = args.report {
        let names = machines.iter().map(|m| m.name().to_string()).collect();
        RunReport::new(names, bench.config().clone(), results.clone()).write(path)?;
        print_human(cli, &format!("Report saved to {}", path.display()));
    }

    output_results(cli, &results)
}

/// Inventory `[benchmark]` settings with command-line overrides applied
pub fn effective_config(base: &BenchmarkConfig, args: &RunArgs) -> Result<BenchmarkConfig, MeshError> {
    BenchmarkConfig::new(
        args.connections.unwrap_or(base.connections),
        args.iterations.unwrap_or(base.iterations),
        args.duration.or(base.duration_seconds),
    )
}
