//! Concurrent aggregation of one benchmark kind across the mesh
//!
//! One worker thread per source machine composes its netperf command, runs
//! it, and parses the report. Workers send their contribution over a channel
//! to a single reducer (the calling thread), so the only shared state is the
//! channel itself and the remote calls run fully in parallel.

use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::command::compose;
use crate::config::BenchmarkConfig;
use crate::error::{MeshError, Result};
use crate::kind::BenchmarkKind;
use crate::machine::Machine;
use crate::parser::contribution;
use crate::record::ResultRecord;

/// One source machine's share of the aggregate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub source: usize,
    pub value: f64,
}

/// Per-phase accumulator owned by the reducer.
///
/// Contributions are slotted by source index and summed in machine order,
/// so the total does not depend on the order workers finish in.
#[derive(Debug, Clone)]
pub struct Accumulator {
    slots: Vec<Option<f64>>,
}

impl Accumulator {
    pub fn new(sources: usize) -> Self {
        Self {
            slots: vec![None; sources],
        }
    }

    /// Merge one contribution; each source may contribute exactly once
    pub fn merge(&mut self, contribution: Contribution) -> Result<()> {
        let sources = self.slots.len();
        let slot = self.slots.get_mut(contribution.source).ok_or_else(|| {
            MeshError::Internal(format!(
                "contribution from source {} outside mesh of {}",
                contribution.source, sources
            ))
        })?;
        if slot.is_some() {
            return Err(MeshError::Internal(format!(
                "source {} contributed twice",
                contribution.source
            )));
        }
        *slot = Some(contribution.value);
        Ok(())
    }

    /// Number of sources that have contributed
    pub fn merged(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.merged() == self.slots.len()
    }

    pub fn total(&self) -> f64 {
        self.slots.iter().flatten().sum()
    }
}

/// Message from a worker to the reducer
struct WorkerReport {
    source: usize,
    outcome: Result<f64>,
}

/// Run `kind` from every machine at once and add the summed contributions to
/// `record.value`.
///
/// Returns once every worker has finished. If any worker fails, the first
/// failure is returned and `record` is left untouched.
pub fn run_phase<M: Machine>(
    machines: &[M],
    kind: BenchmarkKind,
    config: &BenchmarkConfig,
    record: &mut ResultRecord,
) -> Result<()> {
    let addresses: Vec<&str> = machines.iter().map(|m| m.internal_address()).collect();
    let start = Instant::now();

    info!(
        benchmark = %kind,
        machines = machines.len(),
        connections = config.connections,
        "Starting benchmark phase"
    );

    let (tx, rx) = mpsc::channel::<WorkerReport>();

    let accumulator = thread::scope(|scope| -> Result<Accumulator> {
        let mut handles = Vec::with_capacity(machines.len());
        for (source, machine) in machines.iter().enumerate() {
            let tx = tx.clone();
            let addresses = &addresses;
            let handle = thread::Builder::new()
                .name(format!("meshperf-{}", machine.name()))
                .spawn_scoped(scope, move || {
                    let outcome = run_source(machine, kind, addresses, source, config);
                    // The reducer outlives every worker
                    let _ = tx.send(WorkerReport { source, outcome });
                })?;
            handles.push(handle);
        }
        drop(tx);

        let mut accumulator = Accumulator::new(machines.len());
        let mut first_error: Option<MeshError> = None;

        for report in rx {
            match report.outcome {
                Ok(value) => {
                    if let Err(e) = accumulator.merge(Contribution {
                        source: report.source,
                        value,
                    }) {
                        first_error.get_or_insert(e);
                    }
                }
                Err(e) => {
                    warn!(
                        benchmark = %kind,
                        source = %machines[report.source].name(),
                        error = %e,
                        "Benchmark worker failed"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        for (handle, machine) in handles.into_iter().zip(machines) {
            if handle.join().is_err() {
                first_error.get_or_insert(MeshError::WorkerPanicked(machine.name().to_string()));
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(accumulator),
        }
    })?;

    if !accumulator.is_complete() {
        return Err(MeshError::Internal(format!(
            "{} of {} sources reported",
            accumulator.merged(),
            machines.len()
        )));
    }

    record.value += accumulator.total();

    info!(
        benchmark = %kind,
        raw_value = record.value,
        duration_ms = %start.elapsed().as_millis(),
        "Benchmark phase complete"
    );

    Ok(())
}

/// Compose, execute and parse for a single source machine
fn run_source<M: Machine>(
    machine: &M,
    kind: BenchmarkKind,
    addresses: &[&str],
    source: usize,
    config: &BenchmarkConfig,
) -> Result<f64> {
    let cmd = compose(kind, addresses, source, config);
    debug!(source = %machine.name(), command = %cmd, "Running netperf");

    let output = machine
        .remote_command(&cmd)?
        .check(machine.name(), &cmd)?;
    debug!(source = %machine.name(), stdout = %output.stdout, "netperf output");

    let value = contribution(kind, machine.name(), &output.stdout);
    info!(
        benchmark = %kind,
        source = %machine.name(),
        value,
        duration_ms = %output.duration.as_millis(),
        "Source contribution"
    );
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulator_order_independent() {
        let values = [0.1, 0.2, 0.3, 1e-9, 12345.678];
        let orders: [[usize; 5]; 3] = [[0, 1, 2, 3, 4], [4, 3, 2, 1, 0], [2, 0, 4, 1, 3]];

        let totals: Vec<f64> = orders
            .iter()
            .map(|order| {
                let mut acc = Accumulator::new(values.len());
                for &source in order {
                    acc.merge(Contribution {
                        source,
                        value: values[source],
                    })
                    .unwrap();
                }
                assert!(acc.is_complete());
                acc.total()
            })
            .collect();

        assert!(totals.iter().all(|t| t.to_bits() == totals[0].to_bits()));
    }

    #[test]
    fn test_accumulator_rejects_double_count() {
        let mut acc = Accumulator::new(2);
        acc.merge(Contribution { source: 0, value: 1.0 }).unwrap();
        assert!(matches!(
            acc.merge(Contribution { source: 0, value: 1.0 }),
            Err(MeshError::Internal(_))
        ));
        assert!(matches!(
            acc.merge(Contribution { source: 5, value: 1.0 }),
            Err(MeshError::Internal(_))
        ));
        assert_eq!(acc.merged(), 1);
        assert!(!acc.is_complete());
        assert_eq!(acc.total(), 1.0);
    }
}
