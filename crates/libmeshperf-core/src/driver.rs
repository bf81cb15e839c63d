//! Benchmark driver: runs every benchmark kind across the mesh in turn

use tracing::info;

use crate::aggregator::run_phase;
use crate::config::{BenchmarkConfig, MIN_MACHINES};
use crate::error::{MeshError, Result};
use crate::kind::BenchmarkKind;
use crate::machine::Machine;
use crate::record::ResultRecord;
use crate::topology::directed_pair_count;

/// Mesh benchmark over a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct MeshBenchmark {
    config: BenchmarkConfig,
}

impl MeshBenchmark {
    pub fn new(config: BenchmarkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Measure total throughput, then average latency.
    ///
    /// The kinds run one after the other so bulk transfers never overlap the
    /// request/response test. Always returns one record per kind, in
    /// [`BenchmarkKind::ALL`] order.
    pub fn run<M: Machine>(&self, machines: &[M]) -> Result<Vec<ResultRecord>> {
        ensure_mesh(machines.len())?;

        let mut results = Vec::with_capacity(BenchmarkKind::ALL.len());
        for kind in BenchmarkKind::ALL {
            results.push(self.run_kind(machines, kind)?);
        }
        Ok(results)
    }

    /// Run a single kind and apply its normalization
    pub fn run_kind<M: Machine>(&self, machines: &[M], kind: BenchmarkKind) -> Result<ResultRecord> {
        ensure_mesh(machines.len())?;
        let mut record = ResultRecord::new(kind, machines.len(), self.config.connections);
        run_phase(machines, kind, &self.config, &mut record)?;

        if kind.is_averaged() {
            let links = directed_pair_count(machines.len(), self.config.connections);
            record.value /= links as f64;
        }

        info!(
            metric = %record.metric,
            value = record.value,
            unit = %record.unit,
            "Benchmark result"
        );
        Ok(record)
    }
}

fn ensure_mesh(machine_count: usize) -> Result<()> {
    if machine_count < MIN_MACHINES {
        return Err(MeshError::InvalidArgs(format!(
            "mesh benchmark needs at least {} machines, got {}",
            MIN_MACHINES, machine_count
        )));
    }
    Ok(())
}
