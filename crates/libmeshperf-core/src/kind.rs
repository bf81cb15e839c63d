//! Benchmark kinds and their reduction rules

use serde::{Deserialize, Serialize};
use tracing::warn;

/// The two measurements taken across the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkKind {
    /// Bulk TCP transfer, summed across every connection
    Throughput,
    /// TCP request/response, averaged over every connection
    Latency,
}

impl BenchmarkKind {
    /// Kinds in the order the driver runs them
    pub const ALL: [BenchmarkKind; 2] = [BenchmarkKind::Throughput, BenchmarkKind::Latency];

    /// netperf test name passed to `-t`
    pub fn tool_id(&self) -> &'static str {
        match self {
            BenchmarkKind::Throughput => "TCP_STREAM",
            BenchmarkKind::Latency => "TCP_RR",
        }
    }

    pub fn metric_name(&self) -> &'static str {
        match self {
            BenchmarkKind::Throughput => "TCP_STREAM_Total_Throughput",
            BenchmarkKind::Latency => "TCP_RR_Average_Latency",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            BenchmarkKind::Throughput => "Mbits/sec",
            BenchmarkKind::Latency => "ms",
        }
    }

    /// Reduce the samples from one source machine to its contribution.
    ///
    /// Throughput samples are already in Mbits/sec and are summed.
    /// Latency samples are TCP_RR transaction rates (transactions/sec); each
    /// is inverted to milliseconds per transaction before summing. netperf
    /// configurations that report a duration instead of a rate would be
    /// misread here.
    pub fn reduce(&self, samples: &[f64]) -> f64 {
        match self {
            BenchmarkKind::Throughput => samples.iter().sum(),
            BenchmarkKind::Latency => samples
                .iter()
                .filter_map(|&rate| {
                    if rate > 0.0 {
                        Some(1000.0 / rate)
                    } else {
                        warn!(rate, "Skipping non-positive TCP_RR transaction rate");
                        None
                    }
                })
                .sum(),
        }
    }

    /// Whether the aggregate is divided by the number of directed connections
    pub fn is_averaged(&self) -> bool {
        matches!(self, BenchmarkKind::Latency)
    }
}

impl std::fmt::Display for BenchmarkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tool_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput_sums() {
        assert_eq!(BenchmarkKind::Throughput.reduce(&[100.0, 200.0]), 300.0);
    }

    #[test]
    fn test_latency_inverts_rates() {
        assert_eq!(BenchmarkKind::Latency.reduce(&[500.0]), 2.0);
        assert_eq!(BenchmarkKind::Latency.reduce(&[500.0, 1000.0]), 3.0);
    }

    #[test]
    fn test_latency_skips_zero_rate() {
        assert_eq!(BenchmarkKind::Latency.reduce(&[0.0, 250.0]), 4.0);
    }

    #[test]
    fn test_empty_samples_contribute_nothing() {
        for kind in BenchmarkKind::ALL {
            assert_eq!(kind.reduce(&[]), 0.0);
        }
    }

    #[test]
    fn test_run_order() {
        assert_eq!(
            BenchmarkKind::ALL,
            [BenchmarkKind::Throughput, BenchmarkKind::Latency]
        );
        assert!(!BenchmarkKind::Throughput.is_averaged());
        assert!(BenchmarkKind::Latency.is_averaged());
    }
}
