//! JSON report of a benchmark run

use std::path::Path;

use chrono::{DateTime, Utc};
use libmeshperf_core::{BenchmarkConfig, MeshError, ResultRecord};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Machine names in mesh order
    pub machines: Vec<String>,
    pub config: BenchmarkConfig,
    pub results: Vec<ResultRecord>,
}

impl RunReport {
    pub fn new(machines: Vec<String>, config: BenchmarkConfig, results: Vec<ResultRecord>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            machines,
            config,
            results,
        }
    }

    pub fn write(&self, path: &Path) -> Result<(), MeshError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libmeshperf_core::BenchmarkKind;
    use tempfile::tempdir;

    #[test]
    fn test_report_write_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");

        let mut latency = ResultRecord::new(BenchmarkKind::Latency, 2, 1);
        latency.value = 0.25;
        let report = RunReport::new(
            vec!["vm-0".to_string(), "vm-1".to_string()],
            BenchmarkConfig::default(),
            vec![ResultRecord::new(BenchmarkKind::Throughput, 2, 1), latency],
        );
        report.write(&path).unwrap();

        let read: RunReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read.run_id, report.run_id);
        assert_eq!(read.machines, report.machines);
        assert_eq!(read.results, report.results);

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["results"][1]["metric"], "TCP_RR_Average_Latency");
        assert_eq!(raw["config"]["connections"], 1);
    }
}
