//! Result records produced by a benchmark run

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::kind::BenchmarkKind;

/// Metadata key for the number of machines in the mesh
pub const META_NUMBER_MACHINES: &str = "number_machines";
/// Metadata key for the number of connections per machine pair
pub const META_NUMBER_CONNECTIONS: &str = "number_connections";

/// The aggregated output of one benchmark kind across the whole mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub metric: String,
    pub value: f64,
    pub unit: String,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ResultRecord {
    /// Fresh zero-valued record for `kind`
    pub fn new(kind: BenchmarkKind, machines: usize, connections: usize) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(META_NUMBER_MACHINES.to_string(), machines.into());
        metadata.insert(META_NUMBER_CONNECTIONS.to_string(), connections.into());

        Self {
            metric: kind.metric_name().to_string(),
            value: 0.0,
            unit: kind.unit().to_string(),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record() {
        let record = ResultRecord::new(BenchmarkKind::Latency, 4, 2);
        assert_eq!(record.metric, "TCP_RR_Average_Latency");
        assert_eq!(record.unit, "ms");
        assert_eq!(record.value, 0.0);
        assert_eq!(record.metadata[META_NUMBER_MACHINES], 4);
        assert_eq!(record.metadata[META_NUMBER_CONNECTIONS], 2);
    }

    #[test]
    fn test_record_json_shape() {
        let record = ResultRecord::new(BenchmarkKind::Throughput, 2, 1);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["metric"], "TCP_STREAM_Total_Throughput");
        assert_eq!(json["unit"], "Mbits/sec");
        assert_eq!(json["metadata"]["number_machines"], 2);
    }
}
