//! Benchmark run configuration

use serde::{Deserialize, Serialize};

use crate::error::{MeshError, Result};

/// Fewest machines a mesh can be measured with
pub const MIN_MACHINES: usize = 2;

/// Parameters shared by every netperf invocation in a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Concurrent connections between each ordered pair of machines
    pub connections: usize,
    /// Value passed to netperf's `-i`
    pub iterations: usize,
    /// Value passed to netperf's `-l`; netperf's own default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            connections: 1,
            iterations: 1,
            duration_seconds: None,
        }
    }
}

impl BenchmarkConfig {
    pub fn new(connections: usize, iterations: usize, duration_seconds: Option<u64>) -> Result<Self> {
        let config = Self {
            connections,
            iterations,
            duration_seconds,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.connections == 0 {
            return Err(MeshError::InvalidArgs(
                "connections must be at least 1".to_string(),
            ));
        }
        if self.iterations == 0 {
            return Err(MeshError::InvalidArgs(
                "iterations must be at least 1".to_string(),
            ));
        }
        if self.duration_seconds == Some(0) {
            return Err(MeshError::InvalidArgs(
                "duration_seconds must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a `[benchmark]`-style TOML table
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: BenchmarkConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

/// Number of machines to use for a requested mesh size.
///
/// A mesh needs at least two machines, so smaller requests are raised.
pub fn required_machine_count(requested: usize) -> usize {
    requested.max(MIN_MACHINES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.connections, 1);
        assert_eq!(config.iterations, 1);
        assert_eq!(config.duration_seconds, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_counts() {
        assert!(matches!(
            BenchmarkConfig::new(0, 1, None),
            Err(MeshError::InvalidArgs(_))
        ));
        assert!(matches!(
            BenchmarkConfig::new(1, 0, None),
            Err(MeshError::InvalidArgs(_))
        ));
        assert!(matches!(
            BenchmarkConfig::new(1, 1, Some(0)),
            Err(MeshError::InvalidArgs(_))
        ));
    }

    #[test]
    fn test_from_toml_partial() {
        let config = BenchmarkConfig::from_toml_str("connections = 4\nduration_seconds = 30\n").unwrap();
        assert_eq!(config.connections, 4);
        assert_eq!(config.iterations, 1);
        assert_eq!(config.duration_seconds, Some(30));
    }

    #[test]
    fn test_from_toml_invalid() {
        assert!(matches!(
            BenchmarkConfig::from_toml_str("connections = 0\n"),
            Err(MeshError::InvalidArgs(_))
        ));
        assert!(matches!(
            BenchmarkConfig::from_toml_str("connections = \"many\"\n"),
            Err(MeshError::TomlParse(_))
        ));
    }

    #[test]
    fn test_required_machine_count() {
        assert_eq!(required_machine_count(0), 2);
        assert_eq!(required_machine_count(1), 2);
        assert_eq!(required_machine_count(2), 2);
        assert_eq!(required_machine_count(7), 7);
    }
}
