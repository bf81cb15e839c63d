//! Core library for meshperf
//!
//! Measures aggregate throughput and average latency across every ordered
//! pair of a set of machines by running netperf on each of them:
//! - [`topology`]: which machine connects to which, and how many times
//! - [`command`]: the backgrounded netperf command run on each source machine
//! - [`parser`]: netperf report parsing and per-kind reduction
//! - [`aggregator`]: one concurrent worker per source machine, one reducer
//! - [`driver`]: runs throughput then latency and normalizes the results
//! - [`netperf`]: installing and removing netperf on the machines
//!
//! Machines are reached only through the [`Machine`] trait.

pub mod aggregator;
pub mod command;
pub mod config;
pub mod driver;
pub mod error;
pub mod kind;
pub mod machine;
pub mod netperf;
pub mod parser;
pub mod record;
pub mod topology;

pub use config::{required_machine_count, BenchmarkConfig, MIN_MACHINES};
pub use driver::MeshBenchmark;
pub use error::{MeshError, Result};
pub use kind::BenchmarkKind;
pub use machine::{CommandOutput, Machine, MachineError};
pub use record::ResultRecord;
